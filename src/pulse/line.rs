//! Output lines
//!
//! An output line is the engine's only hardware contract: put a level on the
//! line and keep it there for a number of ticks.

use super::Level;
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// Destination of the pulse train
pub trait OutputLine: Send {
    /// Drive `level` for `ticks` engine ticks
    fn emit(&mut self, level: Level, ticks: u32) -> Result<()>;

    /// Flush any buffered output; called once when the engine stops
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Line that records every segment it receives
///
/// Clones share the same record, so a test can keep one clone and hand the other
/// to the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordingLine {
    segments: Arc<Mutex<Vec<(Level, u32)>>>,
}

impl RecordingLine {
    /// Create an empty recording
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments recorded so far
    pub fn segments(&self) -> Vec<(Level, u32)> {
        self.segments.lock().clone()
    }

    /// Total ticks recorded at `level`
    pub fn ticks_at(&self, level: Level) -> u64 {
        self.segments
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, t)| *t as u64)
            .sum()
    }
}

impl OutputLine for RecordingLine {
    fn emit(&mut self, level: Level, ticks: u32) -> Result<()> {
        self.segments.lock().push((level, ticks));
        Ok(())
    }
}
