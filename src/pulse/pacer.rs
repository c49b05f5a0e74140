//! Output pacing
//!
//! The pacer is the engine's clock source: after a level is put on the line the
//! worker asks the pacer to hold it for a number of ticks.

use super::ClockDivider;
use std::time::{Duration, Instant};

/// Clock source that paces the engine's output
pub trait Pacer: Send {
    /// Hold the current level for `ticks` ticks
    fn wait_ticks(&mut self, ticks: u32);

    /// The queue ran empty; the next `wait_ticks` starts a new timeline
    fn idle(&mut self) {}
}

/// Wall-clock pacer
///
/// Deadlines accumulate from the first tick after idle, so sleep overshoot on one
/// segment is absorbed by the next instead of stretching the bit.
#[derive(Debug, Clone)]
pub struct RealtimePacer {
    tick: Duration,
    deadline: Option<Instant>,
}

impl RealtimePacer {
    /// Pace at the tick rate produced by `divider`
    pub fn new(divider: &ClockDivider) -> Self {
        RealtimePacer {
            tick: divider.tick_duration(),
            deadline: None,
        }
    }
}

impl Pacer for RealtimePacer {
    fn wait_ticks(&mut self, ticks: u32) {
        let start = self.deadline.unwrap_or_else(Instant::now);
        let target = start + self.tick * ticks;
        let now = Instant::now();
        if target > now {
            spin_sleep::sleep(target - now);
        }
        self.deadline = Some(target);
    }

    fn idle(&mut self) {
        self.deadline = None;
    }
}

/// No pacing; the output line's own clock (e.g. a WAV sample rate) carries timing
#[derive(Debug, Clone, Copy, Default)]
pub struct Unpaced;

impl Pacer for Unpaced {
    fn wait_ticks(&mut self, _ticks: u32) {}
}
