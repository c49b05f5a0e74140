//! Pulse Timing Engine
//!
//! Shifts queued bytes out as the ZX81 cassette waveform at a fixed tick rate
//! derived from the system clock. The producer side blocks while the FIFO is
//! full (backpressure); the consumer side is a worker paced by a [`Pacer`].

pub mod clock;
pub mod engine;
pub mod line;
pub mod pacer;
pub mod wav;
pub mod waveform;

pub use clock::ClockDivider;
pub use engine::{EngineStats, PulseEngine};
pub use line::{OutputLine, RecordingLine};
pub use pacer::{Pacer, RealtimePacer, Unpaced};
pub use wav::WavOutputLine;
pub use waveform::{Segment, WaveTiming};

use std::time::Duration;

/// Output line level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Line driven high (pulse)
    High,
    /// Line low (between pulses, silence)
    Low,
}

impl Level {
    /// The opposite level
    pub fn inverted(self) -> Self {
        match self {
            Level::High => Level::Low,
            Level::Low => Level::High,
        }
    }
}

/// Entry in the engine's FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseQueueEntry {
    /// A byte to shift out
    Byte(u8),
    /// Keep the line silent for this many ticks
    Idle(u32),
}

/// Anything the tape sender can feed
///
/// Implemented by [`PulseEngine`]; tests substitute recorders.
pub trait PulseSink {
    /// Queue one byte, blocking while the FIFO is full
    fn enqueue(&self, byte: u8);

    /// Block until every queued entry has been shifted out
    fn drain_wait(&self);

    /// Keep the line silent for `duration`, blocking until it has elapsed
    fn settle(&self, duration: Duration);
}
