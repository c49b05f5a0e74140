//! ZX81 cassette waveform
//!
//! Each bit, most significant first, is a burst of pulses followed by silence:
//! 4 pulses for a 0, 9 pulses for a 1. A pulse is 150 µs high then 150 µs low,
//! and every burst is followed by 1300 µs low.

use super::{Level, PulseQueueEntry};
use crate::{K7Error, Result};

/// Pulses in the burst for a 0 bit
pub const PULSES_ZERO: u32 = 4;
/// Pulses in the burst for a 1 bit
pub const PULSES_ONE: u32 = 9;
/// High half of a pulse, in microseconds
pub const PULSE_HIGH_US: u32 = 150;
/// Low half of a pulse, in microseconds
pub const PULSE_LOW_US: u32 = 150;
/// Silence after each bit, in microseconds
pub const BIT_GAP_US: u32 = 1300;

/// One level held for a number of engine ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Line level
    pub level: Level,
    /// Duration in engine ticks
    pub ticks: u32,
}

/// Waveform durations expressed in engine ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveTiming {
    /// Ticks the line stays high in a pulse
    pub high_ticks: u32,
    /// Ticks the line stays low in a pulse
    pub low_ticks: u32,
    /// Ticks of silence after each bit
    pub gap_ticks: u32,
}

impl WaveTiming {
    /// Convert the cassette timings to ticks of the given rate
    ///
    /// Fails when the rate is too coarse to resolve a pulse half.
    pub fn for_tick_rate(tick_hz: f64) -> Result<Self> {
        let ticks = |us: u32| (us as f64 * tick_hz / 1_000_000.0).round() as u32;
        let timing = WaveTiming {
            high_ticks: ticks(PULSE_HIGH_US),
            low_ticks: ticks(PULSE_LOW_US),
            gap_ticks: ticks(BIT_GAP_US),
        };
        if timing.high_ticks == 0 || timing.low_ticks == 0 {
            return Err(K7Error::ConfigError(format!(
                "tick rate {tick_hz:.0} Hz cannot resolve a {PULSE_HIGH_US} µs pulse"
            )));
        }
        Ok(timing)
    }

    /// Ticks needed to shift one bit
    pub fn bit_ticks(&self, bit: bool) -> u32 {
        let pulses = if bit { PULSES_ONE } else { PULSES_ZERO };
        pulses * (self.high_ticks + self.low_ticks) + self.gap_ticks
    }

    /// Ticks needed to shift one byte
    pub fn byte_ticks(&self, byte: u8) -> u32 {
        (0..8).map(|i| self.bit_ticks(byte & (0x80 >> i) != 0)).sum()
    }

    /// Level schedule for one queue entry
    pub fn segments(&self, entry: PulseQueueEntry) -> Vec<Segment> {
        match entry {
            PulseQueueEntry::Byte(byte) => self.byte_segments(byte),
            PulseQueueEntry::Idle(ticks) => vec![Segment {
                level: Level::Low,
                ticks,
            }],
        }
    }

    /// Level schedule for one byte, most significant bit first
    pub fn byte_segments(&self, byte: u8) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(8 * (2 * PULSES_ONE as usize + 1));
        for i in 0..8 {
            let pulses = if byte & (0x80 >> i) != 0 {
                PULSES_ONE
            } else {
                PULSES_ZERO
            };
            for _ in 0..pulses {
                segments.push(Segment {
                    level: Level::High,
                    ticks: self.high_ticks,
                });
                segments.push(Segment {
                    level: Level::Low,
                    ticks: self.low_ticks,
                });
            }
            segments.push(Segment {
                level: Level::Low,
                ticks: self.gap_ticks,
            });
        }
        segments
    }
}
