//! Clock divider
//!
//! The pulse engine runs from the system clock through a fractional divider
//! (16 integer bits, 8 fractional bits), like an RP2040 PIO state machine. The
//! tick period follows from the divider actually programmed, not from the
//! requested rate.

use crate::{K7Error, Result};
use std::time::Duration;

/// Largest integer divider the hardware accepts
const MAX_DIVIDER: f64 = 65_536.0;

/// Fractional clock divider derived from the system clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDivider {
    system_clock_hz: u32,
    integer: u32,
    fraction: u8,
}

impl ClockDivider {
    /// Compute the divider that brings `system_clock_hz` down to `tick_hz`
    pub fn new(system_clock_hz: u32, tick_hz: u32) -> Result<Self> {
        if system_clock_hz == 0 || tick_hz == 0 {
            return Err(K7Error::ConfigError("clock rates must be non-zero".into()));
        }
        let div = system_clock_hz as f64 / tick_hz as f64;
        if !(1.0..=MAX_DIVIDER).contains(&div) {
            return Err(K7Error::ConfigError(format!(
                "divider {div:.3} for {tick_hz} Hz from {system_clock_hz} Hz is out of range"
            )));
        }

        let mut integer = div.floor() as u32;
        let mut fraction = ((div - integer as f64) * 256.0).round() as u32;
        if fraction == 256 {
            integer += 1;
            fraction = 0;
        }
        if integer as f64 > MAX_DIVIDER {
            integer = MAX_DIVIDER as u32;
            fraction = 0;
        }

        Ok(ClockDivider {
            system_clock_hz,
            integer,
            fraction: fraction as u8,
        })
    }

    /// Integer part of the divider
    pub fn integer(&self) -> u32 {
        self.integer
    }

    /// Fractional part of the divider, in 1/256 steps
    pub fn fraction(&self) -> u8 {
        self.fraction
    }

    /// Divider as programmed
    pub fn divider(&self) -> f64 {
        self.integer as f64 + self.fraction as f64 / 256.0
    }

    /// Tick rate the divider produces
    pub fn tick_hz(&self) -> f64 {
        self.system_clock_hz as f64 / self.divider()
    }

    /// Duration of one tick
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(self.divider() / self.system_clock_hz as f64)
    }

    /// Number of whole ticks closest to `duration`
    pub fn ticks_for(&self, duration: Duration) -> u64 {
        (duration.as_secs_f64() * self.tick_hz()).round() as u64
    }
}
