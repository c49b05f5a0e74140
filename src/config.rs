//! Player configuration
//!
//! Timing and output parameters, loadable from a JSON file. Every field has a
//! default matching the reference hardware (RP2040 at 125 MHz, 20 kHz pulse tick,
//! 3 s settling silence, 100 ms switch debounce).

use crate::{K7Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default system clock (RP2040 at stock speed)
pub const DEFAULT_SYSTEM_CLOCK_HZ: u32 = 125_000_000;

/// Default pulse engine tick rate (one tick = 50 µs)
pub const DEFAULT_TICK_HZ: u32 = 20_000;

/// Default output FIFO depth (joined RP2040 TX FIFO)
pub const DEFAULT_FIFO_DEPTH: usize = 8;

/// Configuration for the tape player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// System clock the pulse divider is derived from, in Hz
    pub system_clock_hz: u32,
    /// Pulse engine tick rate, in Hz
    pub tick_hz: u32,
    /// Entries the output FIFO accepts before `enqueue` blocks
    pub fifo_depth: usize,
    /// Silence before the program name, in milliseconds
    pub settle_ms: u64,
    /// Payload bytes between progress reports
    pub progress_interval: usize,
    /// Time a switch level must hold before it is accepted, in milliseconds
    pub debounce_ms: u64,
    /// Switch sampling period, in milliseconds
    pub debounce_tick_ms: u64,
    /// Drive the line inverted (some boards switch it through a transistor)
    pub invert_output: bool,
    /// Name sent ahead of the program (ASCII, converted to ZX81 codes)
    pub program_name: String,
    /// Sample rate for WAV rendering
    pub wav_sample_rate: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            system_clock_hz: DEFAULT_SYSTEM_CLOCK_HZ,
            tick_hz: DEFAULT_TICK_HZ,
            fifo_depth: DEFAULT_FIFO_DEPTH,
            settle_ms: 3000,
            progress_interval: 128,
            debounce_ms: 100,
            debounce_tick_ms: 10,
            invert_output: false,
            program_name: "DQ".to_string(),
            wav_sample_rate: 44_100,
        }
    }
}

impl PlayerConfig {
    /// Configuration without the settling silence (tests, offline rendering)
    pub fn instant() -> Self {
        PlayerConfig {
            settle_ms: 0,
            ..Self::default()
        }
    }

    /// Load and validate a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: PlayerConfig = serde_json::from_str(&text).map_err(|e| {
            K7Error::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a usable player
    pub fn validate(&self) -> Result<()> {
        if self.tick_hz == 0 || self.system_clock_hz == 0 {
            return Err(K7Error::ConfigError(
                "clock and tick rates must be non-zero".into(),
            ));
        }
        if self.fifo_depth == 0 {
            return Err(K7Error::ConfigError("fifo_depth must be at least 1".into()));
        }
        if self.progress_interval == 0 {
            return Err(K7Error::ConfigError(
                "progress_interval must be at least 1".into(),
            ));
        }
        if self.debounce_tick_ms == 0 || self.debounce_ms < self.debounce_tick_ms {
            return Err(K7Error::ConfigError(format!(
                "debounce window {} ms must cover at least one {} ms tick",
                self.debounce_ms, self.debounce_tick_ms
            )));
        }
        if self.wav_sample_rate == 0 {
            return Err(K7Error::ConfigError("wav_sample_rate must be non-zero".into()));
        }
        crate::pulse::ClockDivider::new(self.system_clock_hz, self.tick_hz)?;
        Ok(())
    }

    /// Settling silence as a duration
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Number of ticks a switch level must hold
    pub fn debounce_ticks(&self) -> u32 {
        (self.debounce_ms / self.debounce_tick_ms.max(1)).max(1) as u32
    }

    /// Switch sampling period as a duration
    pub fn debounce_period(&self) -> Duration {
        Duration::from_millis(self.debounce_tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.debounce_ticks(), 10);
        assert_eq!(config.settle(), Duration::from_secs(3));
    }

    #[test]
    fn test_instant_has_no_settle() {
        assert_eq!(PlayerConfig::instant().settle(), Duration::ZERO);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "settle_ms": 500, "invert_output": true }}"#).unwrap();

        let config = PlayerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.settle_ms, 500);
        assert!(config.invert_output);
        assert_eq!(config.tick_hz, DEFAULT_TICK_HZ);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = PlayerConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, K7Error::ConfigError(_)));
    }

    #[test]
    fn test_zero_fifo_rejected() {
        let config = PlayerConfig {
            fifo_depth: 0,
            ..PlayerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debounce_shorter_than_tick_rejected() {
        let config = PlayerConfig {
            debounce_ms: 5,
            ..PlayerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
