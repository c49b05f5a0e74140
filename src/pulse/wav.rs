//! WAV rendering of the pulse train
//!
//! Renders line levels as 16-bit mono PCM, so a program can be loaded into a real
//! ZX81 (or an emulator) from any audio player.

use super::line::OutputLine;
use super::{ClockDivider, Level};
use crate::{K7Error, PlayerConfig, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Sample value for a high line
const HIGH_SAMPLE: i16 = 24_000;
/// Sample value for a low line
const LOW_SAMPLE: i16 = 0;

/// Output line writing a WAV file
pub struct WavOutputLine {
    writer: Option<WavWriter<BufWriter<File>>>,
    samples_per_tick: f64,
    /// Exact sample position the rendered levels have reached
    position: f64,
    written: u64,
}

impl WavOutputLine {
    /// Create the WAV file, using the configured sample rate and clock divider
    pub fn create<P: AsRef<Path>>(path: P, config: &PlayerConfig) -> Result<Self> {
        let divider = ClockDivider::new(config.system_clock_hz, config.tick_hz)?;
        let spec = WavSpec {
            channels: 1,
            sample_rate: config.wav_sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path.as_ref(), spec).map_err(|e| {
            K7Error::OutputError(format!(
                "Failed to create WAV file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(WavOutputLine {
            writer: Some(writer),
            samples_per_tick: config.wav_sample_rate as f64 / divider.tick_hz(),
            position: 0.0,
            written: 0,
        })
    }

    /// Samples written so far
    pub fn samples_written(&self) -> u64 {
        self.written
    }
}

impl OutputLine for WavOutputLine {
    fn emit(&mut self, level: Level, ticks: u32) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| K7Error::OutputError("WAV file already finalized".into()))?;

        self.position += ticks as f64 * self.samples_per_tick;
        let target = self.position.round() as u64;
        let sample = match level {
            Level::High => HIGH_SAMPLE,
            Level::Low => LOW_SAMPLE,
        };
        while self.written < target {
            writer
                .write_sample(sample)
                .map_err(|e| K7Error::OutputError(format!("WAV write error: {e}")))?;
            self.written += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer
                .finalize()
                .map_err(|e| K7Error::OutputError(format!("WAV finalize error: {e}")))?;
        }
        Ok(())
    }
}
