//! Tape transmission
//!
//! A transmission is: settling silence, the program name (last byte marked with
//! bit 7), the image bytes, then a wait until the engine has shifted everything
//! out. Validation and storage access happen before the first byte reaches the
//! engine, so a rejected file leaves the line untouched.

use crate::pulse::PulseSink;
use crate::status::{self, Breathing, Display, Indicator};
use crate::storage::{self, Storage};
use crate::tape_image::{ProgramName, TapeImage};
use crate::{PlayerConfig, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Orchestrates a transmission through a [`PulseSink`]
pub struct TapeSender<'a, S: PulseSink> {
    sink: &'a S,
    settle: Duration,
    progress_interval: usize,
}

impl<'a, S: PulseSink> TapeSender<'a, S> {
    /// Create a sender using the configured settle time and progress interval
    pub fn new(sink: &'a S, config: &PlayerConfig) -> Self {
        TapeSender {
            sink,
            settle: config.settle(),
            progress_interval: config.progress_interval.max(1),
        }
    }

    /// Transmit a validated image
    ///
    /// Cannot fail once started: the engine always drains at its fixed rate.
    pub fn send(
        &self,
        name: &ProgramName,
        image: &TapeImage,
        display: &mut dyn Display,
        indicator: &mut dyn Indicator,
    ) {
        let mut breathing = Breathing::new();
        display.report_progress(0);
        self.sink.settle(self.settle);

        for &byte in name.as_bytes() {
            self.sink.enqueue(byte);
            breathing.step(indicator);
        }

        let code = image.as_bytes();
        let size = code.len();
        for (i, &byte) in code.iter().enumerate() {
            self.sink.enqueue(byte);
            let remaining = size - i - 1;
            // 100 % waits for the drain below
            if remaining > 0 && remaining % self.progress_interval == 0 {
                display.report_progress(percent(size - remaining, size));
            }
            breathing.step(indicator);
        }

        self.sink.drain_wait();
        display.report_progress(100);
        info!(bytes = size, "transmission complete");
    }

    /// Validate a raw buffer and transmit it
    ///
    /// On rejection nothing is sent; the operator sees "Invalid file" and the
    /// failure colour.
    pub fn send_raw(
        &self,
        name: &ProgramName,
        raw: &[u8],
        display: &mut dyn Display,
        indicator: &mut dyn Indicator,
    ) -> Result<()> {
        let image = match TapeImage::from_raw(raw) {
            Ok(image) => image,
            Err(e) => {
                warn!("invalid file: {e}");
                display.report_status("Invalid file");
                indicator.set_indicator_color(status::FAILURE);
                return Err(e.into());
            }
        };
        info!(bytes = image.effective_length(), "sending");
        self.send(name, &image, display, indicator);
        indicator.set_indicator_color(status::READY);
        Ok(())
    }

    /// Load a program through the storage collaborator and transmit it
    pub fn send_file<St: Storage>(
        &self,
        storage: &mut St,
        path: &str,
        name: &ProgramName,
        display: &mut dyn Display,
        indicator: &mut dyn Indicator,
    ) -> Result<()> {
        display.report_status("Sending");
        display.report_status(path);

        let raw = match storage::load_program(storage, path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{e}");
                display.report_status("File not available");
                indicator.set_indicator_color(status::FAILURE);
                return Err(e);
            }
        };
        self.send_raw(name, &raw, display, indicator)
    }

    /// Stream `count` copies of an all-zero or all-one byte
    ///
    /// Gives a steady 0 or 1 waveform for checking timing on a scope or in a WAV.
    pub fn calibrate(&self, bit: bool, count: usize) {
        let byte = if bit { 0xFF } else { 0x00 };
        for _ in 0..count {
            self.sink.enqueue(byte);
        }
        self.sink.drain_wait();
    }
}

fn percent(sent: usize, size: usize) -> u8 {
    (100 * sent / size.max(1)) as u8
}
