//! Quadrature decoding
//!
//! The hardware sampler pushes one sample per edge on either encoder line. A
//! sample packs the current and previous levels of both lines. Only the rising
//! edge of A counts as a detent; B's level at that moment gives the direction.
//! Every other transition (bounce, the remaining quarter steps) is ignored.

use super::{EventQueue, KeyEvent};
use bitflags::bitflags;

bitflags! {
    /// Packed encoder sample: current and previous levels of lines A and B
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EncoderSample: u8 {
        /// Line A now
        const A = 0b1000;
        /// Line B now
        const B = 0b0100;
        /// Line A at the previous sample
        const A_LAST = 0b0010;
        /// Line B at the previous sample
        const B_LAST = 0b0001;
    }
}

/// Bit position of the sample nibble in a raw 32-bit sampler word
const WORD_SHIFT: u32 = 28;

impl EncoderSample {
    /// Extract the sample from the top nibble of a 32-bit sampler word
    pub fn from_word(word: u32) -> Self {
        Self::from_bits_truncate((word >> WORD_SHIFT) as u8)
    }

    /// Build a sample from previous and current 2-bit phases (`A << 1 | B`)
    pub fn from_phases(previous: u8, current: u8) -> Self {
        Self::from_bits_truncate(((current & 0b11) << 2) | (previous & 0b11))
    }

    /// Current phase, `A << 1 | B`
    pub fn current_phase(self) -> u8 {
        (self.bits() >> 2) & 0b11
    }

    /// Previous phase, `A << 1 | B`
    pub fn previous_phase(self) -> u8 {
        self.bits() & 0b11
    }
}

/// Direction of one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One detent clockwise
    Increase,
    /// One detent anticlockwise
    Decrease,
    /// Not a detent edge
    None,
}

/// A low, B low
const PHASE_00: u8 = 0b00;
/// A low, B high
const PHASE_01: u8 = 0b01;
/// A high, B low
const PHASE_10: u8 = 0b10;
/// A high, B high
const PHASE_11: u8 = 0b11;

/// Classify one sample
pub fn classify(sample: EncoderSample) -> Step {
    match (sample.previous_phase(), sample.current_phase()) {
        // A ____|‾‾‾‾
        // B _________
        (PHASE_00, PHASE_10) => Step::Increase,
        // A ____|‾‾‾‾
        // B ‾‾‾‾‾‾‾‾‾
        (PHASE_01, PHASE_11) => Step::Decrease,
        _ => Step::None,
    }
}

/// Hardware sampler feeding the decoder
pub trait QuadratureSampler {
    /// True while buffered samples remain
    fn has_pending_sample(&self) -> bool;

    /// Take the oldest buffered sample
    fn take_sample(&mut self) -> EncoderSample;
}

/// Turns encoder samples into Up/Down key events
#[derive(Debug, Default, Clone)]
pub struct QuadratureDecoder {
    state_a: bool,
    state_b: bool,
}

impl QuadratureDecoder {
    /// Create a decoder; levels are taken from the first sample
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one sampler notification, draining every buffered sample
    ///
    /// Returns the number of samples processed.
    pub fn on_notify(&mut self, sampler: &mut dyn QuadratureSampler, queue: &EventQueue) -> usize {
        let mut processed = 0;
        while sampler.has_pending_sample() {
            let sample = sampler.take_sample();
            self.process(sample, queue);
            processed += 1;
        }
        processed
    }

    /// Handle a single sample
    pub fn process(&mut self, sample: EncoderSample, queue: &EventQueue) -> Step {
        self.state_a = sample.contains(EncoderSample::A);
        self.state_b = sample.contains(EncoderSample::B);

        let step = classify(sample);
        let event = match step {
            Step::Increase => Some(KeyEvent::Up),
            Step::Decrease => Some(KeyEvent::Down),
            Step::None => None,
        };
        if let Some(event) = event {
            queue.publish(event);
        }
        step
    }

    /// Last seen levels of lines A and B
    pub fn levels(&self) -> (bool, bool) {
        (self.state_a, self.state_b)
    }
}
