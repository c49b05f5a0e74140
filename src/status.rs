//! Operator feedback collaborators
//!
//! The sender reports through two fire-and-forget interfaces: a [`Display`] for
//! progress and status text, and an [`Indicator`] for the status LED colour.
//! Rendering either is up to the caller.

use tracing::info;

/// RGB colour for the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Create a colour
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Pack as 0x00GGRRBB, the order a WS2812 LED shifts in
    pub fn to_grb(self) -> u32 {
        ((self.g as u32) << 16) | ((self.r as u32) << 8) | self.b as u32
    }
}

/// Powered up, not ready yet
pub const BOOT: Rgb = Rgb::new(0, 0, 128);
/// Idle and ready, or last send succeeded
pub const READY: Rgb = Rgb::new(0, 127, 0);
/// Last send or start-up failed
pub const FAILURE: Rgb = Rgb::new(128, 0, 0);

/// Progress and status sink
pub trait Display {
    /// Transmission progress, 0 to 100
    fn report_progress(&mut self, percent: u8);

    /// Short status message
    fn report_status(&mut self, message: &str);
}

/// Status LED
pub trait Indicator {
    /// Set the LED colour
    fn set_indicator_color(&mut self, color: Rgb);
}

/// Progress text as shown on the player's display
pub fn format_progress(percent: u8) -> String {
    format!("Sent {}%", percent.min(100))
}

/// Display that writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDisplay;

impl Display for LogDisplay {
    fn report_progress(&mut self, percent: u8) {
        info!("{}", format_progress(percent));
    }

    fn report_status(&mut self, message: &str) {
        info!("{message}");
    }
}

/// Indicator that ignores colour changes
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndicator;

impl Indicator for NoIndicator {
    fn set_indicator_color(&mut self, _color: Rgb) {}
}

/// Blue "breathing" ramp shown while a program is being sent
///
/// Each step moves the intensity by the current delta, turning around above 120
/// and at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breathing {
    intensity: i16,
    delta: i16,
}

impl Breathing {
    const TOP: i16 = 120;

    /// Start dark, brightening by 2 per step
    pub fn new() -> Self {
        Breathing {
            intensity: 0,
            delta: 2,
        }
    }

    /// Show the current colour and advance the ramp
    pub fn step(&mut self, indicator: &mut dyn Indicator) {
        indicator.set_indicator_color(Rgb::new(0, 0, self.intensity as u8));
        if self.delta < 0 && self.intensity < -self.delta {
            self.delta = -self.delta;
        }
        if self.intensity > Self::TOP && self.delta > 0 {
            self.delta = -self.delta;
        }
        self.intensity += self.delta;
    }
}

impl Default for Breathing {
    fn default() -> Self {
        Self::new()
    }
}
