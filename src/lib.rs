//! ZX81 cassette player
//!
//! Plays a ZX81 `.P` program image back as the pulse train the ZX81 tape loader
//! expects, while an operator picks the program with a rotary encoder.
//!
//! # Subsystems
//! - Tape pulse encoder: [`tape_image`] validates the image, [`sender`] orchestrates
//!   the transmission and [`pulse`] shifts bytes out at a fixed, clock-derived pace
//! - Rotary input: [`input`] decodes quadrature samples and debounces the push
//!   switch into a bounded queue of [`KeyEvent`]s
//!
//! Display, storage and the status LED are collaborators behind the traits in
//! [`status`] and [`storage`].
//!
//! # Quick start
//! ## Render a program to a WAV file
//! ```no_run
//! use zxk7::pulse::{PulseEngine, Unpaced, WavOutputLine};
//! use zxk7::sender::TapeSender;
//! use zxk7::status::{LogDisplay, NoIndicator};
//! use zxk7::storage::FsStorage;
//! use zxk7::{PlayerConfig, ProgramName};
//!
//! # fn main() -> zxk7::Result<()> {
//! let config = PlayerConfig::default();
//! let line = WavOutputLine::create("game.wav", &config)?;
//! let engine = PulseEngine::start(&config, Box::new(line), Box::new(Unpaced))?;
//! let sender = TapeSender::new(&engine, &config);
//! let name = ProgramName::from_ascii("DQ")?;
//! sender.send_file(&mut FsStorage, "GAME.P", &name, &mut LogDisplay, &mut NoIndicator)?;
//! engine.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feed rotary input
//! ```
//! use zxk7::input::{EncoderSample, EventQueue, KeyEvent, SwitchDebouncer};
//!
//! let queue = EventQueue::new();
//! let mut debouncer = SwitchDebouncer::new(10);
//! for _ in 0..10 {
//!     debouncer.sample(true, &queue);
//! }
//! assert_eq!(queue.poll(), Some(KeyEvent::Enter));
//! # let _ = EncoderSample::empty();
//! ```

#![warn(missing_docs)]

pub mod config; // Player configuration
pub mod input; // Rotary encoder and switch input
pub mod pulse; // Pulse Timing Engine
pub mod sender; // Tape transmission
pub mod status; // Display and indicator collaborators
pub mod storage; // Program file access
pub mod tape_image; // .P image validation and inspection

use tape_image::ImageError;

/// Error types for tape playback operations
#[derive(thiserror::Error, Debug)]
pub enum K7Error {
    /// The program image failed validation
    #[error("Invalid image: {0}")]
    InvalidImage(#[from] ImageError),

    /// The program file could not be opened or read
    #[error("Storage unavailable for '{path}': {reason}")]
    StorageUnavailable {
        /// Path that was being accessed
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Error writing to the output line (WAV file, device)
    #[error("Output error: {0}")]
    OutputError(String),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for K7Error {
    /// Converts a String into `K7Error::Other`.
    ///
    /// Prefer the specific variants where the failure has a known kind.
    fn from(msg: String) -> Self {
        K7Error::Other(msg)
    }
}

impl From<&str> for K7Error {
    fn from(msg: &str) -> Self {
        K7Error::Other(msg.to_string())
    }
}

/// Result type for tape playback operations
pub type Result<T> = std::result::Result<T, K7Error>;

// Public API exports
pub use config::PlayerConfig;
pub use input::{EventQueue, KeyEvent};
pub use pulse::{PulseEngine, PulseSink};
pub use sender::TapeSender;
pub use tape_image::{ProgramName, TapeImage};
