//! ZX81 program images
//!
//! A [`TapeImage`] is a validated `.P` memory dump, trimmed to the bytes the
//! ZX81 would have saved. A [`ProgramName`] is the name block that precedes it on
//! tape.

pub mod basic;
pub mod charset;
pub mod export;
pub mod validator;

pub use basic::{list_program, BasicLine};
pub use validator::validate;

/// Address the image is loaded at (first system variable, VERSN)
pub const LOAD_BASE: u16 = 0x4009;

/// Largest image the player loads
pub const MAX_IMAGE_LEN: usize = 16 * 1024;

/// Value of the last saved byte
pub const TERMINATOR: u8 = 0x80;

/// Longest name accepted for the tape name block
pub const MAX_NAME_LEN: usize = 127;

/// Reasons an image or name is rejected
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Too short to hold the system variables and a program
    #[error("image too short ({len} bytes)")]
    TooShort {
        /// Bytes available
        len: usize,
    },

    /// First byte is not the version marker 0
    #[error("bad version marker {marker:#04X}")]
    BadVersion {
        /// Value found at offset 0
        marker: u8,
    },

    /// E_LINE does not point past the load base
    #[error("E_LINE pointer {pointer:#06X} is not past the load base")]
    BadEndPointer {
        /// Raw E_LINE value
        pointer: u16,
    },

    /// E_LINE declares more bytes than the buffer holds
    #[error("image declares {declared} bytes but only {available} are present")]
    Truncated {
        /// Length derived from E_LINE
        declared: usize,
        /// Bytes in the buffer
        available: usize,
    },

    /// The last saved byte is not 0x80
    #[error("missing 0x80 terminator (found {found:#04X})")]
    MissingTerminator {
        /// Byte found where the terminator belongs
        found: u8,
    },

    /// A BASIC line runs past the program area or lacks its NEWLINE
    #[error("malformed BASIC line at offset {offset}")]
    BadLine {
        /// Offset where decoding stopped
        offset: usize,
    },

    /// A program name cannot be sent
    #[error("invalid program name: {0}")]
    InvalidName(String),
}

/// A validated program image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapeImage {
    data: Vec<u8>,
}

impl TapeImage {
    /// Validate a raw buffer and keep its meaningful bytes
    pub fn from_raw(raw: &[u8]) -> Result<Self, ImageError> {
        let len = validate(raw)?;
        Ok(TapeImage {
            data: raw[..len].to_vec(),
        })
    }

    /// Validate an owned buffer, trimming it in place
    pub fn from_vec(mut raw: Vec<u8>) -> Result<Self, ImageError> {
        let len = validate(&raw)?;
        raw.truncate(len);
        Ok(TapeImage { data: raw })
    }

    /// Bytes to transmit
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes to transmit
    pub fn effective_length(&self) -> usize {
        self.data.len()
    }
}

/// Name block sent before the program
///
/// Bytes are ZX81 character codes; only the last one has bit 7 set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramName {
    bytes: Vec<u8>,
}

impl ProgramName {
    /// Build a name from ZX81 codes, checking the end marker
    pub fn from_codes(bytes: &[u8]) -> Result<Self, ImageError> {
        let (last, body) = bytes
            .split_last()
            .ok_or_else(|| ImageError::InvalidName("empty name".into()))?;
        if bytes.len() > MAX_NAME_LEN {
            return Err(ImageError::InvalidName(format!(
                "{} characters, at most {MAX_NAME_LEN} allowed",
                bytes.len()
            )));
        }
        if last & charset::INVERSE == 0 {
            return Err(ImageError::InvalidName(
                "last character lacks the end marker".into(),
            ));
        }
        if let Some(pos) = body.iter().position(|b| b & charset::INVERSE != 0) {
            return Err(ImageError::InvalidName(format!(
                "end marker on character {pos} before the end"
            )));
        }
        Ok(ProgramName {
            bytes: bytes.to_vec(),
        })
    }

    /// Convert an ASCII name to ZX81 codes and mark its last character
    pub fn from_ascii(name: &str) -> Result<Self, ImageError> {
        let mut bytes = name
            .chars()
            .map(|ch| {
                charset::encode(ch).ok_or_else(|| {
                    ImageError::InvalidName(format!("'{ch}' has no ZX81 character"))
                })
            })
            .collect::<Result<Vec<u8>, ImageError>>()?;
        if let Some(last) = bytes.last_mut() {
            *last |= charset::INVERSE;
        }
        Self::from_codes(&bytes)
    }

    /// Bytes to transmit, end marker included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for ProgramName {
    /// "DQ", the name the player firmware sends
    fn default() -> Self {
        ProgramName {
            bytes: vec![0x29, 0xB6],
        }
    }
}
