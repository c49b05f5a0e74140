//! `.P` image validation
//!
//! A `.P` file is a dump of ZX81 memory starting at the system variable area
//! (address 0x4009). The E_LINE system variable tells how much of it the ZX81
//! actually saves; anything after that is garbage some tools append.

use super::{ImageError, LOAD_BASE, MAX_IMAGE_LEN, TERMINATOR};
use tracing::debug;

/// Images this short cannot hold the system variables plus a program
pub const MIN_IMAGE_LEN: usize = 121;

/// Offset of the E_LINE system variable (address 0x4014)
pub const E_LINE_OFFSET: usize = 0x4014 - LOAD_BASE as usize;

/// Read a little-endian system variable at `offset`
pub(crate) fn read_word(raw: &[u8], offset: usize) -> Option<u16> {
    let lo = *raw.get(offset)?;
    let hi = *raw.get(offset + 1)?;
    Some(u16::from_le_bytes([lo, hi]))
}

/// Validate a raw `.P` buffer and return the number of meaningful bytes
///
/// Only the first [`MAX_IMAGE_LEN`] bytes are considered, matching the fixed
/// size of the load buffer.
pub fn validate(raw: &[u8]) -> Result<usize, ImageError> {
    let n = raw.len().min(MAX_IMAGE_LEN);
    let raw = &raw[..n];

    if n < MIN_IMAGE_LEN {
        debug!(len = n, "image too short");
        return Err(ImageError::TooShort { len: n });
    }
    if raw[0] != 0 {
        debug!(marker = raw[0], "bad version marker");
        return Err(ImageError::BadVersion { marker: raw[0] });
    }

    // n >= 121 so the pointer bytes are always present
    let e_line = read_word(raw, E_LINE_OFFSET).unwrap_or(0);
    let effective = match e_line.checked_sub(LOAD_BASE) {
        Some(len) if len > 0 => len as usize,
        _ => {
            debug!(e_line, "E_LINE below load base");
            return Err(ImageError::BadEndPointer { pointer: e_line });
        }
    };

    if effective > n {
        debug!(effective, available = n, "image truncated");
        return Err(ImageError::Truncated {
            declared: effective,
            available: n,
        });
    }

    let last = raw[effective - 1];
    if last != TERMINATOR {
        debug!(found = last, "terminator missing");
        return Err(ImageError::MissingTerminator { found: last });
    }

    Ok(effective)
}
