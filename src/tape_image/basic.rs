//! BASIC program listing
//!
//! Walks the program area of a validated image (0x407D up to the display file)
//! and renders each line with the ZX81 keyword table.

use super::charset::{self, NEWLINE, NUMBER, REM};
use super::validator::read_word;
use super::{ImageError, TapeImage, LOAD_BASE};
use std::fmt;

/// Offset of the first program line (address 0x407D)
pub const PROGRAM_OFFSET: usize = 0x407D - LOAD_BASE as usize;

/// Offset of the D_FILE system variable (address 0x400C)
pub const D_FILE_OFFSET: usize = 0x400C - LOAD_BASE as usize;

/// Bytes the hidden binary form of a numeric literal occupies, marker included
const NUMBER_LEN: usize = 6;

/// One decoded BASIC line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLine {
    /// Line number
    pub number: u16,
    /// Line text without the line number
    pub text: String,
}

impl fmt::Display for BasicLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4} {}", self.number, self.text.trim())
    }
}

/// Decode every BASIC line stored in the image
pub fn list_program(image: &TapeImage) -> Result<Vec<BasicLine>, ImageError> {
    let data = image.as_bytes();
    let d_file = read_word(data, D_FILE_OFFSET).ok_or(ImageError::BadLine {
        offset: D_FILE_OFFSET,
    })?;
    let end = (d_file.saturating_sub(LOAD_BASE) as usize).min(data.len());

    let mut lines = Vec::new();
    let mut pos = PROGRAM_OFFSET;
    while pos < end {
        let header = data
            .get(pos..pos + 4)
            .ok_or(ImageError::BadLine { offset: pos })?;
        let number = u16::from_be_bytes([header[0], header[1]]);
        let length = u16::from_le_bytes([header[2], header[3]]) as usize;
        pos += 4;

        let body_end = pos + length.saturating_sub(1);
        let body = data
            .get(pos..body_end)
            .ok_or(ImageError::BadLine { offset: pos })?;
        let text = decode_body(body);

        if data.get(body_end) != Some(&NEWLINE) {
            return Err(ImageError::BadLine { offset: body_end });
        }
        pos = body_end + 1;
        lines.push(BasicLine { number, text });
    }
    Ok(lines)
}

fn decode_body(body: &[u8]) -> String {
    let mut text = String::new();
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            REM => {
                // REM bodies are shown verbatim, numbers included
                for &code in &body[i..] {
                    text.push_str(charset::decode(code));
                }
                break;
            }
            NUMBER => i += NUMBER_LEN,
            code => {
                text.push_str(charset::decode(code));
                i += 1;
            }
        }
    }
    text
}
