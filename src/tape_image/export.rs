//! C source export
//!
//! Renders a validated image as a `const uint8_t code[]` array, the form the
//! flash-resident test firmware embeds.

use super::TapeImage;
use std::fmt::Write;

const BYTES_PER_ROW: usize = 16;

/// Render the image as a C array definition
pub fn c_array(image: &TapeImage) -> String {
    let mut out = String::from("const uint8_t code[] =  {\n");
    let rows: Vec<String> = image
        .as_bytes()
        .chunks(BYTES_PER_ROW)
        .map(|row| {
            let mut line = String::from(" ");
            for byte in row {
                let _ = write!(line, " 0x{byte:02X},");
            }
            line
        })
        .collect();
    let last = rows.len().saturating_sub(1);
    for (i, mut row) in rows.into_iter().enumerate() {
        if i == last {
            row.pop();
        }
        out.push_str(&row);
        out.push('\n');
    }
    out.push_str("};\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tape_image::validator::E_LINE_OFFSET;

    #[test]
    fn test_layout() {
        let mut raw = vec![0u8; 130];
        raw[E_LINE_OFFSET..E_LINE_OFFSET + 2].copy_from_slice(&(0x4009u16 + 130).to_le_bytes());
        raw[129] = 0x80;
        let image = TapeImage::from_raw(&raw).unwrap();

        let text = c_array(&image);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "const uint8_t code[] =  {");
        // 130 bytes: 8 full rows plus one of 2
        assert_eq!(lines.len(), 1 + 9 + 1);
        assert_eq!(lines[9], "  0x00, 0x80");
        assert!(lines[1].ends_with(','));
        assert_eq!(lines[10], "};");
    }
}
