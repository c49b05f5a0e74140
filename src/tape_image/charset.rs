//! ZX81 character set and BASIC keyword tokens

/// Printable form of character codes 0x00-0x3F (0x80-0xBF are the inverse video copies)
///
/// Codes 0x01-0x0A are block graphics and have no text form.
const CHARACTERS: [&str; 64] = [
    " ", "?", "?", "?", "?", "?", "?", "?", "?", "?", "?", "\"", "£", "$", ":", "?", //
    "(", ")", ">", "<", "=", "+", "-", "*", "/", ";", ",", ".", "0", "1", "2", "3", //
    "4", "5", "6", "7", "8", "9", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", //
    "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z", //
];

/// Keyword tokens 0xC0-0xFF
const KEYWORDS: [&str; 64] = [
    "\"\"", "AT ", "TAB ", "?", "CODE ", "VAL ", "LEN ", "SIN ", "COS ", "TAN ", //
    "ASN ", "ACS ", "ATN ", "LN ", "EXP ", "INT ", "SQR ", "SGN ", "ABS ", "PEEK ", //
    "USR ", "STR$ ", "CHR$ ", "NOT ", "**", " OR ", " AND ", "<=", ">=", "<>", //
    " THEN", " TO ", " STEP ", " LPRINT ", " LLIST ", " STOP ", " SLOW ", " FAST ", //
    " NEW ", " SCROLL ", " CONT ", " DIM ", " REM ", " FOR ", " GOTO ", " GOSUB ", //
    " INPUT ", " LOAD ", " LIST ", " LET ", " PAUSE ", " NEXT ", " POKE ", " PRINT ", //
    " PLOT ", " RUN ", " SAVE ", " RAND ", " IF ", " CLS ", " UNPLOT ", " CLEAR ", //
    " RETURN ", " COPY ", //
];

/// Inverse video flag; also marks the last character of a tape name
pub const INVERSE: u8 = 0x80;

/// End of a BASIC line
pub const NEWLINE: u8 = 0x76;

/// Start of the hidden floating point copy of a numeric literal
pub const NUMBER: u8 = 0x7E;

/// REM keyword
pub const REM: u8 = 0xEA;

/// Text for a single code, as the ZX81 LIST command shows it
pub fn decode(code: u8) -> &'static str {
    match code {
        0x00..=0x3F => CHARACTERS[code as usize],
        0x40 => "RND",
        0x41 => "INKEY$",
        0x42 => "PI",
        0x80..=0xBF => CHARACTERS[(code & 0x3F) as usize],
        0xC0..=0xFF => KEYWORDS[(code - 0xC0) as usize],
        _ => "?",
    }
}

/// ZX81 code for an ASCII character, if the character set has it
///
/// Lowercase letters map to their uppercase codes.
pub fn encode(ch: char) -> Option<u8> {
    let ch = ch.to_ascii_uppercase();
    match ch {
        ' ' => Some(0x00),
        '?' => Some(0x0F),
        _ => CHARACTERS
            .iter()
            .enumerate()
            .skip(0x0B)
            .find(|(_, text)| text.chars().eq(std::iter::once(ch)))
            .map(|(code, _)| code as u8),
    }
}
