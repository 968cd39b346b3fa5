//! Text encoding detection for LDraw files.
//!
//! LDraw files are UTF-8 by standard, but some editors save UTF-16 with a
//! byte order mark. Only the first three bytes are inspected.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8};

/// Encoding chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// UTF-16 BE BOM followed by the high byte of an ASCII character
const UTF16_BE_LEAD: [u8; 3] = [0xFE, 0xFF, 0x00];
/// UTF-16 LE BOM followed by '0'
const UTF16_LE_LEAD_ZERO: [u8; 3] = [0xFF, 0xFE, 0x30];
/// UTF-16 LE BOM followed by '/'
const UTF16_LE_LEAD_SLASH: [u8; 3] = [0xFF, 0xFE, 0x2F];

impl TextEncoding {
    /// Choose an encoding from the leading bytes of a buffer.
    ///
    /// Anything that is not one of the known UTF-16 lead sequences is UTF-8.
    pub fn detect(buffer: &[u8]) -> Self {
        let lead = match buffer.get(..3) {
            Some(lead) => lead,
            None => return TextEncoding::Utf8,
        };

        if lead == UTF16_BE_LEAD {
            TextEncoding::Utf16Be
        } else if lead == UTF16_LE_LEAD_ZERO || lead == UTF16_LE_LEAD_SLASH {
            TextEncoding::Utf16Le
        } else {
            TextEncoding::Utf8
        }
    }

    /// Decode a whole buffer, dropping a BOM if present.
    ///
    /// Invalid sequences become U+FFFD; the line decoder then rejects the
    /// affected lines instead of the whole file.
    pub fn decode(&self, buffer: &[u8]) -> String {
        let encoding = match self {
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::Utf16Le => UTF_16LE,
            TextEncoding::Utf16Be => UTF_16BE,
        };
        let (text, had_errors) = encoding.decode_with_bom_removal(buffer);
        if had_errors {
            log::debug!("Replaced malformed {} sequences while decoding", self);
        }
        text.into_owned()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "UTF-8"),
            TextEncoding::Utf16Le => write!(f, "UTF-16 LE"),
            TextEncoding::Utf16Be => write!(f, "UTF-16 BE"),
        }
    }
}

/// Inspect the first bytes of a file on disk.
pub fn detect_file_encoding(path: &Path) -> io::Result<TextEncoding> {
    let mut lead = Vec::with_capacity(3);
    File::open(path)?.take(3).read_to_end(&mut lead)?;
    Ok(TextEncoding::detect(&lead))
}

/// Detect and decode in one step.
pub fn decode_text(buffer: &[u8]) -> (String, TextEncoding) {
    let encoding = TextEncoding::detect(buffer);
    (encoding.decode(buffer), encoding)
}
