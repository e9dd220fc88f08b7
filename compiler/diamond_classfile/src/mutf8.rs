//! Modified UTF-8, the string encoding of `CONSTANT_Utf8` entries.
//!
//! Differs from standard UTF-8 in two ways: U+0000 is written as the two
//! bytes `C0 80`, and supplementary characters are written as a surrogate
//! pair, each half encoded as a three-byte sequence.

use crate::error::{ClassFileError, Result};

/// Decode modified UTF-8 into a Rust string.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let cont = |j: usize| -> Result<u16> {
            match bytes.get(j) {
                Some(&c) if c & 0xC0 == 0x80 => Ok(u16::from(c & 0x3F)),
                _ => Err(ClassFileError::BadUtf8(j)),
            }
        };
        if b & 0x80 == 0 && b != 0 {
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            units.push((u16::from(b & 0x1F) << 6) | cont(i + 1)?);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            units.push((u16::from(b & 0x0F) << 12) | (cont(i + 1)? << 6) | cont(i + 2)?);
            i += 3;
        } else {
            return Err(ClassFileError::BadUtf8(i));
        }
    }
    char::decode_utf16(units.iter().copied())
        .enumerate()
        .map(|(at, c)| c.map_err(|_| ClassFileError::BadUtf8(at)))
        .collect()
}

/// Encode a Rust string as modified UTF-8.
#[expect(
    clippy::cast_possible_truncation,
    reason = "every cast is masked or shifted into u8 range"
)]
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}
