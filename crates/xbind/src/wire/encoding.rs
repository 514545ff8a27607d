// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Character encodings for byte-stream input and output.

use crate::error::{Error, Result};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Supported document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharacterEncoding {
    #[default]
    Utf8,
    /// Big-endian with a byte order mark.
    Utf16,
    Utf16Be,
    Utf16Le,
}

impl CharacterEncoding {
    /// Resolve an encoding label (case-insensitive).
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(CharacterEncoding::Utf8),
            "UTF-16" | "UTF16" => Ok(CharacterEncoding::Utf16),
            "UTF-16BE" | "UTF16BE" => Ok(CharacterEncoding::Utf16Be),
            "UTF-16LE" | "UTF16LE" => Ok(CharacterEncoding::Utf16Le),
            _ => Err(Error::UnsupportedEncoding(label.to_string())),
        }
    }

    /// Label written into the XML declaration.
    pub fn label(self) -> &'static str {
        match self {
            CharacterEncoding::Utf8 => "UTF-8",
            CharacterEncoding::Utf16 => "UTF-16",
            CharacterEncoding::Utf16Be => "UTF-16BE",
            CharacterEncoding::Utf16Le => "UTF-16LE",
        }
    }
}

impl fmt::Display for CharacterEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CharacterEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}

pub(crate) fn encode_to<W: Write>(mut out: W, text: &str, encoding: CharacterEncoding) -> Result<()> {
    match encoding {
        CharacterEncoding::Utf8 => out.write_all(text.as_bytes())?,
        CharacterEncoding::Utf16 | CharacterEncoding::Utf16Be => {
            let mut bytes = Vec::with_capacity(text.len() * 2 + 2);
            if encoding == CharacterEncoding::Utf16 {
                bytes.extend_from_slice(&[0xFE, 0xFF]);
            }
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
            out.write_all(&bytes)?;
        }
        CharacterEncoding::Utf16Le => {
            let mut bytes = Vec::with_capacity(text.len() * 2);
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            out.write_all(&bytes)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn decode_utf16(bytes: &[u8], big_endian: bool) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::structural("truncated UTF-16 input", None));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| {
            if big_endian {
                u16::from_be_bytes([c[0], c[1]])
            } else {
                u16::from_le_bytes([c[0], c[1]])
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|e| Error::structural(e.to_string(), None))
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| Error::structural(e.to_string(), None))
}

/// Decode document bytes. A byte order mark wins, then the caller's
/// encoding, then a `<` sniff for unmarked UTF-16, then UTF-8.
pub(crate) fn decode(bytes: &[u8], hint: Option<CharacterEncoding>) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return decode_utf8(rest);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, true);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, false);
    }
    match hint {
        Some(CharacterEncoding::Utf8) => decode_utf8(bytes),
        Some(CharacterEncoding::Utf16 | CharacterEncoding::Utf16Be) => decode_utf16(bytes, true),
        Some(CharacterEncoding::Utf16Le) => decode_utf16(bytes, false),
        None => match bytes {
            [0x00, b'<', ..] => decode_utf16(bytes, true),
            [b'<', 0x00, ..] => decode_utf16(bytes, false),
            _ => decode_utf8(bytes),
        },
    }
}
