//! Character-set handling for inbound payloads.
//!
//! Request bodies arrive as bytes with an optional charset label (usually the
//! `charset` parameter of `Content-Type`). FHIR mandates UTF-8 for JSON, but
//! gateways see the other encodings HTTP clients still emit, so the common
//! ones are decoded here and everything else is rejected.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Supported payload encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Charset {
    #[default]
    Utf8,
    /// UTF-16 with byte order taken from the BOM (big-endian without one).
    Utf16,
    Utf16Le,
    Utf16Be,
    Latin1,
    Ascii,
}

impl Charset {
    /// Resolve a charset label. Labels are case-insensitive and may be quoted.
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = label.trim().trim_matches('"').to_ascii_lowercase();
        match normalized.as_str() {
            "utf-8" | "utf8" | "unicode-1-1-utf-8" => Ok(Charset::Utf8),
            "utf-16" | "utf16" => Ok(Charset::Utf16),
            "utf-16le" => Ok(Charset::Utf16Le),
            "utf-16be" => Ok(Charset::Utf16Be),
            "iso-8859-1" | "iso8859-1" | "latin1" | "l1" => Ok(Charset::Latin1),
            "us-ascii" | "ascii" => Ok(Charset::Ascii),
            _ => Err(CoreError::unsupported_charset(label.trim())),
        }
    }

    /// Resolve an optional label, falling back to UTF-8 when none was declared.
    pub fn from_optional_label(label: Option<&str>) -> Result<Self> {
        match label {
            Some(l) if !l.trim().is_empty() => Self::from_label(l),
            _ => Ok(Charset::Utf8),
        }
    }

    /// Canonical name of the charset.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16 => "UTF-16",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
        }
    }

    /// Decode `bytes` into text. A leading byte order mark is dropped.
    ///
    /// UTF-8 input that needs no BOM stripping is borrowed, not copied.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
        match self {
            Charset::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(bytes)
                    .map(Cow::Borrowed)
                    .map_err(|e| CoreError::invalid_encoding(self.name(), e.to_string()))
            }
            Charset::Utf16 => match bytes {
                [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, false, self.name()),
                [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, true, self.name()),
                _ => decode_utf16(bytes, true, self.name()),
            },
            Charset::Utf16Le => decode_utf16(bytes, false, self.name()),
            Charset::Utf16Be => decode_utf16(bytes, true, self.name()),
            Charset::Latin1 => Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())),
            Charset::Ascii => {
                if let Some(pos) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(CoreError::invalid_encoding(
                        self.name(),
                        format!("non-ASCII byte at offset {pos}"),
                    ));
                }
                std::str::from_utf8(bytes)
                    .map(Cow::Borrowed)
                    .map_err(|e| CoreError::invalid_encoding(self.name(), e.to_string()))
            }
        }
    }
}

fn decode_utf16<'a>(bytes: &[u8], big_endian: bool, name: &'static str) -> Result<Cow<'a, str>> {
    if bytes.len() % 2 != 0 {
        return Err(CoreError::invalid_encoding(name, "odd number of bytes"));
    }
    let units = bytes.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });
    let text = char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| CoreError::invalid_encoding(name, e.to_string()))?;
    Ok(Cow::Owned(match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text,
    }))
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}
