//! On-disk format primitives shared by the writers and readers.
//!
//! # Binary store layout
//!
//! ```text
//! [header: VInt length + UTF-8]   "-vectortype real -dimension 200 ..."
//! repeat until EOF:
//!   [identifier: VInt length + UTF-8]
//!   [vector: record_byte_size(type, dim) bytes]
//! ```
//!
//! # Offset index (`<store>.map`)
//!
//! ```text
//! repeat n times: [offset: u64 big-endian]   sorted by the identifier at that offset
//! ```
//!
//! # Text store layout
//!
//! ```text
//! line 1: "-vectortype real -dimension 200 ..."
//! line k: "<identifier, '|' escaped to ';'>|<vector as text>"
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ffi::OsString;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Suffix appended to a binary store path to name its offset index.
pub const OFFSET_INDEX_SUFFIX: &str = ".map";

/// Width of one offset-index entry.
pub const OFFSET_ENTRY_SIZE: usize = 8;

/// Separator between identifier and vector in a text store line.
pub const TEXT_DELIMITER: char = '|';

/// Replacement for [`TEXT_DELIMITER`] inside identifiers.
pub const TEXT_DELIMITER_ESCAPE: char = ';';

/// Longest VInt encoding of a `u32`.
const MAX_VINT_BYTES: usize = 5;

/// Store file encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    /// Length-prefixed binary records with a companion offset index.
    #[default]
    Binary,
    /// One `identifier|vector` line per record, no index.
    Text,
}

impl StoreFormat {
    /// Guesses the format from a file name: `.txt` is text, anything else binary.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => Self::Text,
            _ => Self::Binary,
        }
    }

    /// Lowercase name as used in configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(Self::Binary),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!("unknown store format '{other}'")),
        }
    }
}

/// Returns `<store>.map` for a store path.
#[must_use]
pub fn offset_index_path(store: &Path) -> PathBuf {
    let mut name: OsString = store.as_os_str().to_owned();
    name.push(OFFSET_INDEX_SUFFIX);
    PathBuf::from(name)
}

/// Escapes the text delimiter inside an identifier.
///
/// The escape is lossy: an identifier that already contained `;` cannot be
/// told apart from one that contained `|`.
#[must_use]
pub fn escape_identifier(identifier: &str) -> Cow<'_, str> {
    if identifier.contains(TEXT_DELIMITER) {
        Cow::Owned(identifier.replace(TEXT_DELIMITER, &TEXT_DELIMITER_ESCAPE.to_string()))
    } else {
        Cow::Borrowed(identifier)
    }
}

/// Appends the VInt encoding of `value` to `out`.
///
/// Seven bits per byte, least-significant group first, high bit set on every
/// byte but the last.
pub(crate) fn encode_vint(mut value: u32, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Decodes a VInt from a byte source, one byte at a time.
pub(crate) fn decode_vint(mut next_byte: impl FnMut() -> io::Result<u8>) -> io::Result<u32> {
    let mut value: u32 = 0;
    for i in 0..MAX_VINT_BYTES {
        let byte = next_byte()?;
        let bits = u32::from(byte & 0x7F);
        if i == MAX_VINT_BYTES - 1 && bits > 0x0F {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "VInt overflows u32"));
        }
        value |= bits << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(io::Error::new(io::ErrorKind::InvalidData, "VInt too long"))
}

/// Writes a length-prefixed UTF-8 string and returns the bytes written.
pub(crate) fn write_string<W: Write>(out: &mut W, value: &str) -> io::Result<u64> {
    let len = u32::try_from(value.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string too long"))?;
    let mut prefix = Vec::with_capacity(MAX_VINT_BYTES);
    encode_vint(len, &mut prefix);
    out.write_all(&prefix)?;
    out.write_all(value.as_bytes())?;
    Ok((prefix.len() + value.len()) as u64)
}
