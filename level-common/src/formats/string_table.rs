//! String table
//!
//! # Layout
//! ```text
//! u32 string_count
//! StringEntry[string_count]   (16 bytes each)
//! string data                 (each string followed by one NUL)
//! ```
//!
//! `StringEntry::offset` is relative to the start of the string data. The
//! stored `length` alone defines a string's extent; the trailing NUL is kept
//! for compatibility but never relied on by readers.

use super::serialization::{FieldReader, FieldWriter};

/// Size of the leading string count.
pub const STRING_COUNT_SIZE: usize = 4;

const _: () = assert!(8 + 4 + 4 == StringEntry::SIZE);

/// String table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StringEntry {
    pub offset: u64,
    pub length: u32,
}

impl StringEntry {
    pub const SIZE: usize = 16;

    /// Write entry to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let mut w = FieldWriter::new(&mut bytes);
        w.u64(self.offset);
        w.u32(self.length);
        w.zeros(4);
        debug_assert_eq!(w.position(), Self::SIZE);
        bytes
    }

    /// Read entry from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut r = FieldReader::new(bytes);
        let offset = r.u64();
        let length = r.u32();
        r.skip(4);
        Some(Self { offset, length })
    }

    /// Byte range of this string within the string data.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.offset.saturating_add(self.length as u64)
    }
}

/// Build the string entries and the string-data blob for `strings`.
pub fn build_string_data<S: AsRef<str>>(strings: &[S]) -> (Vec<StringEntry>, Vec<u8>) {
    let mut entries = Vec::with_capacity(strings.len());
    let mut data = Vec::new();
    for s in strings {
        let s = s.as_ref();
        entries.push(StringEntry {
            offset: data.len() as u64,
            length: s.len() as u32,
        });
        data.extend_from_slice(s.as_bytes());
        data.push(0);
    }
    (entries, data)
}
