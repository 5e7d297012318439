//! Eden binary level format (`.edenbin`)
//!
//! Fixed-width little-endian records for the header and every table, plus
//! the section layout shared by the writer and reader. Record types here are
//! plain data: they carry raw on-disk values (`-1` sentinels, raw enum
//! integers) and never touch I/O.
//!
//! Format constants (extension, magic, version) live in
//! `eden_shared::LevelFormat`. Use `EDEN_LEVEL_FORMAT`.
//!
//! All records implement the [`BinarySerializable`] trait for consistent
//! serialization/deserialization.

pub mod header;
pub mod layout;
pub mod mesh;
pub mod object;
mod serialization;
pub mod string_table;
pub mod texture;

pub use header::*;
pub use layout::*;
pub use mesh::*;
pub use object::*;
pub use serialization::{BinarySerializable, decode_fixed_str, encode_fixed_str};
pub use string_table::*;
pub use texture::*;

// Re-export level format from shared for convenience
pub use eden_shared::{EDEN_LEVEL_FORMAT, LevelFormat};
