//! Binary level header (128 bytes)
//!
//! # Layout
//! ```text
//! 0x00: magic [u8; 4] = "EBIN"
//! 0x04: version u32
//! 0x08: mesh_count u32
//! 0x0C: texture_count u32
//! 0x10: object_count u32
//! 0x14: mesh_table_offset u64
//! 0x1C: texture_table_offset u64
//! 0x24: object_table_offset u64
//! 0x2C: mesh_data_offset u64
//! 0x34: texture_data_offset u64
//! 0x3C: mesh_data_size u64
//! 0x44: texture_data_size u64
//! 0x4C: reserved [u8; 52]
//! ```
//!
//! The magic is the only format discriminator. Nothing past it is trusted
//! until it has been checked, see [`LevelHeader::check_magic`].

use eden_shared::EDEN_LEVEL_FORMAT;

use super::serialization::{FieldReader, FieldWriter};

const MAGIC_LEN: usize = 4;
const RESERVED_LEN: usize = 52;
const FIELDS_LEN: usize = MAGIC_LEN + 4 * 4 + 7 * 8 + RESERVED_LEN;
const _: () = assert!(FIELDS_LEN == LevelHeader::SIZE);

/// Binary level header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelHeader {
    pub magic: [u8; 4],
    pub version: u32,

    // Section counts
    pub mesh_count: u32,
    pub texture_count: u32,
    pub object_count: u32,

    // Section offsets (from start of file)
    pub mesh_table_offset: u64,
    pub texture_table_offset: u64,
    pub object_table_offset: u64,
    pub mesh_data_offset: u64,
    pub texture_data_offset: u64,

    // Blob sizes
    pub mesh_data_size: u64,
    pub texture_data_size: u64,
}

impl Default for LevelHeader {
    fn default() -> Self {
        Self {
            magic: *EDEN_LEVEL_FORMAT.magic,
            version: EDEN_LEVEL_FORMAT.version,
            mesh_count: 0,
            texture_count: 0,
            object_count: 0,
            mesh_table_offset: 0,
            texture_table_offset: 0,
            object_table_offset: 0,
            mesh_data_offset: 0,
            texture_data_offset: 0,
            mesh_data_size: 0,
            texture_data_size: 0,
        }
    }
}

impl LevelHeader {
    pub const SIZE: usize = 128;

    /// Length of the magic prefix.
    pub const MAGIC_LEN: usize = MAGIC_LEN;

    /// Returns true if `magic` is the level magic ("EBIN").
    pub fn check_magic(magic: &[u8]) -> bool {
        magic.len() >= MAGIC_LEN && &magic[..MAGIC_LEN] == EDEN_LEVEL_FORMAT.magic
    }

    /// Returns true if this build can read the stored version.
    pub fn is_supported_version(&self) -> bool {
        EDEN_LEVEL_FORMAT.supports(self.version)
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let mut w = FieldWriter::new(&mut bytes);
        w.bytes(&self.magic);
        w.u32(self.version);
        w.u32(self.mesh_count);
        w.u32(self.texture_count);
        w.u32(self.object_count);
        w.u64(self.mesh_table_offset);
        w.u64(self.texture_table_offset);
        w.u64(self.object_table_offset);
        w.u64(self.mesh_data_offset);
        w.u64(self.texture_data_offset);
        w.u64(self.mesh_data_size);
        w.u64(self.texture_data_size);
        w.zeros(RESERVED_LEN);
        debug_assert_eq!(w.position(), Self::SIZE);
        bytes
    }

    /// Read header from bytes
    ///
    /// Does not validate magic or version; see [`check_magic`](Self::check_magic).
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut r = FieldReader::new(bytes);
        Some(Self {
            magic: r.array(),
            version: r.u32(),
            mesh_count: r.u32(),
            texture_count: r.u32(),
            object_count: r.u32(),
            mesh_table_offset: r.u64(),
            texture_table_offset: r.u64(),
            object_table_offset: r.u64(),
            mesh_data_offset: r.u64(),
            texture_data_offset: r.u64(),
            mesh_data_size: r.u64(),
            texture_data_size: r.u64(),
        })
    }
}
