//! Section layout shared by the writer and the reader.
//!
//! # File order
//! ```text
//! header (128)
//! mesh table      MeshEntry[mesh_count]
//! texture table   TextureEntry[texture_count]
//! object table    ObjectEntry[object_count]
//! string table    u32 count + StringEntry[count]
//! string data
//! [pad to 16]
//! mesh data blob
//! [pad to 16]
//! texture data blob
//! ```
//!
//! The string table offset is not stored in the header. Both sides derive it
//! from the object table with [`string_table_offset`], so changing the object
//! record size moves the string table for writer and reader together.

use super::{LevelHeader, MeshEntry, ObjectEntry, STRING_COUNT_SIZE, StringEntry, TextureEntry};

/// Alignment of the mesh-data and texture-data blobs.
pub const BLOB_ALIGNMENT: u64 = 16;

/// Alignment of an index run inside the mesh-data blob.
pub const INDEX_ALIGNMENT: usize = 4;

/// Round `offset` up to a multiple of `align` (a power of two).
pub const fn align_up(offset: u64, align: u64) -> u64 {
    (offset + align - 1) & !(align - 1)
}

/// File offset of the string table: immediately after the object table.
pub const fn string_table_offset(object_table_offset: u64, object_count: u32) -> u64 {
    object_table_offset + object_count as u64 * ObjectEntry::SIZE as u64
}

/// File offset of the string data: after the count and the entries.
pub const fn string_data_offset(string_table_offset: u64, string_count: u32) -> u64 {
    string_table_offset + STRING_COUNT_SIZE as u64 + string_count as u64 * StringEntry::SIZE as u64
}

/// Section sizes the layout is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionSizes {
    pub mesh_count: u32,
    pub texture_count: u32,
    pub object_count: u32,
    pub string_count: u32,
    pub string_data_size: u64,
    pub mesh_data_size: u64,
    pub texture_data_size: u64,
}

/// Absolute offset of every section in a level file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelLayout {
    pub mesh_table_offset: u64,
    pub texture_table_offset: u64,
    pub object_table_offset: u64,
    pub string_table_offset: u64,
    pub string_data_offset: u64,
    pub mesh_data_offset: u64,
    pub texture_data_offset: u64,
    /// Total file length
    pub file_size: u64,
}

impl LevelLayout {
    /// Lay out every section in file order as a running counter.
    pub fn compute(sizes: &SectionSizes) -> Self {
        let mut offset = LevelHeader::SIZE as u64;

        let mesh_table_offset = offset;
        offset += sizes.mesh_count as u64 * MeshEntry::SIZE as u64;

        let texture_table_offset = offset;
        offset += sizes.texture_count as u64 * TextureEntry::SIZE as u64;

        let object_table_offset = offset;
        let string_table_offset = string_table_offset(object_table_offset, sizes.object_count);
        let string_data_offset = string_data_offset(string_table_offset, sizes.string_count);
        offset = string_data_offset + sizes.string_data_size;

        let mesh_data_offset = align_up(offset, BLOB_ALIGNMENT);
        offset = mesh_data_offset + sizes.mesh_data_size;

        let texture_data_offset = align_up(offset, BLOB_ALIGNMENT);
        let file_size = texture_data_offset + sizes.texture_data_size;

        Self {
            mesh_table_offset,
            texture_table_offset,
            object_table_offset,
            string_table_offset,
            string_data_offset,
            mesh_data_offset,
            texture_data_offset,
            file_size,
        }
    }

    /// Header describing this layout.
    pub fn header(&self, sizes: &SectionSizes) -> LevelHeader {
        LevelHeader {
            mesh_count: sizes.mesh_count,
            texture_count: sizes.texture_count,
            object_count: sizes.object_count,
            mesh_table_offset: self.mesh_table_offset,
            texture_table_offset: self.texture_table_offset,
            object_table_offset: self.object_table_offset,
            mesh_data_offset: self.mesh_data_offset,
            texture_data_offset: self.texture_data_offset,
            mesh_data_size: sizes.mesh_data_size,
            texture_data_size: sizes.texture_data_size,
            ..Default::default()
        }
    }
}
