//! Mesh table entries and the vertex record stored in the mesh-data blob.
//!
//! # MeshEntry layout (64 bytes)
//! ```text
//! 0x00: vertex_offset u64   (relative to mesh-data blob)
//! 0x08: vertex_count u32
//! 0x0C: vertex_stride u32   (48)
//! 0x10: index_offset u64    (relative to mesh-data blob, 4-byte aligned)
//! 0x18: index_count u32
//! 0x1C: index_size u32      (4 = u32 indices)
//! 0x20: bounds_min f32x3
//! 0x2C: bounds_max f32x3
//! 0x38: texture_id i32      (-1 = none)
//! 0x3C: reserved [u8; 4]
//! ```
//!
//! # ModelVertex layout (48 bytes)
//! ```text
//! 0x00: position f32x3
//! 0x0C: normal f32x3
//! 0x18: tex_coord f32x2
//! 0x20: color f32x4 (RGBA)
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::serialization::{FieldReader, FieldWriter};

/// Byte stride of one encoded [`ModelVertex`].
pub const VERTEX_STRIDE: u32 = 48;

/// Byte size of one index element (u32 indices).
pub const INDEX_SIZE: u32 = 4;

/// Texture reference meaning "no texture".
pub const NO_TEXTURE: i32 = -1;

const _: () = assert!(3 * 4 + 3 * 4 + 2 * 4 + 4 * 4 == VERTEX_STRIDE as usize);
const _: () = assert!(std::mem::size_of::<ModelVertex>() == ModelVertex::SIZE);
const _: () = assert!(8 + 4 + 4 + 8 + 4 + 4 + 12 + 12 + 4 + 4 == MeshEntry::SIZE);

/// One vertex as produced by the model loader and consumed by the renderer.
///
/// `#[repr(C)]` + `Pod` so decoded buffers can be handed to the GPU with
/// `bytemuck::cast_slice`. On disk the fields are always encoded explicitly
/// as little-endian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
    pub color: [f32; 4],
}

impl ModelVertex {
    pub const SIZE: usize = VERTEX_STRIDE as usize;

    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
            color,
        }
    }

    /// Write vertex to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let mut w = FieldWriter::new(&mut bytes);
        for v in self
            .position
            .iter()
            .chain(&self.normal)
            .chain(&self.tex_coord)
            .chain(&self.color)
        {
            w.f32(*v);
        }
        debug_assert_eq!(w.position(), Self::SIZE);
        bytes
    }

    /// Read vertex from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut r = FieldReader::new(bytes);
        Some(Self {
            position: [r.f32(), r.f32(), r.f32()],
            normal: [r.f32(), r.f32(), r.f32()],
            tex_coord: [r.f32(), r.f32()],
            color: [r.f32(), r.f32(), r.f32(), r.f32()],
        })
    }
}

/// Encode a vertex run into its on-disk bytes.
pub fn encode_vertices(vertices: &[ModelVertex]) -> Vec<u8> {
    let mut out = Vec::with_capacity(vertices.len() * ModelVertex::SIZE);
    for v in vertices {
        out.extend_from_slice(&v.to_bytes());
    }
    out
}

/// Encode an index run into its on-disk bytes.
pub fn encode_indices(indices: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(indices.len() * INDEX_SIZE as usize);
    for i in indices {
        out.extend_from_slice(&i.to_le_bytes());
    }
    out
}

/// Mesh table entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshEntry {
    pub vertex_offset: u64,
    pub vertex_count: u32,
    pub vertex_stride: u32,
    pub index_offset: u64,
    pub index_count: u32,
    pub index_size: u32,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub texture_id: i32,
}

impl Default for MeshEntry {
    fn default() -> Self {
        Self {
            vertex_offset: 0,
            vertex_count: 0,
            vertex_stride: VERTEX_STRIDE,
            index_offset: 0,
            index_count: 0,
            index_size: INDEX_SIZE,
            bounds_min: Vec3::ZERO,
            bounds_max: Vec3::ZERO,
            texture_id: NO_TEXTURE,
        }
    }
}

impl MeshEntry {
    pub const SIZE: usize = 64;

    /// Byte length of the vertex run.
    pub fn vertex_bytes_len(&self) -> u64 {
        self.vertex_count as u64 * self.vertex_stride as u64
    }

    /// Byte length of the index run.
    pub fn index_bytes_len(&self) -> u64 {
        self.index_count as u64 * self.index_size as u64
    }

    /// Texture table index, if the mesh references one.
    pub fn texture(&self) -> Option<u32> {
        u32::try_from(self.texture_id).ok()
    }

    /// Write entry to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let mut w = FieldWriter::new(&mut bytes);
        w.u64(self.vertex_offset);
        w.u32(self.vertex_count);
        w.u32(self.vertex_stride);
        w.u64(self.index_offset);
        w.u32(self.index_count);
        w.u32(self.index_size);
        w.vec3(self.bounds_min);
        w.vec3(self.bounds_max);
        w.i32(self.texture_id);
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
        Some(Self {
            vertex_offset: r.u64(),
            vertex_count: r.u32(),
            vertex_stride: r.u32(),
            index_offset: r.u64(),
            index_count: r.u32(),
            index_size: r.u32(),
            bounds_min: r.vec3(),
            bounds_max: r.vec3(),
            texture_id: r.i32(),
        })
    }
}
