//! Object table entries (272 bytes)
//!
//! One record per scene object. Every conditional sub-record is always
//! present on disk; its bytes are meaningful only when the governing bit in
//! `flags` is set. With the bit clear the writer stores the defaults below.
//!
//! # Layout
//! ```text
//! 0x000: mesh_id i32                (-1 = not baked into this file)
//! 0x004: name [u8; 64]              (NUL-padded, max 63 bytes)
//! 0x044: position f32x3
//! 0x050: rotation f32x3             (Euler degrees)
//! 0x05C: scale f32x3
//! 0x068: hue_shift f32
//! 0x06C: saturation f32
//! 0x070: brightness f32
//! 0x074: collision_type i32
//! 0x078: being_type i32
//! 0x07C: patrol_speed f32
//! 0x080: flags u32
//! 0x084: frozen_rotation f32x3      [FROZEN_TRANSFORM]
//! 0x090: frozen_scale f32x3         [FROZEN_TRANSFORM]
//! 0x09C: primitive_type i32         [IS_PRIMITIVE]
//! 0x0A0: primitive_size f32         [IS_PRIMITIVE]
//! 0x0A4: primitive_radius f32       [IS_PRIMITIVE]
//! 0x0A8: primitive_height f32       [IS_PRIMITIVE]
//! 0x0AC: primitive_segments i32     [IS_PRIMITIVE]
//! 0x0B0: primitive_color f32x4      [IS_PRIMITIVE]
//! 0x0C0: door_id [u8; 32]           [IS_DOOR]
//! 0x0E0: target_door_id [u8; 32]    [IS_DOOR]
//! 0x100: model_path_index i32       (string table, -1 = none)
//! 0x104: target_level_index i32     (string table, -1 = none) [IS_DOOR]
//! 0x108: description_index i32      (string table, -1 = none)
//! 0x10C: reserved [u8; 4]
//! ```

use glam::{Vec3, Vec4};

use super::serialization::{FieldReader, FieldWriter};

/// Width of the name field, including the terminating NUL.
pub const NAME_LEN: usize = 64;

/// Width of each door id field, including the terminating NUL.
pub const DOOR_ID_LEN: usize = 32;

/// String index meaning "no string".
pub const NO_STRING: i32 = -1;

/// Mesh reference meaning "not baked into this file".
pub const NO_MESH: i32 = -1;

const _: () = assert!(
    4 + NAME_LEN + 3 * 12 + 3 * 4 + 3 * 4 + 4 + 2 * 12 + 5 * 4 + 16 + 2 * DOOR_ID_LEN + 3 * 4 + 4
        == ObjectEntry::SIZE
);

bitflags::bitflags! {
    /// Object flag bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct ObjectFlags: u32 {
        const VISIBLE = 1 << 0;
        const AABB_COLLISION = 1 << 1;
        const POLY_COLLISION = 1 << 2;
        const KINEMATIC = 1 << 3;
        /// Rotation and scale are baked into the vertices
        const FROZEN_TRANSFORM = 1 << 4;
        const DAILY_SCHEDULE = 1 << 5;
        const IS_SKINNED = 1 << 6;
        const IS_PRIMITIVE = 1 << 7;
        const IS_DOOR = 1 << 8;
    }
}

/// Object table entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectEntry {
    pub mesh_id: i32,
    pub name: [u8; NAME_LEN],

    // Transform
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,

    // Color adjustments
    pub hue_shift: f32,
    pub saturation: f32,
    pub brightness: f32,

    // Collision
    pub collision_type: i32,
    pub being_type: i32,
    pub patrol_speed: f32,

    pub flags: ObjectFlags,

    // Frozen transform
    pub frozen_rotation: Vec3,
    pub frozen_scale: Vec3,

    // Primitive
    pub primitive_type: i32,
    pub primitive_size: f32,
    pub primitive_radius: f32,
    pub primitive_height: f32,
    pub primitive_segments: i32,
    pub primitive_color: Vec4,

    // Door
    pub door_id: [u8; DOOR_ID_LEN],
    pub target_door_id: [u8; DOOR_ID_LEN],

    // String table references
    pub model_path_index: i32,
    pub target_level_index: i32,
    pub description_index: i32,
}

impl Default for ObjectEntry {
    fn default() -> Self {
        Self {
            mesh_id: NO_MESH,
            name: [0; NAME_LEN],
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            hue_shift: 0.0,
            saturation: 1.0,
            brightness: 1.0,
            collision_type: 0,
            being_type: 0,
            patrol_speed: 5.0,
            flags: ObjectFlags::VISIBLE,
            frozen_rotation: Vec3::ZERO,
            frozen_scale: Vec3::ONE,
            primitive_type: 0,
            primitive_size: 1.0,
            primitive_radius: 0.5,
            primitive_height: 1.0,
            primitive_segments: 16,
            primitive_color: Vec4::new(0.7, 0.7, 0.7, 1.0),
            door_id: [0; DOOR_ID_LEN],
            target_door_id: [0; DOOR_ID_LEN],
            model_path_index: NO_STRING,
            target_level_index: NO_STRING,
            description_index: NO_STRING,
        }
    }
}

impl ObjectEntry {
    pub const SIZE: usize = 272;

    /// Mesh table index, if the object's mesh is baked into this file.
    pub fn mesh(&self) -> Option<u32> {
        u32::try_from(self.mesh_id).ok()
    }

    /// Write entry to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let mut w = FieldWriter::new(&mut bytes);
        w.i32(self.mesh_id);
        w.bytes(&self.name);
        w.vec3(self.position);
        w.vec3(self.rotation);
        w.vec3(self.scale);
        w.f32(self.hue_shift);
        w.f32(self.saturation);
        w.f32(self.brightness);
        w.i32(self.collision_type);
        w.i32(self.being_type);
        w.f32(self.patrol_speed);
        w.u32(self.flags.bits());
        w.vec3(self.frozen_rotation);
        w.vec3(self.frozen_scale);
        w.i32(self.primitive_type);
        w.f32(self.primitive_size);
        w.f32(self.primitive_radius);
        w.f32(self.primitive_height);
        w.i32(self.primitive_segments);
        w.vec4(self.primitive_color);
        w.bytes(&self.door_id);
        w.bytes(&self.target_door_id);
        w.i32(self.model_path_index);
        w.i32(self.target_level_index);
        w.i32(self.description_index);
        w.zeros(4);
        debug_assert_eq!(w.position(), Self::SIZE);
        bytes
    }

    /// Read entry from bytes
    ///
    /// Unknown flag bits are dropped.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut r = FieldReader::new(bytes);
        Some(Self {
            mesh_id: r.i32(),
            name: r.array(),
            position: r.vec3(),
            rotation: r.vec3(),
            scale: r.vec3(),
            hue_shift: r.f32(),
            saturation: r.f32(),
            brightness: r.f32(),
            collision_type: r.i32(),
            being_type: r.i32(),
            patrol_speed: r.f32(),
            flags: ObjectFlags::from_bits_truncate(r.u32()),
            frozen_rotation: r.vec3(),
            frozen_scale: r.vec3(),
            primitive_type: r.i32(),
            primitive_size: r.f32(),
            primitive_radius: r.f32(),
            primitive_height: r.f32(),
            primitive_segments: r.i32(),
            primitive_color: r.vec4(),
            door_id: r.array(),
            target_door_id: r.array(),
            model_path_index: r.i32(),
            target_level_index: r.i32(),
            description_index: r.i32(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_size() {
        assert_eq!(ObjectEntry::SIZE, 272);
        assert_eq!(ObjectEntry::default().to_bytes().len(), 272);
    }

    #[test]
    fn test_flag_bits() {
        assert_eq!(ObjectFlags::VISIBLE.bits(), 0x001);
        assert_eq!(ObjectFlags::FROZEN_TRANSFORM.bits(), 0x010);
        assert_eq!(ObjectFlags::IS_PRIMITIVE.bits(), 0x080);
        assert_eq!(ObjectFlags::IS_DOOR.bits(), 0x100);
    }

    #[test]
    fn test_field_offsets() {
        let mut entry = ObjectEntry {
            mesh_id: 3,
            flags: ObjectFlags::VISIBLE | ObjectFlags::IS_DOOR,
            description_index: 7,
            ..Default::default()
        };
        entry.name[0] = b'A';
        entry.door_id[0] = b'D';
        let bytes = entry.to_bytes();

        assert_eq!(&bytes[0x000..0x004], &3i32.to_le_bytes());
        assert_eq!(bytes[0x004], b'A');
        assert_eq!(&bytes[0x05C..0x060], &1.0f32.to_le_bytes()); // scale.x
        assert_eq!(&bytes[0x07C..0x080], &5.0f32.to_le_bytes()); // patrol_speed
        assert_eq!(&bytes[0x080..0x084], &0x101u32.to_le_bytes());
        assert_eq!(&bytes[0x0AC..0x0B0], &16i32.to_le_bytes()); // segments
        assert_eq!(&bytes[0x0B0..0x0B4], &0.7f32.to_le_bytes()); // color.r
        assert_eq!(bytes[0x0C0], b'D');
        assert_eq!(&bytes[0x100..0x104], &(-1i32).to_le_bytes());
        assert_eq!(&bytes[0x108..0x10C], &7i32.to_le_bytes());
        assert_eq!(&bytes[0x10C..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_entry_roundtrip() {
        let entry = ObjectEntry {
            mesh_id: 1,
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, 90.0, 0.0),
            collision_type: 2,
            being_type: 7,
            flags: ObjectFlags::all(),
            primitive_color: Vec4::new(0.1, 0.2, 0.3, 0.4),
            target_level_index: 4,
            ..Default::default()
        };
        assert_eq!(ObjectEntry::from_bytes(&entry.to_bytes()), Some(entry));
    }

    #[test]
    fn test_unknown_flag_bits_dropped() {
        let mut bytes = ObjectEntry::default().to_bytes();
        bytes[0x080..0x084].copy_from_slice(&0xFFFF_0001u32.to_le_bytes());
        let entry = ObjectEntry::from_bytes(&bytes).unwrap();
        assert_eq!(entry.flags, ObjectFlags::VISIBLE);
    }

    #[test]
    fn test_mesh_reference() {
        assert_eq!(ObjectEntry::default().mesh(), None);
        let entry = ObjectEntry {
            mesh_id: 5,
            ..Default::default()
        };
        assert_eq!(entry.mesh(), Some(5));
    }
}
