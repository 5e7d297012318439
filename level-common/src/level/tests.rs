//! Tests for the level writer/reader pair

use std::io::Cursor;

use glam::{Vec3, Vec4};

use super::*;
use crate::error::{LevelError, Section};
use crate::formats::{
    LevelHeader, MeshEntry, ModelVertex, ObjectEntry, TextureEntry, string_data_offset,
    string_table_offset,
};
use crate::scene::{Aabb, BeingType, DoorParams, PrimitiveParams, PrimitiveType, SceneObject, TextureRef};

fn quad(z: f32) -> (Vec<ModelVertex>, Vec<u32>) {
    let normal = [0.0, 0.0, 1.0];
    let white = [1.0; 4];
    let vertices = vec![
        ModelVertex::new([-0.5, -0.5, z], normal, [0.0, 0.0], white),
        ModelVertex::new([0.5, -0.5, z], normal, [1.0, 0.0], white),
        ModelVertex::new([0.5, 0.5, z], normal, [1.0, 1.0], white),
        ModelVertex::new([-0.5, 0.5, z], normal, [0.0, 1.0], white),
    ];
    (vertices, vec![0, 1, 2, 0, 2, 3])
}

fn quad_bounds() -> Aabb {
    Aabb::new(Vec3::new(-0.5, -0.5, 0.0), Vec3::new(0.5, 0.5, 0.0))
}

fn checker(width: u32, height: u32) -> Vec<u8> {
    (0..width * height)
        .flat_map(|i| if i % 2 == 0 { [255, 255, 255, 255] } else { [0, 0, 0, 255] })
        .collect()
}

fn to_bytes(writer: &LevelWriter) -> Vec<u8> {
    let mut bytes = Vec::new();
    let written = writer.write_to(&mut bytes).unwrap();
    assert_eq!(written, bytes.len() as u64);
    bytes
}

fn load(bytes: Vec<u8>) -> Result<LevelData, LevelError> {
    LevelReader::new().load_from(Cursor::new(bytes))
}

fn header_of(bytes: &[u8]) -> LevelHeader {
    LevelHeader::from_bytes(bytes).unwrap()
}

fn patch(bytes: &mut [u8], offset: u64, value: &[u8]) {
    let offset = offset as usize;
    bytes[offset..offset + value.len()].copy_from_slice(value);
}

fn section_of(result: Result<LevelData, LevelError>) -> Option<Section> {
    result.unwrap_err().section()
}

// ========================================================================
// Writer
// ========================================================================

#[test]
fn test_empty_level_is_header_plus_string_count() {
    let bytes = to_bytes(&LevelWriter::new());
    // 128 header + 4 string count, padded to 16
    assert_eq!(bytes.len(), 144);
    let header = header_of(&bytes);
    assert_eq!(&header.magic, b"EBIN");
    assert_eq!(header.mesh_data_offset, 144);
    assert_eq!(header.texture_data_offset, 144);

    let data = load(bytes).unwrap();
    assert!(data.meshes.is_empty());
    assert!(data.objects.is_empty());
}

#[test]
fn test_mesh_runs_are_laid_out_in_blob() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    let a = writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();
    let (verts, idx) = quad(1.0);
    let b = writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();
    assert_eq!((a, b), (0, 1));

    // Each mesh: 4 * 48 vertex bytes + 6 * 4 index bytes
    assert_eq!(writer.total_mesh_data_size(), 2 * (192 + 24));

    let bytes = to_bytes(&writer);
    let header = header_of(&bytes);
    let second = MeshEntry::from_bytes(&bytes[128 + MeshEntry::SIZE..]).unwrap();
    assert_eq!(second.vertex_offset, 216);
    assert_eq!(second.index_offset, 216 + 192);
    assert_eq!(second.index_offset % 4, 0);
    assert_eq!(second.texture_id, -1);
    assert_eq!(header.mesh_data_size, 432);
}

#[test]
fn test_empty_mesh_rejected() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    assert!(matches!(
        writer.add_mesh(&[], &idx, quad_bounds(), None),
        Err(LevelError::EmptyMesh)
    ));
    assert!(matches!(
        writer.add_mesh(&verts, &[], quad_bounds(), None),
        Err(LevelError::EmptyMesh)
    ));
    assert_eq!(writer.mesh_count(), 0);
}

#[test]
fn test_short_texture_rejected() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    let pixels = vec![0u8; 10];
    let err = writer
        .add_mesh(&verts, &idx, quad_bounds(), Some(TextureRef::new(&pixels, 2, 2)))
        .unwrap_err();
    assert!(matches!(
        err,
        LevelError::TextureSize {
            expected: 16,
            actual: 10
        }
    ));
}

#[test]
fn test_zero_sized_texture_is_absent() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    let plain = writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();
    let zero = writer
        .add_mesh(&verts, &idx, quad_bounds(), Some(TextureRef::new(&[], 0, 4)))
        .unwrap();
    assert_eq!(plain, zero);
    assert_eq!(writer.texture_count(), 0);
}

#[test]
fn test_same_geometry_different_texture_is_distinct() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    let red = [255u8, 0, 0, 255].repeat(4);
    let blue = [0u8, 0, 255, 255].repeat(4);

    let a = writer
        .add_mesh(&verts, &idx, quad_bounds(), Some(TextureRef::new(&red, 2, 2)))
        .unwrap();
    let b = writer
        .add_mesh(&verts, &idx, quad_bounds(), Some(TextureRef::new(&blue, 2, 2)))
        .unwrap();
    let c = writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();

    assert_eq!(writer.mesh_count(), 3);
    assert_eq!(writer.texture_count(), 2);
    assert!(a != b && b != c && a != c);
}

#[test]
fn test_vertex_order_matters_for_dedup() {
    let mut writer = LevelWriter::new();
    let (mut verts, idx) = quad(0.0);
    let a = writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();
    verts.swap(0, 1);
    let b = writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_add_string_interns() {
    let mut writer = LevelWriter::new();
    assert_eq!(writer.add_string("alpha"), 0);
    assert_eq!(writer.add_string("beta"), 1);
    assert_eq!(writer.add_string("alpha"), 0);
    assert_eq!(writer.string_count(), 2);
}

#[test]
fn test_explicit_model_path_wins() {
    let mut writer = LevelWriter::new();
    let mut obj = SceneObject::new("statue");
    obj.model_path = "models/own.glb".into();

    writer.add_object(&obj, None, Some("models/override.glb"));
    writer.add_object(&obj, None, Some(""));
    writer.add_object(&obj, None, None);

    let data = load(to_bytes(&writer)).unwrap();
    assert_eq!(data.objects[0].object.model_path, "models/override.glb");
    assert_eq!(data.objects[1].object.model_path, "models/own.glb");
    assert_eq!(data.objects[2].object.model_path, "models/own.glb");
    assert_eq!(writer.string_count(), 2);
}

#[test]
fn test_empty_target_level_not_interned() {
    let mut writer = LevelWriter::new();
    let mut door = SceneObject::new("door");
    door.door = Some(DoorParams {
        door_id: "A".into(),
        target_door_id: "B".into(),
        target_level: String::new(),
    });
    writer.add_object(&door, None, None);
    assert_eq!(writer.string_count(), 0);

    let bytes = to_bytes(&writer);
    let entry = ObjectEntry::from_bytes(&bytes[128..]).unwrap();
    assert_eq!(entry.target_level_index, -1);
}

#[test]
fn test_clear_allows_reuse() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    let pixels = checker(2, 2);
    writer
        .add_mesh(&verts, &idx, quad_bounds(), Some(TextureRef::new(&pixels, 2, 2)))
        .unwrap();
    writer.add_object(&SceneObject::new("a"), Some(0), Some("x.glb"));

    writer.clear();
    assert_eq!(writer.mesh_count(), 0);
    assert_eq!(writer.texture_count(), 0);
    assert_eq!(writer.object_count(), 0);
    assert_eq!(writer.string_count(), 0);
    assert_eq!(writer.total_mesh_data_size(), 0);
    assert_eq!(writer.total_texture_data_size(), 0);
    assert_eq!(to_bytes(&writer).len(), 144);

    // Dedup maps were reset too, so the same mesh gets a fresh id 0 and bytes
    let id = writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();
    assert_eq!(id, 0);
    assert_eq!(writer.total_mesh_data_size(), 216);
}

// ========================================================================
// Reader
// ========================================================================

#[test]
fn test_roundtrip_meshes_and_textures() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.25);
    let pixels = checker(4, 2);
    writer
        .add_mesh(&verts, &idx, quad_bounds(), Some(TextureRef::new(&pixels, 4, 2)))
        .unwrap();

    let data = load(to_bytes(&writer)).unwrap();
    assert_eq!(data.version, 1);
    assert_eq!(data.meshes.len(), 1);
    let mesh = &data.meshes[0];
    assert_eq!(mesh.vertices, verts);
    assert_eq!(mesh.indices, idx);
    assert_eq!(mesh.bounds, quad_bounds());
    assert_eq!(mesh.texture_id, Some(0));
    assert_eq!(mesh.vertex_bytes().len(), 4 * 48);
    assert_eq!(mesh.index_bytes().len(), 6 * 4);

    assert_eq!(data.textures.len(), 1);
    assert_eq!(data.textures[0].width, 4);
    assert_eq!(data.textures[0].height, 2);
    assert_eq!(data.textures[0].pixels, pixels);
    assert_eq!(data.total_texture_data_size, 32);
}

#[test]
fn test_roundtrip_object_fields() {
    let mut writer = LevelWriter::new();
    let mut obj = SceneObject::new("lamp");
    obj.transform.position = Vec3::new(1.0, 2.0, 3.0);
    obj.transform.rotation = Vec3::new(0.0, 45.0, 0.0);
    obj.transform.scale = Vec3::splat(2.0);
    obj.color.hue_shift = 0.25;
    obj.being = BeingType::Robot;
    obj.patrol_speed = 3.5;
    obj.polygon_collision = true;
    obj.daily_schedule = true;
    obj.primitive = Some(PrimitiveParams {
        kind: PrimitiveType::Cylinder,
        radius: 0.25,
        segments: 8,
        color: Vec4::new(1.0, 0.5, 0.0, 1.0),
        ..Default::default()
    });
    writer.add_object(&obj, None, None);

    let data = load(to_bytes(&writer)).unwrap();
    assert_eq!(data.objects.len(), 1);
    assert_eq!(data.objects[0].mesh_id, None);
    assert_eq!(data.objects[0].object, obj);
}

#[test]
fn test_cleared_flag_drops_sub_record() {
    let mut writer = LevelWriter::new();
    let mut obj = SceneObject::new("gate");
    obj.door = Some(DoorParams {
        door_id: "north".into(),
        target_door_id: "south".into(),
        target_level: "levels/two.eden".into(),
    });
    writer.add_object(&obj, None, None);

    // Stale values stay in memory on the editor side but the flag is gone
    let mut stale = obj.clone();
    stale.door = None;
    writer.add_object(&stale, None, None);

    let data = load(to_bytes(&writer)).unwrap();
    assert_eq!(data.objects[0].object.door, obj.door);
    assert_eq!(data.objects[1].object.door, None);
}

#[test]
fn test_magic_checked_before_anything_else() {
    let mut bytes = to_bytes(&LevelWriter::new());
    bytes[0..4].copy_from_slice(b"GLTF");

    let mut cursor = Cursor::new(bytes.clone());
    let err = LevelReader::probe(&mut cursor).unwrap_err();
    assert!(matches!(err, LevelError::Format { found } if &found == b"GLTF"));
    assert_eq!(cursor.position(), 4);

    assert!(matches!(load(bytes), Err(LevelError::Format { .. })));
}

#[test]
fn test_version_gate() {
    let mut bytes = to_bytes(&LevelWriter::new());
    patch(&mut bytes, 4, &2u32.to_le_bytes());
    assert!(matches!(
        load(bytes.clone()),
        Err(LevelError::Version {
            found: 2,
            supported: 1
        })
    ));

    // Older versions are accepted
    patch(&mut bytes, 4, &0u32.to_le_bytes());
    assert_eq!(load(bytes).unwrap().version, 0);
}

#[test]
fn test_truncated_header() {
    let bytes = to_bytes(&LevelWriter::new());
    assert_eq!(section_of(load(bytes[..100].to_vec())), Some(Section::Header));
}

#[test]
fn test_missing_string_count_is_fatal() {
    let mut writer = LevelWriter::new();
    writer.add_object(&SceneObject::new("only"), None, None);
    let bytes = to_bytes(&writer);

    // Cut right after the object table
    let cut = (128 + ObjectEntry::SIZE) as usize;
    assert_eq!(section_of(load(bytes[..cut].to_vec())), Some(Section::StringTable));
}

#[test]
fn test_huge_counts_rejected_without_allocating() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();
    let mut bytes = to_bytes(&writer);

    let mut huge = bytes.clone();
    patch(&mut huge, 0x08, &u32::MAX.to_le_bytes()); // mesh_count
    assert_eq!(section_of(load(huge)), Some(Section::MeshTable));

    patch(&mut bytes, 0x10, &u32::MAX.to_le_bytes()); // object_count
    assert!(matches!(
        load(bytes),
        Err(LevelError::OutOfBounds {
            section: Section::ObjectTable,
            ..
        })
    ));
}

#[test]
fn test_vertex_run_outside_blob() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();
    let mut bytes = to_bytes(&writer);
    patch(&mut bytes, 128 + 0x08, &1000u32.to_le_bytes()); // vertex_count
    assert!(matches!(
        load(bytes),
        Err(LevelError::OutOfBounds {
            section: Section::MeshData,
            ..
        })
    ));
}

#[test]
fn test_bad_stride_and_index_size() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();
    let bytes = to_bytes(&writer);

    let mut small_stride = bytes.clone();
    patch(&mut small_stride, 128 + 0x0C, &32u32.to_le_bytes());
    assert_eq!(section_of(load(small_stride)), Some(Section::MeshData));

    let mut short_indices = bytes;
    patch(&mut short_indices, 128 + 0x1C, &2u32.to_le_bytes());
    assert_eq!(section_of(load(short_indices)), Some(Section::MeshData));
}

#[test]
fn test_wider_stride_keeps_leading_vertex_fields() {
    let (verts, _) = quad(0.0);
    let mut writer = LevelWriter::new();
    writer.add_mesh(&verts[..2], &[0, 1, 0], quad_bounds(), None).unwrap();
    let mut bytes = to_bytes(&writer);

    // Reinterpret the 96 vertex bytes as one vertex with a 96-byte stride
    patch(&mut bytes, 128 + 0x08, &1u32.to_le_bytes());
    patch(&mut bytes, 128 + 0x0C, &96u32.to_le_bytes());
    let data = load(bytes).unwrap();
    assert_eq!(data.meshes[0].vertices, vec![verts[0]]);
}

#[test]
fn test_unknown_texture_format() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    let pixels = checker(2, 2);
    writer
        .add_mesh(&verts, &idx, quad_bounds(), Some(TextureRef::new(&pixels, 2, 2)))
        .unwrap();
    let mut bytes = to_bytes(&writer);
    let table = header_of(&bytes).texture_table_offset;
    patch(&mut bytes, table + 0x14, &9u32.to_le_bytes());

    let err = load(bytes).unwrap_err();
    assert_eq!(err.section(), Some(Section::TextureData));
    assert!(err.to_string().contains("unknown format 9"));
}

#[test]
fn test_texture_run_outside_blob() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    let pixels = checker(2, 2);
    writer
        .add_mesh(&verts, &idx, quad_bounds(), Some(TextureRef::new(&pixels, 2, 2)))
        .unwrap();
    let mut bytes = to_bytes(&writer);
    let table = header_of(&bytes).texture_table_offset;
    patch(&mut bytes, table + 0x08, &(TextureEntry::SIZE as u32 * 100).to_le_bytes());
    assert_eq!(section_of(load(bytes)), Some(Section::TextureData));
}

#[test]
fn test_dangling_texture_reference() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    let pixels = checker(2, 2);
    writer
        .add_mesh(&verts, &idx, quad_bounds(), Some(TextureRef::new(&pixels, 2, 2)))
        .unwrap();
    let mut bytes = to_bytes(&writer);
    let table = header_of(&bytes).mesh_table_offset;
    patch(&mut bytes, table + 0x38, &5i32.to_le_bytes()); // texture_id

    let err = load(bytes).unwrap_err();
    assert_eq!(err.section(), Some(Section::MeshTable));
    assert!(err.to_string().contains("texture 5 out of range"));
}

#[test]
fn test_dangling_mesh_reference() {
    let mut writer = LevelWriter::new();
    let (verts, idx) = quad(0.0);
    let id = writer.add_mesh(&verts, &idx, quad_bounds(), None).unwrap();
    writer.add_object(&SceneObject::new("floor"), Some(id), None);
    let mut bytes = to_bytes(&writer);
    let table = header_of(&bytes).object_table_offset;
    patch(&mut bytes, table, &3i32.to_le_bytes()); // mesh_id

    let err = load(bytes).unwrap_err();
    assert_eq!(err.section(), Some(Section::ObjectTable));
    assert!(err.to_string().contains("mesh 3 out of range"));
}

#[test]
fn test_out_of_range_string_index_reads_empty() {
    let mut writer = LevelWriter::new();
    let mut obj = SceneObject::new("crate");
    obj.description = "A wooden crate".into();
    writer.add_object(&obj, None, None);
    let mut bytes = to_bytes(&writer);
    let table = header_of(&bytes).object_table_offset;
    patch(&mut bytes, table + 0x108, &99i32.to_le_bytes());

    let data = load(bytes).unwrap();
    assert_eq!(data.objects[0].object.description, "");
}

#[test]
fn test_unknown_enum_values_use_defaults() {
    let mut writer = LevelWriter::new();
    writer.add_object(&SceneObject::new("bot"), None, None);
    let mut bytes = to_bytes(&writer);
    let table = header_of(&bytes).object_table_offset;
    patch(&mut bytes, table + 0x074, &17i32.to_le_bytes()); // collision_type
    patch(&mut bytes, table + 0x078, &42i32.to_le_bytes()); // being_type

    let object = &load(bytes).unwrap().objects[0].object;
    assert_eq!(object.being, BeingType::Static);
    assert_eq!(object.collision, crate::scene::CollisionType::None);
}

#[test]
fn test_invalid_utf8_string() {
    let mut writer = LevelWriter::new();
    let mut obj = SceneObject::new("sign");
    obj.description = "hello".into();
    writer.add_object(&obj, None, None);
    let mut bytes = to_bytes(&writer);

    let header = header_of(&bytes);
    let table = string_table_offset(header.object_table_offset, header.object_count);
    patch(&mut bytes, string_data_offset(table, 1), &[0xFF]);
    assert_eq!(section_of(load(bytes)), Some(Section::StringData));
}

#[test]
fn test_string_data_keeps_nul_terminators() {
    let mut writer = LevelWriter::new();
    let mut obj = SceneObject::new("sign");
    obj.description = "hi".into();
    obj.model_path = "m.glb".into();
    writer.add_object(&obj, None, None);
    let bytes = to_bytes(&writer);

    let header = header_of(&bytes);
    let table = string_table_offset(header.object_table_offset, header.object_count);
    let data = string_data_offset(table, 2) as usize;
    assert_eq!(&bytes[data..data + 9], b"hi\0m.glb\0");
}

#[test]
fn test_reader_instance_reused() {
    let mut a = LevelWriter::new();
    let mut obj = SceneObject::new("one");
    obj.description = "first".into();
    a.add_object(&obj, None, None);

    let mut b = LevelWriter::new();
    b.add_object(&SceneObject::new("two"), None, None);

    let mut reader = LevelReader::new();
    let first = reader.load_from(Cursor::new(to_bytes(&a))).unwrap();
    let second = reader.load_from(Cursor::new(to_bytes(&b))).unwrap();
    assert_eq!(first.objects[0].object.description, "first");
    assert_eq!(second.objects[0].object.description, "");
}
