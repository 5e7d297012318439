//! Binary level reader
//!
//! Validates the header, then decodes every section into owned records.
//! Load order: header, strings, meshes, textures, objects. Objects come last
//! because they resolve their text fields through the string table.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use crate::error::{LevelError, Section};
use crate::formats::{
    EDEN_LEVEL_FORMAT, INDEX_SIZE, LevelHeader, MeshEntry, ModelVertex, ObjectEntry, ObjectFlags,
    STRING_COUNT_SIZE, StringEntry, TextureEntry, TextureFormat, VERTEX_STRIDE, decode_fixed_str,
    string_data_offset, string_table_offset,
};
use crate::scene::{
    Aabb, BeingType, CollisionType, ColorAdjust, DoorParams, FrozenTransform, PrimitiveParams,
    PrimitiveType, SceneObject, Transform, decode_enum,
};

/// Decoded mesh: vertex and index runs plus bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
    pub texture_id: Option<u32>,
}

impl MeshData {
    /// Vertex buffer as raw bytes, ready for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Decoded texture pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// Decoded object and its mesh reference
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectData {
    /// `None` when the model is not baked into this file
    pub mesh_id: Option<u32>,
    pub object: SceneObject,
}

/// Everything decoded from one level file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelData {
    pub version: u32,
    pub meshes: Vec<MeshData>,
    pub textures: Vec<TextureData>,
    pub objects: Vec<ObjectData>,
    pub total_mesh_data_size: u64,
    pub total_texture_data_size: u64,
}

/// Reader for binary level files
///
/// Caches the string table for the duration of one load.
#[derive(Debug, Default)]
pub struct LevelReader {
    strings: Vec<String>,
}

impl LevelReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a level file.
    ///
    /// Any failure aborts the whole load; there is no partial result.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LevelData, LevelError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LevelError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let data = self.load_from(BufReader::new(file))?;

        tracing::info!(
            "Loaded binary level {}: {} meshes, {} textures, {} objects",
            path.display(),
            data.meshes.len(),
            data.textures.len(),
            data.objects.len()
        );
        tracing::info!(
            "  Mesh data: {:.1} KB, Texture data: {:.1} KB",
            data.total_mesh_data_size as f64 / 1024.0,
            data.total_texture_data_size as f64 / 1024.0
        );

        Ok(data)
    }

    /// Load a level from any seekable byte source.
    pub fn load_from<R: Read + Seek>(&mut self, mut reader: R) -> Result<LevelData, LevelError> {
        self.strings.clear();

        let header = read_header(&mut reader)?;
        let file_len = reader
            .seek(SeekFrom::End(0))
            .map_err(LevelError::read(Section::Header))?;

        // The string table sits directly after the object table, so its
        // offset is only meaningful once the object table is in bounds.
        let object_table_len = header.object_count as u64 * ObjectEntry::SIZE as u64;
        check_extent(
            Section::ObjectTable,
            header.object_table_offset,
            object_table_len,
            file_len,
        )?;
        let string_table = string_table_offset(header.object_table_offset, header.object_count);

        self.strings = read_strings(&mut reader, string_table, file_len)?;
        let meshes = read_meshes(&mut reader, &header, file_len)?;
        let textures = read_textures(&mut reader, &header, file_len)?;
        let objects = self.read_objects(&mut reader, &header)?;

        Ok(LevelData {
            version: header.version,
            meshes,
            textures,
            objects,
            total_mesh_data_size: header.mesh_data_size,
            total_texture_data_size: header.texture_data_size,
        })
    }

    /// Returns true if `path` opens and carries a valid, supported header.
    ///
    /// Reads nothing past the header.
    pub fn exists(path: impl AsRef<Path>) -> bool {
        match File::open(path.as_ref()) {
            Ok(file) => Self::probe(BufReader::new(file)).is_ok(),
            Err(_) => false,
        }
    }

    /// Validate just the header of a level stream.
    pub fn probe<R: Read>(mut reader: R) -> Result<LevelHeader, LevelError> {
        read_header(&mut reader)
    }

    /// Binary sibling of a source level: `level.eden` -> `level.edenbin`.
    pub fn binary_path(source: impl AsRef<Path>) -> PathBuf {
        source.as_ref().with_extension(EDEN_LEVEL_FORMAT.extension)
    }

    fn read_objects<R: Read + Seek>(
        &self,
        reader: &mut R,
        header: &LevelHeader,
    ) -> Result<Vec<ObjectData>, LevelError> {
        if header.object_count == 0 {
            return Ok(Vec::new());
        }

        let table = read_at(
            reader,
            Section::ObjectTable,
            header.object_table_offset,
            header.object_count as u64 * ObjectEntry::SIZE as u64,
        )?;

        table
            .chunks_exact(ObjectEntry::SIZE)
            .map(|bytes| {
                let entry = ObjectEntry::from_bytes(bytes).ok_or_else(|| {
                    LevelError::invalid_data(Section::ObjectTable, "truncated object entry")
                })?;
                self.object_from_entry(&entry, header.mesh_count)
            })
            .collect()
    }

    fn object_from_entry(
        &self,
        entry: &ObjectEntry,
        mesh_count: u32,
    ) -> Result<ObjectData, LevelError> {
        let name = decode_fixed_str(&entry.name);

        let mesh_id = entry.mesh();
        if let Some(id) = mesh_id
            && id >= mesh_count
        {
            return Err(LevelError::invalid_data(
                Section::ObjectTable,
                format!(
                    "object '{}': mesh {} out of range ({} meshes)",
                    name, id, mesh_count
                ),
            ));
        }
        let flags = entry.flags;

        // Sub-record fields are only meaningful with their flag set
        let frozen = flags
            .contains(ObjectFlags::FROZEN_TRANSFORM)
            .then(|| FrozenTransform {
                rotation: entry.frozen_rotation,
                scale: entry.frozen_scale,
            });

        let primitive = flags.contains(ObjectFlags::IS_PRIMITIVE).then(|| PrimitiveParams {
            kind: decode_enum(entry.primitive_type, "primitive type", &name, PrimitiveType::from_raw),
            size: entry.primitive_size,
            radius: entry.primitive_radius,
            height: entry.primitive_height,
            segments: entry.primitive_segments,
            color: entry.primitive_color,
        });

        let door = flags.contains(ObjectFlags::IS_DOOR).then(|| DoorParams {
            door_id: decode_fixed_str(&entry.door_id),
            target_door_id: decode_fixed_str(&entry.target_door_id),
            target_level: self.string(entry.target_level_index, "target level", &name),
        });

        let mut object = SceneObject {
            transform: Transform {
                position: entry.position,
                rotation: entry.rotation,
                scale: entry.scale,
            },
            color: ColorAdjust {
                hue_shift: entry.hue_shift,
                saturation: entry.saturation,
                brightness: entry.brightness,
            },
            collision: decode_enum(
                entry.collision_type,
                "collision type",
                &name,
                CollisionType::from_raw,
            ),
            being: decode_enum(entry.being_type, "being type", &name, BeingType::from_raw),
            patrol_speed: entry.patrol_speed,
            frozen,
            primitive,
            door,
            description: self.string(entry.description_index, "description", &name),
            model_path: self.string(entry.model_path_index, "model path", &name),
            ..Default::default()
        };
        object.set_flags(flags);
        object.name = name;

        Ok(ObjectData { mesh_id, object })
    }

    /// Resolve a string-table index; -1 and out-of-range indices are empty.
    fn string(&self, index: i32, field: &str, object: &str) -> String {
        if index < 0 {
            return String::new();
        }
        match self.strings.get(index as usize) {
            Some(s) => s.clone(),
            None => {
                tracing::warn!(
                    "Object '{}' {} index {} out of range ({} strings)",
                    object,
                    field,
                    index,
                    self.strings.len()
                );
                String::new()
            }
        }
    }
}

/// Read and validate the 128-byte header.
///
/// The magic is checked before anything else is read.
fn read_header<R: Read>(reader: &mut R) -> Result<LevelHeader, LevelError> {
    let mut bytes = [0u8; LevelHeader::SIZE];
    let (magic, rest) = bytes.split_at_mut(LevelHeader::MAGIC_LEN);

    reader
        .read_exact(magic)
        .map_err(LevelError::read(Section::Header))?;
    if !LevelHeader::check_magic(magic) {
        let mut found = [0u8; 4];
        found.copy_from_slice(magic);
        return Err(LevelError::Format { found });
    }

    reader
        .read_exact(rest)
        .map_err(LevelError::read(Section::Header))?;

    let header = LevelHeader::from_bytes(&bytes)
        .ok_or_else(|| LevelError::invalid_data(Section::Header, "truncated header"))?;

    if !header.is_supported_version() {
        return Err(LevelError::Version {
            found: header.version,
            supported: EDEN_LEVEL_FORMAT.version,
        });
    }

    Ok(header)
}

fn read_strings<R: Read + Seek>(
    reader: &mut R,
    table_offset: u64,
    file_len: u64,
) -> Result<Vec<String>, LevelError> {
    check_extent(
        Section::StringTable,
        table_offset,
        STRING_COUNT_SIZE as u64,
        file_len,
    )?;
    seek_to(reader, Section::StringTable, table_offset)?;
    let count = reader
        .read_u32::<LittleEndian>()
        .map_err(LevelError::read(Section::StringTable))?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let entries_offset = table_offset + STRING_COUNT_SIZE as u64;
    let entries = read_checked(
        reader,
        Section::StringTable,
        entries_offset,
        count as u64 * StringEntry::SIZE as u64,
        file_len,
    )?;
    let data_offset = string_data_offset(table_offset, count);

    entries
        .chunks_exact(StringEntry::SIZE)
        .enumerate()
        .map(|(i, bytes)| {
            let entry = StringEntry::from_bytes(bytes).ok_or_else(|| {
                LevelError::invalid_data(Section::StringTable, "truncated string entry")
            })?;
            let range = entry.range();
            let bytes = read_checked(
                reader,
                Section::StringData,
                data_offset.saturating_add(range.start),
                range.end - range.start,
                file_len,
            )?;
            String::from_utf8(bytes).map_err(|e| {
                LevelError::invalid_data(Section::StringData, format!("string {}: {}", i, e))
            })
        })
        .collect()
}

fn read_meshes<R: Read + Seek>(
    reader: &mut R,
    header: &LevelHeader,
    file_len: u64,
) -> Result<Vec<MeshData>, LevelError> {
    if header.mesh_count == 0 {
        return Ok(Vec::new());
    }

    let table = read_checked(
        reader,
        Section::MeshTable,
        header.mesh_table_offset,
        header.mesh_count as u64 * MeshEntry::SIZE as u64,
        file_len,
    )?;
    check_extent(
        Section::MeshData,
        header.mesh_data_offset,
        header.mesh_data_size,
        file_len,
    )?;

    table
        .chunks_exact(MeshEntry::SIZE)
        .enumerate()
        .map(|(i, bytes)| {
            let entry = MeshEntry::from_bytes(bytes).ok_or_else(|| {
                LevelError::invalid_data(Section::MeshTable, "truncated mesh entry")
            })?;
            read_mesh(reader, header, file_len, i, &entry)
        })
        .collect()
}

fn read_mesh<R: Read + Seek>(
    reader: &mut R,
    header: &LevelHeader,
    file_len: u64,
    index: usize,
    entry: &MeshEntry,
) -> Result<MeshData, LevelError> {
    if entry.vertex_stride < VERTEX_STRIDE {
        return Err(LevelError::invalid_data(
            Section::MeshData,
            format!(
                "mesh {}: vertex stride {} is smaller than {}",
                index, entry.vertex_stride, VERTEX_STRIDE
            ),
        ));
    }
    if entry.index_size != INDEX_SIZE {
        return Err(LevelError::invalid_data(
            Section::MeshData,
            format!("mesh {}: unsupported index size {}", index, entry.index_size),
        ));
    }

    let texture_id = entry.texture();
    if let Some(id) = texture_id
        && id >= header.texture_count
    {
        return Err(LevelError::invalid_data(
            Section::MeshTable,
            format!(
                "mesh {}: texture {} out of range ({} textures)",
                index, id, header.texture_count
            ),
        ));
    }

    let blob = Blob {
        section: Section::MeshData,
        offset: header.mesh_data_offset,
        size: header.mesh_data_size,
        file_len,
    };

    let vertex_bytes = blob.read_run(reader, entry.vertex_offset, entry.vertex_bytes_len())?;
    let vertices = vertex_bytes
        .chunks_exact(entry.vertex_stride as usize)
        .filter_map(ModelVertex::from_bytes)
        .collect();

    let index_bytes = blob.read_run(reader, entry.index_offset, entry.index_bytes_len())?;
    let mut indices = vec![0u32; entry.index_count as usize];
    LittleEndian::read_u32_into(&index_bytes, &mut indices);

    Ok(MeshData {
        vertices,
        indices,
        bounds: Aabb::new(entry.bounds_min, entry.bounds_max),
        texture_id,
    })
}

fn read_textures<R: Read + Seek>(
    reader: &mut R,
    header: &LevelHeader,
    file_len: u64,
) -> Result<Vec<TextureData>, LevelError> {
    if header.texture_count == 0 {
        return Ok(Vec::new());
    }

    let table = read_checked(
        reader,
        Section::TextureTable,
        header.texture_table_offset,
        header.texture_count as u64 * TextureEntry::SIZE as u64,
        file_len,
    )?;
    check_extent(
        Section::TextureData,
        header.texture_data_offset,
        header.texture_data_size,
        file_len,
    )?;

    let blob = Blob {
        section: Section::TextureData,
        offset: header.texture_data_offset,
        size: header.texture_data_size,
        file_len,
    };

    table
        .chunks_exact(TextureEntry::SIZE)
        .enumerate()
        .map(|(i, bytes)| {
            let entry = TextureEntry::from_bytes(bytes).ok_or_else(|| {
                LevelError::invalid_data(Section::TextureTable, "truncated texture entry")
            })?;
            let format = TextureFormat::from_u32(entry.format).ok_or_else(|| {
                LevelError::invalid_data(
                    Section::TextureData,
                    format!("texture {}: unknown format {}", i, entry.format),
                )
            })?;
            let pixels = blob.read_run(reader, entry.data_offset, entry.data_size as u64)?;
            Ok(TextureData {
                pixels,
                width: entry.width,
                height: entry.height,
                format,
            })
        })
        .collect()
}

/// A data blob whose extent has already been checked against the file.
struct Blob {
    section: Section,
    offset: u64,
    size: u64,
    file_len: u64,
}

impl Blob {
    /// Read `len` bytes at `rel_offset` inside the blob.
    fn read_run<R: Read + Seek>(
        &self,
        reader: &mut R,
        rel_offset: u64,
        len: u64,
    ) -> Result<Vec<u8>, LevelError> {
        let in_blob = rel_offset
            .checked_add(len)
            .is_some_and(|end| end <= self.size);
        if !in_blob {
            return Err(LevelError::OutOfBounds {
                section: self.section,
                offset: self.offset.saturating_add(rel_offset),
                len,
                file_len: self.file_len,
            });
        }
        read_at(reader, self.section, self.offset + rel_offset, len)
    }
}

/// Fail unless `[offset, offset + len)` lies inside the file.
fn check_extent(section: Section, offset: u64, len: u64, file_len: u64) -> Result<(), LevelError> {
    match offset.checked_add(len) {
        Some(end) if end <= file_len => Ok(()),
        _ => Err(LevelError::OutOfBounds {
            section,
            offset,
            len,
            file_len,
        }),
    }
}

fn read_checked<R: Read + Seek>(
    reader: &mut R,
    section: Section,
    offset: u64,
    len: u64,
    file_len: u64,
) -> Result<Vec<u8>, LevelError> {
    check_extent(section, offset, len, file_len)?;
    read_at(reader, section, offset, len)
}

fn seek_to<R: Seek>(reader: &mut R, section: Section, offset: u64) -> Result<(), LevelError> {
    reader
        .seek(SeekFrom::Start(offset))
        .map(|_| ())
        .map_err(LevelError::read(section))
}

/// Seek to `offset` and read exactly `len` bytes.
///
/// Callers bound `len` by the file length first, so a corrupt count can't
/// trigger a huge allocation.
fn read_at<R: Read + Seek>(
    reader: &mut R,
    section: Section,
    offset: u64,
    len: u64,
) -> Result<Vec<u8>, LevelError> {
    if len == 0 {
        return Ok(Vec::new());
    }
    let len = usize::try_from(len).map_err(|_| {
        LevelError::invalid_data(section, format!("section length {} too large", len))
    })?;
    seek_to(reader, section, offset)?;
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(LevelError::read(section))?;
    Ok(buf)
}
