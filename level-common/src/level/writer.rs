//! Binary level writer
//!
//! Accumulates meshes, textures, objects and strings from one scene, then
//! emits a single `.edenbin` file.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use hashbrown::HashMap;

use crate::error::LevelError;
use crate::formats::{
    DOOR_ID_LEN, INDEX_ALIGNMENT, LevelLayout, MeshEntry, ModelVertex, NAME_LEN, NO_MESH,
    NO_STRING, NO_TEXTURE, ObjectEntry, SectionSizes, TextureEntry, build_string_data,
    encode_fixed_str, encode_indices, encode_vertices, rgba8_size,
};
use crate::hash::{fold_texture, mesh_hash, texture_hash};
use crate::scene::{Aabb, SceneObject, TextureRef};

/// Pixel hash plus dimensions
type TextureKey = (u64, u32, u32);

/// Writer for binary level files
///
/// Holds state for one save. Call [`clear`](Self::clear) to reuse it for the
/// next save; the internal maps keep their allocations.
#[derive(Debug, Default)]
pub struct LevelWriter {
    meshes: Vec<MeshEntry>,
    textures: Vec<TextureEntry>,
    objects: Vec<ObjectEntry>,
    strings: Vec<String>,

    mesh_data: Vec<u8>,
    texture_data: Vec<u8>,

    mesh_ids: HashMap<u64, u32>,
    texture_ids: HashMap<TextureKey, u32>,
    string_ids: HashMap<String, u32>,
}

impl LevelWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh and return its id.
    ///
    /// Meshes with identical vertex, index and texture content share one id.
    /// A texture with zero width or height is treated as absent.
    pub fn add_mesh(
        &mut self,
        vertices: &[ModelVertex],
        indices: &[u32],
        bounds: Aabb,
        texture: Option<TextureRef<'_>>,
    ) -> Result<u32, LevelError> {
        if vertices.is_empty() || indices.is_empty() {
            return Err(LevelError::EmptyMesh);
        }

        let texture = match texture {
            Some(tex) if tex.width > 0 && tex.height > 0 => {
                let size = rgba8_size(tex.width, tex.height);
                if tex.pixels.len() < size {
                    return Err(LevelError::TextureSize {
                        expected: size,
                        actual: tex.pixels.len(),
                    });
                }
                let pixels = &tex.pixels[..size];
                let hash = texture_hash(pixels, tex.width, tex.height);
                Some((TextureRef::new(pixels, tex.width, tex.height), hash))
            }
            _ => None,
        };

        let vertex_bytes = encode_vertices(vertices);
        let index_bytes = encode_indices(indices);

        let mut hash = mesh_hash(&vertex_bytes, &index_bytes);
        if let Some((_, tex_hash)) = texture {
            hash = fold_texture(hash, tex_hash);
        }

        if let Some(&id) = self.mesh_ids.get(&hash) {
            tracing::debug!("Mesh deduplicated: {} vertices -> mesh {}", vertices.len(), id);
            return Ok(id);
        }

        let texture_id = match texture {
            Some((tex, tex_hash)) => self.intern_texture(tex, tex_hash) as i32,
            None => NO_TEXTURE,
        };

        let vertex_offset = self.mesh_data.len() as u64;
        self.mesh_data.extend_from_slice(&vertex_bytes);

        // Index runs start on a 4-byte boundary
        while self.mesh_data.len() % INDEX_ALIGNMENT != 0 {
            self.mesh_data.push(0);
        }

        let index_offset = self.mesh_data.len() as u64;
        self.mesh_data.extend_from_slice(&index_bytes);

        let id = self.meshes.len() as u32;
        self.meshes.push(MeshEntry {
            vertex_offset,
            vertex_count: vertices.len() as u32,
            index_offset,
            index_count: indices.len() as u32,
            bounds_min: bounds.min,
            bounds_max: bounds.max,
            texture_id,
            ..Default::default()
        });
        self.mesh_ids.insert(hash, id);

        Ok(id)
    }

    fn intern_texture(&mut self, tex: TextureRef<'_>, hash: u64) -> u32 {
        let key = (hash, tex.width, tex.height);
        if let Some(&id) = self.texture_ids.get(&key) {
            tracing::debug!("Texture deduplicated: {}x{} -> texture {}", tex.width, tex.height, id);
            return id;
        }

        let id = self.textures.len() as u32;
        self.textures.push(TextureEntry::rgba8(
            self.texture_data.len() as u64,
            tex.width,
            tex.height,
        ));
        self.texture_data.extend_from_slice(tex.pixels);
        self.texture_ids.insert(key, id);
        id
    }

    /// Add an object referencing a mesh from [`add_mesh`](Self::add_mesh).
    ///
    /// `mesh_id` is `None` for objects whose model is not baked into this
    /// file. An explicit `model_path` wins over the object's own.
    pub fn add_object(&mut self, object: &SceneObject, mesh_id: Option<u32>, model_path: Option<&str>) {
        let mut entry = ObjectEntry {
            mesh_id: mesh_id.map_or(NO_MESH, |id| id as i32),
            name: fixed_field::<NAME_LEN>("name", &object.name),
            position: object.transform.position,
            rotation: object.transform.rotation,
            scale: object.transform.scale,
            hue_shift: object.color.hue_shift,
            saturation: object.color.saturation,
            brightness: object.color.brightness,
            collision_type: object.collision as i32,
            being_type: object.being as i32,
            patrol_speed: object.patrol_speed,
            flags: object.flags(),
            ..Default::default()
        };

        if let Some(frozen) = &object.frozen {
            entry.frozen_rotation = frozen.rotation;
            entry.frozen_scale = frozen.scale;
        }

        if let Some(prim) = &object.primitive {
            entry.primitive_type = prim.kind as i32;
            entry.primitive_size = prim.size;
            entry.primitive_radius = prim.radius;
            entry.primitive_height = prim.height;
            entry.primitive_segments = prim.segments;
            entry.primitive_color = prim.color;
        }

        if let Some(door) = &object.door {
            entry.door_id = fixed_field::<DOOR_ID_LEN>("door id", &door.door_id);
            entry.target_door_id =
                fixed_field::<DOOR_ID_LEN>("target door id", &door.target_door_id);
            entry.target_level_index = self.optional_string(&door.target_level);
        }

        entry.description_index = self.optional_string(&object.description);

        entry.model_path_index = match model_path {
            Some(path) if !path.is_empty() => self.add_string(path) as i32,
            _ => self.optional_string(&object.model_path),
        };

        self.objects.push(entry);
    }

    fn optional_string(&mut self, s: &str) -> i32 {
        if s.is_empty() {
            NO_STRING
        } else {
            self.add_string(s) as i32
        }
    }

    /// Intern a string and return its index in the string table.
    pub fn add_string(&mut self, s: &str) -> u32 {
        if let Some(&index) = self.string_ids.get(s) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.strings.push(s.to_owned());
        self.string_ids.insert(s.to_owned(), index);
        index
    }

    /// Reset for the next save.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.textures.clear();
        self.objects.clear();
        self.strings.clear();
        self.mesh_data.clear();
        self.texture_data.clear();
        self.mesh_ids.clear();
        self.texture_ids.clear();
        self.string_ids.clear();
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    pub fn total_mesh_data_size(&self) -> u64 {
        self.mesh_data.len() as u64
    }

    pub fn total_texture_data_size(&self) -> u64 {
        self.texture_data.len() as u64
    }

    /// Write the level to `path`.
    ///
    /// Bytes go to a sibling `<name>.tmp` file that is synced and then renamed
    /// over `path`, so a failed write never leaves a truncated level behind.
    /// Returns the number of bytes written.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<u64, LevelError> {
        let path = path.as_ref();
        let write_err = |source| LevelError::Write {
            path: path.to_path_buf(),
            source,
        };

        let tmp_path = temp_path(path).map_err(write_err)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let written = match self.write_file(&tmp_path) {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                return Err(write_err(e));
            }
        };

        #[cfg(windows)]
        {
            // Windows rename fails if destination exists.
            if path.exists()
                && let Err(e) = fs::remove_file(path)
            {
                let _ = fs::remove_file(&tmp_path);
                return Err(write_err(e));
            }
        }

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }

        tracing::info!(
            "Wrote binary level {} ({} bytes): {} meshes, {} textures, {} objects, {} strings",
            path.display(),
            written,
            self.meshes.len(),
            self.textures.len(),
            self.objects.len(),
            self.strings.len()
        );
        tracing::info!(
            "  Mesh data: {:.1} KB, Texture data: {:.1} KB",
            self.mesh_data.len() as f64 / 1024.0,
            self.texture_data.len() as f64 / 1024.0
        );

        Ok(written)
    }

    fn write_file(&self, tmp_path: &Path) -> io::Result<u64> {
        let mut out = BufWriter::new(File::create(tmp_path)?);
        let written = self.write_to(&mut out)?;
        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(written)
    }

    /// Serialize the level into `w` and return the number of bytes written.
    ///
    /// Section offsets are computed first so the header can be written up
    /// front; sections then follow in file order.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<u64> {
        let (string_entries, string_data) = build_string_data(&self.strings);

        let sizes = SectionSizes {
            mesh_count: self.meshes.len() as u32,
            texture_count: self.textures.len() as u32,
            object_count: self.objects.len() as u32,
            string_count: string_entries.len() as u32,
            string_data_size: string_data.len() as u64,
            mesh_data_size: self.mesh_data.len() as u64,
            texture_data_size: self.texture_data.len() as u64,
        };
        let layout = LevelLayout::compute(&sizes);
        let header = layout.header(&sizes);

        let mut out = CountingWriter::new(&mut w);

        out.write_all(&header.to_bytes())?;

        for entry in &self.meshes {
            out.write_all(&entry.to_bytes())?;
        }
        for entry in &self.textures {
            out.write_all(&entry.to_bytes())?;
        }
        for entry in &self.objects {
            out.write_all(&entry.to_bytes())?;
        }

        debug_assert_eq!(out.position(), layout.string_table_offset);
        out.write_u32::<LittleEndian>(sizes.string_count)?;
        for entry in &string_entries {
            out.write_all(&entry.to_bytes())?;
        }
        out.write_all(&string_data)?;

        out.pad_to(layout.mesh_data_offset)?;
        out.write_all(&self.mesh_data)?;

        out.pad_to(layout.texture_data_offset)?;
        out.write_all(&self.texture_data)?;

        out.flush()?;
        debug_assert_eq!(out.position(), layout.file_size);
        Ok(out.position())
    }
}

fn fixed_field<const N: usize>(field: &str, value: &str) -> [u8; N] {
    let (bytes, truncated) = encode_fixed_str::<N>(value);
    if truncated {
        tracing::debug!("Truncated {} '{}' to {} bytes", field, value, N - 1);
    }
    bytes
}

/// Sibling temp path: `level.edenbin` -> `level.edenbin.tmp`
fn temp_path(path: &Path) -> io::Result<PathBuf> {
    match path.file_name() {
        Some(name) => {
            let mut tmp_name = OsString::from(name);
            tmp_name.push(".tmp");
            Ok(path.with_file_name(tmp_name))
        }
        None => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "level path has no file name",
        )),
    }
}

/// Tracks the stream position so blobs can be padded to their offsets.
struct CountingWriter<W> {
    inner: W,
    pos: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, pos: 0 }
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn pad_to(&mut self, offset: u64) -> io::Result<()> {
        const ZEROS: [u8; 16] = [0; 16];
        while self.pos < offset {
            let n = (offset - self.pos).min(ZEROS.len() as u64) as usize;
            self.write_all(&ZEROS[..n])?;
        }
        Ok(())
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
