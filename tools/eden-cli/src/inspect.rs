//! Print the contents of a binary level

use std::fmt::Write as _;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use level_common::formats::string_table_offset;
use level_common::{LevelData, LevelHeader, LevelReader};

/// Load `path` and print its header, tables and objects to stdout.
pub fn inspect(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let header = LevelReader::probe(BufReader::new(file))
        .with_context(|| format!("Not a valid level: {}", path.display()))?;

    let data = LevelReader::new()
        .load(path)
        .with_context(|| format!("Failed to load level: {}", path.display()))?;

    print!("{}", describe(path, &header, &data));
    Ok(())
}

/// Human-readable summary of a loaded level.
pub fn describe(path: &Path, header: &LevelHeader, data: &LevelData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", path.display());
    let _ = writeln!(
        out,
        "  format: {} v{}",
        String::from_utf8_lossy(&header.magic),
        header.version
    );

    let _ = writeln!(out, "  sections:");
    let section = |out: &mut String, name: &str, offset: u64, detail: String| {
        let _ = writeln!(out, "    {:<14} @ {:#010x}  {}", name, offset, detail);
    };
    section(
        &mut out,
        "meshes",
        header.mesh_table_offset,
        format!("{} entries", header.mesh_count),
    );
    section(
        &mut out,
        "textures",
        header.texture_table_offset,
        format!("{} entries", header.texture_count),
    );
    section(
        &mut out,
        "objects",
        header.object_table_offset,
        format!("{} entries", header.object_count),
    );
    section(
        &mut out,
        "strings",
        string_table_offset(header.object_table_offset, header.object_count),
        String::new(),
    );
    section(
        &mut out,
        "mesh data",
        header.mesh_data_offset,
        format_size(header.mesh_data_size),
    );
    section(
        &mut out,
        "texture data",
        header.texture_data_offset,
        format_size(header.texture_data_size),
    );

    if !data.meshes.is_empty() {
        let _ = writeln!(out, "  meshes:");
        for (i, mesh) in data.meshes.iter().enumerate() {
            let texture = mesh
                .texture_id
                .map_or_else(|| "none".to_string(), |id| id.to_string());
            let _ = writeln!(
                out,
                "    [{}] {} vertices, {} indices, texture {}, center {:?} size {:?}",
                i,
                mesh.vertices.len(),
                mesh.indices.len(),
                texture,
                mesh.bounds.center().to_array(),
                mesh.bounds.size().to_array()
            );
        }
    }

    if !data.textures.is_empty() {
        let _ = writeln!(out, "  textures:");
        for (i, tex) in data.textures.iter().enumerate() {
            let _ = writeln!(
                out,
                "    [{}] {}x{} {:?} ({})",
                i,
                tex.width,
                tex.height,
                tex.format,
                format_size(tex.pixels.len() as u64)
            );
        }
    }

    if !data.objects.is_empty() {
        let _ = writeln!(out, "  objects:");
        for entry in &data.objects {
            let obj = &entry.object;
            let mesh = entry
                .mesh_id
                .map_or_else(|| "-".to_string(), |id| id.to_string());
            let _ = write!(
                out,
                "    {:<24} mesh {:<4} {:<10} {}",
                obj.name,
                mesh,
                obj.being.name(),
                obj.collision.name()
            );
            if let Some(prim) = &obj.primitive {
                let _ = write!(out, " primitive={}", prim.kind.name());
            }
            if let Some(door) = &obj.door {
                let _ = write!(out, " door={}->{}", door.door_id, door.target_door_id);
                if !door.target_level.is_empty() {
                    let _ = write!(out, "@{}", door.target_level);
                }
            }
            if !obj.visible {
                let _ = write!(out, " hidden");
            }
            let _ = writeln!(out);
        }
    }

    out
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} bytes", bytes)
    }
}
