//! Bake a scene manifest into a binary level

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use level_common::LevelWriter;

use crate::manifest::SceneManifest;
use crate::primitives;

/// Summary of one bake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeReport {
    pub output: PathBuf,
    pub bytes: u64,
    pub meshes: usize,
    pub textures: usize,
    pub objects: usize,
    pub strings: usize,
}

/// Bake `manifest_path` to `output`, or to the manifest's own output path.
pub fn bake(manifest_path: &Path, output: Option<&Path>) -> Result<BakeReport> {
    let manifest = SceneManifest::load(manifest_path)?;
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => manifest.output_path(manifest_path),
    };

    tracing::info!(
        "Baking {} ({} objects)",
        manifest_path.display(),
        manifest.objects.len()
    );

    let mut writer = LevelWriter::new();
    build_level(&manifest, &mut writer)?;

    let bytes = writer
        .write(&output)
        .with_context(|| format!("Failed to write level: {}", output.display()))?;

    Ok(BakeReport {
        output,
        bytes,
        meshes: writer.mesh_count(),
        textures: writer.texture_count(),
        objects: writer.object_count(),
        strings: writer.string_count(),
    })
}

/// Add every manifest object, and the geometry of its primitive, to `writer`.
pub fn build_level(manifest: &SceneManifest, writer: &mut LevelWriter) -> Result<()> {
    for section in &manifest.objects {
        let object = section.to_scene_object();

        let mesh_id = match object.primitive.as_ref().and_then(primitives::generate) {
            Some(mesh) => {
                let id = writer
                    .add_mesh(&mesh.vertices, &mesh.indices, mesh.bounds, None)
                    .with_context(|| format!("Object '{}': failed to add mesh", object.name))?;
                Some(id)
            }
            None => None,
        };

        tracing::debug!(
            "  {} -> mesh {}",
            object.name,
            mesh_id.map_or_else(|| "-".to_string(), |id| id.to_string())
        );

        writer.add_object(&object, mesh_id, None);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_primitives_share_mesh() {
        let manifest = SceneManifest::parse(
            r#"
[[objects]]
name = "crate_a"
[objects.primitive]
kind = "cube"

[[objects]]
name = "crate_b"
position = [3.0, 0.0, 0.0]
[objects.primitive]
kind = "cube"

[[objects]]
name = "pillar"
[objects.primitive]
kind = "cylinder"
segments = 12

[[objects]]
name = "spawn"
[objects.primitive]
kind = "spawn_marker"
"#,
        )
        .unwrap();

        let mut writer = LevelWriter::new();
        build_level(&manifest, &mut writer).unwrap();

        assert_eq!(writer.object_count(), 4);
        assert_eq!(writer.mesh_count(), 2);
        assert_eq!(writer.texture_count(), 0);
    }

    #[test]
    fn test_strings_interned_across_objects() {
        let manifest = SceneManifest::parse(
            r#"
[[objects]]
name = "a"
description = "shared"
model_path = "models/a.glb"

[[objects]]
name = "b"
description = "shared"
"#,
        )
        .unwrap();

        let mut writer = LevelWriter::new();
        build_level(&manifest, &mut writer).unwrap();
        assert_eq!(writer.string_count(), 2);
        assert_eq!(writer.mesh_count(), 0);
    }
}
