//! Scene manifest parsing
//!
//! A TOML description of a level's objects, baked into `.edenbin` by the
//! `bake` command. Defaults match the level record defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::{Vec3, Vec4};
use level_common::{
    BeingType, CollisionType, DoorParams, FrozenTransform, PrimitiveParams, PrimitiveType,
    SceneObject, Transform,
};
use serde::Deserialize;

/// Scene manifest structure
#[derive(Debug, Deserialize)]
pub struct SceneManifest {
    /// Output path, relative to the manifest. Default: `<manifest>.edenbin`
    pub output: Option<String>,
    #[serde(default)]
    pub objects: Vec<ObjectSection>,
}

/// One `[[objects]]` entry
#[derive(Debug, Deserialize)]
pub struct ObjectSection {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],

    #[serde(default)]
    pub hue_shift: f32,
    #[serde(default = "default_one")]
    pub saturation: f32,
    #[serde(default = "default_one")]
    pub brightness: f32,

    #[serde(default)]
    pub collision: CollisionKind,
    #[serde(default)]
    pub being: BeingKind,
    #[serde(default = "default_patrol_speed")]
    pub patrol_speed: f32,

    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub aabb_collision: bool,
    #[serde(default)]
    pub polygon_collision: bool,
    #[serde(default)]
    pub kinematic: bool,
    #[serde(default)]
    pub daily_schedule: bool,
    #[serde(default)]
    pub skinned: bool,

    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model_path: String,

    pub frozen: Option<FrozenSection>,
    pub primitive: Option<PrimitiveSection>,
    pub door: Option<DoorSection>,
}

#[derive(Debug, Deserialize)]
pub struct FrozenSection {
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

#[derive(Debug, Deserialize)]
pub struct PrimitiveSection {
    pub kind: PrimitiveKind,
    #[serde(default = "default_one")]
    pub size: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_one")]
    pub height: f32,
    #[serde(default = "default_segments")]
    pub segments: i32,
    #[serde(default = "default_color")]
    pub color: [f32; 4],
}

#[derive(Debug, Deserialize)]
pub struct DoorSection {
    pub door_id: String,
    #[serde(default)]
    pub target_door_id: String,
    #[serde(default)]
    pub target_level: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    #[default]
    None,
    Box,
    ConvexHull,
    Mesh,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeingKind {
    #[default]
    Static,
    Human,
    Clone,
    Robot,
    Android,
    Cyborg,
    Alien,
    Eve,
    AiArchitect,
    Algobot,
    EdenCompanion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Cube,
    Cylinder,
    SpawnMarker,
    Door,
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_one() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_patrol_speed() -> f32 {
    5.0
}

fn default_radius() -> f32 {
    0.5
}

fn default_segments() -> i32 {
    16
}

fn default_color() -> [f32; 4] {
    [0.7, 0.7, 0.7, 1.0]
}

impl From<CollisionKind> for CollisionType {
    fn from(kind: CollisionKind) -> Self {
        match kind {
            CollisionKind::None => Self::None,
            CollisionKind::Box => Self::Box,
            CollisionKind::ConvexHull => Self::ConvexHull,
            CollisionKind::Mesh => Self::Mesh,
        }
    }
}

impl From<BeingKind> for BeingType {
    fn from(kind: BeingKind) -> Self {
        match kind {
            BeingKind::Static => Self::Static,
            BeingKind::Human => Self::Human,
            BeingKind::Clone => Self::Clone,
            BeingKind::Robot => Self::Robot,
            BeingKind::Android => Self::Android,
            BeingKind::Cyborg => Self::Cyborg,
            BeingKind::Alien => Self::Alien,
            BeingKind::Eve => Self::Eve,
            BeingKind::AiArchitect => Self::AiArchitect,
            BeingKind::Algobot => Self::Algobot,
            BeingKind::EdenCompanion => Self::EdenCompanion,
        }
    }
}

impl From<PrimitiveKind> for PrimitiveType {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Cube => Self::Cube,
            PrimitiveKind::Cylinder => Self::Cylinder,
            PrimitiveKind::SpawnMarker => Self::SpawnMarker,
            PrimitiveKind::Door => Self::Door,
        }
    }
}

impl SceneManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("In manifest {}", path.display()))
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content).context("Failed to parse scene manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate manifest fields
    pub fn validate(&self) -> Result<()> {
        for obj in &self.objects {
            if obj.name.is_empty() {
                anyhow::bail!("Object with empty name in scene manifest");
            }
            if let Some(prim) = &obj.primitive {
                if prim.segments < 0 {
                    anyhow::bail!(
                        "Object '{}': negative segment count {}",
                        obj.name,
                        prim.segments
                    );
                }
                if prim.kind == PrimitiveKind::Cylinder && prim.segments < 3 {
                    anyhow::bail!(
                        "Object '{}': cylinder needs at least 3 segments (got {})",
                        obj.name,
                        prim.segments
                    );
                }
                if prim.size <= 0.0 || prim.radius <= 0.0 || prim.height <= 0.0 {
                    anyhow::bail!("Object '{}': primitive dimensions must be positive", obj.name);
                }
            }
        }
        Ok(())
    }

    /// Resolve the output path for a manifest at `manifest_path`.
    pub fn output_path(&self, manifest_path: &Path) -> PathBuf {
        match &self.output {
            Some(out) => manifest_path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(out),
            None => manifest_path.with_extension(eden_shared::EDEN_LEVEL_FORMAT.extension),
        }
    }
}

impl ObjectSection {
    /// Build the scene object this entry describes.
    pub fn to_scene_object(&self) -> SceneObject {
        let mut obj = SceneObject::new(self.name.clone());
        obj.transform = Transform {
            position: Vec3::from(self.position),
            rotation: Vec3::from(self.rotation),
            scale: Vec3::from(self.scale),
        };
        obj.color.hue_shift = self.hue_shift;
        obj.color.saturation = self.saturation;
        obj.color.brightness = self.brightness;
        obj.collision = self.collision.into();
        obj.being = self.being.into();
        obj.patrol_speed = self.patrol_speed;

        obj.visible = self.visible;
        obj.aabb_collision = self.aabb_collision;
        obj.polygon_collision = self.polygon_collision;
        obj.kinematic = self.kinematic;
        obj.daily_schedule = self.daily_schedule;
        obj.skinned = self.skinned;

        obj.frozen = self.frozen.as_ref().map(|f| FrozenTransform {
            rotation: Vec3::from(f.rotation),
            scale: Vec3::from(f.scale),
        });
        obj.primitive = self.primitive.as_ref().map(|p| PrimitiveParams {
            kind: p.kind.into(),
            size: p.size,
            radius: p.radius,
            height: p.height,
            segments: p.segments,
            color: Vec4::from(p.color),
        });
        obj.door = self.door.as_ref().map(|d| DoorParams {
            door_id: d.door_id.clone(),
            target_door_id: d.target_door_id.clone(),
            target_level: d.target_level.clone(),
        });

        obj.description = self.description.clone();
        obj.model_path = self.model_path.clone();
        obj
    }
}
