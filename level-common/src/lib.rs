//! Binary level format for Eden scenes
//!
//! Persists an editable 3D scene (meshes, textures, per-object properties and
//! strings) into one `.edenbin` file and reconstructs it exactly. Shared by:
//! - the editor (save/load of levels)
//! - `edenbin` (bake and inspect tool)
//!
//! # Modules
//!
//! - [`formats`] - Fixed-width on-disk records and the section layout
//! - [`level`] - [`LevelWriter`] and [`LevelReader`]
//! - [`scene`] - In-memory records exchanged with the editor
//! - [`hash`] - Content hashes for mesh/texture deduplication
//! - [`error`] - [`LevelError`] and the file [`Section`] it names

pub mod error;
pub mod formats;
pub mod hash;
pub mod level;
pub mod scene;

pub use error::{LevelError, Section};
pub use level::{LevelData, LevelReader, LevelWriter, MeshData, ObjectData, TextureData};
pub use scene::{
    Aabb, BeingType, CollisionType, ColorAdjust, DoorParams, FrozenTransform, PrimitiveParams,
    PrimitiveType, SceneObject, TextureRef, Transform,
};

// Re-export commonly used format items
pub use formats::{
    BinarySerializable, EDEN_LEVEL_FORMAT, LevelHeader, LevelLayout, ModelVertex, ObjectFlags,
    TextureFormat,
};
