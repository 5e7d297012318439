//! In-memory scene records exchanged with the editor.
//!
//! The writer consumes these and the reader rebuilds them. Conditional
//! sub-records (frozen transform, primitive, door) are `Option`s here; the
//! on-disk flag bits are derived from which ones are present.

use glam::{Vec3, Vec4};

use crate::formats::ObjectFlags;

/// Axis-aligned bounding box in mesh-local space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or the zero box if there are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        iter.fold(Self::new(first, first), |b, p| Self::new(b.min.min(p), b.max.max(p)))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Borrowed RGBA8 pixels handed to [`LevelWriter::add_mesh`](crate::LevelWriter::add_mesh).
#[derive(Debug, Clone, Copy)]
pub struct TextureRef<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
}

impl<'a> TextureRef<'a> {
    pub fn new(pixels: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }
}

/// Bullet physics collision shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(i32)]
pub enum CollisionType {
    #[default]
    None = 0,
    /// Oriented box that rotates with the object
    Box = 1,
    ConvexHull = 2,
    /// Triangle mesh
    Mesh = 3,
}

impl CollisionType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Box),
            2 => Some(Self::ConvexHull),
            3 => Some(Self::Mesh),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Box => "Box",
            Self::ConvexHull => "Convex Hull",
            Self::Mesh => "Mesh",
        }
    }
}

/// What kind of being an object represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(i32)]
pub enum BeingType {
    /// Non-interactive object
    #[default]
    Static = 0,
    Human = 1,
    Clone = 2,
    Robot = 3,
    Android = 4,
    Cyborg = 5,
    Alien = 6,
    Eve = 7,
    AiArchitect = 8,
    /// Script-driven bot with no chat
    Algobot = 9,
    EdenCompanion = 10,
}

impl BeingType {
    pub const ALL: [Self; 11] = [
        Self::Static,
        Self::Human,
        Self::Clone,
        Self::Robot,
        Self::Android,
        Self::Cyborg,
        Self::Alien,
        Self::Eve,
        Self::AiArchitect,
        Self::Algobot,
        Self::EdenCompanion,
    ];

    pub fn from_raw(raw: i32) -> Option<Self> {
        usize::try_from(raw).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Static => "Static",
            Self::Human => "Human",
            Self::Clone => "Clone",
            Self::Robot => "Robot",
            Self::Android => "Android",
            Self::Cyborg => "Cyborg",
            Self::Alien => "Alien",
            Self::Eve => "Eve",
            Self::AiArchitect => "AI Architect",
            Self::Algobot => "Algobot",
            Self::EdenCompanion => "Eden Companion",
        }
    }
}

/// Built-in shape for objects without a model file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(i32)]
pub enum PrimitiveType {
    /// Uses the model path
    #[default]
    None = 0,
    Cube = 1,
    Cylinder = 2,
    SpawnMarker = 3,
    /// Level transition trigger zone
    Door = 4,
}

impl PrimitiveType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Cube),
            2 => Some(Self::Cylinder),
            3 => Some(Self::SpawnMarker),
            4 => Some(Self::Door),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Cube => "Cube",
            Self::Cylinder => "Cylinder",
            Self::SpawnMarker => "Spawn Marker",
            Self::Door => "Door",
        }
    }
}

/// Decode a raw enum field, falling back to the default for unknown values.
pub(crate) fn decode_enum<T: Default + Copy>(
    raw: i32,
    field: &'static str,
    object: &str,
    from_raw: fn(i32) -> Option<T>,
) -> T {
    from_raw(raw).unwrap_or_else(|| {
        tracing::warn!("Unknown {} {} on object '{}', using default", field, raw, object);
        T::default()
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in degrees
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAdjust {
    pub hue_shift: f32,
    pub saturation: f32,
    pub brightness: f32,
}

impl Default for ColorAdjust {
    fn default() -> Self {
        Self {
            hue_shift: 0.0,
            saturation: 1.0,
            brightness: 1.0,
        }
    }
}

/// Rotation and scale already baked into the mesh vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrozenTransform {
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for FrozenTransform {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveParams {
    pub kind: PrimitiveType,
    pub size: f32,
    pub radius: f32,
    pub height: f32,
    pub segments: i32,
    pub color: Vec4,
}

impl Default for PrimitiveParams {
    fn default() -> Self {
        Self {
            kind: PrimitiveType::None,
            size: 1.0,
            radius: 0.5,
            height: 1.0,
            segments: 16,
            color: Vec4::new(0.7, 0.7, 0.7, 1.0),
        }
    }
}

/// Level transition parameters
///
/// Door ids are stored in 32-byte fields and truncated to 31 bytes on save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoorParams {
    pub door_id: String,
    pub target_door_id: String,
    /// Source path of the level this door leads to
    pub target_level: String,
}

/// One editable object as seen by the level format.
///
/// The name is stored in a 64-byte field and truncated to 63 bytes on save.
/// Truncated names are not guaranteed to stay unique.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    pub color: ColorAdjust,
    pub collision: CollisionType,
    pub being: BeingType,
    pub patrol_speed: f32,

    pub visible: bool,
    pub aabb_collision: bool,
    pub polygon_collision: bool,
    pub kinematic: bool,
    pub daily_schedule: bool,
    pub skinned: bool,

    pub frozen: Option<FrozenTransform>,
    pub primitive: Option<PrimitiveParams>,
    pub door: Option<DoorParams>,

    /// Free text used for AI perception
    pub description: String,
    /// External model file for meshes not baked into the level
    pub model_path: String,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::default(),
            color: ColorAdjust::default(),
            collision: CollisionType::None,
            being: BeingType::Static,
            patrol_speed: 5.0,
            visible: true,
            aabb_collision: false,
            polygon_collision: false,
            kinematic: false,
            daily_schedule: false,
            skinned: false,
            frozen: None,
            primitive: None,
            door: None,
            description: String::new(),
            model_path: String::new(),
        }
    }
}

impl SceneObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// On-disk flag bits for this object.
    pub fn flags(&self) -> ObjectFlags {
        let mut flags = ObjectFlags::empty();
        flags.set(ObjectFlags::VISIBLE, self.visible);
        flags.set(ObjectFlags::AABB_COLLISION, self.aabb_collision);
        flags.set(ObjectFlags::POLY_COLLISION, self.polygon_collision);
        flags.set(ObjectFlags::KINEMATIC, self.kinematic);
        flags.set(ObjectFlags::FROZEN_TRANSFORM, self.frozen.is_some());
        flags.set(ObjectFlags::DAILY_SCHEDULE, self.daily_schedule);
        flags.set(ObjectFlags::IS_SKINNED, self.skinned);
        flags.set(ObjectFlags::IS_PRIMITIVE, self.primitive.is_some());
        flags.set(ObjectFlags::IS_DOOR, self.door.is_some());
        flags
    }

    /// Apply the boolean properties encoded in `flags`.
    ///
    /// Sub-record flags are not handled here; the reader fills those from the
    /// entry fields.
    pub fn set_flags(&mut self, flags: ObjectFlags) {
        self.visible = flags.contains(ObjectFlags::VISIBLE);
        self.aabb_collision = flags.contains(ObjectFlags::AABB_COLLISION);
        self.polygon_collision = flags.contains(ObjectFlags::POLY_COLLISION);
        self.kinematic = flags.contains(ObjectFlags::KINEMATIC);
        self.daily_schedule = flags.contains(ObjectFlags::DAILY_SCHEDULE);
        self.skinned = flags.contains(ObjectFlags::IS_SKINNED);
    }
}
