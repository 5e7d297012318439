//! Binary serialization trait for level records.
//!
//! Every fixed-width record in a binary level implements `BinarySerializable`
//! for consistent serialization/deserialization. Each record also keeps its
//! type-specific `to_bytes()` returning a fixed-size array.
//!
//! All multi-byte fields are little-endian and packed with no implicit padding.

use glam::{Vec3, Vec4};

/// Trait for binary-serializable level records.
///
/// The trait uses `Vec<u8>` for the return type because associated const
/// generics in return types (`[u8; Self::SIZE]`) are not yet stable in Rust.
///
/// # Example
///
/// ```
/// use level_common::formats::{BinarySerializable, TextureEntry};
///
/// let entry = TextureEntry::rgba8(0, 64, 64);
///
/// // Using the trait (returns Vec<u8>)
/// let bytes = entry.serialize();
/// let parsed = TextureEntry::deserialize(&bytes).unwrap();
/// assert_eq!(parsed.width, 64);
///
/// // Using the type-specific method (returns [u8; 32])
/// let bytes_array = entry.to_bytes();
/// assert_eq!(bytes_array.len(), 32);
/// ```
pub trait BinarySerializable: Sized {
    /// Size of the serialized record in bytes.
    const SIZE: usize;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes.
    ///
    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

macro_rules! impl_binary_serializable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BinarySerializable for $ty {
                const SIZE: usize = <$ty>::SIZE;

                fn serialize(&self) -> Vec<u8> {
                    self.to_bytes().to_vec()
                }

                fn deserialize(bytes: &[u8]) -> Option<Self> {
                    Self::from_bytes(bytes)
                }
            }
        )*
    };
}

impl_binary_serializable!(
    super::LevelHeader,
    super::MeshEntry,
    super::TextureEntry,
    super::ObjectEntry,
    super::StringEntry,
    super::ModelVertex,
);

/// Sequential little-endian field writer over a fixed record buffer.
///
/// Callers size the buffer to the record; writing past the end panics, which
/// the size assertions on each record rule out.
pub(crate) struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FieldWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn bytes(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    pub(crate) fn zeros(&mut self, len: usize) {
        self.buf[self.pos..self.pos + len].fill(0);
        self.pos += len;
    }

    pub(crate) fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }

    pub(crate) fn i32(&mut self, v: i32) {
        self.bytes(&v.to_le_bytes());
    }

    pub(crate) fn u64(&mut self, v: u64) {
        self.bytes(&v.to_le_bytes());
    }

    pub(crate) fn f32(&mut self, v: f32) {
        self.bytes(&v.to_le_bytes());
    }

    pub(crate) fn vec3(&mut self, v: Vec3) {
        self.f32(v.x);
        self.f32(v.y);
        self.f32(v.z);
    }

    pub(crate) fn vec4(&mut self, v: Vec4) {
        self.f32(v.x);
        self.f32(v.y);
        self.f32(v.z);
        self.f32(v.w);
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }
}

/// Sequential little-endian field reader over a record slice.
///
/// `from_bytes` implementations check the slice length up front, so reads
/// here never run past the end.
pub(crate) struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    pub(crate) fn skip(&mut self, len: usize) {
        self.pos += len;
    }

    pub(crate) fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.array())
    }

    pub(crate) fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.array())
    }

    pub(crate) fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.array())
    }

    pub(crate) fn f32(&mut self) -> f32 {
        f32::from_le_bytes(self.array())
    }

    pub(crate) fn vec3(&mut self) -> Vec3 {
        Vec3::new(self.f32(), self.f32(), self.f32())
    }

    pub(crate) fn vec4(&mut self) -> Vec4 {
        Vec4::new(self.f32(), self.f32(), self.f32(), self.f32())
    }
}

/// Encode `s` into a NUL-padded fixed field of `N` bytes.
///
/// At most `N - 1` bytes are kept so the field always ends in NUL. Truncation
/// backs off to the previous UTF-8 char boundary. Returns the field and
/// whether anything was dropped.
pub fn encode_fixed_str<const N: usize>(s: &str) -> ([u8; N], bool) {
    let mut out = [0u8; N];
    let mut len = s.len().min(N.saturating_sub(1));
    while !s.is_char_boundary(len) {
        len -= 1;
    }
    out[..len].copy_from_slice(&s.as_bytes()[..len]);
    (out, len < s.len())
}

/// Decode a NUL-padded fixed field, stopping at the first NUL.
pub fn decode_fixed_str(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
