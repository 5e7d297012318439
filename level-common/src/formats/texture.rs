//! Texture table entries (32 bytes)
//!
//! # Layout
//! ```text
//! 0x00: data_offset u64   (relative to texture-data blob)
//! 0x08: data_size u32     (width × height × 4 for RGBA8)
//! 0x0C: width u32
//! 0x10: height u32
//! 0x14: format u32        (0 = RGBA8)
//! 0x18: reserved [u8; 8]
//! ```

use super::serialization::{FieldReader, FieldWriter};

const _: () = assert!(8 + 4 + 4 + 4 + 4 + 8 == TextureEntry::SIZE);

/// Pixel format tag stored in [`TextureEntry::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum TextureFormat {
    /// 8-bit RGBA, 4 bytes per pixel
    #[default]
    Rgba8 = 0,
}

impl TextureFormat {
    pub fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Rgba8),
            _ => None,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
        }
    }
}

/// Byte size of an RGBA8 image.
pub fn rgba8_size(width: u32, height: u32) -> usize {
    width as usize * height as usize * TextureFormat::Rgba8.bytes_per_pixel()
}

/// Texture table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureEntry {
    pub data_offset: u64,
    pub data_size: u32,
    pub width: u32,
    pub height: u32,
    pub format: u32,
}

impl TextureEntry {
    pub const SIZE: usize = 32;

    /// Entry for an RGBA8 image at `data_offset` in the texture-data blob.
    pub fn rgba8(data_offset: u64, width: u32, height: u32) -> Self {
        Self {
            data_offset,
            data_size: rgba8_size(width, height) as u32,
            width,
            height,
            format: TextureFormat::Rgba8 as u32,
        }
    }

    /// Write entry to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        let mut w = FieldWriter::new(&mut bytes);
        w.u64(self.data_offset);
        w.u32(self.data_size);
        w.u32(self.width);
        w.u32(self.height);
        w.u32(self.format);
        w.zeros(8);
        debug_assert_eq!(w.position(), Self::SIZE);
        bytes
    }

    /// Read entry from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut r = FieldReader::new(bytes);
        Some(Self {
            data_offset: r.u64(),
            data_size: r.u32(),
            width: r.u32(),
            height: r.u32(),
            format: r.u32(),
        })
    }
}
