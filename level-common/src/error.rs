//! Error types for level writing and loading.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// File region a read failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Header,
    MeshTable,
    MeshData,
    TextureTable,
    TextureData,
    ObjectTable,
    StringTable,
    StringData,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::MeshTable => "mesh table",
            Self::MeshData => "mesh data",
            Self::TextureTable => "texture table",
            Self::TextureData => "texture data",
            Self::ObjectTable => "object table",
            Self::StringTable => "string table",
            Self::StringData => "string data",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from [`LevelWriter`](crate::LevelWriter) and [`LevelReader`](crate::LevelReader).
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("Failed to open level {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid level format: expected magic \"EBIN\", found {found:02X?}")]
    Format { found: [u8; 4] },

    #[error("Unsupported level version {found} (supported up to {supported})")]
    Version { found: u32, supported: u32 },

    #[error("Failed to read {section}: {source}")]
    SectionRead {
        section: Section,
        #[source]
        source: io::Error,
    },

    #[error("{section} out of bounds: {len} bytes at offset {offset} (file size {file_len})")]
    OutOfBounds {
        section: Section,
        offset: u64,
        len: u64,
        file_len: u64,
    },

    #[error("Mesh has no vertices or no indices")]
    EmptyMesh,

    #[error("Texture pixel data too short: expected {expected} bytes, got {actual}")]
    TextureSize { expected: usize, actual: usize },

    #[error("Failed to write level {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LevelError {
    /// Section a load failure is attributed to, if any.
    pub fn section(&self) -> Option<Section> {
        match self {
            Self::Format { .. } | Self::Version { .. } => Some(Section::Header),
            Self::SectionRead { section, .. } | Self::OutOfBounds { section, .. } => Some(*section),
            _ => None,
        }
    }

    pub(crate) fn read(section: Section) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::SectionRead { section, source }
    }

    pub(crate) fn invalid_data(section: Section, msg: impl Into<String>) -> Self {
        Self::SectionRead {
            section,
            source: io::Error::new(io::ErrorKind::InvalidData, msg.into()),
        }
    }
}
