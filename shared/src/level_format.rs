//! Level format constants for Eden binary levels.
//!
//! This module defines the `LevelFormat` struct which serves as the single source of truth
//! for level-related constants (file extensions, magic bytes, supported version).
//!
//! # Example
//!
//! ```
//! use eden_shared::EDEN_LEVEL_FORMAT;
//!
//! // Binary sibling of an editable `.eden` level
//! assert_eq!(EDEN_LEVEL_FORMAT.extension, "edenbin");
//! assert_eq!(EDEN_LEVEL_FORMAT.source_extension, "eden");
//!
//! // Check magic bytes
//! assert_eq!(EDEN_LEVEL_FORMAT.magic, b"EBIN");
//! ```

/// Binary level format description.
///
/// Each build of the engine carries one static `LevelFormat`; readers accept any
/// file whose stored version is less than or equal to `version`.
#[derive(Debug, Clone, Copy)]
pub struct LevelFormat {
    /// Binary level extension without dot (e.g., "edenbin")
    pub extension: &'static str,

    /// Editable source level extension without dot (e.g., "eden")
    pub source_extension: &'static str,

    /// Magic bytes at start of every binary level (4 bytes)
    pub magic: &'static [u8; 4],

    /// Newest format version this build reads and the version it writes
    pub version: u32,
}

impl LevelFormat {
    /// Create a new level format description.
    pub const fn new(
        extension: &'static str,
        source_extension: &'static str,
        magic: &'static [u8; 4],
        version: u32,
    ) -> Self {
        Self {
            extension,
            source_extension,
            magic,
            version,
        }
    }

    /// Returns true if `version` can be read by this build.
    pub const fn supports(&self, version: u32) -> bool {
        version <= self.version
    }
}

/// Eden binary level format.
///
/// - Level extension: `.edenbin`
/// - Source extension: `.eden`
/// - Magic bytes: `EBIN`
pub const EDEN_LEVEL_FORMAT: LevelFormat = LevelFormat::new("edenbin", "eden", b"EBIN", 1);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_format_extensions() {
        assert_eq!(EDEN_LEVEL_FORMAT.extension, "edenbin");
        assert_eq!(EDEN_LEVEL_FORMAT.source_extension, "eden");
    }

    #[test]
    fn test_level_format_magic() {
        assert_eq!(EDEN_LEVEL_FORMAT.magic, b"EBIN");
        assert_eq!(EDEN_LEVEL_FORMAT.magic.len(), 4);
    }

    #[test]
    fn test_level_format_version() {
        assert_eq!(EDEN_LEVEL_FORMAT.version, 1);
    }

    #[test]
    fn test_supports_older_and_current_versions() {
        assert!(EDEN_LEVEL_FORMAT.supports(0));
        assert!(EDEN_LEVEL_FORMAT.supports(EDEN_LEVEL_FORMAT.version));
        assert!(!EDEN_LEVEL_FORMAT.supports(EDEN_LEVEL_FORMAT.version + 1));
    }
}
