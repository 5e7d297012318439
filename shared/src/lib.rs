//! Shared constants for the Eden level pipeline.
//!
//! Tools and runtimes agree on file extensions, magic bytes and the supported
//! format version through [`LevelFormat`]; nothing else lives here.

pub mod level_format;

pub use level_format::{EDEN_LEVEL_FORMAT, LevelFormat};
