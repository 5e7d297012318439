//! Writing and loading `.edenbin` levels.

mod reader;
mod writer;

#[cfg(test)]
mod tests;

pub use reader::{LevelData, LevelReader, MeshData, ObjectData, TextureData};
pub use writer::LevelWriter;
