//! Eden level tool
//!
//! Bakes TOML scene manifests into `.edenbin` levels and inspects existing
//! levels.

pub mod bake;
pub mod inspect;
pub mod manifest;
pub mod primitives;
