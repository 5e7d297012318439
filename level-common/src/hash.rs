//! Content hashes used for mesh and texture deduplication.
//!
//! Hashes only key the writer's in-memory maps and are never persisted, so
//! they need to be stable within one process, not across versions.

use xxhash_rust::xxh3::Xxh3;

/// Multiplier used to fold a texture hash into a mesh hash (64-bit FNV prime).
const TEXTURE_FOLD_PRIME: u64 = 1_099_511_628_211;

/// Hash of encoded vertex bytes followed by encoded index bytes.
///
/// Order-sensitive: the same vertices in a different order hash differently.
pub fn mesh_hash(vertex_bytes: &[u8], index_bytes: &[u8]) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(vertex_bytes);
    hasher.update(index_bytes);
    hasher.digest()
}

/// Hash of a texture's dimensions followed by its raw pixels.
///
/// The same bytes read as 4x4 and as 2x8 are different textures.
pub fn texture_hash(pixels: &[u8], width: u32, height: u32) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(&width.to_le_bytes());
    hasher.update(&height.to_le_bytes());
    hasher.update(pixels);
    hasher.digest()
}

/// Fold a texture hash into a mesh hash so the same geometry with different
/// textures stays distinct.
pub fn fold_texture(mesh_hash: u64, texture_hash: u64) -> u64 {
    mesh_hash ^ texture_hash.wrapping_mul(TEXTURE_FOLD_PRIME)
}
