//! Procedural meshes for primitive objects
//!
//! Cubes and cylinders are generated at bake time so their geometry lands in
//! the level's mesh blob like any other model. Spawn markers and doors have
//! no baked geometry.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use level_common::{Aabb, ModelVertex, PrimitiveParams, PrimitiveType};

/// Generated geometry for one primitive
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveMesh {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl PrimitiveMesh {
    fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
            bounds: Aabb::default(),
        }
    }

    fn push(&mut self, position: Vec3, normal: Vec3, uv: Vec2, color: [f32; 4]) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(ModelVertex::new(
            position.to_array(),
            normal.to_array(),
            uv.to_array(),
            color,
        ));
        index
    }

    fn finish(mut self) -> Self {
        self.bounds = Aabb::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)));
        self
    }
}

/// Build the mesh for a primitive, or `None` for kinds without geometry.
pub fn generate(params: &PrimitiveParams) -> Option<PrimitiveMesh> {
    let color = params.color.to_array();
    match params.kind {
        PrimitiveType::Cube => Some(cube(params.size, color)),
        PrimitiveType::Cylinder => Some(cylinder(
            params.radius,
            params.height,
            params.segments.max(3) as u32,
            color,
        )),
        PrimitiveType::None | PrimitiveType::SpawnMarker | PrimitiveType::Door => None,
    }
}

/// Axis-aligned cube centered on the origin with flat-shaded faces.
pub fn cube(size: f32, color: [f32; 4]) -> PrimitiveMesh {
    let h = size * 0.5;
    // (normal, tangent u, tangent v) per face
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    let mut mesh = PrimitiveMesh::with_capacity(24, 36);
    for (normal, u, v) in faces {
        let center = normal * h;
        let a = mesh.push(center - u * h - v * h, normal, Vec2::new(0.0, 1.0), color);
        let b = mesh.push(center + u * h - v * h, normal, Vec2::new(1.0, 1.0), color);
        let c = mesh.push(center + u * h + v * h, normal, Vec2::new(1.0, 0.0), color);
        let d = mesh.push(center - u * h + v * h, normal, Vec2::new(0.0, 0.0), color);
        mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
    mesh.finish()
}

/// Y-up cylinder centered on the origin, with capped ends.
pub fn cylinder(radius: f32, height: f32, segments: u32, color: [f32; 4]) -> PrimitiveMesh {
    let segments = segments.max(3);
    let half = height * 0.5;
    let ring = segments as usize + 1;
    let mut mesh = PrimitiveMesh::with_capacity(ring * 2 + (segments as usize + 1) * 2, segments as usize * 12);

    // Side: duplicated seam column so UVs wrap cleanly
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let (sin, cos) = (t * TAU).sin_cos();
        let normal = Vec3::new(cos, 0.0, sin);
        let rim = normal * radius;
        mesh.push(rim + Vec3::Y * half, normal, Vec2::new(t, 0.0), color);
        mesh.push(rim - Vec3::Y * half, normal, Vec2::new(t, 1.0), color);
    }
    for i in 0..segments {
        let top = i * 2;
        let bottom = top + 1;
        let next_top = top + 2;
        let next_bottom = top + 3;
        mesh.indices
            .extend_from_slice(&[top, next_top, bottom, bottom, next_top, next_bottom]);
    }

    // Caps
    for (y, normal) in [(half, Vec3::Y), (-half, Vec3::NEG_Y)] {
        let center = mesh.push(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5), color);
        let first = center + 1;
        for i in 0..segments {
            let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
            mesh.push(
                Vec3::new(cos * radius, y, sin * radius),
                normal,
                Vec2::new(cos * 0.5 + 0.5, sin * 0.5 + 0.5),
                color,
            );
        }
        for i in 0..segments {
            let a = first + i;
            let b = first + (i + 1) % segments;
            if normal.y > 0.0 {
                mesh.indices.extend_from_slice(&[center, b, a]);
            } else {
                mesh.indices.extend_from_slice(&[center, a, b]);
            }
        }
    }

    mesh.finish()
}
