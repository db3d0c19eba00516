//! Procedural meshes for tests, benchmarks, and smoke runs.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::{Mesh, Triangle};

/// Latitude/longitude sphere centred on the origin.
///
/// `rings` is clamped to at least 2 and `segments` to at least 3. The mesh has
/// `(rings - 1) * segments + 2` vertices and `2 * segments * (rings - 1)` triangles.
pub fn uv_sphere(radius: f32, rings: u32, segments: u32) -> Mesh {
    let rings = rings.max(2);
    let segments = segments.max(3);

    let mut positions = Vec::with_capacity(((rings - 1) * segments + 2) as usize);
    positions.push(Vec3::new(0.0, radius, 0.0));
    for r in 1..rings {
        let phi = PI * r as f32 / rings as f32;
        for s in 0..segments {
            let theta = TAU * s as f32 / segments as f32;
            positions.push(Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            ));
        }
    }
    positions.push(Vec3::new(0.0, -radius, 0.0));
    let bottom = positions.len() as u32 - 1;

    let ring_start = |r: u32| 1 + (r - 1) * segments;
    let mut triangles: Vec<Triangle> = Vec::with_capacity((2 * segments * (rings - 1)) as usize);
    for s in 0..segments {
        let n = (s + 1) % segments;
        triangles.push([0, ring_start(1) + n, ring_start(1) + s]);
    }
    for r in 1..rings - 1 {
        for s in 0..segments {
            let n = (s + 1) % segments;
            let a = ring_start(r) + s;
            let b = ring_start(r) + n;
            let c = ring_start(r + 1) + s;
            let d = ring_start(r + 1) + n;
            triangles.push([a, b, d]);
            triangles.push([a, d, c]);
        }
    }
    let last = ring_start(rings - 1);
    for s in 0..segments {
        let n = (s + 1) % segments;
        triangles.push([bottom, last + s, last + n]);
    }

    Mesh::from_parts_unchecked(positions, triangles)
}

/// Flat `cells x cells` grid of quads in the XZ plane, spanning `[0, size]`.
pub fn grid_plane(size: f32, cells: u32) -> Mesh {
    let cells = cells.max(1);
    let row = cells + 1;
    let step = size / cells as f32;

    let mut positions = Vec::with_capacity((row * row) as usize);
    for z in 0..row {
        for x in 0..row {
            positions.push(Vec3::new(x as f32 * step, 0.0, z as f32 * step));
        }
    }

    let mut triangles: Vec<Triangle> = Vec::with_capacity((cells * cells * 2) as usize);
    for z in 0..cells {
        for x in 0..cells {
            let a = z * row + x;
            let b = a + 1;
            let c = a + row;
            let d = c + 1;
            triangles.push([a, c, b]);
            triangles.push([b, c, d]);
        }
    }

    Mesh::from_parts_unchecked(positions, triangles)
}
