//! Indexed triangle mesh with a cached bounding box.

use glam::Vec3;

use crate::{Aabb, MeshError};

/// Three vertex indices into the owning mesh's position array.
pub type Triangle = [u32; 3];

/// An indexed triangle mesh.
///
/// The bounding box is computed once on construction and is what the simplifier
/// uses to normalize and denormalize coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    triangles: Vec<Triangle>,
    bounds: Aabb,
}

impl Mesh {
    /// Build a mesh from positions and triangles.
    ///
    /// Only checks that every index is in range; an empty mesh is allowed so that
    /// fully-collapsed simplification levels can still be represented. Use
    /// [`Mesh::from_flat`] for loader input.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<Triangle>) -> Result<Self, MeshError> {
        let vertex_count = positions.len();
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(Self::from_parts_unchecked(positions, triangles))
    }

    /// Build a mesh whose indices are known to be in range.
    pub(crate) fn from_parts_unchecked(positions: Vec<Vec3>, triangles: Vec<Triangle>) -> Self {
        let bounds = Aabb::from_points(&positions).unwrap_or_default();
        Self {
            positions,
            triangles,
            bounds,
        }
    }

    /// Build a mesh from the flat arrays a mesh loader produces.
    ///
    /// `positions` holds xyz triples and `indices` holds index triples. Fails if
    /// either length is not a multiple of 3, if the mesh is empty, or if any index
    /// is out of range.
    pub fn from_flat(positions: &[f32], indices: &[u32]) -> Result<Self, MeshError> {
        if positions.len() % 3 != 0 {
            return Err(MeshError::PositionLength(positions.len()));
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndexLength(indices.len()));
        }
        if positions.is_empty() || indices.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        let points = positions
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();
        let triangles = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self::new(points, triangles)
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Triangle index triples.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Bounding box computed at construction.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True if the mesh has no vertices or no triangles.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.triangles.is_empty()
    }

    /// Corner positions of one triangle.
    pub fn triangle_positions(&self, tri: &Triangle) -> [Vec3; 3] {
        tri.map(|i| self.positions[i as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flat_builds_mesh() {
        let mesh = Mesh::from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2])
            .unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.bounds().max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_from_flat_rejects_ragged_positions() {
        let err = Mesh::from_flat(&[0.0, 1.0], &[0, 0, 0]).unwrap_err();
        assert!(matches!(err, MeshError::PositionLength(2)));
    }

    #[test]
    fn test_from_flat_rejects_ragged_indices() {
        let err = Mesh::from_flat(&[0.0; 9], &[0, 1]).unwrap_err();
        assert!(matches!(err, MeshError::IndexLength(2)));
    }

    #[test]
    fn test_from_flat_rejects_empty() {
        assert!(matches!(
            Mesh::from_flat(&[], &[]).unwrap_err(),
            MeshError::EmptyMesh
        ));
        assert!(matches!(
            Mesh::from_flat(&[0.0; 9], &[]).unwrap_err(),
            MeshError::EmptyMesh
        ));
    }

    #[test]
    fn test_out_of_range_index_is_reported() {
        let err = Mesh::from_flat(&[0.0; 9], &[0, 1, 3]).unwrap_err();
        match err {
            MeshError::IndexOutOfRange {
                triangle,
                index,
                vertex_count,
            } => {
                assert_eq!(triangle, 0);
                assert_eq!(index, 3);
                assert_eq!(vertex_count, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_new_allows_empty_output_mesh() {
        let mesh = Mesh::new(vec![Vec3::ONE], Vec::new()).unwrap();
        assert!(mesh.is_empty());
        assert_eq!(mesh.bounds().min, Vec3::ONE);
    }
}
