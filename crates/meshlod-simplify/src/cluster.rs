//! Vertex clustering at a fixed octree depth.

use glam::Vec3;

use crate::{ErrorQuadric, Octree, OctreeNode, SimplifyError};

/// Cluster quadrics with `|det| <= 1e-3` fall back to the member centroid.
pub const DEFAULT_DETERMINANT_THRESHOLD: f64 = 1e-3;

/// Result of collapsing every octree node at one depth into a representative.
///
/// Representative ids are contiguous from 0 in depth-first octant order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClusterResolution {
    /// Representative position per cluster id.
    pub representatives: Vec<Vec3>,
    /// Cluster id per original vertex; `None` for vertices in no resolved cluster.
    pub vertex_map: Vec<Option<u32>>,
    /// Clusters placed at their quadric minimum.
    pub quadric_clusters: usize,
    /// Clusters placed at their member centroid.
    pub centroid_clusters: usize,
    /// Occupied leaves found above the target depth.
    pub skipped_subtrees: usize,
}

impl ClusterResolution {
    pub fn cluster_count(&self) -> usize {
        self.representatives.len()
    }

    /// Cluster id of an original vertex.
    pub fn representative_of(&self, vertex: u32) -> Option<u32> {
        self.vertex_map.get(vertex as usize).copied().flatten()
    }
}

/// Maps original vertices to one representative per occupied octree node.
pub struct ClusterResolver<'a> {
    quadrics: &'a [ErrorQuadric],
    points: &'a [Vec3],
    determinant_threshold: f64,
}

impl<'a> ClusterResolver<'a> {
    /// `quadrics` and `points` are indexed by original vertex and must live in the
    /// same coordinate space the octree was built in. Fails if their lengths differ.
    pub fn new(quadrics: &'a [ErrorQuadric], points: &'a [Vec3]) -> Result<Self, SimplifyError> {
        if quadrics.len() != points.len() {
            return Err(SimplifyError::QuadricCountMismatch {
                quadrics: quadrics.len(),
                points: points.len(),
            });
        }
        Ok(Self {
            quadrics,
            points,
            determinant_threshold: DEFAULT_DETERMINANT_THRESHOLD,
        })
    }

    #[must_use]
    pub fn with_determinant_threshold(mut self, threshold: f64) -> Self {
        self.determinant_threshold = threshold;
        self
    }

    /// Collapse every occupied node at `target_depth`.
    ///
    /// An occupied leaf shallower than `target_depth` means the tree was built too
    /// shallow; it is logged and its vertices stay unmapped.
    pub fn resolve(&self, octree: &Octree, target_depth: u32) -> ClusterResolution {
        let mut out = ClusterResolution {
            vertex_map: vec![None; self.points.len()],
            ..Default::default()
        };
        self.visit(octree.root(), target_depth, &mut out);
        out
    }

    fn visit(&self, node: &OctreeNode, target_depth: u32, out: &mut ClusterResolution) {
        if node.members().is_empty() {
            return;
        }
        if node.depth() == target_depth {
            self.emit_cluster(node, out);
            return;
        }
        match node.children() {
            Some(children) => {
                for child in children.iter() {
                    self.visit(child, target_depth, out);
                }
            }
            None => {
                tracing::error!(
                    "cannot descend below leaf at depth {} (requested depth {target_depth})",
                    node.depth()
                );
                out.skipped_subtrees += 1;
            }
        }
    }

    fn emit_cluster(&self, node: &OctreeNode, out: &mut ClusterResolution) {
        let members = node.members();
        let quadric: ErrorQuadric = members.iter().map(|&i| self.quadrics[i as usize]).sum();

        let position = match quadric.optimal_point(self.determinant_threshold) {
            Some(p) => {
                out.quadric_clusters += 1;
                p.as_vec3()
            }
            None => {
                out.centroid_clusters += 1;
                let sum: Vec3 = members.iter().map(|&i| self.points[i as usize]).sum();
                sum / members.len() as f32
            }
        };

        let id = out.representatives.len() as u32;
        out.representatives.push(position);
        for &m in members {
            out.vertex_map[m as usize] = Some(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_quadrics;
    use meshlod_mesh::Mesh;

    fn square() -> Mesh {
        Mesh::from_flat(
            &[
                0.25, 0.25, 0.5, //
                0.75, 0.25, 0.5, //
                0.75, 0.75, 0.5, //
                0.25, 0.75, 0.5,
            ],
            &[0, 1, 2, 0, 2, 3],
        )
        .unwrap()
    }

    /// Coplanar members make the quadric singular, so the centroid is used exactly.
    #[test]
    fn test_coplanar_cluster_uses_centroid() {
        let mesh = square();
        let quadrics = compute_quadrics(&mesh);
        let tree = Octree::build(mesh.positions(), 0);
        let res = ClusterResolver::new(&quadrics, mesh.positions()).unwrap().resolve(&tree, 0);

        assert_eq!(res.cluster_count(), 1);
        assert_eq!(res.centroid_clusters, 1);
        assert_eq!(res.quadric_clusters, 0);
        let mean = mesh.positions().iter().copied().sum::<Vec3>() / 4.0;
        assert_eq!(res.representatives[0], mean);
        assert_eq!(res.representatives[0], Vec3::new(0.5, 0.5, 0.5));
    }

    /// A cluster around a box corner snaps to the corner through its quadric.
    #[test]
    fn test_corner_cluster_uses_quadric_minimum() {
        // Three faces of a box meeting at (0.3, 0.3, 0.3).
        let c = 0.3;
        let e = 0.1;
        let points = [
            Vec3::splat(c),
            Vec3::new(c - e, c, c),
            Vec3::new(c, c - e, c),
            Vec3::new(c, c, c - e),
        ];
        let flat: Vec<f32> = points.iter().flat_map(|p| p.to_array()).collect();
        let mesh = Mesh::from_flat(&flat, &[0, 1, 2, 0, 2, 3, 0, 3, 1]).unwrap();
        let quadrics = compute_quadrics(&mesh);
        let tree = Octree::build(mesh.positions(), 1);
        let res = ClusterResolver::new(&quadrics, mesh.positions()).unwrap().resolve(&tree, 1);

        assert_eq!(res.cluster_count(), 1);
        assert_eq!(res.quadric_clusters, 1);
        assert!((res.representatives[0] - Vec3::splat(c)).length() < 1e-5);
    }

    /// Ids are sequential in octant order and every member maps to its node's id.
    #[test]
    fn test_ids_follow_traversal_order() {
        let points = vec![
            Vec3::new(0.9, 0.9, 0.9), // octant 7
            Vec3::new(0.1, 0.1, 0.1), // octant 0
            Vec3::new(0.9, 0.1, 0.1), // octant 1
            Vec3::new(0.1, 0.2, 0.1), // octant 0
        ];
        let quadrics = vec![ErrorQuadric::ZERO; points.len()];
        let tree = Octree::build(&points, 1);
        let res = ClusterResolver::new(&quadrics, &points).unwrap().resolve(&tree, 1);

        assert_eq!(res.cluster_count(), 3);
        assert_eq!(res.representative_of(1), Some(0));
        assert_eq!(res.representative_of(3), Some(0));
        assert_eq!(res.representative_of(2), Some(1));
        assert_eq!(res.representative_of(0), Some(2));
        assert_eq!(res.centroid_clusters, 3);
    }

    /// Asking for a depth the tree was not built to skips the subtree without panicking.
    #[test]
    fn test_too_deep_request_is_skipped() {
        let points = vec![Vec3::splat(0.2), Vec3::splat(0.8)];
        let quadrics = vec![ErrorQuadric::ZERO; points.len()];
        let tree = Octree::build(&points, 2);
        let res = ClusterResolver::new(&quadrics, &points).unwrap().resolve(&tree, 4);

        assert_eq!(res.cluster_count(), 0);
        assert_eq!(res.skipped_subtrees, 2);
        assert_eq!(res.vertex_map, vec![None, None]);
    }

    /// Repeated runs start from id 0; nothing leaks between invocations.
    #[test]
    fn test_resolutions_are_independent() {
        let mesh = square();
        let quadrics = compute_quadrics(&mesh);
        let tree = Octree::build(mesh.positions(), 3);
        let resolver = ClusterResolver::new(&quadrics, mesh.positions()).unwrap();
        let first = resolver.resolve(&tree, 2);
        let second = resolver.resolve(&tree, 2);
        assert_eq!(first, second);
        assert_eq!(first.representative_of(0), Some(0));
    }

    /// A zero threshold still rejects an exactly singular system.
    #[test]
    fn test_threshold_is_configurable() {
        let mesh = square();
        let quadrics = compute_quadrics(&mesh);
        let tree = Octree::build(mesh.positions(), 0);
        let res = ClusterResolver::new(&quadrics, mesh.positions())
            .unwrap()
            .with_determinant_threshold(0.0)
            .resolve(&tree, 0);
        assert_eq!(res.centroid_clusters, 1);
    }

    /// Quadrics and points must describe the same vertices.
    #[test]
    fn test_mismatched_lengths_are_rejected() {
        let points = vec![Vec3::splat(0.2), Vec3::splat(0.8)];
        let quadrics = vec![ErrorQuadric::ZERO; 1];
        assert!(matches!(
            ClusterResolver::new(&quadrics, &points),
            Err(SimplifyError::QuadricCountMismatch {
                quadrics: 1,
                points: 2
            })
        ));
    }
}
