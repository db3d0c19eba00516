//! Multi-resolution LOD generation.

use glam::Vec3;
use meshlod_mesh::{Aabb, Mesh, MeshError, Triangle};
use tracing::info;

use crate::{
    ClusterResolution, ClusterResolver, DEFAULT_DETERMINANT_THRESHOLD, Octree, SimplifyError,
    compute_quadrics,
};

/// Deepest octree the generator will build. Beyond this, cells approach f32
/// resolution in the unit cube.
pub const MAX_OCTREE_DEPTH: u32 = 20;

/// Expansion applied to the normalization scale so the bounding-box max lands
/// strictly inside the unit cube.
pub const DEFAULT_NORMALIZE_EPSILON: f32 = 1e-4;

/// Affine map between mesh space and the unit cube used by the octree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitCubeTransform {
    origin: Vec3,
    scale: Vec3,
}

impl UnitCubeTransform {
    /// `p' = (p - min) / (extent * (1 + epsilon))` per axis. Flat axes use a
    /// scale of 1 so they map to 0.
    pub fn from_bounds(bounds: Aabb, epsilon: f32) -> Self {
        let extent = bounds.size();
        let scale = Vec3::select(extent.cmpgt(Vec3::ZERO), extent * (1.0 + epsilon), Vec3::ONE);
        Self {
            origin: bounds.min,
            scale,
        }
    }

    pub fn to_unit(&self, p: Vec3) -> Vec3 {
        (p - self.origin) / self.scale
    }

    pub fn from_unit(&self, p: Vec3) -> Vec3 {
        p * self.scale + self.origin
    }
}

/// Counters describing how one level was produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelStats {
    pub quadric_clusters: usize,
    pub centroid_clusters: usize,
    pub skipped_subtrees: usize,
    /// Source triangles that collapsed and were dropped.
    pub dropped_triangles: usize,
}

/// One simplified mesh, tagged with the octree depth it was clustered at.
#[derive(Clone, Debug, PartialEq)]
pub struct LodLevel {
    pub depth: u32,
    pub mesh: Mesh,
    pub stats: LevelStats,
}

impl LodLevel {
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }
}

/// Builds one octree per mesh and clusters it at each requested depth.
#[derive(Clone, Debug)]
pub struct LodGenerator {
    max_depth: u32,
    normalize_epsilon: f32,
    determinant_threshold: f64,
}

impl LodGenerator {
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            normalize_epsilon: DEFAULT_NORMALIZE_EPSILON,
            determinant_threshold: DEFAULT_DETERMINANT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_normalize_epsilon(mut self, epsilon: f32) -> Self {
        self.normalize_epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn with_determinant_threshold(mut self, threshold: f64) -> Self {
        self.determinant_threshold = threshold;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Generate one level per entry of `target_depths`, in the given order.
    ///
    /// Depths deeper than the octree are reported by the resolver and produce
    /// levels missing the affected vertices rather than failing the run.
    pub fn generate(&self, mesh: &Mesh, target_depths: &[u32]) -> Result<Vec<LodLevel>, SimplifyError> {
        if mesh.is_empty() {
            return Err(MeshError::EmptyMesh.into());
        }
        if target_depths.is_empty() {
            return Err(SimplifyError::NoTargetDepths);
        }
        if self.max_depth > MAX_OCTREE_DEPTH {
            return Err(SimplifyError::DepthTooLarge(self.max_depth));
        }

        let transform = UnitCubeTransform::from_bounds(mesh.bounds(), self.normalize_epsilon);
        let unit_points: Vec<Vec3> = mesh.positions().iter().map(|&p| transform.to_unit(p)).collect();
        let unit_mesh = Mesh::new(unit_points, mesh.triangles().to_vec())?;

        let quadrics = compute_quadrics(&unit_mesh);
        let octree = Octree::build(unit_mesh.positions(), self.max_depth);
        let resolver = ClusterResolver::new(&quadrics, unit_mesh.positions())?
            .with_determinant_threshold(self.determinant_threshold);

        target_depths
            .iter()
            .map(|&depth| {
                let resolution = resolver.resolve(&octree, depth);
                let level = build_level(mesh, depth, resolution, &transform)?;
                info!(
                    "LOD depth {depth}: {} vertices, {} triangles ({} quadric, {} centroid clusters)",
                    level.mesh.vertex_count(),
                    level.mesh.triangle_count(),
                    level.stats.quadric_clusters,
                    level.stats.centroid_clusters,
                );
                Ok(level)
            })
            .collect()
    }
}

fn build_level(
    source: &Mesh,
    depth: u32,
    resolution: ClusterResolution,
    transform: &UnitCubeTransform,
) -> Result<LodLevel, SimplifyError> {
    let (triangles, dropped_triangles) = remap_triangles(source.triangles(), &resolution);
    let positions = resolution
        .representatives
        .iter()
        .map(|&p| transform.from_unit(p))
        .collect();
    Ok(LodLevel {
        depth,
        mesh: Mesh::new(positions, triangles)?,
        stats: LevelStats {
            quadric_clusters: resolution.quadric_clusters,
            centroid_clusters: resolution.centroid_clusters,
            skipped_subtrees: resolution.skipped_subtrees,
            dropped_triangles,
        },
    })
}

/// Rewrite triangles through the cluster map, dropping any whose corners
/// collapse together or were left unmapped. Returns the kept triangles and the
/// number dropped.
fn remap_triangles(triangles: &[Triangle], resolution: &ClusterResolution) -> (Vec<Triangle>, usize) {
    let mut kept = Vec::with_capacity(triangles.len());
    for tri in triangles {
        match tri.map(|v| resolution.representative_of(v)) {
            [Some(a), Some(b), Some(c)] if a != b && b != c && a != c => kept.push([a, b, c]),
            _ => {}
        }
    }
    let dropped = triangles.len() - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshlod_mesh::shapes::{grid_plane, uv_sphere};

    /// Normalization maps the bounds strictly inside the unit cube and inverts.
    #[test]
    fn test_unit_cube_transform_roundtrip() {
        let bounds = Aabb::new(Vec3::new(-2.0, 1.0, 10.0), Vec3::new(6.0, 3.0, 14.0));
        let t = UnitCubeTransform::from_bounds(bounds, 1e-3);
        assert_eq!(t.to_unit(bounds.min), Vec3::ZERO);
        let top = t.to_unit(bounds.max);
        assert!(top.cmplt(Vec3::ONE).all());
        assert!(top.cmpgt(Vec3::splat(0.99)).all());
        let p = Vec3::new(1.0, 2.0, 12.5);
        assert!((t.from_unit(t.to_unit(p)) - p).length() < 1e-5);
    }

    /// A flat axis maps to 0 instead of dividing by zero.
    #[test]
    fn test_flat_axis_is_finite() {
        let t = UnitCubeTransform::from_bounds(Aabb::new(Vec3::ZERO, Vec3::new(4.0, 0.0, 4.0)), 1e-4);
        let p = t.to_unit(Vec3::new(2.0, 0.0, 2.0));
        assert!(p.is_finite());
        assert_eq!(p.y, 0.0);
    }

    /// Kept face count equals input count minus collapsed faces.
    #[test]
    fn test_collapsed_faces_are_removed() {
        let mesh = uv_sphere(1.0, 12, 16);
        let levels = LodGenerator::new(4).generate(&mesh, &[2]).unwrap();
        let level = &levels[0];

        assert!(level.stats.dropped_triangles > 0);
        assert_eq!(
            level.mesh.triangle_count(),
            mesh.triangle_count() - level.stats.dropped_triangles
        );
        for [a, b, c] in level.mesh.triangles() {
            assert!(a != b && b != c && a != c);
        }
    }

    /// The remap drops exactly the triangles with a repeated or missing id.
    #[test]
    fn test_remap_counts_collisions() {
        let resolution = ClusterResolution {
            representatives: vec![Vec3::ZERO; 3],
            vertex_map: vec![Some(0), Some(1), Some(1), Some(2), None],
            ..Default::default()
        };
        let triangles = [[0, 1, 3], [0, 1, 2], [1, 2, 3], [0, 3, 4], [2, 0, 3]];
        let (kept, dropped) = remap_triangles(&triangles, &resolution);
        assert_eq!(kept, vec![[0, 1, 2], [1, 0, 2]]);
        assert_eq!(dropped, 3);
    }

    /// Coarser depths never keep more triangles than finer ones.
    #[test]
    fn test_triangle_count_grows_with_depth() {
        let mesh = uv_sphere(3.0, 24, 32);
        let depths = [1, 2, 3, 4, 5, 6];
        let levels = LodGenerator::new(6).generate(&mesh, &depths).unwrap();
        let counts: Vec<usize> = levels.iter().map(LodLevel::triangle_count).collect();
        for pair in counts.windows(2) {
            assert!(pair[0] <= pair[1], "counts not monotonic: {counts:?}");
        }
        assert!(counts[0] < mesh.triangle_count());
    }

    /// Output keeps the request order and tags each level with its depth.
    #[test]
    fn test_levels_follow_request_order() {
        let mesh = uv_sphere(1.0, 8, 8);
        let levels = LodGenerator::new(5).generate(&mesh, &[5, 2, 3]).unwrap();
        let depths: Vec<u32> = levels.iter().map(|l| l.depth).collect();
        assert_eq!(depths, vec![5, 2, 3]);
    }

    /// Representatives are mapped back into the source bounding box region.
    #[test]
    fn test_output_in_original_space() {
        let mesh = grid_plane(10.0, 16);
        let levels = LodGenerator::new(4).generate(&mesh, &[3]).unwrap();
        let bounds = levels[0].mesh.bounds();
        assert!(bounds.min.cmpge(Vec3::splat(-1e-3)).all());
        assert!(bounds.max.cmple(Vec3::new(10.001, 1e-3, 10.001)).all());
        assert!(bounds.max.x > 5.0);
    }

    /// A flat grid has singular cluster quadrics everywhere, so every cluster is a centroid.
    #[test]
    fn test_flat_mesh_uses_centroids() {
        let mesh = grid_plane(1.0, 8);
        let levels = LodGenerator::new(3).generate(&mesh, &[2]).unwrap();
        assert_eq!(levels[0].stats.quadric_clusters, 0);
        assert!(levels[0].stats.centroid_clusters > 0);
    }

    /// Requesting a depth beyond the octree leaves the level empty instead of failing.
    #[test]
    fn test_depth_beyond_octree_is_not_fatal() {
        let mesh = uv_sphere(1.0, 6, 6);
        let levels = LodGenerator::new(2).generate(&mesh, &[4]).unwrap();
        assert!(levels[0].stats.skipped_subtrees > 0);
        assert_eq!(levels[0].mesh.triangle_count(), 0);
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let err = LodGenerator::new(4).generate(&Mesh::default(), &[2]).unwrap_err();
        assert!(matches!(err, SimplifyError::Mesh(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_no_depths_is_rejected() {
        let err = LodGenerator::new(4)
            .generate(&uv_sphere(1.0, 4, 4), &[])
            .unwrap_err();
        assert!(matches!(err, SimplifyError::NoTargetDepths));
    }

    #[test]
    fn test_excessive_depth_is_rejected() {
        let err = LodGenerator::new(MAX_OCTREE_DEPTH + 1)
            .generate(&uv_sphere(1.0, 4, 4), &[1])
            .unwrap_err();
        assert!(matches!(err, SimplifyError::DepthTooLarge(21)));
    }
}
