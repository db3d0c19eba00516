//! Offline multi-resolution mesh simplification.
//!
//! A dense mesh is normalized into the unit cube and indexed by an [`Octree`].
//! For every requested depth, the [`ClusterResolver`] collapses all vertices that
//! share an octree node into one representative placed at the minimum of the
//! node's summed [`ErrorQuadric`] (or at the centroid when that system is
//! singular). The [`LodGenerator`] rebuilds faces through the resulting remap,
//! drops collapsed triangles, and emits one [`LodLevel`] per depth.

mod cluster;
mod error;
mod generator;
mod octree;
mod persist;
mod quadric;

pub use cluster::{ClusterResolution, ClusterResolver, DEFAULT_DETERMINANT_THRESHOLD};
pub use error::SimplifyError;
pub use generator::{
    DEFAULT_NORMALIZE_EPSILON, LevelStats, LodGenerator, LodLevel, MAX_OCTREE_DEPTH,
    UnitCubeTransform,
};
pub use octree::{Octree, OctreeNode};
pub use persist::{lod_file_name, write_lod_set};
pub use quadric::{ErrorQuadric, compute_quadrics, triangle_plane};
