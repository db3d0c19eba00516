//! Simplification error types.

use std::path::PathBuf;

use meshlod_mesh::MeshError;

use crate::MAX_OCTREE_DEPTH;

/// Errors that abort LOD generation. Nothing is written when one is returned.
#[derive(Debug, thiserror::Error)]
pub enum SimplifyError {
    /// The input mesh is invalid, or a level could not be built or persisted.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// No target depth was requested.
    #[error("no target depths requested")]
    NoTargetDepths,

    /// The octree depth exceeds what f32 coordinates can subdivide.
    #[error("octree depth {0} exceeds the maximum of {max}", max = MAX_OCTREE_DEPTH)]
    DepthTooLarge(u32),

    /// Quadric and point slices handed to the cluster resolver disagree in length.
    #[error("{quadrics} quadrics supplied for {points} points")]
    QuadricCountMismatch {
        /// Number of quadrics.
        quadrics: usize,
        /// Number of points.
        points: usize,
    },

    /// The output directory could not be created.
    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
