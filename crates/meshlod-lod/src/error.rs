//! Error types for scene loading and LOD selection.

use meshlod_mesh::MeshError;

use crate::EntityId;

/// Errors raised while assembling a scene. Selection itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum LodError {
    /// Filesystem error while reading a scene, visibility table, or mesh.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the visibility table is malformed.
    #[error("visibility table line {line}: {reason}")]
    Visibility {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// Two grid-shaped inputs disagree on dimensions.
    #[error("grid size mismatch: expected {expected:?}, got {actual:?}")]
    GridMismatch {
        /// `(width, height)` of the scene grid.
        expected: (u32, u32),
        /// `(width, height)` of the offending input.
        actual: (u32, u32),
    },

    /// A grid must have at least one cell.
    #[error("grid has no cells")]
    EmptyGrid,

    /// A cell coordinate lies outside the grid.
    #[error("cell ({x}, {y}) is outside the grid")]
    CellOutOfRange {
        /// Cell column.
        x: u32,
        /// Cell row.
        y: u32,
    },

    /// Tile data is shorter than `width * height * components`.
    #[error("tile map needs {expected} bytes, got {actual}")]
    TileMapData {
        /// Required byte count.
        expected: usize,
        /// Provided byte count.
        actual: usize,
    },

    /// An instance references an entity the scene does not know.
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// An entity was registered twice.
    #[error("entity {0} is already registered")]
    DuplicateEntity(EntityId),

    /// No LOD level could be loaded for an entity.
    #[error("entity {0} has no LOD levels")]
    EmptyEntity(EntityId),

    /// A mesh could not be parsed.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// The scene description is not valid RON.
    #[error("scene parse error: {0}")]
    Scene(#[from] ron::error::SpannedError),

    /// The tile map image could not be decoded.
    #[error("tile map image error: {0}")]
    Image(#[from] image::ImageError),
}
