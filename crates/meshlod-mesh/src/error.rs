//! Mesh construction and PLY I/O error types.

/// Errors that can occur when building, loading, or saving a mesh.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// Reading or writing the mesh file failed.
    #[error("mesh I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The mesh has no vertices or no triangles.
    #[error("mesh has no vertices or no triangles")]
    EmptyMesh,

    /// The flat position array cannot be split into xyz triples.
    #[error("position array length {0} is not a multiple of 3")]
    PositionLength(usize),

    /// The flat index array cannot be split into triangles.
    #[error("index array length {0} is not a multiple of 3")]
    IndexLength(usize),

    /// A triangle refers to a vertex that does not exist.
    #[error("triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending triangle.
        triangle: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// The PLY header is missing or malformed.
    #[error("invalid PLY header: {0}")]
    InvalidHeader(String),

    /// The PLY file uses an encoding this reader does not handle.
    #[error("unsupported PLY format: {0}")]
    UnsupportedFormat(String),

    /// A body line could not be parsed.
    #[error("PLY parse error on line {line}: {reason}")]
    Parse {
        /// 1-based line number in the file.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// The file ended before every declared record was read.
    #[error("PLY data truncated: expected {expected} {element} records, got {actual}")]
    Truncated {
        /// Element name from the header.
        element: String,
        /// Declared record count.
        expected: usize,
        /// Records actually present.
        actual: usize,
    },
}
