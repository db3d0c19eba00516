//! Writing generated levels to disk.

use std::path::{Path, PathBuf};

use meshlod_mesh::write_ply_file;

use crate::{LodLevel, SimplifyError};

/// File name of one level: `<stem>_LOD<depth>.ply`.
pub fn lod_file_name(stem: &str, depth: u32) -> String {
    format!("{stem}_LOD{depth}.ply")
}

/// Write every level into `dir` as `<stem>_LOD<depth>.ply`, creating `dir` if
/// needed. Existing files are overwritten. Returns the written paths in level
/// order.
pub fn write_lod_set(dir: &Path, stem: &str, levels: &[LodLevel]) -> Result<Vec<PathBuf>, SimplifyError> {
    std::fs::create_dir_all(dir).map_err(|source| SimplifyError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(levels.len());
    for level in levels {
        let path = dir.join(lod_file_name(stem, level.depth));
        write_ply_file(&level.mesh, &path)?;
        tracing::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
