//! Renderable entities and their LOD chains.

use std::fmt;
use std::path::{Path, PathBuf};

use meshlod_mesh::{Mesh, read_ply_file};
use meshlod_simplify::{LodLevel, lod_file_name};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::LodError;

/// Octree depths loaded for every entity unless configured otherwise.
pub const DEFAULT_LOD_DEPTHS: [u32; 4] = [6, 7, 9, 10];

/// Identifier of an entity within a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One level of an entity's LOD chain.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityLevel {
    /// Octree depth the mesh was generated at.
    pub depth: u32,
    pub mesh: Mesh,
}

/// An entity with its LOD chain ordered coarsest first.
///
/// LOD index 0 is the shallowest depth. Triangle counts are expected to grow
/// along the chain but this is not checked.
#[derive(Clone, Debug)]
pub struct RenderableEntity {
    id: EntityId,
    levels: Vec<EntityLevel>,
}

impl RenderableEntity {
    /// Build from levels in any order. Fails if `levels` is empty.
    pub fn new(id: EntityId, mut levels: Vec<EntityLevel>) -> Result<Self, LodError> {
        if levels.is_empty() {
            return Err(LodError::EmptyEntity(id));
        }
        levels.sort_by_key(|l| l.depth);
        Ok(Self { id, levels })
    }

    /// Wrap freshly generated levels.
    pub fn from_lod_levels(id: EntityId, levels: Vec<LodLevel>) -> Result<Self, LodError> {
        let levels = levels
            .into_iter()
            .map(|l| EntityLevel {
                depth: l.depth,
                mesh: l.mesh,
            })
            .collect();
        Self::new(id, levels)
    }

    /// Load `<path_stem>_LOD<depth>.ply` for each depth, skipping files that are
    /// missing or unreadable.
    pub fn load(id: EntityId, path_stem: &Path, depths: &[u32]) -> Result<Self, LodError> {
        let mut levels = Vec::with_capacity(depths.len());
        for &depth in depths {
            let path = lod_path(path_stem, depth);
            match read_ply_file(&path) {
                Ok(mesh) => levels.push(EntityLevel { depth, mesh }),
                Err(e) => warn!("Skipping LOD {depth} of entity {id}: {}: {e}", path.display()),
            }
        }
        Self::new(id, levels)
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn lod_count(&self) -> usize {
        self.levels.len()
    }

    /// Index of the finest level.
    pub fn finest_lod(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn level(&self, lod: usize) -> Option<&EntityLevel> {
        self.levels.get(lod)
    }

    pub fn levels(&self) -> &[EntityLevel] {
        &self.levels
    }

    /// Octree depth of `lod`, clamped to the finest level.
    pub fn depth(&self, lod: usize) -> u32 {
        self.levels[lod.min(self.finest_lod())].depth
    }

    /// Triangle count of `lod`, clamped to the finest level.
    pub fn triangle_count(&self, lod: usize) -> u64 {
        self.levels[lod.min(self.finest_lod())].mesh.triangle_count() as u64
    }
}

fn lod_path(path_stem: &Path, depth: u32) -> PathBuf {
    let stem = path_stem.file_name().map(|s| s.to_string_lossy()).unwrap_or_default();
    path_stem.with_file_name(lod_file_name(&stem, depth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshlod_mesh::{shapes::uv_sphere, write_ply_file};

    fn level(depth: u32, rings: u32) -> EntityLevel {
        EntityLevel {
            depth,
            mesh: uv_sphere(1.0, rings, rings),
        }
    }

    #[test]
    fn test_levels_sorted_coarsest_first() {
        let entity =
            RenderableEntity::new(EntityId(1), vec![level(9, 8), level(6, 3), level(7, 4)]).unwrap();
        let depths: Vec<u32> = entity.levels().iter().map(|l| l.depth).collect();
        assert_eq!(depths, vec![6, 7, 9]);
        assert_eq!(entity.finest_lod(), 2);
        assert_eq!(entity.depth(0), 6);
        assert_eq!(entity.triangle_count(0), 2 * 3 * 2);
        assert_eq!(entity.triangle_count(5), entity.triangle_count(2));
    }

    #[test]
    fn test_empty_entity_is_rejected() {
        let err = RenderableEntity::new(EntityId(4), Vec::new()).unwrap_err();
        assert!(matches!(err, LodError::EmptyEntity(EntityId(4))));
    }

    #[test]
    fn test_lod_path_appends_suffix() {
        assert_eq!(
            lod_path(Path::new("models/moai"), 7),
            PathBuf::from("models/moai_LOD7.ply")
        );
    }

    /// Missing files are skipped; the remaining levels still load.
    #[test]
    fn test_load_skips_missing_levels() {
        let tmp = tempfile::tempdir().unwrap();
        let stem = tmp.path().join("rock");
        write_ply_file(&uv_sphere(1.0, 4, 4), &lod_path(&stem, 6)).unwrap();
        write_ply_file(&uv_sphere(1.0, 8, 8), &lod_path(&stem, 10)).unwrap();

        let entity = RenderableEntity::load(EntityId(0), &stem, &DEFAULT_LOD_DEPTHS).unwrap();
        assert_eq!(entity.lod_count(), 2);
        assert_eq!(entity.depth(0), 6);
        assert_eq!(entity.depth(1), 10);
        assert!(entity.triangle_count(0) < entity.triangle_count(1));
    }

    #[test]
    fn test_load_with_no_files_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = RenderableEntity::load(EntityId(2), &tmp.path().join("ghost"), &[6, 7]).unwrap_err();
        assert!(matches!(err, LodError::EmptyEntity(EntityId(2))));
    }
}
