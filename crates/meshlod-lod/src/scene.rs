//! Scene context: grid, visibility, entities, and instance placements.

use std::path::{Path, PathBuf};

use glam::UVec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{EntityId, Grid, LodError, RenderableEntity, TileMap, VisibilityTable};

/// On-disk scene layout, stored as RON.
///
/// Relative paths are resolved against the directory of the scene file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneDescription {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Optional tile map image; instances placed on walls are skipped.
    #[serde(default)]
    pub tilemap: Option<PathBuf>,
    /// Visibility table file. Without one every cell sees every other cell.
    #[serde(default)]
    pub visibility: Option<PathBuf>,
    pub entities: Vec<EntityDescription>,
    pub instances: Vec<InstanceDescription>,
}

/// An entity and the stem its LOD files share.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityDescription {
    pub id: EntityId,
    /// Path without the `_LOD<depth>.ply` suffix.
    pub path: PathBuf,
}

/// One placed copy of an entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InstanceDescription {
    pub entity: EntityId,
    /// `(x, y)` grid cell.
    pub cell: (u32, u32),
}

impl SceneDescription {
    pub fn from_ron(text: &str) -> Result<Self, LodError> {
        Ok(ron::from_str(text)?)
    }
}

/// Everything the selector reads. Immutable once built.
#[derive(Debug)]
pub struct Scene {
    visibility: VisibilityTable,
    entities: FxHashMap<EntityId, RenderableEntity>,
    /// Entities placed in each cell, by cell index.
    instances: Vec<Vec<EntityId>>,
    instance_count: usize,
}

impl Scene {
    /// Empty scene over the visibility table's grid.
    pub fn new(visibility: VisibilityTable) -> Self {
        let cells = visibility.grid().cell_count();
        Self {
            visibility,
            entities: FxHashMap::default(),
            instances: vec![Vec::new(); cells],
            instance_count: 0,
        }
    }

    pub fn add_entity(&mut self, entity: RenderableEntity) -> Result<(), LodError> {
        let id = entity.id();
        if self.entities.contains_key(&id) {
            return Err(LodError::DuplicateEntity(id));
        }
        self.entities.insert(id, entity);
        Ok(())
    }

    /// Place an instance of a registered entity in `cell`.
    pub fn place(&mut self, entity: EntityId, cell: UVec2) -> Result<(), LodError> {
        if !self.entities.contains_key(&entity) {
            return Err(LodError::UnknownEntity(entity));
        }
        let grid = self.grid();
        if !grid.contains_cell(cell) {
            return Err(LodError::CellOutOfRange {
                x: cell.x,
                y: cell.y,
            });
        }
        self.instances[grid.cell_index(cell)].push(entity);
        self.instance_count += 1;
        Ok(())
    }

    /// Build a scene, loading every entity's LOD files for `lod_depths`.
    pub fn from_description(
        desc: &SceneDescription,
        base_dir: &Path,
        lod_depths: &[u32],
    ) -> Result<Self, LodError> {
        let grid = Grid::new(desc.width, desc.height)?;

        let tiles = match &desc.tilemap {
            Some(path) => {
                let tiles = TileMap::load(&base_dir.join(path))?;
                if tiles.grid() != grid {
                    return Err(LodError::GridMismatch {
                        expected: grid.dimensions(),
                        actual: tiles.grid().dimensions(),
                    });
                }
                Some(tiles)
            }
            None => None,
        };

        let visibility = match &desc.visibility {
            Some(path) => VisibilityTable::load(&base_dir.join(path), grid)?,
            None => VisibilityTable::all_visible(grid),
        };

        let mut scene = Self::new(visibility);
        for e in &desc.entities {
            let entity = RenderableEntity::load(e.id, &base_dir.join(&e.path), lod_depths)?;
            scene.add_entity(entity)?;
        }
        for inst in &desc.instances {
            let (x, y) = inst.cell;
            if let Some(tiles) = &tiles
                && tiles.is_wall(x as i64, y as i64)
            {
                warn!("Skipping instance of entity {} placed on wall cell ({x}, {y})", inst.entity);
                continue;
            }
            scene.place(inst.entity, UVec2::new(x, y))?;
        }

        info!(
            "Scene loaded: {}x{} grid, {} entities, {} instances",
            grid.width(),
            grid.height(),
            scene.entities.len(),
            scene.instance_count
        );
        Ok(scene)
    }

    /// Read a RON scene file and build it.
    pub fn load(path: &Path, lod_depths: &[u32]) -> Result<Self, LodError> {
        let text = std::fs::read_to_string(path)?;
        let desc = SceneDescription::from_ron(&text)?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        Self::from_description(&desc, base_dir, lod_depths)
    }

    pub fn grid(&self) -> Grid {
        self.visibility.grid()
    }

    pub fn visibility(&self) -> &VisibilityTable {
        &self.visibility
    }

    pub fn entity(&self, id: EntityId) -> Option<&RenderableEntity> {
        self.entities.get(&id)
    }

    /// Entities placed in the cell with linear index `cell`.
    pub fn instances_in(&self, cell: usize) -> &[EntityId] {
        self.instances.get(cell).map_or(&[][..], Vec::as_slice)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instance_count
    }
}
