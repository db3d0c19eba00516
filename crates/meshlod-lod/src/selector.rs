//! Per-frame LOD selection under a global triangle budget.
//!
//! Selection runs in four steps:
//!
//! 1. Clamp the camera onto the grid and find its cell.
//! 2. Gather every instance in a cell visible from the camera cell that passes a
//!    conservative field-of-view test. Each candidate starts at LOD 0.
//! 3. Repeatedly sort candidates by `2^depth * distance` and commit the first
//!    upgrade that keeps the running triangle total within budget, until a full
//!    scan commits nothing.
//! 4. Emit every candidate. The budget limits upgrades, never inclusion.

use glam::{UVec2, Vec2};
use tracing::debug;

use crate::{Camera, EntityId, Grid, Scene};

/// Half-angle of the field-of-view test.
pub const DEFAULT_HALF_FOV_DEGREES: f32 = 60.0;

/// An instance considered for drawing this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderCandidate {
    pub entity: EntityId,
    /// Ground-plane distance from the camera to the cell center.
    pub distance: f32,
    pub cell: UVec2,
    /// Current LOD index, 0 being the coarsest.
    pub lod: usize,
}

/// What the renderer receives for one instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCommand {
    pub entity: EntityId,
    pub lod: usize,
    pub cell: UVec2,
}

/// Receives the frame's draw list.
pub trait DrawSink {
    fn draw(&mut self, command: DrawCommand);
}

impl DrawSink for Vec<DrawCommand> {
    fn draw(&mut self, command: DrawCommand) {
        self.push(command);
    }
}

/// Result of one selection pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameSelection {
    /// Final candidates in gather order.
    pub candidates: Vec<RenderCandidate>,
    /// Triangles drawn at the chosen LODs.
    pub total_triangles: u64,
    /// Committed single-step upgrades.
    pub upgrades: usize,
    /// Refinement scans performed, including the final one that committed nothing.
    pub scans: usize,
}

impl FrameSelection {
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Hand every candidate to `sink`.
    pub fn emit<S: DrawSink + ?Sized>(&self, sink: &mut S) {
        for c in &self.candidates {
            sink.draw(DrawCommand {
                entity: c.entity,
                lod: c.lod,
                cell: c.cell,
            });
        }
    }

    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        let mut out = Vec::with_capacity(self.candidates.len());
        self.emit(&mut out);
        out
    }
}

/// Greedy budgeted LOD selector.
#[derive(Clone, Debug)]
pub struct BudgetedLodSelector {
    triangle_budget: u64,
    cos_half_fov: f32,
}

impl BudgetedLodSelector {
    pub fn new(triangle_budget: u64) -> Self {
        Self::with_half_fov(triangle_budget, DEFAULT_HALF_FOV_DEGREES)
    }

    pub fn with_half_fov(triangle_budget: u64, half_fov_degrees: f32) -> Self {
        Self {
            triangle_budget,
            cos_half_fov: half_fov_degrees.to_radians().cos(),
        }
    }

    pub fn triangle_budget(&self) -> u64 {
        self.triangle_budget
    }

    /// Run one selection pass.
    pub fn select(&self, scene: &Scene, camera: &Camera) -> FrameSelection {
        let mut candidates = self.gather(scene, camera);
        let mut total: u64 = candidates
            .iter()
            .filter_map(|c| scene.entity(c.entity))
            .map(|e| e.triangle_count(0))
            .sum();

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        let mut upgrades = 0;
        let mut scans = 0;

        if !candidates.is_empty() {
            loop {
                scans += 1;
                order.sort_by(|&a, &b| {
                    priority(scene, &candidates[a])
                        .total_cmp(&priority(scene, &candidates[b]))
                        .then(a.cmp(&b))
                });

                let mut committed = false;
                for &i in &order {
                    let c = &mut candidates[i];
                    let Some(entity) = scene.entity(c.entity) else {
                        continue;
                    };
                    if c.lod >= entity.finest_lod() {
                        continue;
                    }
                    let next = total - entity.triangle_count(c.lod) + entity.triangle_count(c.lod + 1);
                    if next <= self.triangle_budget {
                        c.lod += 1;
                        total = next;
                        upgrades += 1;
                        committed = true;
                        break;
                    }
                }
                if !committed {
                    break;
                }
            }
        }

        debug!(
            "LOD selection: {} candidates, {upgrades} upgrades in {scans} scans, {total}/{} triangles",
            candidates.len(),
            self.triangle_budget
        );

        FrameSelection {
            candidates,
            total_triangles: total,
            upgrades,
            scans,
        }
    }

    /// Visible instances that pass the field-of-view test, at LOD 0.
    ///
    /// Instances in the camera's own cell skip the corner test and are always kept.
    fn gather(&self, scene: &Scene, camera: &Camera) -> Vec<RenderCandidate> {
        let grid = scene.grid();
        let position = grid.clamp_position(camera.position);
        let camera_cell = grid.cell_of(position);
        let forward = camera.forward();

        let mut out = Vec::new();
        for &visible in scene.visibility().visible_from(grid.cell_index(camera_cell)) {
            let instances = scene.instances_in(visible as usize);
            if instances.is_empty() {
                continue;
            }
            let cell = grid.cell_at(visible as usize);
            if cell != camera_cell && !self.in_view(&grid, cell, position, forward) {
                continue;
            }
            let distance = position.distance(grid.cell_center(cell));
            for &entity in instances {
                if scene.entity(entity).is_none() {
                    continue;
                }
                out.push(RenderCandidate {
                    entity,
                    distance,
                    cell,
                    lod: 0,
                });
            }
        }
        out
    }

    /// True if any corner of `cell` lies within the half-angle of `forward`.
    fn in_view(&self, grid: &Grid, cell: UVec2, position: Vec2, forward: Vec2) -> bool {
        grid.cell_corners(cell).iter().any(|&corner| {
            let to_corner = corner - position;
            match to_corner.try_normalize() {
                Some(dir) => dir.dot(forward) >= self.cos_half_fov,
                None => true,
            }
        })
    }
}

/// Refinement order key; smaller refines first.
fn priority(scene: &Scene, c: &RenderCandidate) -> f64 {
    let depth = scene.entity(c.entity).map_or(0, |e| e.depth(c.lod));
    2f64.powi(depth as i32) * c.distance as f64
}
