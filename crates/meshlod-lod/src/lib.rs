//! Runtime level-of-detail selection over a grid of precomputed visibility.
//!
//! A [`Scene`] owns the walkable [`Grid`], its [`VisibilityTable`], every
//! [`RenderableEntity`] with its LOD chain, and the cell each instance sits in.
//! Once per frame the [`BudgetedLodSelector`] gathers the instances the camera may
//! see and greedily refines them, cheapest-first, until the triangle budget is
//! spent.

mod camera;
mod entity;
mod error;
mod grid;
mod scene;
mod selector;
mod visibility;

pub use camera::Camera;
pub use entity::{DEFAULT_LOD_DEPTHS, EntityId, EntityLevel, RenderableEntity};
pub use error::LodError;
pub use grid::{Grid, TileMap};
pub use scene::{EntityDescription, InstanceDescription, Scene, SceneDescription};
pub use selector::{
    BudgetedLodSelector, DEFAULT_HALF_FOV_DEGREES, DrawCommand, DrawSink, FrameSelection,
    RenderCandidate,
};
pub use visibility::VisibilityTable;
