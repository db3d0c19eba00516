//! Triangle mesh storage, bounding boxes, and ASCII PLY persistence for meshlod.

mod aabb;
mod error;
mod mesh;
pub mod ply;
pub mod shapes;

pub use aabb::Aabb;
pub use error::MeshError;
pub use mesh::{Mesh, Triangle};
pub use ply::{read_ply, read_ply_file, write_ply, write_ply_file};
