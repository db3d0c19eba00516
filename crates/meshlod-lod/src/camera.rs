//! Ground-plane camera used for visibility and distance queries.

use glam::Vec2;

/// Camera position and heading on the grid plane.
///
/// `yaw` is in radians; yaw 0 looks along +x and yaw `PI / 2` along +y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    pub yaw: f32,
}

impl Camera {
    pub fn new(position: Vec2, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Camera at `position` facing `target`. Faces +x if the two coincide.
    pub fn looking_at(position: Vec2, target: Vec2) -> Self {
        let dir = target - position;
        let yaw = if dir.length_squared() > 0.0 {
            dir.y.atan2(dir.x)
        } else {
            0.0
        };
        Self { position, yaw }
    }

    /// Unit forward direction.
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.yaw)
    }
}
