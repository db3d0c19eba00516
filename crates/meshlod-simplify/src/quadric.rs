//! Fundamental error quadrics.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use glam::{DMat4, DVec3, DVec4, Vec3};
use meshlod_mesh::Mesh;

/// Cross products shorter than this mark a triangle as degenerate.
const DEGENERATE_CROSS_LENGTH: f64 = 1e-12;

/// Symmetric 4x4 matrix measuring summed squared distance to a set of planes.
///
/// For a plane `p = [n, d]` with unit normal `n`, the quadric is `p p^T`, and
/// `[x, 1]^T Q [x, 1]` is the squared distance from `x` to the plane. Quadrics of
/// several planes add.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorQuadric(DMat4);

impl Default for ErrorQuadric {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ErrorQuadric {
    pub const ZERO: Self = Self(DMat4::ZERO);

    /// Rank-1 quadric `p p^T` of the plane `p = [n.x, n.y, n.z, d]`.
    pub fn from_plane(plane: DVec4) -> Self {
        Self(DMat4::from_cols(
            plane * plane.x,
            plane * plane.y,
            plane * plane.z,
            plane * plane.w,
        ))
    }

    pub fn matrix(&self) -> DMat4 {
        self.0
    }

    /// Squared-distance error of `p`, i.e. `[p, 1]^T Q [p, 1]`.
    pub fn evaluate(&self, p: DVec3) -> f64 {
        let v = p.extend(1.0);
        v.dot(self.0 * v)
    }

    /// Position minimizing the error, or `None` if the system is ill-conditioned.
    ///
    /// The bottom row is replaced with `[0, 0, 0, 1]` and `Q' x = [0, 0, 0, 1]^T` is
    /// solved when `|det(Q')| > determinant_threshold`.
    pub fn optimal_point(&self, determinant_threshold: f64) -> Option<DVec3> {
        let mut q = self.0;
        q.x_axis.w = 0.0;
        q.y_axis.w = 0.0;
        q.z_axis.w = 0.0;
        q.w_axis.w = 1.0;
        if q.determinant().abs() <= determinant_threshold {
            return None;
        }
        let solution = q.inverse() * DVec4::W;
        solution.is_finite().then(|| solution.truncate())
    }
}

impl Add for ErrorQuadric {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for ErrorQuadric {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for ErrorQuadric {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Plane `[n, d]` of a triangle, or `None` if the triangle has no area.
///
/// The normal comes from the edges leaving `a`, and the offset always uses `a`.
pub fn triangle_plane(a: Vec3, b: Vec3, c: Vec3) -> Option<DVec4> {
    let (a, b, c) = (a.as_dvec3(), b.as_dvec3(), c.as_dvec3());
    let cross = (b - a).cross(c - a);
    let length = cross.length();
    if !(length > DEGENERATE_CROSS_LENGTH) {
        return None;
    }
    let n = cross / length;
    Some(n.extend(-n.dot(a)))
}

/// Accumulate one quadric per vertex from every incident non-degenerate triangle.
pub fn compute_quadrics(mesh: &Mesh) -> Vec<ErrorQuadric> {
    let mut quadrics = vec![ErrorQuadric::ZERO; mesh.vertex_count()];
    let mut degenerate = 0usize;
    for tri in mesh.triangles() {
        let [a, b, c] = mesh.triangle_positions(tri);
        let Some(plane) = triangle_plane(a, b, c) else {
            degenerate += 1;
            continue;
        };
        let k = ErrorQuadric::from_plane(plane);
        for &v in tri {
            quadrics[v as usize] += k;
        }
    }
    if degenerate > 0 {
        tracing::debug!("{degenerate} degenerate triangles contributed no quadric");
    }
    quadrics
}
