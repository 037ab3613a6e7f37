#![warn(missing_docs)]

//! Math types for wallprobe.
//!
//! Thin wrappers around nalgebra providing the point, vector and
//! direction types shared by the facet hierarchy, the ray caster and
//! the thickness probe, plus the placement transform applied to input
//! triangulations and the two geometric thresholds the algorithms rely on.

use nalgebra::{Matrix4, Unit, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Squared-length threshold below which an edge vector or a triangle's
/// unnormalized normal is treated as zero.
pub const DEGENERACY_SQ_TOL: f64 = 1e-8;

/// Probing directions with `|d · n| <= TANGENCY_TOL` against the inward
/// normal are rejected as near-tangential.
pub const TANGENCY_TOL: f64 = 1e-3;

/// Placement of a triangulation in world space (4x4 affine matrix).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about an axis through the origin by `angle` radians.
    pub fn rotation(axis: &Dir3, angle: f64) -> Self {
        let rot = nalgebra::Rotation3::from_axis_angle(axis, angle);
        Self {
            matrix: rot.to_homogeneous(),
        }
    }

    /// Compose: the result applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Arithmetic mean of three points.
#[inline]
pub fn triangle_centroid(p0: &Point3, p1: &Point3, p2: &Point3) -> Point3 {
    Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
}

/// Unit normal of the triangle `(p0, p1, p2)` following its winding.
///
/// Returns `None` when either edge `p1 - p0`, `p2 - p0` or their cross
/// product has a squared length below [`DEGENERACY_SQ_TOL`].
pub fn triangle_normal(p0: &Point3, p1: &Point3, p2: &Point3) -> Option<Dir3> {
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    if e1.norm_squared() < DEGENERACY_SQ_TOL || e2.norm_squared() < DEGENERACY_SQ_TOL {
        return None;
    }
    let n = e1.cross(&e2);
    if n.norm_squared() < DEGENERACY_SQ_TOL {
        return None;
    }
    Some(Dir3::new_normalize(n))
}

/// Coordinate of `p` on `axis` (0 = x, 1 = y, anything else = z).
#[inline]
pub fn axis_coord(p: &Point3, axis: usize) -> f64 {
    match axis {
        0 => p.x,
        1 => p.y,
        _ => p.z,
    }
}
