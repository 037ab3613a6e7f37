//! Ray/triangle intersection.

use wallprobe_math::Point3;

use crate::ray::Ray;

/// Parameters of a ray/triangle hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Ray parameter, always strictly positive.
    pub t: f64,
    /// Barycentric weight of the second vertex.
    pub u: f64,
    /// Barycentric weight of the third vertex.
    pub v: f64,
}

/// Watertight test of `ray` against triangle `tri`.
///
/// The triangle is moved into a ray-aligned frame (the ray becomes the
/// +z axis through the origin) and the hit is decided by the signs of the
/// three 2D edge functions. A shared edge produces exactly negated edge
/// functions in its two triangles, so a ray crossing the edge cannot slip
/// between them. Both windings are hit. Edges and vertices count as inside.
/// Rays exactly parallel to the triangle's plane (zero determinant) and
/// hits at `t <= 0` are rejected.
pub fn intersect_triangle(ray: &Ray, tri: &[Point3; 3]) -> Option<TriangleHit> {
    let d = ray.direction.as_ref();

    // Dominant axis of the direction becomes z; x and y follow cyclically.
    let kz = d.iamax();
    let (mut kx, mut ky) = ((kz + 1) % 3, (kz + 2) % 3);
    if d[kz] < 0.0 {
        std::mem::swap(&mut kx, &mut ky);
    }

    let sx = d[kx] / d[kz];
    let sy = d[ky] / d[kz];
    let sz = 1.0 / d[kz];

    let a = tri[0] - ray.origin;
    let b = tri[1] - ray.origin;
    let c = tri[2] - ray.origin;

    let (ax, ay) = (a[kx] - sx * a[kz], a[ky] - sy * a[kz]);
    let (bx, by) = (b[kx] - sx * b[kz], b[ky] - sy * b[kz]);
    let (cx, cy) = (c[kx] - sx * c[kz], c[ky] - sy * c[kz]);

    let e0 = cx * by - cy * bx;
    let e1 = ax * cy - ay * cx;
    let e2 = bx * ay - by * ax;

    let negative = e0 < 0.0 || e1 < 0.0 || e2 < 0.0;
    let positive = e0 > 0.0 || e1 > 0.0 || e2 > 0.0;
    if negative && positive {
        return None;
    }

    let det = e0 + e1 + e2;
    if det == 0.0 {
        return None;
    }

    let scaled_t = (e0 * a[kz] + e1 * b[kz] + e2 * c[kz]) * sz;
    let t = scaled_t / det;
    if !(t > 0.0) {
        return None;
    }

    Some(TriangleHit {
        t,
        u: e1 / det,
        v: e2 / det,
    })
}
