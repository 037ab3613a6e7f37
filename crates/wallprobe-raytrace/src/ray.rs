//! Ray representation and box rejection.

use wallprobe_bvh::Aabb3;
use wallprobe_math::{Dir3, Point3, Vec3};

/// A ray in 3D space defined by origin and direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Unit direction of the ray.
    pub direction: Dir3,
    /// Reciprocal of the direction components.
    inv_direction: Vec3,
    /// Sign of direction components (0 if positive, 1 if negative).
    sign: [usize; 3],
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// The direction will be normalized; it must not be zero.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self::from_dir(origin, Dir3::new_normalize(direction))
    }

    /// Create a ray from an already normalized direction.
    pub fn from_dir(origin: Point3, direction: Dir3) -> Self {
        let inv = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        let sign = [
            usize::from(inv.x < 0.0),
            usize::from(inv.y < 0.0),
            usize::from(inv.z < 0.0),
        ];
        Self {
            origin,
            direction,
            inv_direction: inv,
            sign,
        }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Parameter interval over which the ray is inside `aabb`.
    ///
    /// Returns `Some((enter, exit))` with `enter` clamped to zero, or `None`
    /// if the box lies entirely behind the origin or off the ray. The
    /// interval is widened by the rounding bound of the slab arithmetic, so
    /// a hit on the box boundary is never rejected. Slabs the ray runs
    /// exactly inside of (zero direction component, origin on a face)
    /// produce NaN and leave the interval unchanged.
    #[inline]
    pub fn intersect_aabb(&self, aabb: &Aabb3) -> Option<(f64, f64)> {
        let corners = [&aabb.min, &aabb.max];
        let mut enter = f64::NEG_INFINITY;
        let mut exit = f64::INFINITY;

        for axis in 0..3 {
            let near = corners[self.sign[axis]][axis];
            let far = corners[1 - self.sign[axis]][axis];
            let o = self.origin[axis];
            let inv = self.inv_direction[axis];
            enter = enter.max((near - o) * inv);
            exit = exit.min((far - o) * inv);
        }

        let exit = exit * (1.0 + 2.0 * GAMMA_3);
        let enter = (enter * (1.0 - 2.0 * GAMMA_3)).max(0.0);
        (exit >= enter).then_some((enter, exit))
    }
}

/// Relative error bound of three chained rounded operations, `3u / (1 - 3u)`
/// with `u` the unit roundoff.
const GAMMA_3: f64 = 3.0 * (f64::EPSILON * 0.5) / (1.0 - 3.0 * (f64::EPSILON * 0.5));

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb3 {
        Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let p = ray.at(5.0);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn test_ray_aabb_hit() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit_box()).unwrap();
        assert!((t_min - 5.0).abs() < 1e-10);
        assert!((t_max - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_ray_aabb_miss() {
        let ray = Ray::new(Point3::new(-5.0, 5.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn test_ray_inside_aabb() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_aabb(&unit_box()).unwrap();
        assert_eq!(t_min, 0.0);
        assert!((t_max - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_ray_aabb_behind() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        assert!(ray.intersect_aabb(&unit_box()).is_none());
        let back = Ray::from_dir(ray.origin, -ray.direction);
        assert!(back.intersect_aabb(&unit_box()).is_some());
    }

    #[test]
    fn test_ray_hits_flat_box() {
        // Boxes of planar facets have zero thickness on one axis.
        let flat = Aabb3::new(Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let (t_min, t_max) = ray.intersect_aabb(&flat).unwrap();
        assert!((t_min - 1.0).abs() < 1e-12);
        assert!((t_max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_hit_survives_rounding() {
        // Ray grazing the corner of a tight box from a far, skewed origin.
        let aabb = Aabb3::new(Point3::new(0.1, 0.2, 0.3), Point3::new(0.7, 0.9, 0.3));
        let origin = Point3::new(-13.37, 7.77, 11.1);
        for target in [aabb.min, aabb.max, Point3::new(0.1, 0.9, 0.3), Point3::new(0.4, 0.2, 0.3)] {
            let ray = Ray::new(origin, target - origin);
            let (enter, exit) = ray.intersect_aabb(&aabb).unwrap();
            assert!(enter <= exit);
        }
    }

    #[test]
    fn test_origin_on_face_with_parallel_direction() {
        // Zero direction component with the origin exactly on the slab face.
        let ray = Ray::new(Point3::new(0.5, 0.5, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let (enter, _) = ray.intersect_aabb(&unit_box()).unwrap();
        assert_eq!(enter, 0.0);
    }
}
