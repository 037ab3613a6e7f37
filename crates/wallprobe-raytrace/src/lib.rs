#![warn(missing_docs)]

//! Ray queries over a facet hierarchy.
//!
//! A [`RayCaster`] walks a [`Tree`](wallprobe_bvh::Tree) built over a
//! [`FacetSet`](wallprobe_bvh::FacetSet) and reports the nearest facet hit
//! at a strictly positive ray parameter. One facet owner can be excluded
//! from the search, which is how a probe avoids hitting the triangle it
//! starts from.
//!
//! # Architecture
//!
//! - [`Ray`] - Origin, unit direction and slab-test box rejection
//! - [`intersect_triangle`] - Watertight ray/triangle test
//! - [`RayCaster`] - Nearest-hit traversal with owner exclusion
//!
//! # Example
//!
//! ```
//! use wallprobe_bvh::{BuildParams, BuildStrategy, FacetSet, Orientation, Triangulation};
//! use wallprobe_math::{Point3, Vec3};
//! use wallprobe_raytrace::{Ray, RayCaster};
//!
//! let mesh = Triangulation::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//! let mut facets = FacetSet::from_triangulation(&mesh, Orientation::Forward).unwrap();
//! let tree = BuildStrategy::Binned.build(&mut facets, &BuildParams::default());
//!
//! let caster = RayCaster::new(&facets, tree.as_ref());
//! let hit = caster
//!     .query(&Ray::new(Point3::new(0.2, 0.2, 3.0), Vec3::new(0.0, 0.0, -1.0)))
//!     .unwrap();
//! assert!((hit.t - 3.0).abs() < 1e-12);
//! ```

mod caster;
mod ray;
mod triangle;

pub use caster::{RayCaster, RayHit};
pub use ray::Ray;
pub use triangle::{intersect_triangle, TriangleHit};
