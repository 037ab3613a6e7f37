#![warn(missing_docs)]

//! Facet container and bounding volume hierarchy for wallprobe.
//!
//! The hierarchy is built over a [`FacetSet`], the container of valid
//! (non-degenerate) triangles extracted from a tessellated shape or a raw
//! triangulation. Builders only ever see the facets through the
//! [`PrimitiveAccess`] contract (count, box, centroid, swap), so the
//! container and the partitioning strategy stay independent.
//!
//! # Architecture
//!
//! - [`Triangulation`], [`Shape`] - Input models consumed once at construction
//! - [`Facet`], [`FacetSet`] - Valid triangles plus the builder accessor contract
//! - [`BuildStrategy`] - Binned SAH or linear (Morton order) construction
//! - [`Tree`] - Immutable flat array of nested boxes
//! - [`TreeIter`] - Depth-first traversal
//! - [`FacetTree`] - Facets with a lazily (re)built tree
//!
//! # Example
//!
//! ```
//! use wallprobe_bvh::{BuildParams, BuildStrategy, FacetSet, Orientation, Triangulation};
//! use wallprobe_math::Point3;
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
//! let tree = BuildStrategy::Binned.build(&mut facets, &BuildParams::default()).unwrap();
//! assert_eq!(tree.leaf_count(), 1);
//! ```

pub mod aabb;
pub mod build;
pub mod debug;
pub mod error;
pub mod facet;
pub mod input;
pub mod iter;
pub mod lazy;
pub mod tree;

pub use aabb::Aabb3;
pub use build::{BuildParams, BuildStrategy, PrimitiveAccess};
pub use debug::{dump_top_level_boxes, PlotSink};
pub use error::{BvhError, Result};
pub use facet::{Facet, FacetSet};
pub use input::{Orientation, Shape, ShapeFace, Triangulation};
pub use iter::{NodeVisit, TreeIter};
pub use lazy::FacetTree;
pub use tree::{Node, NodeKind, Tree};
