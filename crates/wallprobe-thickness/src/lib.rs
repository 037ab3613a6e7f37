#![warn(missing_docs)]

//! Per-triangle wall thickness probing.
//!
//! A [`ThicknessProbe`] builds a hierarchy over the valid facets of a
//! triangulation (or a tessellated shape) and casts one ray per triangle
//! from its centroid, by default along the inward normal. The distance to
//! the nearest other facet is the triangle's thickness, collected in a
//! sparse [`ScalarField`] together with global minimum and maximum.
//!
//! # Architecture
//!
//! - [`ThicknessSettings`] - Method, probing direction, build strategy
//! - [`ThicknessProbe`] - Sequential or rayon-parallel probing pass
//! - [`ScalarField`] - Sparse id to value map with max-on-conflict updates
//! - [`ProbeStats`], [`ThicknessReport`] - Pass counts and summary
//!
//! Triangles that cannot be probed (degenerate, grazed by a custom
//! direction, or without any hit) are skipped and counted; they never fail
//! a pass.

pub mod error;
pub mod field;
pub mod probe;
pub mod report;
pub mod settings;

pub use error::{Result, ThicknessError};
pub use field::ScalarField;
pub use probe::ThicknessProbe;
pub use report::{ProbeStats, ThicknessReport};
pub use settings::{ProbeMethod, ThicknessSettings};
