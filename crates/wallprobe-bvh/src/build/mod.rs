//! Hierarchy construction over any indexed primitive container.
//!
//! Builders see primitives only through [`PrimitiveAccess`]: a count, a
//! box and a centroid coordinate per index, and an in-place swap. The swap
//! is the only mutation a builder performs, so after a build the container
//! is a permutation of its former self and every leaf of the returned
//! [`Tree`] names a contiguous index range in it.

mod binned;
mod linear;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wallprobe_math::Point3;

use crate::aabb::Aabb3;
use crate::error::{BvhError, Result};
use crate::tree::Tree;

/// Accessor contract a builder needs from a primitive container.
pub trait PrimitiveAccess {
    /// Number of primitives.
    fn len(&self) -> usize;

    /// Whether there are no primitives.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tight box of primitive `i`.
    fn aabb(&self, i: usize) -> Aabb3;

    /// Centroid coordinate of primitive `i` on `axis` (0, 1 or 2).
    fn centroid(&self, i: usize, axis: usize) -> f64;

    /// Exchange primitives `i` and `j` in place.
    fn swap(&mut self, i: usize, j: usize);
}

/// How the hierarchy is partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStrategy {
    /// Per-node surface area heuristic evaluated over a fixed bin count.
    #[default]
    Binned,
    /// One global sort along a Morton curve, then a top-down build from
    /// that order.
    Linear,
}

impl BuildStrategy {
    /// Build a hierarchy over `prims`, reordering them in place.
    ///
    /// Returns `None` if there are no primitives or `params` are invalid.
    pub fn build<P: PrimitiveAccess + ?Sized>(self, prims: &mut P, params: &BuildParams) -> Option<Tree> {
        if let Err(e) = params.validate() {
            warn!(error = %e, "Refusing to build hierarchy");
            return None;
        }
        if prims.is_empty() {
            debug!("No primitives to build a hierarchy over");
            return None;
        }

        let tree = match self {
            BuildStrategy::Binned => binned::build(prims, params),
            BuildStrategy::Linear => linear::build(prims, params),
        };

        debug!(
            strategy = ?self,
            primitives = prims.len(),
            nodes = tree.len(),
            leaves = tree.leaf_count(),
            "Built hierarchy"
        );
        Some(tree)
    }
}

impl std::str::FromStr for BuildStrategy {
    type Err = BvhError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "binned" | "sah" => Ok(BuildStrategy::Binned),
            "linear" | "morton" => Ok(BuildStrategy::Linear),
            other => Err(BvhError::InvalidParams(format!("unknown build strategy '{other}'"))),
        }
    }
}

/// Leaf size bounds shared by all strategies.
///
/// Ranges of at most `min_leaf_size` primitives always become leaves and
/// ranges above `max_leaf_size` are always split. When a range holds at
/// least `2 * min_leaf_size` primitives, no child smaller than
/// `min_leaf_size` is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildParams {
    /// Lower leaf size bound.
    pub min_leaf_size: usize,
    /// Upper leaf size bound.
    pub max_leaf_size: usize,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            min_leaf_size: 1,
            max_leaf_size: 5,
        }
    }
}

impl BuildParams {
    /// Create leaf size bounds.
    pub fn new(min_leaf_size: usize, max_leaf_size: usize) -> Self {
        Self {
            min_leaf_size,
            max_leaf_size,
        }
    }

    /// Validate bounds.
    pub fn validate(&self) -> Result<()> {
        if self.min_leaf_size == 0 {
            return Err(BvhError::InvalidParams("min_leaf_size must be at least 1".into()));
        }
        if self.min_leaf_size > self.max_leaf_size {
            return Err(BvhError::InvalidParams(format!(
                "min_leaf_size ({}) exceeds max_leaf_size ({})",
                self.min_leaf_size, self.max_leaf_size
            )));
        }
        Ok(())
    }

    /// Move a proposed split of `start..end` inside the range and away from
    /// undersized children.
    pub(crate) fn clamp_split(&self, start: usize, end: usize, mid: usize) -> usize {
        let count = end - start;
        let mut mid = if mid <= start || mid >= end {
            start + count / 2
        } else {
            mid
        };
        if count >= 2 * self.min_leaf_size {
            mid = mid.clamp(start + self.min_leaf_size, end - self.min_leaf_size);
        }
        mid
    }
}

/// Union of the boxes of primitives `start..end`.
pub(crate) fn range_bounds<P: PrimitiveAccess + ?Sized>(prims: &P, start: usize, end: usize) -> Aabb3 {
    let mut aabb = Aabb3::empty();
    for i in start..end {
        aabb.merge(&prims.aabb(i));
    }
    aabb
}

/// Box of the centroids of primitives `start..end`.
pub(crate) fn centroid_bounds<P: PrimitiveAccess + ?Sized>(prims: &P, start: usize, end: usize) -> Aabb3 {
    let mut aabb = Aabb3::empty();
    for i in start..end {
        let c = Point3::new(prims.centroid(i, 0), prims.centroid(i, 1), prims.centroid(i, 2));
        aabb.include_point(&c);
    }
    aabb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(BuildParams::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_params() {
        assert!(BuildParams::new(0, 4).validate().is_err());
        let err = BuildParams::new(6, 4).validate().unwrap_err();
        assert!(format!("{err}").contains("exceeds"));
    }

    #[test]
    fn test_clamp_split() {
        let p = BuildParams::new(2, 4);
        // Degenerate proposals fall back to the median.
        assert_eq!(p.clamp_split(0, 10, 0), 5);
        assert_eq!(p.clamp_split(0, 10, 10), 5);
        // Undersized children are avoided.
        assert_eq!(p.clamp_split(0, 10, 1), 2);
        assert_eq!(p.clamp_split(0, 10, 9), 8);
        assert_eq!(p.clamp_split(4, 14, 7), 7);
        // Too few primitives to honor the minimum on both sides.
        assert_eq!(p.clamp_split(0, 3, 1), 1);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("binned".parse::<BuildStrategy>().unwrap(), BuildStrategy::Binned);
        assert_eq!("Linear".parse::<BuildStrategy>().unwrap(), BuildStrategy::Linear);
        assert!("octree".parse::<BuildStrategy>().is_err());
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&BuildStrategy::Linear).unwrap();
        assert_eq!(json, "\"linear\"");
        let params: BuildParams = serde_json::from_str(r#"{"max_leaf_size": 8}"#).unwrap();
        assert_eq!(params, BuildParams::new(1, 8));
    }
}
