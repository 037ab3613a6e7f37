//! Nearest-hit queries against a facet hierarchy.

use wallprobe_bvh::{FacetSet, NodeKind, Tree};
use wallprobe_math::{Dir3, Point3};

use crate::ray::Ray;
use crate::triangle::intersect_triangle;

/// Nearest facet hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Parameter along the ray, strictly positive.
    pub t: f64,
    /// Intersection point.
    pub point: Point3,
    /// Index of the facet in the [`FacetSet`].
    pub facet: usize,
    /// Owner id of the facet.
    pub owner: Option<usize>,
    /// Unit normal of the facet.
    pub normal: Dir3,
}

/// Ray query over a facet set and the hierarchy built over it.
///
/// The tree must have been built over `facets` in their current order.
/// Without a tree every query misses.
#[derive(Debug, Clone)]
pub struct RayCaster<'a> {
    facets: &'a FacetSet,
    tree: Option<&'a Tree>,
    skip: Option<usize>,
}

impl<'a> RayCaster<'a> {
    /// Create a caster with no excluded owner.
    pub fn new(facets: &'a FacetSet, tree: Option<&'a Tree>) -> Self {
        Self {
            facets,
            tree,
            skip: None,
        }
    }

    /// Ignore every facet whose owner is `owner` until changed.
    pub fn set_face_to_skip(&mut self, owner: usize) {
        self.skip = Some(owner);
    }

    /// Stop ignoring any owner.
    pub fn clear_face_to_skip(&mut self) {
        self.skip = None;
    }

    /// Nearest hit at a strictly positive parameter.
    ///
    /// Among hits at exactly the same parameter, the first one reached in
    /// traversal order wins.
    pub fn query(&self, ray: &Ray) -> Option<RayHit> {
        let tree = self.tree?;
        let (root_t, _) = ray.intersect_aabb(&tree.root().aabb)?;

        let mut best: Option<RayHit> = None;
        let mut best_t = f64::INFINITY;
        let mut stack: Vec<(usize, f64)> = Vec::with_capacity(64);
        stack.push((0, root_t));

        while let Some((index, entry_t)) = stack.pop() {
            if entry_t >= best_t {
                continue;
            }

            match tree.node(index).kind {
                NodeKind::Leaf { start, end } => {
                    for i in start..end {
                        let facet = self.facets.facet(i);
                        if self.skip.is_some() && facet.owner == self.skip {
                            continue;
                        }
                        let Some(hit) = intersect_triangle(ray, &facet.vertices()) else {
                            continue;
                        };
                        if hit.t < best_t {
                            best_t = hit.t;
                            best = Some(RayHit {
                                t: hit.t,
                                point: ray.at(hit.t),
                                facet: i,
                                owner: facet.owner,
                                normal: facet.normal,
                            });
                        }
                    }
                }
                NodeKind::Interior { left, right } => {
                    let lt = ray.intersect_aabb(&tree.node(left).aabb).map(|(t, _)| t);
                    let rt = ray.intersect_aabb(&tree.node(right).aabb).map(|(t, _)| t);

                    // Push the farther child first so the nearer one is popped next.
                    match (lt, rt) {
                        (Some(lt), Some(rt)) => {
                            if lt <= rt {
                                stack.push((right, rt));
                                stack.push((left, lt));
                            } else {
                                stack.push((left, lt));
                                stack.push((right, rt));
                            }
                        }
                        (Some(lt), None) => stack.push((left, lt)),
                        (None, Some(rt)) => stack.push((right, rt)),
                        (None, None) => {}
                    }
                }
            }
        }

        best
    }
}
