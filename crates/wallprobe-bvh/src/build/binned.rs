//! Binned surface-area-heuristic builder.

use wallprobe_math::axis_coord;

use super::{centroid_bounds, range_bounds, BuildParams, PrimitiveAccess};
use crate::aabb::Aabb3;
use crate::tree::{Node, NodeKind, Tree};

const NUM_BINS: usize = 12;
const TRAVERSAL_COST: f64 = 0.125;

/// Best split candidate for one node.
#[derive(Debug, Clone, Copy)]
struct Split {
    axis: usize,
    /// Bins `0..bin` go left.
    bin: usize,
    cost: f64,
    origin: f64,
    scale: f64,
}

impl Split {
    #[inline]
    fn goes_left(&self, centroid: f64) -> bool {
        bin_index(centroid, self.origin, self.scale) < self.bin
    }
}

#[inline]
fn bin_index(centroid: f64, origin: f64, scale: f64) -> usize {
    (((centroid - origin) * scale) as usize).min(NUM_BINS - 1)
}

pub(super) fn build<P: PrimitiveAccess + ?Sized>(prims: &mut P, params: &BuildParams) -> Tree {
    let n = prims.len();
    let mut nodes = Vec::with_capacity(2 * n);
    build_node(prims, params, 0, n, &mut nodes);
    Tree::from_nodes(nodes)
}

/// Build the subtree over `start..end`, returning its node index.
fn build_node<P: PrimitiveAccess + ?Sized>(
    prims: &mut P,
    params: &BuildParams,
    start: usize,
    end: usize,
    nodes: &mut Vec<Node>,
) -> usize {
    let aabb = range_bounds(prims, start, end);
    let count = end - start;
    let idx = nodes.len();
    nodes.push(Node {
        aabb,
        kind: NodeKind::Leaf { start, end },
    });

    if count <= params.min_leaf_size {
        return idx;
    }

    let must_split = count > params.max_leaf_size;
    let mid = match find_best_split(prims, start, end, &aabb) {
        Some(split) if must_split || split.cost < count as f64 => partition(prims, start, end, &split),
        Some(_) => return idx,
        // All centroids coincide: split the current order in half.
        None if must_split => start + count / 2,
        None => return idx,
    };
    let mid = params.clamp_split(start, end, mid);

    let left = build_node(prims, params, start, mid, nodes);
    let right = build_node(prims, params, mid, end, nodes);
    nodes[idx].kind = NodeKind::Interior { left, right };
    idx
}

/// Find the cheapest bin boundary over all three axes.
fn find_best_split<P: PrimitiveAccess + ?Sized>(
    prims: &P,
    start: usize,
    end: usize,
    bounds: &Aabb3,
) -> Option<Split> {
    let centroids = centroid_bounds(prims, start, end);
    let total_area = bounds.surface_area();
    let inv_area = if total_area > 0.0 { 1.0 / total_area } else { 0.0 };

    let mut best: Option<Split> = None;

    for axis in 0..3 {
        let origin = centroids.min_on(axis);
        let extent = axis_coord(&centroids.max, axis) - origin;
        if !(extent > 0.0) {
            continue;
        }
        let scale = NUM_BINS as f64 / extent;

        let mut counts = [0usize; NUM_BINS];
        let mut boxes = [Aabb3::empty(); NUM_BINS];
        for i in start..end {
            let b = bin_index(prims.centroid(i, axis), origin, scale);
            counts[b] += 1;
            boxes[b].merge(&prims.aabb(i));
        }

        // Right-hand areas and counts for every boundary.
        let mut right_area = [0.0; NUM_BINS];
        let mut right_count = [0usize; NUM_BINS];
        let mut acc = Aabb3::empty();
        let mut acc_count = 0;
        for b in (1..NUM_BINS).rev() {
            acc.merge(&boxes[b]);
            acc_count += counts[b];
            right_area[b] = acc.surface_area();
            right_count[b] = acc_count;
        }

        let mut left = Aabb3::empty();
        let mut left_count = 0;
        for boundary in 1..NUM_BINS {
            left.merge(&boxes[boundary - 1]);
            left_count += counts[boundary - 1];
            let r_count = right_count[boundary];
            if left_count == 0 || r_count == 0 {
                continue;
            }

            let cost = TRAVERSAL_COST
                + (left.surface_area() * left_count as f64 + right_area[boundary] * r_count as f64)
                    * inv_area;

            if best.map_or(true, |b| cost < b.cost) {
                best = Some(Split {
                    axis,
                    bin: boundary,
                    cost,
                    origin,
                    scale,
                });
            }
        }
    }

    best
}

/// Move primitives left of the split boundary to the front of the range.
fn partition<P: PrimitiveAccess + ?Sized>(prims: &mut P, start: usize, end: usize, split: &Split) -> usize {
    let mut left = start;
    let mut right = end;

    while left < right {
        if split.goes_left(prims.centroid(left, split.axis)) {
            left += 1;
        } else {
            right -= 1;
            prims.swap(left, right);
        }
    }

    left
}
