//! Linear builder: Morton ordering followed by a top-down split on the
//! highest differing key bit.

use wallprobe_math::axis_coord;

use super::{centroid_bounds, range_bounds, BuildParams, PrimitiveAccess};
use crate::tree::{Node, NodeKind, Tree};

/// Quantization steps per axis (10 bits).
const GRID: f64 = 1023.0;

/// Interleave the low 10 bits of `v` with two zero bits between each.
#[inline]
fn spread_bits(v: u32) -> u32 {
    let mut x = v & 0x3FF;
    x = (x | (x << 16)) & 0x0300_00FF;
    x = (x | (x << 8)) & 0x0300_F00F;
    x = (x | (x << 4)) & 0x030C_30C3;
    x = (x | (x << 2)) & 0x0924_9249;
    x
}

/// 30-bit Morton key of every primitive centroid, quantized on the
/// centroid bounds of the whole set.
fn morton_keys<P: PrimitiveAccess + ?Sized>(prims: &P) -> Vec<u32> {
    let n = prims.len();
    let bounds = centroid_bounds(prims, 0, n);

    let mut origin = [0.0; 3];
    let mut scale = [0.0; 3];
    for axis in 0..3 {
        origin[axis] = bounds.min_on(axis);
        let extent = axis_coord(&bounds.max, axis) - origin[axis];
        scale[axis] = if extent > 0.0 { GRID / extent } else { 0.0 };
    }

    (0..n)
        .map(|i| {
            let mut key = 0;
            for axis in 0..3 {
                let q = ((prims.centroid(i, axis) - origin[axis]) * scale[axis]).clamp(0.0, GRID) as u32;
                key |= spread_bits(q) << (2 - axis);
            }
            key
        })
        .collect()
}

/// Reorder `prims` so that position `k` holds the primitive formerly at
/// `order[k]`, using swaps only.
fn apply_order<P: PrimitiveAccess + ?Sized>(prims: &mut P, order: &[usize]) {
    let n = order.len();
    // at[k]: original index now at position k; pos_of[id]: inverse.
    let mut at: Vec<usize> = (0..n).collect();
    let mut pos_of: Vec<usize> = (0..n).collect();

    for (k, &id) in order.iter().enumerate() {
        let p = pos_of[id];
        if p == k {
            continue;
        }
        prims.swap(k, p);
        at.swap(k, p);
        pos_of[at[k]] = k;
        pos_of[at[p]] = p;
    }
}

pub(super) fn build<P: PrimitiveAccess + ?Sized>(prims: &mut P, params: &BuildParams) -> Tree {
    let n = prims.len();
    let keys = morton_keys(prims);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| keys[i]);
    apply_order(prims, &order);
    let sorted: Vec<u32> = order.iter().map(|&i| keys[i]).collect();

    let mut nodes = Vec::with_capacity(2 * n);
    build_node(prims, params, &sorted, 0, n, &mut nodes);
    Tree::from_nodes(nodes)
}

fn build_node<P: PrimitiveAccess + ?Sized>(
    prims: &P,
    params: &BuildParams,
    keys: &[u32],
    start: usize,
    end: usize,
    nodes: &mut Vec<Node>,
) -> usize {
    let count = end - start;
    let idx = nodes.len();
    nodes.push(Node {
        aabb: range_bounds(prims, start, end),
        kind: NodeKind::Leaf { start, end },
    });

    if count <= params.max_leaf_size {
        return idx;
    }

    let mid = split_point(&keys[start..end]).map_or(start + count / 2, |m| start + m);
    let mid = params.clamp_split(start, end, mid);

    let left = build_node(prims, params, keys, start, mid, nodes);
    let right = build_node(prims, params, keys, mid, end, nodes);
    nodes[idx].kind = NodeKind::Interior { left, right };
    idx
}

/// First position whose key has the highest differing bit set, or `None`
/// when all keys are equal.
fn split_point(keys: &[u32]) -> Option<usize> {
    let (first, last) = (*keys.first()?, *keys.last()?);
    let diff = first ^ last;
    if diff == 0 {
        return None;
    }
    let bit = 1u32 << (31 - diff.leading_zeros());
    Some(keys.partition_point(|k| k & bit == 0))
}
