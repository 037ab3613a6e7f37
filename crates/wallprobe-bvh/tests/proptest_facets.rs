//! Property-based tests for facet extraction and hierarchy construction.
//!
//! Run with: cargo test -p wallprobe-bvh -- proptest

use proptest::prelude::*;
use wallprobe_bvh::{BuildParams, BuildStrategy, FacetSet, NodeKind, Orientation, Triangulation};
use wallprobe_math::{triangle_normal, Point3};

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Point3> {
    prop::array::uniform3(-50.0..50.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Random triangulation; node indices are always in range.
fn arb_triangulation(max_nodes: usize, max_triangles: usize) -> impl Strategy<Value = Triangulation> {
    (3..=max_nodes).prop_flat_map(move |n| {
        let nodes = prop::collection::vec(arb_point(), n);
        let tris = prop::collection::vec(prop::array::uniform3(0..n), 1..=max_triangles);
        (nodes, tris).prop_map(|(nodes, triangles)| Triangulation::new(nodes, triangles))
    })
}

fn arb_strategy() -> impl Strategy<Value = BuildStrategy> {
    prop_oneof![Just(BuildStrategy::Binned), Just(BuildStrategy::Linear)]
}

fn arb_params() -> impl Strategy<Value = BuildParams> {
    (1usize..4, 0usize..6).prop_map(|(min, extra)| BuildParams::new(min, min + extra))
}

fn valid_count(mesh: &Triangulation) -> usize {
    mesh.triangles
        .iter()
        .filter(|[a, b, c]| triangle_normal(&mesh.nodes[*a], &mesh.nodes[*b], &mesh.nodes[*c]).is_some())
        .count()
}

// =============================================================================
// Property Tests: FacetSet
// =============================================================================

proptest! {
    /// Size never exceeds the candidate count and matches the valid count.
    #[test]
    fn size_counts_valid_triangles(mesh in arb_triangulation(20, 40)) {
        let set = FacetSet::from_triangulation(&mesh, Orientation::Forward).unwrap();
        prop_assert!(set.len() <= mesh.num_triangles());
        prop_assert_eq!(set.len(), valid_count(&mesh));
    }

    /// Every facet's box contains its vertices and the centroid is the mean.
    #[test]
    fn box_and_center_are_exact(mesh in arb_triangulation(12, 24)) {
        let set = FacetSet::from_triangulation(&mesh, Orientation::Forward).unwrap();
        for i in 0..set.len() {
            let aabb = set.aabb(i);
            let verts = set.vertices(i);
            for v in &verts {
                prop_assert!(aabb.contains_point(v));
            }
            for axis in 0..3 {
                let mean = (verts[0][axis] + verts[1][axis] + verts[2][axis]) / 3.0;
                prop_assert!((set.centroid(i, axis) - mean).abs() <= 1e-12 * (1.0 + mean.abs()));
            }
        }
    }

    /// Swapping twice restores the original order.
    #[test]
    fn swap_is_involution(mesh in arb_triangulation(12, 24), i in 0usize..24, j in 0usize..24) {
        let mut set = FacetSet::from_triangulation(&mesh, Orientation::Forward).unwrap();
        prop_assume!(!set.is_empty());
        let (i, j) = (i % set.len(), j % set.len());
        let before: Vec<_> = set.iter().copied().collect();
        set.swap(i, j);
        set.swap(i, j);
        prop_assert_eq!(set.iter().copied().collect::<Vec<_>>(), before);
    }

    /// Leaves cover every facet exactly once and respect the leaf bound.
    #[test]
    fn tree_partitions_facets(
        mesh in arb_triangulation(30, 80),
        strategy in arb_strategy(),
        params in arb_params(),
    ) {
        let mut set = FacetSet::from_triangulation(&mesh, Orientation::Forward).unwrap();
        prop_assume!(!set.is_empty());
        let owners_before = {
            let mut o: Vec<_> = set.iter().map(|f| f.owner).collect();
            o.sort_unstable();
            o
        };

        let tree = strategy.build(&mut set, &params).unwrap();

        let mut seen = vec![0usize; set.len()];
        for visit in &tree {
            match visit.kind {
                NodeKind::Leaf { start, end } => {
                    prop_assert!(end - start <= params.max_leaf_size);
                    for i in start..end {
                        seen[i] += 1;
                        prop_assert!(visit.aabb.contains(&set.aabb(i)));
                    }
                }
                NodeKind::Interior { .. } => {
                    let (l, r) = visit.children.unwrap();
                    prop_assert!(visit.aabb.contains(&l) && visit.aabb.contains(&r));
                }
            }
        }
        prop_assert!(seen.iter().all(|&c| c == 1));

        let mut owners_after: Vec<_> = set.iter().map(|f| f.owner).collect();
        owners_after.sort_unstable();
        prop_assert_eq!(owners_after, owners_before);
    }
}

// =============================================================================
// Scenario: a zero-area triangle is skipped
// =============================================================================

#[test]
fn zero_area_triangle_is_skipped() {
    let nodes = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
    ];
    let clean = Triangulation::new(nodes.clone(), vec![[0, 1, 2], [0, 2, 3]]);
    // Collinear nodes 0, 1, 4.
    let dirty = Triangulation::new(nodes, vec![[0, 1, 2], [0, 1, 4], [0, 2, 3]]);

    let clean_set = FacetSet::from_triangulation(&clean, Orientation::Forward).unwrap();
    let dirty_set = FacetSet::from_triangulation(&dirty, Orientation::Forward).unwrap();
    assert_eq!(dirty_set.len(), clean_set.len());
    assert_eq!(dirty_set.facet(1).owner, Some(2));
}
