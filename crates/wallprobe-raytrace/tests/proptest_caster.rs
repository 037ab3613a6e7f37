//! Property-based tests for nearest-hit queries.
//!
//! Run with: cargo test -p wallprobe-raytrace -- proptest

use proptest::prelude::*;
use wallprobe_bvh::{Aabb3, BuildParams, BuildStrategy, Facet, FacetSet};
use wallprobe_math::{Point3, Vec3};
use wallprobe_raytrace::{intersect_triangle, Ray, RayCaster};

// =============================================================================
// Strategies
// =============================================================================

fn arb_point(r: f64) -> impl Strategy<Value = Point3> {
    prop::array::uniform3(-r..r).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_facets() -> impl Strategy<Value = Vec<Facet>> {
    prop::collection::vec((arb_point(10.0), arb_point(10.0), arb_point(10.0)), 1..60).prop_map(|tris| {
        tris.into_iter()
            .enumerate()
            .filter_map(|(k, (a, b, c))| Facet::new(a, b, c, Some(k % 7)))
            .collect()
    })
}

fn arb_ray() -> impl Strategy<Value = Ray> {
    (arb_point(15.0), arb_point(1.0))
        .prop_filter("non-zero direction", |(_, d)| d.coords.norm() > 1e-3)
        .prop_map(|(o, d)| Ray::new(o, d.coords))
}

fn arb_strategy() -> impl Strategy<Value = BuildStrategy> {
    prop_oneof![Just(BuildStrategy::Binned), Just(BuildStrategy::Linear)]
}

/// Smallest positive parameter over all facets not owned by `skip`.
fn brute_force(facets: &FacetSet, ray: &Ray, skip: Option<usize>) -> Option<f64> {
    facets
        .iter()
        .filter(|f| skip.is_none() || f.owner != skip)
        .filter_map(|f| intersect_triangle(ray, &f.vertices()))
        .map(|h| h.t)
        .min_by(|a, b| a.total_cmp(b))
}

proptest! {
    /// The hierarchy query agrees with an exhaustive search.
    #[test]
    fn query_matches_brute_force(
        facets in arb_facets(),
        ray in arb_ray(),
        strategy in arb_strategy(),
        skip in prop::option::of(0usize..7),
    ) {
        prop_assume!(!facets.is_empty());
        let mut set = FacetSet::from_facets(facets).unwrap();
        let tree = strategy.build(&mut set, &BuildParams::new(1, 3)).unwrap();

        let mut caster = RayCaster::new(&set, Some(&tree));
        if let Some(k) = skip {
            caster.set_face_to_skip(k);
        }

        let expected = brute_force(&set, &ray, skip);
        let got = caster.query(&ray);
        prop_assert_eq!(got.map(|h| h.t), expected);

        if let Some(hit) = got {
            prop_assert!(hit.t > 0.0);
            prop_assert!(skip.is_none() || hit.owner != skip);
        }
    }
}

proptest! {
    /// Rays aimed exactly at facet vertices and edge midpoints land on tight
    /// box boundaries; the hierarchy must not prune them.
    #[test]
    fn query_matches_brute_force_at_vertices_and_edges(
        facets in arb_facets(),
        origin in arb_point(20.0),
        strategy in arb_strategy(),
        pick in any::<prop::sample::Index>(),
        target_kind in 0usize..6,
    ) {
        prop_assume!(!facets.is_empty());
        let mut set = FacetSet::from_facets(facets).unwrap();
        let tree = strategy.build(&mut set, &BuildParams::new(1, 2)).unwrap();
        let caster = RayCaster::new(&set, Some(&tree));

        let v = set.vertices(pick.index(set.len()));
        let target = match target_kind {
            0..=2 => v[target_kind],
            k => {
                let (a, b) = (v[k - 3], v[(k - 2) % 3]);
                Point3::from((a.coords + b.coords) * 0.5)
            }
        };
        let dir = target - origin;
        prop_assume!(dir.norm() > 1e-3);
        let ray = Ray::new(origin, dir);

        prop_assert_eq!(caster.query(&ray).map(|h| h.t), brute_force(&set, &ray, None));
    }
}

// =============================================================================
// Scenario: a ray from far outside pointing away misses
// =============================================================================

#[test]
fn far_ray_pointing_away_misses() {
    let facets: Vec<Facet> = (0..20)
        .filter_map(|i| {
            let x = i as f64;
            Facet::new(
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + 1.0, 0.0, 0.0),
                Point3::new(x, 1.0, 1.0),
                Some(i),
            )
        })
        .collect();
    let mut set = FacetSet::from_facets(facets).unwrap();
    let tree = BuildStrategy::Binned.build(&mut set, &BuildParams::default()).unwrap();
    let caster = RayCaster::new(&set, Some(&tree));

    let bounds: Aabb3 = tree.bounds();
    let origin = bounds.max + Vec3::new(1000.0, 1000.0, 1000.0);
    let ray = Ray::new(origin, Vec3::new(1.0, 0.5, 0.25));
    assert!(caster.query(&ray).is_none());
}
