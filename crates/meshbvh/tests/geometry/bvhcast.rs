use crate::meshes::triangle_soup;
use meshbvh::bounding_volume::{Aabb, BoundingVolume};
use meshbvh::math::{Isometry, Real, Vector};
use meshbvh::partitioning::{
    BvhCastVisitor, BvhOptions, LeafPrimitives, MeshBvh, SplitStrategy, VisitStatus,
};
use meshbvh::query::intersection_test_primitive_primitive;
use meshbvh::shape::{PrimitiveSource, TriMesh};
use std::collections::HashSet;

#[derive(Default)]
struct PairCollector {
    pairs: HashSet<(u32, u32)>,
    leaf_pairs: usize,
}

impl BvhCastVisitor for PairCollector {
    fn intersects_ranges(
        &mut self,
        primitives1: LeafPrimitives,
        primitives2: LeafPrimitives,
        _: u32,
        _: u32,
        _: u32,
        _: u32,
    ) -> VisitStatus {
        self.leaf_pairs += 1;
        for i1 in primitives1.iter() {
            for i2 in primitives2.iter() {
                let _ = self.pairs.insert((i1, i2));
            }
        }
        VisitStatus::Continue
    }
}

fn primitive_aabb_in1(source: &TriMesh, i: u32, pos12: &Isometry<Real>) -> Aabb {
    source.primitive(i).transformed(pos12).local_aabb()
}

fn build(seed: u64, count: usize) -> MeshBvh<TriMesh> {
    let options = BvhOptions::default()
        .with_strategy(SplitStrategy::Midpoint)
        .with_max_leaf_size(1);
    MeshBvh::new(triangle_soup(seed, count), &options).unwrap()
}

#[test]
fn bvhcast_reports_every_overlapping_pair() {
    let bvh1 = build(40, 400);
    let bvh2 = build(41, 300);
    let identity = Isometry::identity();

    for pos12 in [
        Isometry::translation(2.0, -1.0, 0.5),
        Isometry::new(Vector::new(1.0, 0.0, -1.0), Vector::new(0.2, 0.9, -0.4)),
    ] {
        let mut collector = PairCollector::default();
        assert!(!bvh1.bvhcast(&bvh2, &pos12, &mut collector));
        assert!(collector.leaf_pairs > 0);
        assert!(collector.leaf_pairs < 400 * 300 / 10);

        let (s1, s2) = (bvh1.source(), bvh2.source());
        for i in 0..s1.primitive_count() {
            let aabb1 = primitive_aabb_in1(s1, i, &identity);
            for j in 0..s2.primitive_count() {
                let aabb2 = primitive_aabb_in1(s2, j, &pos12);
                if aabb1.intersects(&aabb2) {
                    assert!(collector.pairs.contains(&(i, j)), "missed pair {:?}", (i, j));
                }
            }
        }

        // Leaves hold one primitive each, so reported pairs are close to each other.
        for (i, j) in &collector.pairs {
            let aabb1 = primitive_aabb_in1(s1, *i, &identity).loosened(1.0);
            assert!(aabb1.intersects(&primitive_aabb_in1(s2, *j, &pos12)));
        }
    }
}

#[test]
fn early_exit_stops_the_dual_traversal() {
    struct FirstPair(usize);

    impl BvhCastVisitor for FirstPair {
        fn intersects_ranges(
            &mut self,
            _: LeafPrimitives,
            _: LeafPrimitives,
            _: u32,
            _: u32,
            _: u32,
            _: u32,
        ) -> VisitStatus {
            self.0 += 1;
            VisitStatus::ExitEarly
        }
    }

    let bvh1 = build(42, 200);
    let bvh2 = build(43, 200);
    let mut visitor = FirstPair(0);
    assert!(bvh1.bvhcast(&bvh2, &Isometry::identity(), &mut visitor));
    assert_eq!(visitor.0, 1);
}

#[test]
fn intersects_bvh_matches_brute_force() {
    let bvh1 = build(44, 150);
    let bvh2 = build(45, 150);

    for shift in [0.0, 3.0, 11.0, 25.0] {
        let pos12 = Isometry::translation(shift, 0.0, 0.0);
        let (s1, s2) = (bvh1.source(), bvh2.source());
        let expected = (0..s1.primitive_count()).any(|i| {
            (0..s2.primitive_count()).any(|j| {
                intersection_test_primitive_primitive(&pos12, &s1.primitive(i), &s2.primitive(j))
            })
        });

        assert_eq!(bvh1.intersects_bvh(&bvh2, &pos12), expected, "shift {}", shift);
    }
}
