use crate::meshes::{point_cloud, random_point, random_strip, triangle_soup};
use meshbvh::math::{Isometry, Real, Vector};
use meshbvh::partitioning::{BvhOptions, MeshBvh};
use meshbvh::query::closest_points_primitive_primitive;
use meshbvh::shape::PrimitiveSource;

#[test]
fn nearest_point_matches_brute_force() {
    let bvh = MeshBvh::new(point_cloud(30, 1000), &BvhOptions::default()).unwrap();
    let mut rng = oorandom::Rand32::new(31);

    for _ in 0..100 {
        let query = random_point(&mut rng, 14.0) - Vector::repeat(2.0);
        let hit = bvh.closest_point_to_point(&query, 0.0, Real::MAX).unwrap();

        let source = bvh.source();
        let expected = (0..source.primitive_count())
            .map(|i| na::distance(&source.vertex(i, 0), &query))
            .fold(Real::MAX, Real::min);

        assert_relative_eq!(hit.distance, expected, epsilon = 1.0e-5);
        assert_relative_eq!(hit.point, source.vertex(hit.primitive, 0));
    }
}

#[test]
fn thresholds_bound_the_search() {
    let bvh = MeshBvh::new(point_cloud(32, 1000), &BvhOptions::default()).unwrap();
    let far_away = meshbvh::math::Point::new(100.0, 100.0, 100.0);

    assert!(bvh.closest_point_to_point(&far_away, 0.0, 10.0).is_none());
    let hit = bvh.closest_point_to_point(&far_away, 0.0, 1000.0).unwrap();
    assert!(hit.distance > 10.0);

    // Any point within the minimum threshold ends the search.
    let inside = bvh.source().vertex(0, 0);
    let early = bvh.closest_point_to_point(&inside, 5.0, Real::MAX).unwrap();
    assert!(early.distance <= 5.0);
}

#[test]
fn closest_geometry_matches_brute_force() {
    let bvh1 = MeshBvh::new(triangle_soup(33, 200), &BvhOptions::default()).unwrap();
    let bvh2 = MeshBvh::new(random_strip(34, 150), &BvhOptions::default()).unwrap();
    let mut rng = oorandom::Rand32::new(35);

    for _ in 0..10 {
        let shift = Vector::new(rng.rand_float(), rng.rand_float(), rng.rand_float()) * 12.0;
        let pos12 = Isometry::new(shift, Vector::new(0.0, rng.rand_float() * 3.0, 0.0));
        let hit = bvh1
            .closest_point_to_geometry(&bvh2, &pos12, 0.0, Real::MAX)
            .unwrap();

        let (s1, s2) = (bvh1.source(), bvh2.source());
        let mut expected = Real::MAX;
        for i in 0..s1.primitive_count() {
            for j in 0..s2.primitive_count() {
                let (pt1, pt2) =
                    closest_points_primitive_primitive(&pos12, &s1.primitive(i), &s2.primitive(j));
                expected = expected.min(na::distance(&pt1, &(pos12 * pt2)));
            }
        }

        assert_relative_eq!(hit.distance, expected, epsilon = 1.0e-4);
        assert_relative_eq!(
            na::distance(&hit.point1, &(pos12 * hit.point2)),
            hit.distance,
            epsilon = 1.0e-4
        );
    }
}
