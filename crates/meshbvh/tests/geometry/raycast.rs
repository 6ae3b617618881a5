use crate::meshes::{cube, point_cloud, random_point, random_strip, triangle_soup};
use meshbvh::math::{Point, Vector};
use meshbvh::partitioning::{raycast_primitive, BvhOptions, MeshBvh, MeshRayHit, RaycastOptions};
use meshbvh::query::{Ray, Side};
use meshbvh::shape::{PrimitiveRange, PrimitiveSource};

fn brute_force<S: PrimitiveSource>(
    source: &S,
    ray: &Ray,
    options: &RaycastOptions,
) -> Vec<MeshRayHit> {
    (0..source.primitive_count())
        .filter_map(|i| raycast_primitive(&source.primitive(i), i, ray, options))
        .collect()
}

fn sorted_primitives(hits: &[MeshRayHit]) -> Vec<u32> {
    let mut result: Vec<u32> = hits.iter().map(|hit| hit.primitive).collect();
    result.sort_unstable();
    result
}

fn random_ray(rng: &mut oorandom::Rand32) -> Ray {
    let origin = random_point(rng, 20.0) - Vector::repeat(5.0);
    let target = random_point(rng, 10.0);
    Ray::new(origin, target - origin)
}

fn check_against_brute_force<S: PrimitiveSource>(
    bvh: &MeshBvh<S>,
    seed: u64,
    options: &RaycastOptions,
) {
    let mut rng = oorandom::Rand32::new(seed);
    let mut hit_count = 0;

    for _ in 0..200 {
        let ray = random_ray(&mut rng);
        let expected = brute_force(bvh.source(), &ray, options);
        let hits = bvh.raycast(&ray, options);
        assert_eq!(sorted_primitives(&hits), sorted_primitives(&expected));
        hit_count += hits.len();

        let first = bvh.raycast_first(&ray, options);
        let expected_first = expected
            .iter()
            .map(|hit| hit.time_of_impact)
            .min_by(|a, b| a.total_cmp(b));
        assert_eq!(first.map(|hit| hit.time_of_impact), expected_first);
    }

    assert!(hit_count > 0);
}

#[test]
fn triangle_raycasts_match_brute_force() {
    let bvh = MeshBvh::new(triangle_soup(20, 3000), &BvhOptions::default()).unwrap();
    for side in [Side::Front, Side::Back, Side::Double] {
        let options = RaycastOptions {
            side,
            ..Default::default()
        };
        check_against_brute_force(&bvh, 21, &options);
    }

    let indirect = BvhOptions::default().with_indirect(true);
    let bvh = MeshBvh::new(triangle_soup(20, 3000), &indirect).unwrap();
    check_against_brute_force(&bvh, 22, &RaycastOptions::default());
}

#[test]
fn near_and_far_limits_filter_hits() {
    let bvh = MeshBvh::new(triangle_soup(23, 3000), &BvhOptions::default()).unwrap();
    let options = RaycastOptions {
        side: Side::Double,
        near: 0.3,
        far: 0.7,
        ..Default::default()
    };
    check_against_brute_force(&bvh, 24, &options);
}

#[test]
fn thin_primitive_raycasts_match_brute_force() {
    let options = RaycastOptions {
        threshold: 0.1,
        ..Default::default()
    };

    let points = MeshBvh::new(point_cloud(25, 5000), &BvhOptions::default()).unwrap();
    check_against_brute_force(&points, 26, &options);

    let strip = MeshBvh::new(random_strip(27, 3000), &BvhOptions::default()).unwrap();
    check_against_brute_force(&strip, 28, &options);
}

#[test]
fn ray_through_a_cube_hits_two_faces() {
    let bvh = MeshBvh::new(cube(), &BvhOptions::default()).unwrap();
    let ray = Ray::new(Point::new(-5.0, 0.2, 0.3), Vector::x());
    let options = RaycastOptions {
        side: Side::Double,
        ..Default::default()
    };

    let mut hits = bvh.raycast(&ray, &options);
    hits.sort_by(|a, b| a.time_of_impact.total_cmp(&b.time_of_impact));
    assert_eq!(hits.len(), 2);
    assert_relative_eq!(hits[0].time_of_impact, 4.5);
    assert_relative_eq!(hits[1].time_of_impact, 5.5);

    let first = bvh.raycast_first(&ray, &options).unwrap();
    assert_eq!(first.time_of_impact, hits[0].time_of_impact);
    assert_relative_eq!(first.point, Point::new(-0.5, 0.2, 0.3), epsilon = 1.0e-6);
    assert_relative_eq!(first.normal.unwrap(), -Vector::x(), epsilon = 1.0e-6);

    // Only the entry face is seen from outside.
    let front = bvh.raycast(&ray, &RaycastOptions::default());
    assert_eq!(front.len(), 1);
    assert_relative_eq!(front[0].time_of_impact, 4.5);

    let miss = Ray::new(Point::new(-5.0, 2.0, 0.3), Vector::x());
    assert!(bvh.raycast(&miss, &options).is_empty());
    assert!(bvh.raycast_first(&miss, &options).is_none());
}

#[test]
fn rays_against_an_empty_tree_hit_nothing() {
    let options = BvhOptions::default().with_range(PrimitiveRange::new(0, 0));
    let bvh = MeshBvh::new(triangle_soup(29, 10), &options).unwrap();
    let ray = Ray::new(Point::origin(), Vector::new(1.0, 1.0, 1.0));
    assert!(bvh.raycast(&ray, &RaycastOptions::default()).is_empty());
    assert!(bvh.raycast_first(&ray, &RaycastOptions::default()).is_none());
}
