use crate::meshes::{random_point, triangle_soup};
use meshbvh::math::{Real, Vector};
use meshbvh::partitioning::{
    raycast_primitive, BvhOptions, DeserializeOptions, MeshBvh, NodeVisit, RaycastOptions,
    RefitFilter, TraversalAction,
};
use meshbvh::query::{PointQuery, Ray, Side};
use meshbvh::shape::{PrimitiveRange, PrimitiveSource, TriMesh};

fn grouped_soup(seed: u64) -> TriMesh {
    triangle_soup(seed, 900)
        .with_groups(vec![
            PrimitiveRange::new(0, 300),
            PrimitiveRange::new(300, 300),
            PrimitiveRange::new(600, 300),
        ])
        .unwrap()
}

fn ray_answers(bvh: &MeshBvh<TriMesh>, seed: u64) -> Vec<Vec<(u32, Real)>> {
    let options = RaycastOptions {
        side: Side::Double,
        ..Default::default()
    };
    let mut rng = oorandom::Rand32::new(seed);

    (0..100)
        .map(|_| {
            let origin = random_point(&mut rng, 20.0) - Vector::repeat(5.0);
            let ray = Ray::new(origin, random_point(&mut rng, 10.0) - origin);
            let mut hits: Vec<_> = bvh
                .raycast(&ray, &options)
                .iter()
                .map(|hit| (hit.primitive, hit.time_of_impact))
                .collect();
            hits.sort_by_key(|hit| hit.0);
            hits
        })
        .collect()
}

#[test]
fn queries_span_every_root() {
    for indirect in [false, true] {
        let options = BvhOptions::default().with_indirect(indirect);
        let bvh = MeshBvh::new(grouped_soup(70), &options).unwrap();
        assert_eq!(bvh.root_count(), 3);

        let ray_options = RaycastOptions {
            side: Side::Double,
            ..Default::default()
        };
        let mut rng = oorandom::Rand32::new(71);
        let mut hit_count = 0;

        for _ in 0..200 {
            let origin = random_point(&mut rng, 20.0) - Vector::repeat(5.0);
            let ray = Ray::new(origin, random_point(&mut rng, 10.0) - origin);
            let source = bvh.source();

            let mut expected: Vec<u32> = (0..source.primitive_count())
                .filter_map(|i| raycast_primitive(&source.primitive(i), i, &ray, &ray_options))
                .map(|hit| hit.primitive)
                .collect();
            let mut found: Vec<u32> = bvh
                .raycast(&ray, &ray_options)
                .iter()
                .map(|hit| hit.primitive)
                .collect();
            expected.sort_unstable();
            found.sort_unstable();
            assert_eq!(found, expected);
            hit_count += found.len();

            let query = random_point(&mut rng, 14.0) - Vector::repeat(2.0);
            let closest = bvh.closest_point_to_point(&query, 0.0, Real::MAX).unwrap();
            let expected_distance = source
                .triangles()
                .map(|tri| tri.distance_to_local_point(&query))
                .fold(Real::MAX, Real::min);
            assert_relative_eq!(closest.distance, expected_distance, epsilon = 1.0e-4);
        }

        assert!(hit_count > 0);
    }
}

#[test]
fn multi_root_tree_round_trips() {
    let bvh = MeshBvh::new(grouped_soup(72), &BvhOptions::default()).unwrap();
    let data = bvh.serialize();
    assert_eq!(data.roots.len(), 3);

    let restored =
        MeshBvh::deserialize(&data, bvh.source().clone(), &DeserializeOptions::default()).unwrap();
    assert_eq!(restored.root_bases(), bvh.root_bases());
    assert_eq!(restored.root_bases()[0], 0);
    assert_eq!(restored.node_count(), bvh.node_count());
    assert_eq!(ray_answers(&restored, 73), ray_answers(&bvh, 73));
}

#[test]
fn partial_refit_of_a_leaf_in_the_last_root() {
    let options = BvhOptions::default().with_max_leaf_size(4);
    let mut bvh = MeshBvh::new(grouped_soup(74), &options).unwrap();
    let last_base = bvh.root_bases()[2];

    let mut leaf = None;
    let mut edited = vec![];
    bvh.traverse_nodes(|node, _, _, visit| {
        if let NodeVisit::Leaf { primitives } = visit {
            if node >= last_base {
                leaf = Some(node);
                edited.extend(primitives.iter());
                return TraversalAction::EarlyExit;
            }
        }
        TraversalAction::Continue
    });
    let leaf = leaf.unwrap();

    for primitive in edited {
        for v in bvh.source().triangle_indices(primitive) {
            bvh.source_mut().vertices_mut()[v as usize].x += 4.0;
        }
    }
    assert!(bvh.validate().is_err());

    let filter = RefitFilter::from_leaves(&bvh, &[leaf]);
    assert!(filter.visit.contains(&last_base));
    assert!(bvh.refit_partial(&filter) >= 1);
    assert_eq!(bvh.validate(), Ok(()));
    assert_eq!(bvh.refit(), 0);
}
