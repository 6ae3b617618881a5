use crate::meshes::{cube, point_cloud, random_strip, triangle_soup};
use meshbvh::math::{Point, Real};
use meshbvh::partitioning::{
    BvhError, BvhOptions, MeshBvh, NodeVisit, SplitStrategy, TraversalAction,
};
use meshbvh::shape::{PointCloud, PrimitiveRange, PrimitiveSource, TriMesh};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const STRATEGIES: [SplitStrategy; 3] = [
    SplitStrategy::Midpoint,
    SplitStrategy::Mean,
    SplitStrategy::Sah,
];

/// The primitives of every leaf, in slot order.
fn leaf_primitives<S: PrimitiveSource>(bvh: &MeshBvh<S>) -> Vec<Vec<u32>> {
    let mut result = vec![];
    bvh.traverse_nodes(|_, _, _, visit| {
        if let NodeVisit::Leaf { primitives } = visit {
            result.push(primitives.iter().collect());
        }
        TraversalAction::Continue
    });
    result
}

#[test]
fn bounds_contain_primitives_for_every_strategy() {
    for (seed, strategy) in STRATEGIES.into_iter().enumerate() {
        for indirect in [false, true] {
            let options = BvhOptions::default()
                .with_strategy(strategy)
                .with_indirect(indirect);
            let bvh = MeshBvh::new(triangle_soup(seed as u64, 2000), &options).unwrap();
            assert_eq!(bvh.validate(), Ok(()), "{:?}", strategy);

            let mut covered: Vec<u32> = leaf_primitives(&bvh).into_iter().flatten().collect();
            covered.sort_unstable();
            assert_eq!(covered, (0..2000).collect::<Vec<_>>());
            assert!(bvh.stats().max_depth <= 40);
        }
    }
}

#[test]
fn points_and_segments_are_contained() {
    let cloud = MeshBvh::new(point_cloud(3, 3000), &BvhOptions::default()).unwrap();
    assert_eq!(cloud.validate(), Ok(()));
    assert_eq!(cloud.stats().primitive_count, 3000);

    let strip = MeshBvh::new(random_strip(4, 1001), &BvhOptions::default()).unwrap();
    assert_eq!(strip.validate(), Ok(()));
    assert_eq!(strip.stats().primitive_count, 1000);
}

#[test]
fn leaf_size_one_gives_one_leaf_per_triangle() {
    let options = BvhOptions::default()
        .with_strategy(SplitStrategy::Midpoint)
        .with_max_leaf_size(1);
    let bvh = MeshBvh::new(cube(), &options).unwrap();
    let stats = bvh.stats();

    assert_eq!(stats.leaf_count, 12);
    assert_eq!(stats.node_count, 23);
    assert!(leaf_primitives(&bvh).iter().all(|leaf| leaf.len() == 1));
}

#[test]
fn collinear_input_becomes_a_single_leaf() {
    let vertices: Vec<Point<Real>> = (0..150)
        .map(|i| Point::new(i as Real * 0.25, 0.0, 0.0))
        .collect();
    let mesh = TriMesh::new(vertices, None).unwrap();
    let bvh = MeshBvh::new(mesh, &BvhOptions::default()).unwrap();
    let stats = bvh.stats();

    assert_eq!(stats.leaf_count, 1);
    assert_eq!(stats.primitive_count, 50);
    assert_eq!(bvh.validate(), Ok(()));
}

#[test]
fn depth_cap_is_not_fatal() {
    let options = BvhOptions::default()
        .with_strategy(SplitStrategy::Midpoint)
        .with_max_depth(3)
        .with_max_leaf_size(1);
    let bvh = MeshBvh::new(triangle_soup(12, 500), &options).unwrap();
    let stats = bvh.stats();

    assert_eq!(stats.max_depth, 3);
    assert_eq!(stats.primitive_count, 500);
    assert_eq!(bvh.validate(), Ok(()));
}

#[test]
fn groups_keep_their_primitives() {
    // Three groups of 300 triangles, each using its own vertices.
    let soup = triangle_soup(5, 900);
    let group_of_vertex = |v: u32| v / 900;
    let groups = vec![
        PrimitiveRange::new(0, 300),
        PrimitiveRange::new(300, 300),
        PrimitiveRange::new(600, 300),
    ];

    for indirect in [false, true] {
        let mesh = soup.clone().with_groups(groups.clone()).unwrap();
        let options = BvhOptions::default().with_indirect(indirect);
        let bvh = MeshBvh::new(mesh, &options).unwrap();
        assert_eq!(bvh.root_count(), 3);
        assert_eq!(bvh.validate(), Ok(()));

        for (k, root) in bvh.roots().enumerate() {
            for i in 0..root.len() as u32 {
                if !root.is_leaf(i) {
                    continue;
                }

                let range = PrimitiveRange::new(root.offset(i), root.count(i));
                assert!(groups[k].contains(range.offset) && range.end() <= groups[k].end());

                for slot in range.iter() {
                    let primitive = bvh.resolve_primitive(slot);
                    let indices = bvh.source().triangle_indices(primitive);
                    assert!(indices.iter().all(|v| group_of_vertex(*v) as usize == k));
                }
            }
        }
    }
}

#[test]
fn range_option_restricts_the_build() {
    let options = BvhOptions::default().with_range(PrimitiveRange::new(100, 250));
    let bvh = MeshBvh::new(triangle_soup(6, 1000), &options).unwrap();
    let mut covered: Vec<u32> = leaf_primitives(&bvh).into_iter().flatten().collect();
    covered.sort_unstable();
    assert_eq!(covered, (100..350).collect::<Vec<_>>());

    let empty = BvhOptions::default().with_range(PrimitiveRange::new(2000, 10));
    let bvh = MeshBvh::new(triangle_soup(6, 1000), &empty).unwrap();
    assert!(bvh.is_empty());
    assert_eq!(bvh.root_count(), 0);
}

#[test]
fn progress_is_reported_up_to_completion() {
    let last = Arc::new(AtomicU32::new(0));
    let calls = Arc::new(AtomicU32::new(0));
    let (last2, calls2) = (last.clone(), calls.clone());
    let options = BvhOptions::default().with_progress(move |fraction| {
        assert!((0.0..=1.0).contains(&fraction));
        last2.store(fraction.to_bits(), Ordering::Relaxed);
        let _ = calls2.fetch_add(1, Ordering::Relaxed);
    });

    let _ = MeshBvh::new(triangle_soup(7, 1000), &options).unwrap();
    assert!(calls.load(Ordering::Relaxed) > 0);
    assert_eq!(Real::from_bits(last.load(Ordering::Relaxed)), 1.0);
}

#[test]
fn malformed_geometry_is_rejected() {
    let vertices = vec![Point::origin(); 4];
    assert!(matches!(
        TriMesh::new(vertices.clone(), Some(vec![0, 1, 2, 3])),
        Err(BvhError::MalformedGeometry { .. })
    ));
    assert!(matches!(
        TriMesh::new(vertices.clone(), Some(vec![0, 1, 7])),
        Err(BvhError::MalformedGeometry { .. })
    ));

    let mesh = TriMesh::new(vertices, Some(vec![0, 1, 2, 1, 2, 3])).unwrap();
    assert!(matches!(
        mesh.with_groups(vec![PrimitiveRange::new(0, 2), PrimitiveRange::new(1, 1)]),
        Err(BvhError::MalformedGeometry { .. })
    ));
}

#[test]
fn oversized_leaves_overflow_the_packed_count() {
    let cloud = PointCloud::new(vec![Point::new(1.0, 2.0, 3.0); 70_000]);
    match MeshBvh::new(cloud, &BvhOptions::default()) {
        Err(BvhError::EncodingOverflow { value, limit, .. }) => {
            assert_eq!(value, 70_000);
            assert_eq!(limit, 0xFFFF);
        }
        other => panic!("unexpected build result: {:?}", other.map(|b| b.node_count())),
    }
}

#[test]
fn zero_workers_are_unsupported() {
    let options = BvhOptions::default().with_workers(0, false);
    assert!(matches!(
        MeshBvh::new(point_cloud(8, 10), &options),
        Err(BvhError::UnsupportedConfiguration(_))
    ));
}

#[cfg(not(feature = "parallel"))]
#[test]
fn workers_need_the_parallel_feature() {
    for (workers, shared) in [(4, false), (1, true)] {
        let options = BvhOptions::default().with_workers(workers, shared);
        assert!(matches!(
            MeshBvh::new(point_cloud(8, 10), &options),
            Err(BvhError::UnsupportedConfiguration(_))
        ));
    }
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_builds_match_the_serial_layout() {
    let serial = MeshBvh::new(triangle_soup(9, 5000), &BvhOptions::default()).unwrap();

    for shared in [false, true] {
        let options = BvhOptions::default().with_workers(4, shared);
        let parallel = MeshBvh::new(triangle_soup(9, 5000), &options).unwrap();
        assert_eq!(parallel.validate(), Ok(()));
        assert_eq!(parallel.stats(), serial.stats());
        assert_eq!(parallel.root(0).nodes(), serial.root(0).nodes());
    }
}

#[test]
fn fixed_order_polylines_use_indirection() {
    let bvh = MeshBvh::new(random_strip(10, 200), &BvhOptions::default()).unwrap();
    let indirect = bvh.indirect_buffer().unwrap();
    let mut sorted = indirect.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..199).collect::<Vec<_>>());

    let soup = MeshBvh::new(triangle_soup(10, 200), &BvhOptions::default()).unwrap();
    assert!(soup.indirect_buffer().is_none());
}
