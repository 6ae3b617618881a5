use crate::meshes::triangle_soup;
use meshbvh::math::{Point, Real, Vector};
use meshbvh::partitioning::{
    BvhOptions, MeshBvh, NodeVisit, RaycastOptions, RefitFilter, TraversalAction,
};
use meshbvh::query::{Ray, Side};
use meshbvh::shape::PrimitiveSource;

fn wave(pt: &mut Point<Real>) {
    pt.z += (pt.x * 0.7).sin() * 2.0;
    pt.y *= 1.3;
}

#[test]
fn refitted_tree_answers_like_a_rebuilt_one() {
    let mut refitted = MeshBvh::new(triangle_soup(50, 2000), &BvhOptions::default()).unwrap();
    refitted.source_mut().vertices_mut().iter_mut().for_each(wave);
    assert!(refitted.refit() > 0);
    assert_eq!(refitted.validate(), Ok(()));

    let mut rebuilt = MeshBvh::new(refitted.source().clone(), &BvhOptions::default()).unwrap();
    rebuilt.rebuild().unwrap();

    let options = RaycastOptions {
        side: Side::Double,
        ..Default::default()
    };
    let mut rng = oorandom::Rand32::new(51);
    for _ in 0..100 {
        let origin = Point::new(rng.rand_float(), rng.rand_float(), rng.rand_float()) * 10.0
            - Vector::new(0.0, 0.0, 20.0);
        let ray = Ray::new(origin, Vector::new(0.0, 0.0, 1.0));

        let tois = |bvh: &MeshBvh<_>| {
            let mut result: Vec<Real> = bvh
                .raycast(&ray, &options)
                .iter()
                .map(|hit| hit.time_of_impact)
                .collect();
            result.sort_by(Real::total_cmp);
            result
        };
        assert_eq!(tois(&refitted), tois(&rebuilt));
    }
}

#[test]
fn partial_refit_of_edited_leaves() {
    let options = BvhOptions::default().with_max_leaf_size(4);
    let mut bvh = MeshBvh::new(triangle_soup(52, 1000), &options).unwrap();

    // Lift every triangle of the first leaves found.
    let mut leaves = vec![];
    let mut edited = vec![];
    bvh.traverse_nodes(|node, _, _, visit| {
        if let NodeVisit::Leaf { primitives } = visit {
            leaves.push(node);
            edited.extend(primitives.iter());
            if leaves.len() == 5 {
                return TraversalAction::EarlyExit;
            }
        }
        TraversalAction::Continue
    });

    for primitive in edited {
        let indices = bvh.source().triangle_indices(primitive);
        for v in indices {
            bvh.source_mut().vertices_mut()[v as usize].y += 3.0;
        }
    }

    let filter = RefitFilter::from_leaves(&bvh, &leaves);
    assert!(bvh.refit_partial(&filter) >= leaves.len());
    assert_eq!(bvh.validate(), Ok(()));
    assert_eq!(bvh.refit(), 0);
}
