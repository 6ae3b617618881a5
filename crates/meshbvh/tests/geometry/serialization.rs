use crate::meshes::{random_strip, triangle_soup};
use meshbvh::math::{Point, Vector};
use meshbvh::partitioning::{
    BvhError, BvhOptions, DeserializeOptions, MeshBvh, PackedTreeView, RaycastOptions,
    SerializedBvh, PACKED_NODE_SIZE,
};
use meshbvh::query::{Ray, Side};
use meshbvh::shape::PrimitiveSource;

fn same_answers<S1, S2>(bvh1: &MeshBvh<S1>, bvh2: &MeshBvh<S2>)
where
    S1: PrimitiveSource,
    S2: PrimitiveSource,
{
    let options = RaycastOptions {
        side: Side::Double,
        threshold: 0.1,
        ..Default::default()
    };
    let mut rng = oorandom::Rand32::new(60);

    for _ in 0..50 {
        let origin = Point::new(rng.rand_float(), rng.rand_float(), -5.0) * 10.0;
        let ray = Ray::new(origin, Vector::new(0.1, -0.2, 1.0));
        let mut hits1 = bvh1.raycast(&ray, &options);
        let mut hits2 = bvh2.raycast(&ray, &options);
        hits1.sort_by_key(|hit| hit.primitive);
        hits2.sort_by_key(|hit| hit.primitive);
        assert_eq!(hits1, hits2);
    }
}

#[test]
fn reordered_tree_round_trips() {
    let bvh = MeshBvh::new(triangle_soup(61, 2000), &BvhOptions::default()).unwrap();
    let data = bvh.serialize();
    assert!(data.indirect_buffer.is_none());
    assert_eq!(data.roots[0].len(), bvh.node_count() * PACKED_NODE_SIZE);

    // The source handed back was reordered by the build.
    let restored =
        MeshBvh::deserialize(&data, bvh.source().clone(), &DeserializeOptions::default()).unwrap();
    assert_eq!(restored.root(0).nodes(), bvh.root(0).nodes());
    assert_eq!(restored.validate(), Ok(()));
    same_answers(&bvh, &restored);

    // The original mesh gets its connectivity from the serialized index.
    let options = DeserializeOptions { set_index: true };
    let restored = MeshBvh::deserialize(&data, triangle_soup(61, 2000), &options).unwrap();
    assert_eq!(restored.source().index_buffer(), bvh.source().index_buffer());
    assert_eq!(restored.validate(), Ok(()));
    same_answers(&bvh, &restored);
}

#[test]
fn indirect_tree_round_trips() {
    let bvh = MeshBvh::new(random_strip(62, 500), &BvhOptions::default()).unwrap();
    let data = bvh.serialize();
    assert!(data.indirect_buffer.is_some());

    let restored =
        MeshBvh::deserialize(&data, random_strip(62, 500), &DeserializeOptions::default()).unwrap();
    assert_eq!(restored.indirect_buffer(), bvh.indirect_buffer());
    assert!(restored.options().indirect);
    same_answers(&bvh, &restored);
}

#[test]
fn root_bytes_can_be_viewed_in_place() {
    let bvh = MeshBvh::new(triangle_soup(63, 300), &BvhOptions::default()).unwrap();
    let bytes = bvh.root(0).to_bytes();
    let view = PackedTreeView::from_bytes(&bytes).unwrap();

    assert_eq!(view.len(), bvh.node_count());
    assert_eq!(view.nodes(), bvh.root(0).nodes());
    assert!(matches!(
        PackedTreeView::from_bytes(&bytes[..bytes.len() - 4]),
        Err(BvhError::InvalidBuffer { .. })
    ));
}

#[test]
fn corrupted_records_are_rejected() {
    let bvh = MeshBvh::new(triangle_soup(64, 300), &BvhOptions::default()).unwrap();
    let data = bvh.serialize();

    // Point the right child of the root past the end of the buffer.
    let mut corrupted: SerializedBvh = data.clone();
    corrupted.roots[0][24..28].copy_from_slice(&u32::MAX.to_le_bytes());
    assert!(matches!(
        MeshBvh::deserialize(&corrupted, bvh.source().clone(), &DeserializeOptions::default()),
        Err(BvhError::MalformedGeometry { .. })
    ));

    // A smaller mesh than the one the tree was built for.
    assert!(matches!(
        MeshBvh::deserialize(&data, triangle_soup(64, 10), &DeserializeOptions::default()),
        Err(BvhError::MalformedGeometry { .. })
    ));
}

#[test]
fn corrupted_indirect_table_is_rejected() {
    let bvh = MeshBvh::new(random_strip(65, 100), &BvhOptions::default()).unwrap();
    let mut data = bvh.serialize();
    let count = bvh.source().primitive_count();
    assert_eq!(data.indirect_buffer.as_ref().map(|b| b.len() as u32), Some(count));

    data.indirect_buffer.as_mut().unwrap()[0] = 5000;
    assert!(matches!(
        MeshBvh::deserialize(&data, bvh.source().clone(), &DeserializeOptions::default()),
        Err(BvhError::MalformedGeometry { .. })
    ));
}
