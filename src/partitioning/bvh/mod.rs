pub use bvh_bounds::PrimitiveBounds;
pub use bvh_error::{BvhError, BvhValidationError};
pub use bvh_options::{BvhOptions, ProgressCallback, SahParams, SplitStrategy};
pub use bvh_packed::{
    nodes_to_le_bytes, PackedNode, PackedTreeView, LEAF_SENTINEL, MAX_LEAF_COUNT,
    PACKED_NODE_SIZE,
};
pub use bvh_queries::{ClosestGeometryHit, ClosestPointHit};
pub use bvh_raycast::{raycast_primitive, MeshRayHit, RayHitDetail, RaycastOptions};
pub use bvh_refit::RefitFilter;
pub use bvh_serialize::{DeserializeOptions, SerializedBvh, SERIALIZATION_VERSION};
pub use bvh_traverse::{
    BoundsIntersection, LeafPrimitives, NodeVisit, ShapeCast, TraversalAction, VisitStatus,
};
pub use bvh_traverse_bvtt::BvhCastVisitor;
pub use bvh_tree::MeshBvh;
pub use bvh_validation::BvhStats;

pub(crate) mod bvh_bounds;
mod bvh_build;
mod bvh_error;
mod bvh_options;
mod bvh_packed;
#[cfg(feature = "parallel")]
mod bvh_parallel_build;
pub(crate) mod bvh_partition;
mod bvh_queries;
mod bvh_raycast;
mod bvh_refit;
mod bvh_serialize;
pub(crate) mod bvh_split;
mod bvh_traverse;
mod bvh_traverse_bvtt;
mod bvh_tree;
mod bvh_validation;
