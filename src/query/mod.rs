//! Non-persistent geometric queries.
//!
//! Exact primitive-level tests used at the leaves of a [`MeshBvh`](crate::partitioning::MeshBvh):
//! ray casts, point projection, closest points and separating-axis intersection tests.

pub use self::closest_points::closest_points_primitive_primitive;
pub use self::intersection_test::intersection_test_primitive_primitive;
pub use self::point::{PointProjection, PointQuery, PointQueryWithLocation};
pub use self::ray::{
    local_ray_intersection_with_triangle, ray_toi_with_ball, ray_toi_with_point,
    ray_toi_with_segment, Ray, RayCast, RayIntersection, SegmentRayHit, Side, TriangleRayHit,
};

pub mod closest_points;
pub mod intersection_test;
mod point;
mod ray;
pub mod sat;
