//! Ray-casting related definitions and implementations.

#[doc(inline)]
pub use self::ray::{Ray, RayCast, RayIntersection};
pub use self::ray_bounding_sphere::ray_toi_with_ball;
pub use self::ray_point::ray_toi_with_point;
pub use self::ray_segment::{ray_toi_with_segment, SegmentRayHit};
pub use self::ray_triangle::{local_ray_intersection_with_triangle, Side, TriangleRayHit};

#[doc(hidden)]
pub mod ray;
mod ray_aabb;
mod ray_bounding_sphere;
mod ray_point;
mod ray_segment;
mod ray_triangle;
