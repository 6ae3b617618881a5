//! Spatial partitioning tools.
//!
//! [`MeshBvh`] is a bounding volume hierarchy over the primitives of a
//! [`PrimitiveSource`](crate::shape::PrimitiveSource), stored as packed node records.

pub use self::bvh::*;

mod bvh;
