//! Shapes supported by meshbvh.
//!
//! The primitives a BVH indexes ([`Triangle`], [`Segment`] and points) and the geometry
//! providers that expose them ([`TriMesh`], [`Polyline`], [`PointCloud`]).

pub use self::point_cloud::PointCloud;
pub use self::polyline::{Polyline, PolylineMode};
pub use self::primitive::{Primitive, PrimitiveKind, PrimitiveRange};
pub use self::primitive_source::PrimitiveSource;
pub use self::segment::{Segment, SegmentPointLocation};
pub use self::triangle::{Triangle, TrianglePointLocation};
pub use self::trimesh::TriMesh;

mod point_cloud;
mod polyline;
mod primitive;
pub(crate) mod primitive_source;
mod segment;
mod triangle;
mod trimesh;
