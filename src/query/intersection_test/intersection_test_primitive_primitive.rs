use crate::math::{Isometry, Real, DEFAULT_EPSILON};
use crate::query::closest_points::closest_points_primitive_primitive;
use crate::query::sat;
use crate::shape::Primitive;

/// Tests whether two mesh primitives intersect.
///
/// `prim2` is expressed in the local frame of `prim1` through `pos12`. Triangle pairs use an
/// exact separating-axis test; pairs involving points or segments are considered intersecting
/// when their distance does not exceed the default epsilon.
pub fn intersection_test_primitive_primitive(
    pos12: &Isometry<Real>,
    prim1: &Primitive,
    prim2: &Primitive,
) -> bool {
    match (prim1, prim2) {
        (Primitive::Triangle(tri1), Primitive::Triangle(tri2)) => {
            sat::triangle_triangle_intersect(tri1, &tri2.transformed(pos12))
        }
        _ => {
            let (pt1, pt2) = closest_points_primitive_primitive(pos12, prim1, prim2);
            na::distance_squared(&pt1, &(pos12 * pt2)) <= DEFAULT_EPSILON * DEFAULT_EPSILON
        }
    }
}
