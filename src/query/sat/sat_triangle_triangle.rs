use crate::math::{Real, Vector};
use crate::query::sat::{intervals_separated, is_valid_axis, point_set_extents_on_axis};
use crate::shape::Triangle;

/// Finds an axis separating two triangles, if any.
///
/// Tests both normals, the nine edge-edge cross products, and the in-plane edge normals of
/// each triangle so that coplanar triangles are handled too.
pub fn triangle_triangle_find_separating_axis(
    tri1: &Triangle,
    tri2: &Triangle,
) -> Option<Vector<Real>> {
    let pts1 = tri1.vertices();
    let pts2 = tri2.vertices();
    let n1 = tri1.scaled_normal();
    let n2 = tri2.scaled_normal();
    let edges1 = tri1.edges_scaled_directions();
    let edges2 = tri2.edges_scaled_directions();

    let separates = |axis: &Vector<Real>| {
        is_valid_axis(axis)
            && intervals_separated(
                point_set_extents_on_axis(&pts1, axis),
                point_set_extents_on_axis(&pts2, axis),
            )
    };

    if separates(&n1) {
        return Some(n1);
    }

    if separates(&n2) {
        return Some(n2);
    }

    for e1 in &edges1 {
        for e2 in &edges2 {
            let axis = e1.cross(e2);
            if separates(&axis) {
                return Some(axis);
            }
        }
    }

    for e1 in &edges1 {
        let axis = n1.cross(e1);
        if separates(&axis) {
            return Some(axis);
        }
    }

    for e2 in &edges2 {
        let axis = n2.cross(e2);
        if separates(&axis) {
            return Some(axis);
        }
    }

    None
}

/// Do two triangles intersect?
#[inline]
pub fn triangle_triangle_intersect(tri1: &Triangle, tri2: &Triangle) -> bool {
    triangle_triangle_find_separating_axis(tri1, tri2).is_none()
}
