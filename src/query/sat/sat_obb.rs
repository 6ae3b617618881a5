use crate::bounding_volume::{Aabb, OrientedBox};
use crate::math::{Isometry, Real, Vector};
use crate::query::sat::{intervals_separated, is_valid_axis, point_set_extents_on_axis};
use crate::shape::{Segment, Triangle};

/// Finds an axis separating two oriented boxes, if any.
///
/// Tests the 3 face normals of each box and the 9 cross products of their axes.
pub fn obb_obb_find_separating_axis(
    obb1: &OrientedBox,
    obb2: &OrientedBox,
) -> Option<Vector<Real>> {
    let axes1 = obb1.axes();
    let axes2 = obb2.axes();

    let separates = |axis: &Vector<Real>| {
        is_valid_axis(axis)
            && intervals_separated(obb1.extents_on_axis(axis), obb2.extents_on_axis(axis))
    };

    for axis in axes1.iter().chain(axes2.iter()) {
        if separates(axis) {
            return Some(*axis);
        }
    }

    for a1 in &axes1 {
        for a2 in &axes2 {
            let axis = a1.cross(a2);
            if separates(&axis) {
                return Some(axis);
            }
        }
    }

    None
}

/// Finds an axis separating an oriented box and an AABB, if any.
#[inline]
pub fn obb_aabb_find_separating_axis(obb: &OrientedBox, aabb: &Aabb) -> Option<Vector<Real>> {
    let aabb_as_obb = OrientedBox::from_aabb(aabb, &Isometry::identity());
    obb_obb_find_separating_axis(obb, &aabb_as_obb)
}

/// Finds an axis separating an oriented box and a triangle, if any.
///
/// Tests the 3 box axes, the triangle normal, and the 9 cross products between box axes and
/// triangle edges.
pub fn obb_triangle_find_separating_axis(
    obb: &OrientedBox,
    triangle: &Triangle,
) -> Option<Vector<Real>> {
    let pts = triangle.vertices();
    let separates = |axis: &Vector<Real>| {
        is_valid_axis(axis)
            && intervals_separated(
                obb.extents_on_axis(axis),
                point_set_extents_on_axis(&pts, axis),
            )
    };

    let axes = obb.axes();
    for axis in &axes {
        if separates(axis) {
            return Some(*axis);
        }
    }

    let normal = triangle.scaled_normal();
    if separates(&normal) {
        return Some(normal);
    }

    for axis in &axes {
        for edge in &triangle.edges_scaled_directions() {
            let cross = axis.cross(edge);
            if separates(&cross) {
                return Some(cross);
            }
        }
    }

    None
}

/// Finds an axis separating an oriented box and a segment, if any.
pub fn obb_segment_find_separating_axis(
    obb: &OrientedBox,
    segment: &Segment,
) -> Option<Vector<Real>> {
    let pts = [segment.a, segment.b];
    let separates = |axis: &Vector<Real>| {
        is_valid_axis(axis)
            && intervals_separated(
                obb.extents_on_axis(axis),
                point_set_extents_on_axis(&pts, axis),
            )
    };

    let dir = segment.scaled_direction();
    let axes = obb.axes();

    for axis in &axes {
        if separates(axis) {
            return Some(*axis);
        }
    }

    for axis in &axes {
        let cross = axis.cross(&dir);
        if separates(&cross) {
            return Some(cross);
        }
    }

    None
}
