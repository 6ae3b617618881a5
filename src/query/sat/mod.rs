//! Application of the Separating Axis Theorem (SAT) for intersection tests.
//!
//! Two convex shapes are disjoint if and only if their projections on some axis do not
//! overlap. For the polyhedra handled here, the candidate axes are the face normals of both
//! shapes and the cross products of their edge directions.

pub use self::sat_obb::*;
pub use self::sat_triangle_triangle::*;

mod sat_obb;
mod sat_triangle_triangle;

use crate::math::{Point, Real, Vector};

/// The min and max of the dot products between `pts` and `axis`.
#[inline]
pub fn point_set_extents_on_axis(pts: &[Point<Real>], axis: &Vector<Real>) -> (Real, Real) {
    pts.iter()
        .map(|pt| pt.coords.dot(axis))
        .fold((Real::MAX, -Real::MAX), |(min, max), d| (min.min(d), max.max(d)))
}

/// Are the intervals `a` and `b` disjoint?
#[inline]
pub fn intervals_separated(a: (Real, Real), b: (Real, Real)) -> bool {
    a.1 < b.0 || b.1 < a.0
}

/// Candidate axes with a norm too small to be meaningful are skipped.
#[inline]
pub(crate) fn is_valid_axis(axis: &Vector<Real>) -> bool {
    axis.norm_squared() > crate::math::DEFAULT_EPSILON * crate::math::DEFAULT_EPSILON
}
