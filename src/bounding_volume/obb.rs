//! Oriented bounding box.

use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real, Translation, Vector, DIM};
use crate::query::sat;
use crate::shape::{Segment, Triangle};
use crate::utils::{self, IsometryOps};
use na::{Rotation3, UnitQuaternion};

/// An Oriented Bounding Box (OBB).
///
/// The box is centered on `pos.translation` with its local axes given by `pos.rotation`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct OrientedBox {
    /// The position of the box center and the orientation of its axes.
    pub pos: Isometry<Real>,
    /// The half-lengths of the box along each of its local axes.
    pub half_extents: Vector<Real>,
}

impl OrientedBox {
    /// Creates a new oriented box.
    #[inline]
    pub fn new(pos: Isometry<Real>, half_extents: Vector<Real>) -> Self {
        Self { pos, half_extents }
    }

    /// The box occupied by `aabb` once moved by `pos`.
    #[inline]
    pub fn from_aabb(aabb: &Aabb, pos: &Isometry<Real>) -> Self {
        let center = pos * aabb.center();
        Self::new(
            Isometry::from_parts(Translation::from(center.coords), pos.rotation),
            aabb.half_extents(),
        )
    }

    /// Computes an oriented bounding box for the given set of points.
    ///
    /// The box axes are the principal axes of the point covariance. The result is not
    /// guaranteed to be the smallest enclosing box. Returns `None` for an empty set.
    pub fn from_points(pts: &[Point<Real>]) -> Option<Self> {
        if pts.is_empty() {
            return None;
        }

        let cov = utils::cov(pts);
        let mut eigv = cov.symmetric_eigen().eigenvectors;

        if eigv.determinant() < 0.0 {
            eigv = -eigv;
        }

        let mut mins = Vector::repeat(Real::MAX);
        let mut maxs = Vector::repeat(-Real::MAX);

        for pt in pts {
            for i in 0..DIM {
                let dot = eigv.column(i).dot(&pt.coords);
                mins[i] = mins[i].min(dot);
                maxs[i] = maxs[i].max(dot);
            }
        }

        let rot = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(eigv));

        Some(Self::new(
            rot * Translation::from((maxs + mins) / 2.0),
            (maxs - mins) / 2.0,
        ))
    }

    /// The center of this box.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::from(self.pos.translation.vector)
    }

    /// The unit axes of this box, in world space.
    #[inline]
    pub fn axes(&self) -> [Vector<Real>; DIM] {
        let rot = self.pos.rotation_matrix();
        [
            rot.column(0).into_owned(),
            rot.column(1).into_owned(),
            rot.column(2).into_owned(),
        ]
    }

    /// The eight corners of this box.
    pub fn vertices(&self) -> [Point<Real>; 8] {
        Aabb::from_half_extents(Point::origin(), self.half_extents)
            .vertices()
            .map(|pt| self.pos * pt)
    }

    /// The smallest AABB enclosing this box.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_half_extents(Point::origin(), self.half_extents).transform_by(&self.pos)
    }

    /// This box moved by `m`.
    #[inline]
    pub fn transform_by(&self, m: &Isometry<Real>) -> Self {
        Self::new(m * self.pos, self.half_extents)
    }

    /// The min and max of the dot products between the points of this box and `axis`.
    #[inline]
    pub fn extents_on_axis(&self, axis: &Vector<Real>) -> (Real, Real) {
        let center = self.pos.translation.vector.dot(axis);
        let local_axis = self.pos.inverse_transform_vector(axis);
        let radius = local_axis.abs().dot(&self.half_extents);
        (center - radius, center + radius)
    }

    /// Does this box contain the given point?
    #[inline]
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        let local = self.pos.inverse_transform_point(pt);
        (0..DIM).all(|i| local[i].abs() <= self.half_extents[i])
    }

    /// The point of this box closest to `pt`.
    #[inline]
    pub fn clamp_point(&self, pt: &Point<Real>) -> Point<Real> {
        let local = self.pos.inverse_transform_point(pt);
        let clamped = local.coords.sup(&-self.half_extents).inf(&self.half_extents);
        self.pos * Point::from(clamped)
    }

    /// The squared distance between `pt` and this box. Zero inside of the box.
    #[inline]
    pub fn distance_squared_to_point(&self, pt: &Point<Real>) -> Real {
        na::distance_squared(pt, &self.clamp_point(pt))
    }

    /// Does this box fully contain `aabb`?
    #[inline]
    pub fn contains_aabb(&self, aabb: &Aabb) -> bool {
        aabb.vertices().iter().all(|pt| self.contains_point(pt))
    }

    /// Does this box intersect `aabb`?
    #[inline]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        sat::obb_aabb_find_separating_axis(self, aabb).is_none()
    }

    /// Does this box intersect another one?
    #[inline]
    pub fn intersects_obb(&self, other: &OrientedBox) -> bool {
        sat::obb_obb_find_separating_axis(self, other).is_none()
    }

    /// Does this box intersect `triangle`?
    #[inline]
    pub fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        sat::obb_triangle_find_separating_axis(self, triangle).is_none()
    }

    /// Does this box intersect `segment`?
    #[inline]
    pub fn intersects_segment(&self, segment: &Segment) -> bool {
        sat::obb_segment_find_separating_axis(self, segment).is_none()
    }
}
