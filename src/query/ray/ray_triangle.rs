use crate::math::{Point, Real, Vector};
use crate::query::{Ray, RayCast, RayIntersection};
use crate::shape::Triangle;

/// Which faces of a triangle a ray can hit.
///
/// The front face is the one a ray sees when traveling against the triangle normal
/// `AB × AC`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Side {
    /// Only front faces are hit.
    #[default]
    Front,
    /// Only back faces are hit.
    Back,
    /// Both faces are hit.
    Double,
}

impl Side {
    /// Does this side setting accept a hit on the front (`true`) or back (`false`) face?
    #[inline]
    pub fn accepts(self, front_face: bool) -> bool {
        match self {
            Side::Front => front_face,
            Side::Back => !front_face,
            Side::Double => true,
        }
    }
}

/// A ray hit on a triangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleRayHit {
    /// The time of impact and the triangle normal facing the ray origin.
    pub intersection: RayIntersection,
    /// Barycentric coordinates of the hit point with respect to `a`, `b` and `c`.
    pub barycentric_coordinates: Vector<Real>,
    /// Was the front face hit?
    pub front_face: bool,
}

impl RayCast for Triangle {
    #[inline]
    fn cast_local_ray_and_get_normal(
        &self,
        ray: &Ray,
        max_toi: Real,
        _: bool,
    ) -> Option<RayIntersection> {
        let hit =
            local_ray_intersection_with_triangle(&self.a, &self.b, &self.c, ray, Side::Double)?;

        if hit.intersection.time_of_impact <= max_toi {
            Some(hit.intersection)
        } else {
            None
        }
    }
}

/// Computes the intersection between a triangle and a ray, restricted to the faces accepted by
/// `side`.
///
/// A ray lying in the plane of the triangle never hits it.
pub fn local_ray_intersection_with_triangle(
    a: &Point<Real>,
    b: &Point<Real>,
    c: &Point<Real>,
    ray: &Ray,
    side: Side,
) -> Option<TriangleRayHit> {
    let ab = *b - *a;
    let ac = *c - *a;

    // normal
    let n = ab.cross(&ac);
    let d = n.dot(&ray.dir);

    // the normal and the ray direction are parallel
    if d == 0.0 {
        return None;
    }

    let front_face = d < 0.0;
    if !side.accepts(front_face) {
        return None;
    }

    let ap = ray.origin - *a;
    let t = ap.dot(&n);

    // the ray does not intersect the halfspace defined by the triangle
    if (t < 0.0 && d < 0.0) || (t > 0.0 && d > 0.0) {
        return None;
    }

    let d = d.abs();

    //
    // intersection: compute barycentric coordinates
    //
    let e = -ray.dir.cross(&ap);

    let mut v;
    let mut w;
    let toi;
    let normal;

    if t < 0.0 {
        v = -ac.dot(&e);

        if v < 0.0 || v > d {
            return None;
        }

        w = ab.dot(&e);

        if w < 0.0 || v + w > d {
            return None;
        }

        let invd = 1.0 / d;
        toi = -t * invd;
        normal = -n.normalize();
        v *= invd;
        w *= invd;
    } else {
        v = ac.dot(&e);

        if v < 0.0 || v > d {
            return None;
        }

        w = -ab.dot(&e);

        if w < 0.0 || v + w > d {
            return None;
        }

        let invd = 1.0 / d;
        toi = t * invd;
        normal = n.normalize();
        v *= invd;
        w *= invd;
    }

    Some(TriangleRayHit {
        intersection: RayIntersection::new(toi, normal),
        barycentric_coordinates: Vector::new(-v - w + 1.0, v, w),
        front_face,
    })
}
