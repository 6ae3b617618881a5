use crate::bounding_volume::Aabb;
use crate::math::{Real, Vector, DIM};
use crate::query::{Ray, RayCast, RayIntersection};
use crate::utils::sort2;
use num::Zero;

impl Aabb {
    /// Computes the parameters of the two intersection points between a ray and this AABB.
    ///
    /// Returns `None` if the ray misses the box. The entry parameter may be negative if the ray
    /// origin is inside of the box.
    pub fn clip_ray_parameters(&self, ray: &Ray) -> Option<(Real, Real)> {
        clip_ray_slabs(self, ray, -Real::MAX, Real::MAX).map(|(near, far, _, _)| (near, far))
    }
}

/// Slab test returning the entry and exit parameters together with the axes they were
/// found on (`usize::MAX` if the bound was not tightened by any slab).
fn clip_ray_slabs(
    aabb: &Aabb,
    ray: &Ray,
    mut tmin: Real,
    mut tmax: Real,
) -> Option<(Real, Real, usize, usize)> {
    let mut near_axis = usize::MAX;
    let mut far_axis = usize::MAX;

    for i in 0usize..DIM {
        if ray.dir[i].is_zero() {
            if ray.origin[i] < aabb.mins[i] || ray.origin[i] > aabb.maxs[i] {
                return None;
            }
        } else {
            let denom = 1.0 / ray.dir[i];
            let (inter_with_near_halfspace, inter_with_far_halfspace) = sort2(
                (aabb.mins[i] - ray.origin[i]) * denom,
                (aabb.maxs[i] - ray.origin[i]) * denom,
            );

            if inter_with_near_halfspace > tmin {
                tmin = inter_with_near_halfspace;
                near_axis = i;
            }

            if inter_with_far_halfspace < tmax {
                tmax = inter_with_far_halfspace;
                far_axis = i;
            }

            if tmin > tmax {
                return None;
            }
        }
    }

    Some((tmin, tmax, near_axis, far_axis))
}

fn face_normal(ray: &Ray, axis: usize, entering: bool) -> Vector<Real> {
    if axis >= DIM {
        return Vector::zeros();
    }

    let sign = if (ray.dir[axis] > 0.0) == entering {
        -1.0
    } else {
        1.0
    };
    Vector::ith(axis, sign)
}

impl RayCast for Aabb {
    fn cast_local_ray(&self, ray: &Ray, max_toi: Real, solid: bool) -> Option<Real> {
        // This covers the case where tmax is negative because tmin is initialized at zero.
        let (tmin, tmax, _, _) = clip_ray_slabs(self, ray, 0.0, max_toi)?;

        if tmin.is_zero() && !solid {
            Some(tmax)
        } else {
            Some(tmin)
        }
    }

    #[inline]
    fn cast_local_ray_and_get_normal(
        &self,
        ray: &Ray,
        max_toi: Real,
        solid: bool,
    ) -> Option<RayIntersection> {
        let (near, far, near_axis, far_axis) = clip_ray_slabs(self, ray, -Real::MAX, Real::MAX)?;

        if near < 0.0 {
            if solid {
                Some(RayIntersection::new(0.0, Vector::zeros()))
            } else if far >= 0.0 && far <= max_toi {
                Some(RayIntersection::new(far, face_normal(ray, far_axis, false)))
            } else {
                None
            }
        } else if near <= max_toi {
            Some(RayIntersection::new(near, face_normal(ray, near_axis, true)))
        } else {
            None
        }
    }
}
