use crate::bounding_volume::BoundingSphere;
use crate::math::{Real, Vector};
use crate::query::{Ray, RayCast, RayIntersection};

/// Computes the time of impact of a ray on a ball centered at the origin.
///
/// The first result element is `true` if the ray started inside of the ball.
#[inline]
pub fn ray_toi_with_ball(
    radius: Real,
    ray: &Ray,
    max_toi: Real,
    solid: bool,
) -> (bool, Option<Real>) {
    let dcenter = ray.origin.coords;

    let a = ray.dir.norm_squared();
    let b = dcenter.dot(&ray.dir);
    let c = dcenter.norm_squared() - radius * radius;

    // Special case for when the dir is zero.
    if a == 0.0 {
        if c > 0.0 {
            return (false, None);
        } else {
            return (true, Some(0.0));
        }
    }

    if c > 0.0 && b > 0.0 {
        (false, None)
    } else {
        let delta = b * b - a * c;

        if delta < 0.0 {
            // no solution
            (false, None)
        } else {
            let t = (-b - delta.sqrt()) / a;

            if t <= 0.0 {
                // origin inside of the ball
                if solid {
                    (true, Some(0.0))
                } else {
                    let t = (-b + delta.sqrt()) / a;
                    (true, (t <= max_toi).then_some(t))
                }
            } else if t <= max_toi {
                (false, Some(t))
            } else {
                (false, None)
            }
        }
    }
}

impl RayCast for BoundingSphere {
    #[inline]
    fn cast_local_ray_and_get_normal(
        &self,
        ray: &Ray,
        max_toi: Real,
        solid: bool,
    ) -> Option<RayIntersection> {
        let centered_ray = ray.translate_by(-self.center().coords);
        let (inside, toi) = ray_toi_with_ball(self.radius(), &centered_ray, max_toi, solid);
        let toi = toi?;

        let pos = centered_ray.point_at(toi).coords;
        let normal = pos.try_normalize(crate::math::DEFAULT_EPSILON).unwrap_or_else(Vector::zeros);

        if inside && !solid {
            Some(RayIntersection::new(toi, -normal))
        } else {
            Some(RayIntersection::new(toi, normal))
        }
    }
}
