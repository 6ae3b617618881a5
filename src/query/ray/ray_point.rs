use crate::math::{Point, Real};
use crate::query::Ray;

/// Tests whether a ray passes within `threshold` of a point.
///
/// Returns the ray parameter of the point of the ray closest to `point`, and the distance
/// between the two.
pub fn ray_toi_with_point(ray: &Ray, point: &Point<Real>, threshold: Real) -> Option<(Real, Real)> {
    let dir_sq = ray.dir.norm_squared();
    let toi = if dir_sq > 0.0 {
        ((point - ray.origin).dot(&ray.dir) / dir_sq).max(0.0)
    } else {
        0.0
    };

    let dist_sq = na::distance_squared(&ray.point_at(toi), point);
    (dist_sq <= threshold * threshold).then(|| (toi, dist_sq.sqrt()))
}

#[cfg(test)]
mod test {
    use super::ray_toi_with_point;
    use crate::math::{Point, Vector};
    use crate::query::{ray_toi_with_segment, Ray};
    use crate::shape::Segment;

    #[test]
    fn thin_primitives_are_hit_within_threshold() {
        let ray = Ray::new(Point::origin(), Vector::x());
        let (toi, dist) = ray_toi_with_point(&ray, &Point::new(3.0, 0.05, 0.0), 0.1).unwrap();
        assert_relative_eq!(toi, 3.0);
        assert_relative_eq!(dist, 0.05, epsilon = 1.0e-6);
        assert!(ray_toi_with_point(&ray, &Point::new(3.0, 0.5, 0.0), 0.1).is_none());
        assert!(ray_toi_with_point(&ray, &Point::new(-3.0, 0.0, 0.0), 0.1).is_none());

        let seg = Segment::new(Point::new(2.0, -1.0, 0.05), Point::new(2.0, 1.0, 0.05));
        let hit = ray_toi_with_segment(&ray, &seg, 0.1).unwrap();
        assert_relative_eq!(hit.time_of_impact, 2.0);
        assert_relative_eq!(hit.segment_parameter, 0.5);
        assert!(ray_toi_with_segment(&ray, &seg, 0.01).is_none());
    }
}
