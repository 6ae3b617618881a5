use crate::math::{Point, Real};
use crate::query::closest_points::closest_parameters_segment_segment;
use crate::query::Ray;
use crate::shape::Segment;

/// A ray passing within some distance of a segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentRayHit {
    /// The ray parameter of the point of the ray closest to the segment.
    pub time_of_impact: Real,
    /// The point of the segment closest to the ray.
    pub point: Point<Real>,
    /// The parameter of `point` along the segment, `0` at `a` and `1` at `b`.
    pub segment_parameter: Real,
    /// The distance between the ray and the segment.
    pub distance: Real,
}

/// Tests whether a ray passes within `threshold` of a segment.
pub fn ray_toi_with_segment(
    ray: &Ray,
    segment: &Segment,
    threshold: Real,
) -> Option<SegmentRayHit> {
    let (s, t) = closest_parameters_segment_segment(
        &ray.origin,
        &ray.dir,
        Real::INFINITY,
        &segment.a,
        &segment.scaled_direction(),
    );

    let on_ray = ray.point_at(s);
    let point = segment.a + segment.scaled_direction() * t;
    let dist_sq = na::distance_squared(&on_ray, &point);

    (dist_sq <= threshold * threshold).then(|| SegmentRayHit {
        time_of_impact: s,
        point,
        segment_parameter: t,
        distance: dist_sq.sqrt(),
    })
}
