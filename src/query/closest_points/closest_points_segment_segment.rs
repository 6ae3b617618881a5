use crate::math::{Isometry, Point, Real, Vector};
use crate::shape::{Segment, SegmentPointLocation};

/// Closest points between two segments.
///
/// `seg2` is expressed in the local frame of `seg1` through `pos12`. The returned points are
/// each expressed in the local frame of their own segment.
#[inline]
pub fn closest_points_segment_segment(
    pos12: &Isometry<Real>,
    seg1: &Segment,
    seg2: &Segment,
) -> (Point<Real>, Point<Real>) {
    let (loc1, loc2) = closest_points_segment_segment_with_locations(pos12, seg1, seg2);
    (seg1.point_at(&loc1), seg2.point_at(&loc2))
}

/// Closest points between two segments, as locations on each segment.
#[inline]
pub fn closest_points_segment_segment_with_locations(
    pos12: &Isometry<Real>,
    seg1: &Segment,
    seg2: &Segment,
) -> (SegmentPointLocation, SegmentPointLocation) {
    let seg2_1 = seg2.transformed(pos12);
    let (s, t) = closest_parameters_segment_segment(
        &seg1.a,
        &seg1.scaled_direction(),
        1.0,
        &seg2_1.a,
        &seg2_1.scaled_direction(),
    );
    (location_from_parameter(s), location_from_parameter(t))
}

fn location_from_parameter(s: Real) -> SegmentPointLocation {
    if s == 0.0 {
        SegmentPointLocation::OnVertex(0)
    } else if s == 1.0 {
        SegmentPointLocation::OnVertex(1)
    } else {
        SegmentPointLocation::OnEdge([1.0 - s, s])
    }
}

/// Parameters `(s, t)` of the closest points between `orig1 + s * d1` and `orig2 + t * d2`,
/// with `s` in `[0, s_max]` and `t` in `[0, 1]`.
///
/// `s_max` may be `Real::INFINITY`, in which case the first element is a ray.
pub fn closest_parameters_segment_segment(
    orig1: &Point<Real>,
    d1: &Vector<Real>,
    s_max: Real,
    orig2: &Point<Real>,
    d2: &Vector<Real>,
) -> (Real, Real) {
    // Inspired by Real-time collision detection by Christer Ericson.
    let r = orig1 - orig2;

    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let mut s;
    let mut t;

    let _eps = crate::math::DEFAULT_EPSILON;
    if a <= _eps && e <= _eps {
        s = 0.0;
        t = 0.0;
    } else if a <= _eps {
        s = 0.0;
        t = na::clamp(f / e, 0.0, 1.0);
    } else {
        let c = d1.dot(&r);
        if e <= _eps {
            t = 0.0;
            s = na::clamp(-c / a, 0.0, s_max);
        } else {
            let b = d1.dot(d2);
            let ae = a * e;
            let bb = b * b;
            let denom = ae - bb;

            // Use absolute and ulps error to test collinearity.
            if denom > _eps && !ulps_eq!(ae, bb) {
                s = na::clamp((b * f - c * e) / denom, 0.0, s_max);
            } else {
                s = 0.0;
            }

            t = (b * s + f) / e;

            if t < 0.0 {
                t = 0.0;
                s = na::clamp(-c / a, 0.0, s_max);
            } else if t > 1.0 {
                t = 1.0;
                s = na::clamp((b - c) / a, 0.0, s_max);
            }
        }
    }

    (s, t)
}

#[cfg(test)]
mod test {
    use super::closest_points_segment_segment;
    use crate::math::{Isometry, Point};
    use crate::shape::Segment;

    #[test]
    fn crossing_and_parallel_segments() {
        let seg1 = Segment::new(Point::new(-1.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0));
        let seg2 = Segment::new(Point::new(0.5, -1.0, 2.0), Point::new(0.5, 1.0, 2.0));
        let (p1, p2) = closest_points_segment_segment(&Isometry::identity(), &seg1, &seg2);
        assert_relative_eq!(p1, Point::new(0.5, 0.0, 0.0));
        assert_relative_eq!(p2, Point::new(0.5, 0.0, 2.0));

        let seg3 = Segment::new(Point::new(3.0, 1.0, 0.0), Point::new(5.0, 1.0, 0.0));
        let (p1, p3) = closest_points_segment_segment(&Isometry::identity(), &seg1, &seg3);
        assert_relative_eq!(p1, Point::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p3, Point::new(3.0, 1.0, 0.0));
    }
}
