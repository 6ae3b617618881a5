use crate::math::{Isometry, Point, Real};
use crate::query::closest_points::closest_points_segment_segment;
use crate::query::{local_ray_intersection_with_triangle, PointQuery, Ray, Side};
use crate::shape::{Primitive, Segment, Triangle};

/// Closest points between two mesh primitives.
///
/// `prim2` is expressed in the local frame of `prim1` through `pos12`. The returned points are
/// each expressed in the local frame of their own primitive. Intersecting primitives yield
/// two coincident points.
pub fn closest_points_primitive_primitive(
    pos12: &Isometry<Real>,
    prim1: &Primitive,
    prim2: &Primitive,
) -> (Point<Real>, Point<Real>) {
    let prim2_1 = prim2.transformed(pos12);
    let (pt1, pt2_1) = closest_points_local(prim1, &prim2_1);
    (pt1, pos12.inverse_transform_point(&pt2_1))
}

fn closest_points_local(prim1: &Primitive, prim2: &Primitive) -> (Point<Real>, Point<Real>) {
    match (prim1, prim2) {
        (Primitive::Point(a), Primitive::Point(b)) => (*a, *b),
        (Primitive::Point(a), Primitive::Segment(s)) => (*a, s.project_local_point(a).point),
        (Primitive::Point(a), Primitive::Triangle(t)) => (*a, t.project_local_point(a).point),
        (Primitive::Segment(s1), Primitive::Segment(s2)) => {
            closest_points_segment_segment(&Isometry::identity(), s1, s2)
        }
        (Primitive::Segment(s), Primitive::Triangle(t)) => closest_points_segment_triangle(s, t),
        (Primitive::Triangle(t1), Primitive::Triangle(t2)) => {
            closest_points_triangle_triangle(t1, t2)
        }
        (Primitive::Segment(_) | Primitive::Triangle(_), _) => {
            let (pt2, pt1) = closest_points_local(prim2, prim1);
            (pt1, pt2)
        }
    }
}

/// The point where `segment` crosses `triangle`, if any.
pub fn segment_triangle_crossing(segment: &Segment, triangle: &Triangle) -> Option<Point<Real>> {
    let ray = Ray::new(segment.a, segment.scaled_direction());
    let hit = local_ray_intersection_with_triangle(
        &triangle.a,
        &triangle.b,
        &triangle.c,
        &ray,
        Side::Double,
    )?;
    (hit.intersection.time_of_impact <= 1.0).then(|| ray.point_at(hit.intersection.time_of_impact))
}

#[derive(Copy, Clone)]
struct Candidate {
    dist_sq: Real,
    pt1: Point<Real>,
    pt2: Point<Real>,
}

impl Candidate {
    fn new(pt1: Point<Real>, pt2: Point<Real>) -> Self {
        Self {
            dist_sq: na::distance_squared(&pt1, &pt2),
            pt1,
            pt2,
        }
    }

    fn keep_closest(&mut self, other: Candidate) {
        if other.dist_sq < self.dist_sq {
            *self = other;
        }
    }
}

/// Closest points between a segment and a triangle expressed in the same frame.
pub fn closest_points_segment_triangle(
    segment: &Segment,
    triangle: &Triangle,
) -> (Point<Real>, Point<Real>) {
    if let Some(pt) = segment_triangle_crossing(segment, triangle) {
        return (pt, pt);
    }

    let mut best = Candidate::new(segment.a, triangle.project_local_point(&segment.a).point);
    best.keep_closest(Candidate::new(
        segment.b,
        triangle.project_local_point(&segment.b).point,
    ));

    for edge in &triangle.edges() {
        let (pt1, pt2) = closest_points_segment_segment(&Isometry::identity(), segment, edge);
        best.keep_closest(Candidate::new(pt1, pt2));
    }

    (best.pt1, best.pt2)
}

/// Closest points between two triangles expressed in the same frame.
pub fn closest_points_triangle_triangle(
    tri1: &Triangle,
    tri2: &Triangle,
) -> (Point<Real>, Point<Real>) {
    let edges1 = tri1.edges();
    let edges2 = tri2.edges();

    for edge in &edges1 {
        if let Some(pt) = segment_triangle_crossing(edge, tri2) {
            return (pt, pt);
        }
    }

    for edge in &edges2 {
        if let Some(pt) = segment_triangle_crossing(edge, tri1) {
            return (pt, pt);
        }
    }

    let mut best = Candidate::new(tri1.a, tri2.project_local_point(&tri1.a).point);

    for pt in &tri1.vertices()[1..] {
        best.keep_closest(Candidate::new(*pt, tri2.project_local_point(pt).point));
    }

    for pt in &tri2.vertices() {
        best.keep_closest(Candidate::new(tri1.project_local_point(pt).point, *pt));
    }

    for e1 in &edges1 {
        for e2 in &edges2 {
            let (pt1, pt2) = closest_points_segment_segment(&Isometry::identity(), e1, e2);
            best.keep_closest(Candidate::new(pt1, pt2));
        }
    }

    (best.pt1, best.pt2)
}

#[cfg(test)]
mod test {
    use super::closest_points_primitive_primitive;
    use crate::math::{Isometry, Point, Vector};
    use crate::shape::{Primitive, Segment, Triangle};

    #[test]
    fn stacked_triangles() {
        let tri = Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        );
        let pos12 = Isometry::translation(0.0, 0.0, 2.0);
        let (pt1, pt2) = closest_points_primitive_primitive(
            &pos12,
            &Primitive::Triangle(tri),
            &Primitive::Triangle(tri),
        );
        assert_relative_eq!(na::distance(&pt1, &(pos12 * pt2)), 2.0);
    }

    #[test]
    fn segment_through_triangle() {
        let tri = Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
        );
        let seg = Segment::new(Point::new(0.5, 0.5, -1.0), Point::new(0.5, 0.5, 1.0));
        let (pt1, pt2) = closest_points_primitive_primitive(
            &Isometry::identity(),
            &Primitive::Segment(seg),
            &Primitive::Triangle(tri),
        );
        assert_relative_eq!(pt1, Point::new(0.5, 0.5, 0.0));
        assert_relative_eq!(pt2, pt1);

        let (pt_tri, pt_seg) = closest_points_primitive_primitive(
            &Isometry::translation(3.0, 0.0, 0.0),
            &Primitive::Triangle(tri),
            &Primitive::Segment(seg),
        );
        assert_relative_eq!(pt_seg, Point::new(0.5, 0.5, 0.0));
        assert_relative_eq!(
            na::distance(&pt_tri, &(pt_seg + Vector::x() * 3.0)),
            2.5f32.sqrt(),
            epsilon = 1.0e-5
        );
    }
}
