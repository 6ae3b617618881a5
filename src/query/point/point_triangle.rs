use crate::math::{Point, Real};
use crate::query::{PointProjection, PointQuery, PointQueryWithLocation};
use crate::shape::{Segment, Triangle, TrianglePointLocation};

#[inline]
fn compute_result(pt: &Point<Real>, proj: Point<Real>) -> PointProjection {
    PointProjection::new(relative_eq!(proj, *pt), proj)
}

impl PointQuery for Triangle {
    #[inline]
    fn project_local_point(&self, pt: &Point<Real>) -> PointProjection {
        self.project_local_point_and_get_location(pt).0
    }
}

impl PointQueryWithLocation for Triangle {
    type Location = TrianglePointLocation;

    fn project_local_point_and_get_location(
        &self,
        pt: &Point<Real>,
    ) -> (PointProjection, Self::Location) {
        let a = self.a;
        let b = self.b;
        let c = self.c;

        let ab = b - a;
        let ac = c - a;
        let ap = pt - a;

        let ab_ap = ab.dot(&ap);
        let ac_ap = ac.dot(&ap);

        if ab_ap <= 0.0 && ac_ap <= 0.0 {
            // Voronoï region of `a`.
            return (compute_result(pt, a), TrianglePointLocation::OnVertex(0));
        }

        let bp = pt - b;
        let ab_bp = ab.dot(&bp);
        let ac_bp = ac.dot(&bp);

        if ab_bp >= 0.0 && ac_bp <= ab_bp {
            // Voronoï region of `b`.
            return (compute_result(pt, b), TrianglePointLocation::OnVertex(1));
        }

        let cp = pt - c;
        let ab_cp = ab.dot(&cp);
        let ac_cp = ac.dot(&cp);

        if ac_cp >= 0.0 && ab_cp <= ac_cp {
            // Voronoï region of `c`.
            return (compute_result(pt, c), TrianglePointLocation::OnVertex(2));
        }

        let bc = c - b;
        let n = ab.cross(&ac);

        let vc = n.dot(&ab.cross(&ap));
        if vc < 0.0 && ab_ap >= 0.0 && ab_bp <= 0.0 {
            // Voronoï region of `ab`.
            let v = ab_ap / ab.norm_squared();
            return (
                compute_result(pt, a + ab * v),
                TrianglePointLocation::OnEdge(0, [1.0 - v, v]),
            );
        }

        let vb = -n.dot(&ac.cross(&cp));
        if vb < 0.0 && ac_ap >= 0.0 && ac_cp <= 0.0 {
            // Voronoï region of `ac`.
            let w = ac_ap / ac.norm_squared();
            return (
                compute_result(pt, a + ac * w),
                TrianglePointLocation::OnEdge(2, [1.0 - w, w]),
            );
        }

        let va = n.dot(&bc.cross(&bp));
        if va < 0.0 && ac_bp - ab_bp >= 0.0 && ab_cp - ac_cp >= 0.0 {
            // Voronoï region of `bc`.
            let w = bc.dot(&bp) / bc.norm_squared();
            return (
                compute_result(pt, b + bc * w),
                TrianglePointLocation::OnEdge(1, [1.0 - w, w]),
            );
        }

        // Voronoï region of the face.
        if va + vb + vc != 0.0 {
            let denom = 1.0 / (va + vb + vc);
            let v = vb * denom;
            let w = vc * denom;
            let res = a + ab * v + ac * w;

            return (
                compute_result(pt, res),
                TrianglePointLocation::OnFace([1.0 - v - w, v, w]),
            );
        }

        // Degenerate triangle: project on the closest edge.
        let mut best = None;
        for (i, edge) in [Segment::new(a, b), Segment::new(b, c), Segment::new(a, c)]
            .iter()
            .enumerate()
        {
            let (proj, loc) = edge.project_local_point_and_get_location(pt);
            let dist = na::distance_squared(pt, &proj.point);
            if best.map(|(d, _, _, _)| dist < d).unwrap_or(true) {
                best = Some((dist, i as u32, proj, loc.barycentric_coordinates()));
            }
        }

        match best {
            Some((_, i, proj, bcoords)) => (proj, TrianglePointLocation::OnEdge(i, bcoords)),
            None => (compute_result(pt, a), TrianglePointLocation::OnVertex(0)),
        }
    }
}
