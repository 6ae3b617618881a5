use super::bvh_traverse::{BoundsIntersection, LeafPrimitives, ShapeCast, VisitStatus};
use super::bvh_traverse_bvtt::BvhCastVisitor;
use super::bvh_tree::MeshBvh;
use crate::bounding_volume::{Aabb, BoundingSphere, BoundingVolume, OrientedBox};
use crate::math::{Isometry, Point, Real};
use crate::query::{
    closest_points_primitive_primitive, intersection_test_primitive_primitive, PointQuery,
};
use crate::shape::{Primitive, PrimitiveSource};

/// The result of [`MeshBvh::closest_point_to_point`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClosestPointHit {
    /// The index of the closest primitive.
    pub primitive: u32,
    /// The closest point on that primitive.
    pub point: Point<Real>,
    /// The distance between the query point and `point`.
    pub distance: Real,
}

/// The result of [`MeshBvh::closest_point_to_geometry`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClosestGeometryHit {
    /// The index of the closest primitive of the first BVH.
    pub primitive1: u32,
    /// The closest point on `primitive1`, in the local frame of the first BVH.
    pub point1: Point<Real>,
    /// The index of the closest primitive of the second BVH.
    pub primitive2: u32,
    /// The closest point on `primitive2`, in the local frame of the second BVH.
    pub point2: Point<Real>,
    /// The distance between both points.
    pub distance: Real,
}

/// The point of `primitive` closest to `pt`.
fn project_on_primitive(primitive: &Primitive, pt: &Point<Real>) -> Point<Real> {
    match primitive {
        Primitive::Point(p) => *p,
        Primitive::Segment(s) => s.project_local_point(pt).point,
        Primitive::Triangle(t) => t.project_local_point(pt).point,
    }
}

struct BoxIntersection<'a> {
    obb: &'a OrientedBox,
}

impl<S: PrimitiveSource> ShapeCast<S> for BoxIntersection<'_> {
    fn intersects_bounds(
        &mut self,
        aabb: &Aabb,
        _: bool,
        _: Option<Real>,
        _: u32,
        _: u32,
    ) -> BoundsIntersection {
        if self.obb.contains_aabb(aabb) {
            BoundsIntersection::Contained
        } else if self.obb.intersects_aabb(aabb) {
            BoundsIntersection::Intersected
        } else {
            BoundsIntersection::NotIntersected
        }
    }

    fn intersects_range(
        &mut self,
        _: &S,
        primitives: LeafPrimitives,
        contained: bool,
        _: u32,
        _: u32,
    ) -> Option<VisitStatus> {
        (contained && !primitives.is_empty()).then_some(VisitStatus::ExitEarly)
    }

    fn intersects_primitive(&mut self, source: &S, primitive: u32, _: bool, _: u32) -> VisitStatus {
        let hit = match source.primitive(primitive) {
            Primitive::Point(pt) => self.obb.contains_point(&pt),
            Primitive::Segment(seg) => self.obb.intersects_segment(&seg),
            Primitive::Triangle(tri) => self.obb.intersects_triangle(&tri),
        };

        if hit {
            VisitStatus::ExitEarly
        } else {
            VisitStatus::Continue
        }
    }
}

struct SphereIntersection<'a> {
    sphere: &'a BoundingSphere,
}

impl<S: PrimitiveSource> ShapeCast<S> for SphereIntersection<'_> {
    fn intersects_bounds(
        &mut self,
        aabb: &Aabb,
        _: bool,
        _: Option<Real>,
        _: u32,
        _: u32,
    ) -> BoundsIntersection {
        if self.sphere.contains_aabb(aabb) {
            BoundsIntersection::Contained
        } else if self.sphere.intersects_aabb(aabb) {
            BoundsIntersection::Intersected
        } else {
            BoundsIntersection::NotIntersected
        }
    }

    fn intersects_range(
        &mut self,
        _: &S,
        primitives: LeafPrimitives,
        contained: bool,
        _: u32,
        _: u32,
    ) -> Option<VisitStatus> {
        (contained && !primitives.is_empty()).then_some(VisitStatus::ExitEarly)
    }

    fn intersects_primitive(&mut self, source: &S, primitive: u32, _: bool, _: u32) -> VisitStatus {
        let center = *self.sphere.center();
        let proj = project_on_primitive(&source.primitive(primitive), &center);

        if na::distance_squared(&proj, &center) <= self.sphere.radius() * self.sphere.radius() {
            VisitStatus::ExitEarly
        } else {
            VisitStatus::Continue
        }
    }
}

struct ClosestToPoint<'a> {
    point: &'a Point<Real>,
    best_sq: Real,
    min_sq: Real,
    hit: Option<ClosestPointHit>,
}

impl<S: PrimitiveSource> ShapeCast<S> for ClosestToPoint<'_> {
    fn traverse_score(&mut self, aabb: &Aabb) -> Option<Real> {
        Some(aabb.distance_squared_to_point(self.point))
    }

    fn intersects_bounds(
        &mut self,
        aabb: &Aabb,
        _: bool,
        score: Option<Real>,
        _: u32,
        _: u32,
    ) -> BoundsIntersection {
        let score = score.unwrap_or_else(|| aabb.distance_squared_to_point(self.point));
        if score < self.best_sq {
            BoundsIntersection::Intersected
        } else {
            BoundsIntersection::NotIntersected
        }
    }

    fn intersects_primitive(&mut self, source: &S, primitive: u32, _: bool, _: u32) -> VisitStatus {
        let proj = project_on_primitive(&source.primitive(primitive), self.point);
        let dist_sq = na::distance_squared(&proj, self.point);

        if dist_sq < self.best_sq {
            self.best_sq = dist_sq;
            self.hit = Some(ClosestPointHit {
                primitive,
                point: proj,
                distance: dist_sq.sqrt(),
            });

            if dist_sq <= self.min_sq {
                return VisitStatus::ExitEarly;
            }
        }

        VisitStatus::Continue
    }
}

struct ClosestGeometryState {
    best_sq: Real,
    min_sq: Real,
    hit: Option<ClosestGeometryHit>,
}

struct ClosestToGeometry<'a, S2> {
    other: &'a MeshBvh<S2>,
    pos12: &'a Isometry<Real>,
    pos21: Isometry<Real>,
    /// The bounds of `other` in the frame of the first BVH.
    other_aabb: Aabb,
    state: ClosestGeometryState,
}

impl<S1: PrimitiveSource, S2: PrimitiveSource> ShapeCast<S1> for ClosestToGeometry<'_, S2> {
    fn traverse_score(&mut self, aabb: &Aabb) -> Option<Real> {
        Some(aabb.distance_squared_to_aabb(&self.other_aabb))
    }

    fn intersects_bounds(
        &mut self,
        aabb: &Aabb,
        _: bool,
        score: Option<Real>,
        _: u32,
        _: u32,
    ) -> BoundsIntersection {
        let score = score.unwrap_or_else(|| aabb.distance_squared_to_aabb(&self.other_aabb));
        if score < self.state.best_sq {
            BoundsIntersection::Intersected
        } else {
            BoundsIntersection::NotIntersected
        }
    }

    fn intersects_primitive(
        &mut self,
        source: &S1,
        primitive: u32,
        _: bool,
        _: u32,
    ) -> VisitStatus {
        let prim1 = source.primitive(primitive);
        let aabb1_in2 = prim1.transformed(&self.pos21).local_aabb();

        let mut inner = ClosestToPrimitive {
            prim1,
            index1: primitive,
            aabb1_in2,
            pos12: self.pos12,
            state: &mut self.state,
        };

        if self.other.shapecast(&mut inner) {
            VisitStatus::ExitEarly
        } else {
            VisitStatus::Continue
        }
    }
}

/// Searches the second BVH for the primitive closest to one primitive of the first.
struct ClosestToPrimitive<'a> {
    prim1: Primitive,
    index1: u32,
    aabb1_in2: Aabb,
    pos12: &'a Isometry<Real>,
    state: &'a mut ClosestGeometryState,
}

impl<S2: PrimitiveSource> ShapeCast<S2> for ClosestToPrimitive<'_> {
    fn traverse_score(&mut self, aabb: &Aabb) -> Option<Real> {
        Some(aabb.distance_squared_to_aabb(&self.aabb1_in2))
    }

    fn intersects_bounds(
        &mut self,
        aabb: &Aabb,
        _: bool,
        score: Option<Real>,
        _: u32,
        _: u32,
    ) -> BoundsIntersection {
        let score = score.unwrap_or_else(|| aabb.distance_squared_to_aabb(&self.aabb1_in2));
        if score < self.state.best_sq {
            BoundsIntersection::Intersected
        } else {
            BoundsIntersection::NotIntersected
        }
    }

    fn intersects_primitive(
        &mut self,
        source: &S2,
        primitive: u32,
        _: bool,
        _: u32,
    ) -> VisitStatus {
        let prim2 = source.primitive(primitive);
        let (pt1, pt2) = closest_points_primitive_primitive(self.pos12, &self.prim1, &prim2);
        let dist_sq = na::distance_squared(&pt1, &(self.pos12 * pt2));

        if dist_sq < self.state.best_sq {
            self.state.best_sq = dist_sq;
            self.state.hit = Some(ClosestGeometryHit {
                primitive1: self.index1,
                point1: pt1,
                primitive2: primitive,
                point2: pt2,
                distance: dist_sq.sqrt(),
            });

            if dist_sq <= self.state.min_sq {
                return VisitStatus::ExitEarly;
            }
        }

        VisitStatus::Continue
    }
}

struct BvhIntersection<'a, S1, S2> {
    source1: &'a S1,
    source2: &'a S2,
    pos12: &'a Isometry<Real>,
}

impl<S1: PrimitiveSource, S2: PrimitiveSource> BvhCastVisitor for BvhIntersection<'_, S1, S2> {
    fn intersects_ranges(
        &mut self,
        primitives1: LeafPrimitives,
        primitives2: LeafPrimitives,
        _: u32,
        _: u32,
        _: u32,
        _: u32,
    ) -> VisitStatus {
        for i1 in primitives1.iter() {
            let prim1 = self.source1.primitive(i1);
            let aabb1 = prim1.local_aabb();

            for i2 in primitives2.iter() {
                let prim2 = self.source2.primitive(i2);
                if !aabb1.intersects(&prim2.local_aabb().transform_by(self.pos12)) {
                    continue;
                }

                if intersection_test_primitive_primitive(self.pos12, &prim1, &prim2) {
                    return VisitStatus::ExitEarly;
                }
            }
        }

        VisitStatus::Continue
    }
}

impl<S: PrimitiveSource> MeshBvh<S> {
    /// Does any primitive intersect the given oriented box?
    ///
    /// Subtrees entirely inside of the box are accepted without testing their primitives.
    pub fn intersects_box(&self, obb: &OrientedBox) -> bool {
        self.shapecast(&mut BoxIntersection { obb })
    }

    /// Does any primitive intersect the given sphere?
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.shapecast(&mut SphereIntersection { sphere })
    }

    /// Does any primitive of this BVH intersect a primitive of `other`, placed at `pos12`
    /// relative to this one?
    pub fn intersects_bvh<S2: PrimitiveSource>(
        &self,
        other: &MeshBvh<S2>,
        pos12: &Isometry<Real>,
    ) -> bool {
        let mut visitor = BvhIntersection {
            source1: &self.source,
            source2: &other.source,
            pos12,
        };
        self.bvhcast(other, pos12, &mut visitor)
    }

    /// The point of this mesh closest to `point`.
    ///
    /// Primitives farther than `max_threshold` are ignored. The search stops as soon as a point
    /// closer than `min_threshold` is found, in which case the result may not be the closest.
    pub fn closest_point_to_point(
        &self,
        point: &Point<Real>,
        min_threshold: Real,
        max_threshold: Real,
    ) -> Option<ClosestPointHit> {
        let mut caster = ClosestToPoint {
            point,
            best_sq: max_threshold * max_threshold,
            min_sq: min_threshold * min_threshold,
            hit: None,
        };
        let _ = self.shapecast(&mut caster);
        caster.hit
    }

    /// The closest pair of points between this mesh and `other`, placed at `pos12` relative to
    /// this one.
    ///
    /// The thresholds have the same meaning as for [`MeshBvh::closest_point_to_point`].
    pub fn closest_point_to_geometry<S2: PrimitiveSource>(
        &self,
        other: &MeshBvh<S2>,
        pos12: &Isometry<Real>,
        min_threshold: Real,
        max_threshold: Real,
    ) -> Option<ClosestGeometryHit> {
        if other.is_empty() {
            return None;
        }

        let mut caster = ClosestToGeometry {
            other,
            pos12,
            pos21: pos12.inverse(),
            other_aabb: other.aabb().transform_by(pos12),
            state: ClosestGeometryState {
                best_sq: max_threshold * max_threshold,
                min_sq: min_threshold * min_threshold,
                hit: None,
            },
        };
        let _ = self.shapecast(&mut caster);
        caster.state.hit
    }
}
