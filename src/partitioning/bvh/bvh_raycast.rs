use super::bvh_packed::PackedNode;
use super::bvh_traverse::{BoundsIntersection, ShapeCast, VisitStatus};
use super::bvh_tree::{resolve, MeshBvh};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Point, Real, Vector};
use crate::query::{
    local_ray_intersection_with_triangle, ray_toi_with_point, ray_toi_with_segment, Ray, Side,
};
use crate::shape::{Primitive, PrimitiveKind, PrimitiveSource};

/// Options of [`MeshBvh::raycast`] and [`MeshBvh::raycast_first`].
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaycastOptions {
    /// Which triangle faces can be hit.
    pub side: Side,
    /// Hits with a time of impact smaller than this are ignored.
    pub near: Real,
    /// Hits with a time of impact greater than this are ignored.
    pub far: Real,
    /// The distance under which a ray hits a point or segment primitive.
    pub threshold: Real,
}

impl Default for RaycastOptions {
    fn default() -> Self {
        Self {
            side: Side::Front,
            near: 0.0,
            far: Real::MAX,
            threshold: 1.0,
        }
    }
}

/// Primitive-specific details of a [`MeshRayHit`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RayHitDetail {
    /// A triangle was hit.
    Triangle {
        /// Barycentric coordinates of the hit point.
        barycentric_coordinates: [Real; 3],
        /// Was the front face hit?
        front_face: bool,
    },
    /// A segment passed within the threshold distance of the ray.
    Segment {
        /// Parameter of [`MeshRayHit::point`] along the segment, in `[0, 1]`.
        parameter: Real,
        /// Distance between the ray and the segment.
        distance: Real,
    },
    /// A point passed within the threshold distance of the ray.
    Point {
        /// Distance between the ray and the point.
        distance: Real,
    },
}

/// A ray hit on one primitive of a mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshRayHit {
    /// The index of the primitive hit.
    pub primitive: u32,
    /// The ray parameter of the hit.
    pub time_of_impact: Real,
    /// The hit point on the primitive.
    pub point: Point<Real>,
    /// The geometric normal `AB × AC` of a hit triangle, normalized.
    pub normal: Option<Vector<Real>>,
    /// Primitive-specific details.
    pub detail: RayHitDetail,
}

/// Casts a ray on a single primitive.
pub fn raycast_primitive(
    primitive: &Primitive,
    index: u32,
    ray: &Ray,
    options: &RaycastOptions,
) -> Option<MeshRayHit> {
    let hit = match primitive {
        Primitive::Triangle(tri) => {
            let hit =
                local_ray_intersection_with_triangle(&tri.a, &tri.b, &tri.c, ray, options.side)?;
            let bcoords = hit.barycentric_coordinates;
            MeshRayHit {
                primitive: index,
                time_of_impact: hit.intersection.time_of_impact,
                point: ray.point_at(hit.intersection.time_of_impact),
                normal: tri.normal().map(|n| n.into_inner()),
                detail: RayHitDetail::Triangle {
                    barycentric_coordinates: [bcoords.x, bcoords.y, bcoords.z],
                    front_face: hit.front_face,
                },
            }
        }
        Primitive::Segment(seg) => {
            let hit = ray_toi_with_segment(ray, seg, options.threshold)?;
            MeshRayHit {
                primitive: index,
                time_of_impact: hit.time_of_impact,
                point: hit.point,
                normal: None,
                detail: RayHitDetail::Segment {
                    parameter: hit.segment_parameter,
                    distance: hit.distance,
                },
            }
        }
        Primitive::Point(pt) => {
            let (toi, distance) = ray_toi_with_point(ray, pt, options.threshold)?;
            MeshRayHit {
                primitive: index,
                time_of_impact: toi,
                point: *pt,
                normal: None,
                detail: RayHitDetail::Point { distance },
            }
        }
    };

    (hit.time_of_impact >= options.near && hit.time_of_impact <= options.far).then_some(hit)
}

/// Node bounds are grown by the hit threshold for thin primitives.
fn bounds_margin(kind: PrimitiveKind, options: &RaycastOptions) -> Real {
    match kind {
        PrimitiveKind::Triangle => 0.0,
        PrimitiveKind::Point | PrimitiveKind::Segment => options.threshold.max(0.0),
    }
}

#[inline]
fn ray_hits_aabb(aabb: &Aabb, margin: Real, ray: &Ray, options: &RaycastOptions) -> bool {
    let aabb = if margin > 0.0 {
        aabb.loosened(margin)
    } else {
        *aabb
    };

    aabb.clip_ray_parameters(ray)
        .map(|(tmin, tmax)| tmax >= options.near && tmin <= options.far)
        .unwrap_or(false)
}

struct RaycastAll<'a> {
    ray: &'a Ray,
    options: &'a RaycastOptions,
    margin: Real,
    hits: Vec<MeshRayHit>,
}

impl<S: PrimitiveSource> ShapeCast<S> for RaycastAll<'_> {
    fn intersects_bounds(
        &mut self,
        aabb: &Aabb,
        _: bool,
        _: Option<Real>,
        _: u32,
        _: u32,
    ) -> BoundsIntersection {
        if ray_hits_aabb(aabb, self.margin, self.ray, self.options) {
            BoundsIntersection::Intersected
        } else {
            BoundsIntersection::NotIntersected
        }
    }

    fn intersects_primitive(&mut self, source: &S, primitive: u32, _: bool, _: u32) -> VisitStatus {
        if let Some(hit) =
            raycast_primitive(&source.primitive(primitive), primitive, self.ray, self.options)
        {
            self.hits.push(hit);
        }
        VisitStatus::Continue
    }
}

impl<S: PrimitiveSource> MeshBvh<S> {
    /// Collects every primitive hit by `ray`, in no particular order.
    pub fn raycast(&self, ray: &Ray, options: &RaycastOptions) -> Vec<MeshRayHit> {
        let mut caster = RaycastAll {
            ray,
            options,
            margin: bounds_margin(self.source.kind(), options),
            hits: Vec::new(),
        };
        let _ = self.shapecast(&mut caster);
        caster.hits
    }

    /// The hit of `ray` with the smallest time of impact.
    ///
    /// At each internal node, the child lying first along the ray direction on the node's split
    /// axis is descended first. The other child is skipped when the hit already found lies before
    /// it along that axis.
    pub fn raycast_first(&self, ray: &Ray, options: &RaycastOptions) -> Option<MeshRayHit> {
        let margin = bounds_margin(self.source.kind(), options);
        let mut best: Option<MeshRayHit> = None;

        for nodes in &self.roots {
            if nodes.is_empty() || !ray_hits_aabb(&nodes[0].aabb(), margin, ray, options) {
                continue;
            }

            if let Some(hit) = self.raycast_first_node(nodes, 0, ray, options, margin) {
                if best.map(|b| hit.time_of_impact < b.time_of_impact).unwrap_or(true) {
                    best = Some(hit);
                }
            }
        }

        best
    }

    fn raycast_first_node(
        &self,
        nodes: &[PackedNode],
        index: u32,
        ray: &Ray,
        options: &RaycastOptions,
        margin: Real,
    ) -> Option<MeshRayHit> {
        let node = &nodes[index as usize];

        if node.is_leaf() {
            let indirect = self.indirect.as_deref();
            let mut best: Option<MeshRayHit> = None;

            for slot in node.range().iter() {
                let primitive = resolve(indirect, slot);
                if let Some(hit) =
                    raycast_primitive(&self.source.primitive(primitive), primitive, ray, options)
                {
                    if best.map(|b| hit.time_of_impact < b.time_of_impact).unwrap_or(true) {
                        best = Some(hit);
                    }
                }
            }

            return best;
        }

        let axis = node.split_axis();
        let positive = ray.dir[axis] >= 0.0;
        let (c1, c2) = if positive {
            (PackedNode::left_child(index), node.right_child())
        } else {
            (node.right_child(), PackedNode::left_child(index))
        };

        let hit1 = if ray_hits_aabb(&nodes[c1 as usize].aabb(), margin, ray, options) {
            self.raycast_first_node(nodes, c1, ray, options, margin)
        } else {
            None
        };

        let c2_aabb = nodes[c2 as usize].aabb().loosened(margin);
        if let Some(hit1) = hit1 {
            let along_axis = ray.point_at(hit1.time_of_impact)[axis];
            let before_c2 = if positive {
                along_axis < c2_aabb.mins[axis]
            } else {
                along_axis > c2_aabb.maxs[axis]
            };

            if before_c2 {
                return Some(hit1);
            }
        }

        let hit2 = if ray_hits_aabb(&c2_aabb, 0.0, ray, options) {
            self.raycast_first_node(nodes, c2, ray, options, margin)
        } else {
            None
        };

        match (hit1, hit2) {
            (Some(h1), Some(h2)) => Some(if h2.time_of_impact < h1.time_of_impact {
                h2
            } else {
                h1
            }),
            (h1, h2) => h1.or(h2),
        }
    }
}
