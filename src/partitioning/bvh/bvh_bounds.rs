//! Per-primitive bounds records.

use super::bvh_tree::resolve;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, DIM, FLOAT32_EPSILON};
use crate::shape::PrimitiveSource;

/// The bounds of one primitive: `(center, half-extent)` per axis, padded so that
/// `center - half <= min` and `center + half >= max` hold after rounding.
pub type PrimitiveBounds = [Real; 6];

/// The center of `bounds` along `axis`.
#[inline(always)]
pub(crate) fn center(bounds: &PrimitiveBounds, axis: usize) -> Real {
    bounds[axis * 2]
}

/// Converts a bounds record to an AABB.
#[inline]
pub(crate) fn bounds_aabb(bounds: &PrimitiveBounds) -> Aabb {
    let mut result = Aabb::new_invalid();
    for i in 0..DIM {
        result.mins[i] = bounds[i * 2] - bounds[i * 2 + 1];
        result.maxs[i] = bounds[i * 2] + bounds[i * 2 + 1];
    }
    result
}

/// The padded bounds record of the `primitive`-th primitive of `source`.
#[inline]
pub(crate) fn primitive_bounds<S: PrimitiveSource + ?Sized>(
    source: &S,
    primitive: u32,
) -> PrimitiveBounds {
    let mut mins = Point::from([Real::MAX; DIM]);
    let mut maxs = Point::from([-Real::MAX; DIM]);

    for k in 0..source.kind().vertex_count() {
        let vtx = source.vertex(primitive, k);
        mins = mins.inf(&vtx);
        maxs = maxs.sup(&vtx);
    }

    let mut result = [0.0; 6];
    for i in 0..DIM {
        let half_extent = (maxs[i] - mins[i]) / 2.0;
        let center = mins[i] + half_extent;
        let mut padded = half_extent + (mins[i].abs() + half_extent) * FLOAT32_EPSILON;

        // The record must enclose the exact extents, not only their rounded reconstruction.
        while (center as f64 - padded as f64) > mins[i] as f64
            || (center as f64 + padded as f64) < maxs[i] as f64
        {
            padded = Real::from_bits(padded.to_bits() + 1);
        }

        result[i * 2] = center;
        result[i * 2 + 1] = padded;
    }
    result
}

/// Fills `out` with the bounds of the primitives occupying the slots `first_slot..`.
///
/// Slot `i` holds the primitive `indirect[i]`, or `i` without indirection table.
pub(crate) fn compute_primitive_bounds<S: PrimitiveSource + ?Sized>(
    source: &S,
    indirect: Option<&[u32]>,
    first_slot: u32,
    out: &mut [PrimitiveBounds],
) {
    for (i, bounds) in out.iter_mut().enumerate() {
        let slot = first_slot + i as u32;
        *bounds = primitive_bounds(source, resolve(indirect, slot));
    }
}

/// The union of the primitive bounds and the bounds of their centers.
pub(crate) fn range_bounds(bounds: &[PrimitiveBounds]) -> (Aabb, Aabb) {
    let mut node_aabb = Aabb::new_invalid();
    let mut centroid_aabb = Aabb::new_invalid();

    for b in bounds {
        for i in 0..DIM {
            let (c, h) = (b[i * 2], b[i * 2 + 1]);
            node_aabb.mins[i] = node_aabb.mins[i].min(c - h);
            node_aabb.maxs[i] = node_aabb.maxs[i].max(c + h);
            centroid_aabb.mins[i] = centroid_aabb.mins[i].min(c);
            centroid_aabb.maxs[i] = centroid_aabb.maxs[i].max(c);
        }
    }

    (node_aabb, centroid_aabb)
}
