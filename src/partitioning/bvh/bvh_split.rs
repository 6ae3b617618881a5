//! Split plane selection.

use super::bvh_bounds::{center, PrimitiveBounds};
use super::bvh_options::{SahParams, SplitStrategy};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Real, DIM};
use ordered_float::OrderedFloat;
use smallvec::SmallVec;

/// Ranges smaller than this are split by evaluating every primitive centroid.
const EXACT_SAH_THRESHOLD: usize = 8;

/// A split plane orthogonal to one coordinate axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Split {
    pub axis: usize,
    pub position: Real,
}

/// Picks the split plane of a range of primitives.
///
/// Returns `None` if the range should become a leaf because no split is worth it.
pub(crate) fn find_split(
    strategy: SplitStrategy,
    sah: &SahParams,
    bounds: &[PrimitiveBounds],
    node_aabb: &Aabb,
    centroid_aabb: &Aabb,
) -> Option<Split> {
    match strategy {
        SplitStrategy::Midpoint => midpoint_split(centroid_aabb),
        SplitStrategy::Mean => mean_split(bounds, node_aabb),
        SplitStrategy::Sah => {
            if node_aabb.surface_area() <= 0.0 {
                // Area ratios are undefined for collinear ranges.
                return None;
            }

            if bounds.len() < EXACT_SAH_THRESHOLD {
                exact_sah_split(sah, bounds, node_aabb)
            } else {
                binned_sah_split(sah, bounds, node_aabb, centroid_aabb)
            }
        }
    }
}

fn midpoint_split(centroid_aabb: &Aabb) -> Option<Split> {
    let axis = centroid_aabb.longest_axis();
    if centroid_aabb.extents()[axis] <= 0.0 {
        return None;
    }

    Some(Split {
        axis,
        position: centroid_aabb.center()[axis],
    })
}

fn mean_split(bounds: &[PrimitiveBounds], node_aabb: &Aabb) -> Option<Split> {
    if bounds.is_empty() {
        return None;
    }

    let axis = node_aabb.longest_axis();
    let sum: Real = bounds.iter().map(|b| center(b, axis)).sum();

    Some(Split {
        axis,
        position: sum / bounds.len() as Real,
    })
}

/// Cost of splitting a node of surface area `root_area` into two sides.
#[inline]
fn split_cost(
    sah: &SahParams,
    root_area: Real,
    left: &Aabb,
    left_count: u32,
    right: &Aabb,
    right_count: u32,
) -> Real {
    let p_left = left.surface_area() / root_area;
    let p_right = right.surface_area() / root_area;
    sah.traversal_cost
        + sah.intersection_cost * (p_left * left_count as Real + p_right * right_count as Real)
}

fn exact_sah_split(
    sah: &SahParams,
    bounds: &[PrimitiveBounds],
    node_aabb: &Aabb,
) -> Option<Split> {
    let root_area = node_aabb.surface_area();
    let mut best_cost = sah.intersection_cost * bounds.len() as Real;
    let mut best = None;

    for axis in 0..DIM {
        let mut candidates: SmallVec<[OrderedFloat<Real>; EXACT_SAH_THRESHOLD]> =
            bounds.iter().map(|b| OrderedFloat(center(b, axis))).collect();
        candidates.sort_unstable();
        candidates.dedup();

        for candidate in candidates {
            let position = candidate.0;
            let mut left = Aabb::new_invalid();
            let mut right = Aabb::new_invalid();
            let mut left_count = 0;
            let mut right_count = 0;

            for b in bounds {
                let aabb = super::bvh_bounds::bounds_aabb(b);
                if center(b, axis) >= position {
                    right.merge(&aabb);
                    right_count += 1;
                } else {
                    left.merge(&aabb);
                    left_count += 1;
                }
            }

            if left_count == 0 || right_count == 0 {
                continue;
            }

            let cost = split_cost(sah, root_area, &left, left_count, &right, right_count);
            if cost < best_cost {
                best_cost = cost;
                best = Some(Split { axis, position });
            }
        }
    }

    best
}

#[derive(Copy, Clone, Debug)]
struct SahBin {
    aabb: Aabb,
    count: u32,
}

impl Default for SahBin {
    fn default() -> Self {
        Self {
            aabb: Aabb::new_invalid(),
            count: 0,
        }
    }
}

fn binned_sah_split(
    sah: &SahParams,
    bounds: &[PrimitiveBounds],
    node_aabb: &Aabb,
    centroid_aabb: &Aabb,
) -> Option<Split> {
    let num_bins = sah.bins.max(2);
    let root_area = node_aabb.surface_area();
    let mut best_cost = sah.intersection_cost * bounds.len() as Real;
    let mut best = None;

    let mut bins: SmallVec<[SahBin; 32]> = SmallVec::from_elem(SahBin::default(), num_bins);
    let mut right_merges: SmallVec<[SahBin; 32]> = SmallVec::from_elem(SahBin::default(), num_bins);

    for axis in 0..DIM {
        let bins_start = centroid_aabb.mins[axis];
        let bin_width = centroid_aabb.extents()[axis] / num_bins as Real;

        if bin_width <= 0.0 {
            continue;
        }

        bins.fill(SahBin::default());
        for b in bounds {
            let bin_id = (((center(b, axis) - bins_start) / bin_width) as usize).min(num_bins - 1);
            let bin = &mut bins[bin_id];
            bin.aabb.merge(&super::bvh_bounds::bounds_aabb(b));
            bin.count += 1;
        }

        // right_merges[i] accumulates the bins i..num_bins.
        let mut right_acc = SahBin::default();
        for i in (1..num_bins).rev() {
            right_acc.aabb.merge(&bins[i].aabb);
            right_acc.count += bins[i].count;
            right_merges[i] = right_acc;
        }

        let mut left_acc = SahBin::default();
        for i in 0..num_bins - 1 {
            left_acc.aabb.merge(&bins[i].aabb);
            left_acc.count += bins[i].count;
            let right = &right_merges[i + 1];

            if left_acc.count == 0 || right.count == 0 {
                continue;
            }

            let cost = split_cost(
                sah,
                root_area,
                &left_acc.aabb,
                left_acc.count,
                &right.aabb,
                right.count,
            );

            if cost < best_cost {
                best_cost = cost;
                best = Some(Split {
                    axis,
                    position: bins_start + bin_width * (i + 1) as Real,
                });
            }
        }
    }

    best
}
