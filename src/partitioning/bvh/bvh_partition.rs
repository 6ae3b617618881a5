//! In-place partitioning of a primitive range.

use super::bvh_bounds::{center, PrimitiveBounds};
use super::bvh_split::Split;

/// Swaps two slots of the primitive order together with their bounds records.
#[inline(always)]
pub(crate) fn swap_records(order: &mut [u32], bounds: &mut [PrimitiveBounds], i: usize, j: usize) {
    order.swap(i, j);
    bounds.swap(i, j);
}

/// Reorders `order` and `bounds` so that every slot whose center along `split.axis` is smaller
/// than `split.position` comes first.
///
/// Returns the number of slots on the left side, i.e., the index of the first slot with a
/// center `>= split.position`.
pub(crate) fn partition(order: &mut [u32], bounds: &mut [PrimitiveBounds], split: &Split) -> usize {
    let mut lo = 0;
    let mut hi = order.len();

    loop {
        while lo < hi && center(&bounds[lo], split.axis) < split.position {
            lo += 1;
        }

        while lo < hi && center(&bounds[hi - 1], split.axis) >= split.position {
            hi -= 1;
        }

        if lo < hi {
            swap_records(order, bounds, lo, hi - 1);
            lo += 1;
            hi -= 1;
        } else {
            return lo;
        }
    }
}
