use crate::math::Real;

/// Sorts a pair of values in increasing order.
#[inline]
pub fn sort2(a: Real, b: Real) -> (Real, Real) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}
