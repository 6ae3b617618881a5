//! Various unsorted geometrical and logical operators.

pub use self::center::center;
pub use self::cov::{center_cov, cov};
pub use self::isometry_ops::IsometryOps;
pub(crate) use self::sort::sort2;

mod center;
mod cov;
mod isometry_ops;
mod sort;
