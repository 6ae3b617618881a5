use crate::math::{Isometry, Matrix, Real, Vector};

/// Extra operations with isometries.
pub trait IsometryOps {
    /// Transform a vector by the absolute value of the homogeneous matrix
    /// equivalent to `self`.
    fn absolute_transform_vector(&self, v: &Vector<Real>) -> Vector<Real>;

    /// The rotation part of `self` as a 3x3 matrix.
    fn rotation_matrix(&self) -> Matrix<Real>;
}

impl IsometryOps for Isometry<Real> {
    #[inline]
    fn absolute_transform_vector(&self, v: &Vector<Real>) -> Vector<Real> {
        self.rotation.to_rotation_matrix().into_inner().abs() * *v
    }

    #[inline]
    fn rotation_matrix(&self) -> Matrix<Real> {
        self.rotation.to_rotation_matrix().into_inner()
    }
}
