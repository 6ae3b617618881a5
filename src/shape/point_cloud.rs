use crate::math::{Point, Real};
use crate::partitioning::BvhError;
use crate::shape::primitive_source::{check_indices, check_permutation, permute_index_buffer};
use crate::shape::{PrimitiveKind, PrimitiveSource};

/// A set of points, optionally indexed.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PointCloud {
    points: Vec<Point<Real>>,
    indices: Option<Vec<u32>>,
}

impl PointCloud {
    /// Creates a non-indexed point cloud.
    pub fn new(points: Vec<Point<Real>>) -> Self {
        Self {
            points,
            indices: None,
        }
    }

    /// Creates an indexed point cloud, checking that every index is in bounds.
    pub fn with_indices(points: Vec<Point<Real>>, indices: Vec<u32>) -> Result<Self, BvhError> {
        check_indices(&indices, points.len())?;
        Ok(Self {
            points,
            indices: Some(indices),
        })
    }

    /// The point buffer.
    #[inline]
    pub fn points(&self) -> &[Point<Real>] {
        &self.points
    }

    /// Mutable access to the point buffer.
    #[inline]
    pub fn points_mut(&mut self) -> &mut [Point<Real>] {
        &mut self.points
    }

    /// The `i`-th point primitive.
    #[inline]
    pub fn point(&self, i: u32) -> Point<Real> {
        self.vertex(i, 0)
    }
}

impl PrimitiveSource for PointCloud {
    #[inline]
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Point
    }

    #[inline]
    fn primitive_count(&self) -> u32 {
        match &self.indices {
            Some(idx) => idx.len() as u32,
            None => self.points.len() as u32,
        }
    }

    #[inline]
    fn vertex(&self, primitive: u32, _k: usize) -> Point<Real> {
        match &self.indices {
            Some(idx) => self.points[idx[primitive as usize] as usize],
            None => self.points[primitive as usize],
        }
    }

    fn validate(&self) -> Result<(), BvhError> {
        match &self.indices {
            Some(idx) => check_indices(idx, self.points.len()),
            None => Ok(()),
        }
    }

    fn supports_reordering(&self) -> bool {
        true
    }

    fn apply_permutation(&mut self, permutation: &[u32]) -> Result<(), BvhError> {
        check_permutation(permutation, self.primitive_count())?;
        let point_count = self.points.len() as u32;
        let indices = self
            .indices
            .get_or_insert_with(|| (0..point_count).collect());
        *indices = permute_index_buffer(indices, 1, permutation);
        Ok(())
    }

    fn index_buffer(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    fn set_index_buffer(&mut self, index: Vec<u32>) -> Result<(), BvhError> {
        check_indices(&index, self.points.len())?;
        self.indices = Some(index);
        Ok(())
    }
}
