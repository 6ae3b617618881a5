use crate::math::{Point, Real};
use crate::partitioning::BvhError;
use crate::shape::{Primitive, PrimitiveKind, PrimitiveRange, Segment, Triangle};

/// The geometry a [`MeshBvh`](crate::partitioning::MeshBvh) is built over.
///
/// A source exposes a flat list of primitives of a single [`PrimitiveKind`]. Its vertex and
/// connectivity data must stay unchanged for the lifetime of the BVH unless the caller
/// explicitly refits or rebuilds it afterward.
pub trait PrimitiveSource {
    /// The kind of every primitive of this source.
    fn kind(&self) -> PrimitiveKind;

    /// The number of primitives.
    fn primitive_count(&self) -> u32;

    /// The `k`-th vertex of the `primitive`-th primitive, with `k < self.kind().vertex_count()`.
    fn vertex(&self, primitive: u32, k: usize) -> Point<Real>;

    /// The `i`-th primitive, by value.
    #[inline]
    fn primitive(&self, i: u32) -> Primitive {
        match self.kind() {
            PrimitiveKind::Point => Primitive::Point(self.vertex(i, 0)),
            PrimitiveKind::Segment => {
                Primitive::Segment(Segment::new(self.vertex(i, 0), self.vertex(i, 1)))
            }
            PrimitiveKind::Triangle => Primitive::Triangle(Triangle::new(
                self.vertex(i, 0),
                self.vertex(i, 1),
                self.vertex(i, 2),
            )),
        }
    }

    /// Disjoint primitive ranges that must each get their own root.
    ///
    /// An empty list means a single range covering every primitive.
    fn groups(&self) -> Vec<PrimitiveRange> {
        Vec::new()
    }

    /// Checks the connectivity of this source.
    fn validate(&self) -> Result<(), BvhError> {
        Ok(())
    }

    /// Can the primitives of this source be physically reordered?
    fn supports_reordering(&self) -> bool {
        false
    }

    /// Reorders the primitives so that the new primitive `i` is the old primitive
    /// `permutation[i]`.
    fn apply_permutation(&mut self, _permutation: &[u32]) -> Result<(), BvhError> {
        Err(BvhError::UnsupportedConfiguration(
            "this primitive source cannot be reordered".to_string(),
        ))
    }

    /// The connectivity buffer of this source, if it has one.
    fn index_buffer(&self) -> Option<&[u32]> {
        None
    }

    /// Replaces the connectivity buffer of this source.
    fn set_index_buffer(&mut self, _index: Vec<u32>) -> Result<(), BvhError> {
        Err(BvhError::UnsupportedConfiguration(
            "this primitive source has no index buffer".to_string(),
        ))
    }
}

/// Applies a primitive permutation to a flat index buffer with `stride` indices per primitive.
pub(crate) fn permute_index_buffer(
    indices: &[u32],
    stride: usize,
    permutation: &[u32],
) -> Vec<u32> {
    let mut result = Vec::with_capacity(indices.len());

    for &prim in permutation {
        let start = prim as usize * stride;
        result.extend_from_slice(&indices[start..start + stride]);
    }

    result
}

/// Checks a permutation covers exactly `count` primitives.
pub(crate) fn check_permutation(permutation: &[u32], count: u32) -> Result<(), BvhError> {
    if permutation.len() != count as usize {
        return Err(BvhError::malformed(format!(
            "permutation of length {} applied to {} primitives",
            permutation.len(),
            count
        )));
    }

    let mut seen = vec![false; permutation.len()];
    for &prim in permutation {
        match seen.get_mut(prim as usize) {
            Some(flag) if !*flag => *flag = true,
            _ => {
                return Err(BvhError::malformed(format!(
                    "primitive {} is out of range or repeated in the permutation",
                    prim
                )))
            }
        }
    }

    Ok(())
}

/// Checks that every index of `indices` addresses one of `vertex_count` vertices.
pub(crate) fn check_indices(indices: &[u32], vertex_count: usize) -> Result<(), BvhError> {
    if let Some(bad) = indices.iter().find(|i| **i as usize >= vertex_count) {
        return Err(BvhError::malformed(format!(
            "index {} out of bounds for {} vertices",
            bad, vertex_count
        )));
    }

    Ok(())
}

/// Checks that groups are sorted, disjoint and inside of `[0, count)`.
pub(crate) fn check_groups(groups: &[PrimitiveRange], count: u32) -> Result<(), BvhError> {
    let mut last_end = 0;

    for group in groups {
        if group.offset < last_end {
            return Err(BvhError::malformed(format!(
                "group {:?} overlaps the previous group or is out of order",
                group
            )));
        }

        if group.offset as u64 + group.count as u64 > count as u64 {
            return Err(BvhError::malformed(format!(
                "group {:?} extends past the {} primitives of the mesh",
                group, count
            )));
        }

        last_end = group.end();
    }

    Ok(())
}
