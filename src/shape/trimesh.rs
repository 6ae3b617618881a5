use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::partitioning::BvhError;
use crate::shape::primitive_source::{
    check_groups, check_indices, check_permutation, permute_index_buffer,
};
use crate::shape::{PrimitiveKind, PrimitiveRange, PrimitiveSource, Triangle};

/// A triangle mesh, optionally indexed.
///
/// Without an index buffer, every three consecutive vertices form a triangle.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TriMesh {
    vertices: Vec<Point<Real>>,
    indices: Option<Vec<u32>>,
    groups: Vec<PrimitiveRange>,
}

impl TriMesh {
    /// Creates a new triangle mesh.
    ///
    /// Fails with [`BvhError::MalformedGeometry`] if the index count (or the vertex count of a
    /// non-indexed mesh) is not a multiple of 3, or if an index is out of bounds.
    pub fn new(vertices: Vec<Point<Real>>, indices: Option<Vec<u32>>) -> Result<Self, BvhError> {
        let result = Self {
            vertices,
            indices,
            groups: Vec::new(),
        };
        result.validate()?;
        Ok(result)
    }

    /// Creates a triangle mesh from triangles given as index triples.
    pub fn from_triangles(
        vertices: Vec<Point<Real>>,
        triangles: &[[u32; 3]],
    ) -> Result<Self, BvhError> {
        Self::new(vertices, Some(triangles.iter().flatten().copied().collect()))
    }

    /// Sets the draw groups of this mesh, in triangle units.
    ///
    /// Groups must be sorted and disjoint. Each group gets its own BVH root.
    pub fn with_groups(mut self, groups: Vec<PrimitiveRange>) -> Result<Self, BvhError> {
        check_groups(&groups, self.primitive_count())?;
        self.groups = groups;
        Ok(self)
    }

    /// The vertex buffer.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// Mutable access to the vertex buffer.
    ///
    /// Moving vertices invalidates the bounds of any BVH built over this mesh until it is refitted.
    #[inline]
    pub fn vertices_mut(&mut self) -> &mut [Point<Real>] {
        &mut self.vertices
    }

    /// The index buffer, if this mesh is indexed.
    #[inline]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    /// The vertex indices of the `i`-th triangle.
    #[inline]
    pub fn triangle_indices(&self, i: u32) -> [u32; 3] {
        let base = i * 3;
        match &self.indices {
            Some(idx) => {
                let base = base as usize;
                [idx[base], idx[base + 1], idx[base + 2]]
            }
            None => [base, base + 1, base + 2],
        }
    }

    /// The `i`-th triangle.
    #[inline]
    pub fn triangle(&self, i: u32) -> Triangle {
        let [a, b, c] = self.triangle_indices(i);
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }

    /// Iterates through all the triangles of this mesh.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Triangle> + '_ {
        (0..self.primitive_count()).map(move |i| self.triangle(i))
    }

    /// The AABB of every vertex of this mesh.
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().copied())
    }
}

impl PrimitiveSource for TriMesh {
    #[inline]
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Triangle
    }

    #[inline]
    fn primitive_count(&self) -> u32 {
        match &self.indices {
            Some(idx) => (idx.len() / 3) as u32,
            None => (self.vertices.len() / 3) as u32,
        }
    }

    #[inline]
    fn vertex(&self, primitive: u32, k: usize) -> Point<Real> {
        let vid = match &self.indices {
            Some(idx) => idx[primitive as usize * 3 + k] as usize,
            None => primitive as usize * 3 + k,
        };
        self.vertices[vid]
    }

    fn groups(&self) -> Vec<PrimitiveRange> {
        self.groups.clone()
    }

    fn validate(&self) -> Result<(), BvhError> {
        match &self.indices {
            Some(idx) => {
                if idx.len() % 3 != 0 {
                    return Err(BvhError::malformed(format!(
                        "triangle index count {} is not a multiple of 3",
                        idx.len()
                    )));
                }
                check_indices(idx, self.vertices.len())?;
            }
            None => {
                if self.vertices.len() % 3 != 0 {
                    return Err(BvhError::malformed(format!(
                        "non-indexed triangle vertex count {} is not a multiple of 3",
                        self.vertices.len()
                    )));
                }
            }
        }

        check_groups(&self.groups, self.primitive_count())
    }

    fn supports_reordering(&self) -> bool {
        true
    }

    fn apply_permutation(&mut self, permutation: &[u32]) -> Result<(), BvhError> {
        check_permutation(permutation, self.primitive_count())?;

        let vertex_count = self.vertices.len() as u32;
        let indices = self
            .indices
            .get_or_insert_with(|| (0..vertex_count).collect());
        *indices = permute_index_buffer(indices, 3, permutation);
        Ok(())
    }

    fn index_buffer(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    fn set_index_buffer(&mut self, index: Vec<u32>) -> Result<(), BvhError> {
        if index.len() % 3 != 0 {
            return Err(BvhError::malformed(format!(
                "triangle index count {} is not a multiple of 3",
                index.len()
            )));
        }
        check_indices(&index, self.vertices.len())?;
        self.indices = Some(index);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::TriMesh;
    use crate::math::Point;
    use crate::partitioning::BvhError;
    use crate::shape::{PrimitiveRange, PrimitiveSource};

    fn quad() -> TriMesh {
        let vertices = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        TriMesh::from_triangles(vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn rejects_bad_index_count() {
        let err = TriMesh::new(vec![Point::origin(); 3], Some(vec![0, 1])).unwrap_err();
        assert!(matches!(err, BvhError::MalformedGeometry { .. }));
        let err = TriMesh::new(vec![Point::origin(); 4], None).unwrap_err();
        assert!(matches!(err, BvhError::MalformedGeometry { .. }));
        let err = TriMesh::new(vec![Point::origin(); 3], Some(vec![0, 1, 3])).unwrap_err();
        assert!(matches!(err, BvhError::MalformedGeometry { .. }));
    }

    #[test]
    fn rejects_overlapping_groups() {
        let groups = vec![PrimitiveRange::new(0, 2), PrimitiveRange::new(1, 1)];
        assert!(quad().with_groups(groups).is_err());
        let groups = vec![PrimitiveRange::new(1, 2)];
        assert!(quad().with_groups(groups).is_err());
    }

    #[test]
    fn permutation_reorders_triangles() {
        let mut mesh = quad();
        let before = [mesh.triangle(0), mesh.triangle(1)];
        mesh.apply_permutation(&[1, 0]).unwrap();
        assert_eq!(mesh.triangle(0), before[1]);
        assert_eq!(mesh.triangle(1), before[0]);
        assert!(mesh.apply_permutation(&[0, 0]).is_err());
    }

    #[test]
    fn permutation_materializes_index_buffer() {
        let vertices = vec![Point::new(0.0, 0.0, 0.0); 6];
        let mut mesh = TriMesh::new(vertices, None).unwrap();
        assert!(mesh.index_buffer().is_none());
        mesh.apply_permutation(&[1, 0]).unwrap();
        assert_eq!(mesh.index_buffer(), Some(&[3, 4, 5, 0, 1, 2][..]));
    }
}
