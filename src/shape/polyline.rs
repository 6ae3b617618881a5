use crate::math::{Point, Real};
use crate::partitioning::BvhError;
use crate::shape::primitive_source::{check_indices, check_permutation, permute_index_buffer};
use crate::shape::{PrimitiveKind, PrimitiveSource, Segment};

/// How the vertices of a [`Polyline`] are joined into segments.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolylineMode {
    /// Every two consecutive vertices form an independent segment.
    Segments,
    /// Each vertex is joined to the next one: `n` vertices form `n - 1` segments.
    Strip,
    /// Like [`PolylineMode::Strip`], plus a closing segment from the last vertex to the first.
    Loop,
}

/// A set of line segments.
///
/// Only [`PolylineMode::Segments`] polylines can be physically reordered. A BVH built over a
/// strip or a loop automatically uses an indirection table instead.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Polyline {
    vertices: Vec<Point<Real>>,
    indices: Option<Vec<u32>>,
    mode: PolylineMode,
}

impl Polyline {
    /// Creates a new polyline.
    ///
    /// Fails with [`BvhError::MalformedGeometry`] if a [`PolylineMode::Segments`] polyline has an
    /// odd vertex or index count, or if an index is out of bounds.
    pub fn new(
        vertices: Vec<Point<Real>>,
        indices: Option<Vec<u32>>,
        mode: PolylineMode,
    ) -> Result<Self, BvhError> {
        let result = Self {
            vertices,
            indices,
            mode,
        };
        result.validate()?;
        Ok(result)
    }

    /// The way vertices are joined.
    #[inline]
    pub fn mode(&self) -> PolylineMode {
        self.mode
    }

    /// The vertex buffer.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// Mutable access to the vertex buffer.
    #[inline]
    pub fn vertices_mut(&mut self) -> &mut [Point<Real>] {
        &mut self.vertices
    }

    /// The `i`-th segment.
    #[inline]
    pub fn segment(&self, i: u32) -> Segment {
        Segment::new(self.vertex(i, 0), self.vertex(i, 1))
    }

    fn element_count(&self) -> usize {
        match &self.indices {
            Some(idx) => idx.len(),
            None => self.vertices.len(),
        }
    }

    fn element(&self, i: usize) -> usize {
        match &self.indices {
            Some(idx) => idx[i] as usize,
            None => i,
        }
    }
}

impl PrimitiveSource for Polyline {
    #[inline]
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Segment
    }

    fn primitive_count(&self) -> u32 {
        let n = self.element_count();
        let count = match self.mode {
            PolylineMode::Segments => n / 2,
            PolylineMode::Strip => n.saturating_sub(1),
            PolylineMode::Loop if n >= 2 => n,
            PolylineMode::Loop => 0,
        };
        count as u32
    }

    #[inline]
    fn vertex(&self, primitive: u32, k: usize) -> Point<Real> {
        let p = primitive as usize;
        let element = match self.mode {
            PolylineMode::Segments => p * 2 + k,
            PolylineMode::Strip => p + k,
            PolylineMode::Loop => (p + k) % self.element_count(),
        };
        self.vertices[self.element(element)]
    }

    fn validate(&self) -> Result<(), BvhError> {
        if self.mode == PolylineMode::Segments && self.element_count() % 2 != 0 {
            return Err(BvhError::malformed(format!(
                "segment list with an odd element count {}",
                self.element_count()
            )));
        }

        match &self.indices {
            Some(idx) => check_indices(idx, self.vertices.len()),
            None => Ok(()),
        }
    }

    fn supports_reordering(&self) -> bool {
        self.mode == PolylineMode::Segments
    }

    fn apply_permutation(&mut self, permutation: &[u32]) -> Result<(), BvhError> {
        if self.mode != PolylineMode::Segments {
            return Err(BvhError::UnsupportedConfiguration(format!(
                "a {:?} polyline has a fixed segment order",
                self.mode
            )));
        }

        check_permutation(permutation, self.primitive_count())?;
        let vertex_count = self.vertices.len() as u32;
        let indices = self
            .indices
            .get_or_insert_with(|| (0..vertex_count).collect());
        *indices = permute_index_buffer(indices, 2, permutation);
        Ok(())
    }

    fn index_buffer(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    fn set_index_buffer(&mut self, index: Vec<u32>) -> Result<(), BvhError> {
        check_indices(&index, self.vertices.len())?;
        self.indices = Some(index);
        self.validate()
    }
}
