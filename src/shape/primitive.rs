use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real};
use crate::shape::{Segment, Triangle};

/// The kind of primitive a mesh is made of.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Isolated points.
    Point,
    /// Line segments.
    Segment,
    /// Triangles.
    Triangle,
}

impl PrimitiveKind {
    /// The number of vertices defining one primitive of this kind.
    #[inline]
    pub fn vertex_count(self) -> usize {
        match self {
            PrimitiveKind::Point => 1,
            PrimitiveKind::Segment => 2,
            PrimitiveKind::Triangle => 3,
        }
    }
}

/// A contiguous range of primitive slots.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PrimitiveRange {
    /// Index of the first slot.
    pub offset: u32,
    /// Number of slots.
    pub count: u32,
}

impl PrimitiveRange {
    /// Creates a new range.
    #[inline]
    pub fn new(offset: u32, count: u32) -> Self {
        Self { offset, count }
    }

    /// One past the last slot of this range.
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.count
    }

    /// Is this range empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Does this range contain the given slot?
    #[inline]
    pub fn contains(&self, slot: u32) -> bool {
        slot >= self.offset && slot < self.end()
    }

    /// The overlap of two ranges, if non-empty.
    pub fn intersection(&self, other: &PrimitiveRange) -> Option<PrimitiveRange> {
        let start = self.offset.max(other.offset);
        let end = self.end().min(other.end());
        (start < end).then(|| PrimitiveRange::new(start, end - start))
    }

    /// Iterates over the slots of this range.
    #[inline]
    pub fn iter(&self) -> std::ops::Range<u32> {
        self.offset..self.end()
    }
}

/// A single mesh primitive, by value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Primitive {
    /// A point.
    Point(Point<Real>),
    /// A segment.
    Segment(Segment),
    /// A triangle.
    Triangle(Triangle),
}

impl Primitive {
    /// The kind of this primitive.
    #[inline]
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Point(_) => PrimitiveKind::Point,
            Primitive::Segment(_) => PrimitiveKind::Segment,
            Primitive::Triangle(_) => PrimitiveKind::Triangle,
        }
    }

    /// The tight AABB of this primitive.
    #[inline]
    pub fn local_aabb(&self) -> Aabb {
        match self {
            Primitive::Point(pt) => Aabb::new(*pt, *pt),
            Primitive::Segment(s) => s.local_aabb(),
            Primitive::Triangle(t) => t.local_aabb(),
        }
    }

    /// The centroid of this primitive.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        match self {
            Primitive::Point(pt) => *pt,
            Primitive::Segment(s) => s.center(),
            Primitive::Triangle(t) => t.center(),
        }
    }

    /// This primitive with its vertices transformed by `m`.
    #[inline]
    pub fn transformed(&self, m: &Isometry<Real>) -> Self {
        match self {
            Primitive::Point(pt) => Primitive::Point(m * pt),
            Primitive::Segment(s) => Primitive::Segment(s.transformed(m)),
            Primitive::Triangle(t) => Primitive::Triangle(t.transformed(m)),
        }
    }
}
