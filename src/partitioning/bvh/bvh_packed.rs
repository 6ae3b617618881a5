//! The packed node layout.
//!
//! A root is a flat array of 32-byte records laid out in pre-order: the left child of an
//! internal record immediately follows it, and its right child is addressed explicitly by record
//! index within the same root.
//!
//! ```text
//! offset  size  field
//!      0    12  mins (3 x f32)
//!     12    12  maxs (3 x f32)
//!     24     4  right child index (internal) or first primitive slot (leaf)
//!     28     4  split axis (internal) or LEAF_SENTINEL << 16 | primitive count (leaf)
//! ```

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::partitioning::BvhError;
use crate::shape::PrimitiveRange;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;

/// The reserved value of the upper 16 bits of the last field of a leaf record.
pub const LEAF_SENTINEL: u32 = 0xFFFF;
/// The size of one packed record, in bytes.
pub const PACKED_NODE_SIZE: usize = 32;
/// The largest primitive count a leaf record can hold.
pub const MAX_LEAF_COUNT: u32 = 0xFFFF;

/// One 32-byte node record of a packed BVH root.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PackedNode {
    /// Minimum corner of the node bounds.
    pub mins: [f32; 3],
    /// Maximum corner of the node bounds.
    pub maxs: [f32; 3],
    /// Right child record index, or first primitive slot of a leaf.
    pub right_or_offset: u32,
    /// Split axis, or sentinel and primitive count of a leaf.
    pub split_or_leaf: u32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<PackedNode>(), PACKED_NODE_SIZE);

impl PackedNode {
    /// A leaf record covering `count` slots starting at `offset`.
    pub fn leaf(aabb: &Aabb, offset: u32, count: u32) -> Result<Self, BvhError> {
        if count > MAX_LEAF_COUNT {
            return Err(BvhError::EncodingOverflow {
                what: "leaf primitive count",
                value: count as u64,
                limit: MAX_LEAF_COUNT as u64,
            });
        }

        Ok(Self {
            mins: aabb.mins.into(),
            maxs: aabb.maxs.into(),
            right_or_offset: offset,
            split_or_leaf: (LEAF_SENTINEL << 16) | count,
        })
    }

    /// An internal record. Its right child pointer is patched once the left subtree is written.
    pub fn internal(aabb: &Aabb, split_axis: usize) -> Self {
        Self {
            mins: aabb.mins.into(),
            maxs: aabb.maxs.into(),
            right_or_offset: 0,
            split_or_leaf: split_axis as u32,
        }
    }

    /// Is this a leaf record?
    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        (self.split_or_leaf >> 16) == LEAF_SENTINEL
    }

    /// The bounds of this node.
    #[inline(always)]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(Point::from(self.mins), Point::from(self.maxs))
    }

    /// Overwrites the bounds of this node.
    #[inline]
    pub fn set_aabb(&mut self, aabb: &Aabb) {
        self.mins = aabb.mins.into();
        self.maxs = aabb.maxs.into();
    }

    /// The record index of the left child of an internal node, given the index of this node.
    #[inline(always)]
    pub fn left_child(index: u32) -> u32 {
        index + 1
    }

    /// The record index of the right child of an internal node.
    #[inline(always)]
    pub fn right_child(&self) -> u32 {
        self.right_or_offset
    }

    /// The first primitive slot of a leaf.
    #[inline(always)]
    pub fn offset(&self) -> u32 {
        self.right_or_offset
    }

    /// The primitive count of a leaf.
    #[inline(always)]
    pub fn count(&self) -> u32 {
        self.split_or_leaf & 0xFFFF
    }

    /// The slots covered by a leaf.
    #[inline]
    pub fn range(&self) -> PrimitiveRange {
        PrimitiveRange::new(self.offset(), self.count())
    }

    /// The split axis of an internal node.
    #[inline(always)]
    pub fn split_axis(&self) -> usize {
        self.split_or_leaf as usize
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        for v in self.mins.iter().chain(self.maxs.iter()) {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&self.right_or_offset.to_le_bytes());
        out.extend_from_slice(&self.split_or_leaf.to_le_bytes());
    }

    fn read_le_bytes(bytes: &[u8]) -> Self {
        let word = |i: usize| {
            let mut w = [0; 4];
            w.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
            w
        };
        let float = |i: usize| Real::from_le_bytes(word(i));

        Self {
            mins: [float(0), float(1), float(2)],
            maxs: [float(3), float(4), float(5)],
            right_or_offset: u32::from_le_bytes(word(6)),
            split_or_leaf: u32::from_le_bytes(word(7)),
        }
    }
}

/// Converts a record index to its 32-bit encoding.
#[inline]
pub(crate) fn encode_index(index: usize) -> Result<u32, BvhError> {
    u32::try_from(index).map_err(|_| BvhError::EncodingOverflow {
        what: "child record index",
        value: index as u64,
        limit: u32::MAX as u64,
    })
}

/// Serializes packed records to little-endian bytes.
pub fn nodes_to_le_bytes(nodes: &[PackedNode]) -> Vec<u8> {
    let mut result = Vec::with_capacity(nodes.len() * PACKED_NODE_SIZE);
    for node in nodes {
        node.write_le_bytes(&mut result);
    }
    result
}

/// A read-only view over one packed root.
///
/// The view borrows its records when built from a slice of [`PackedNode`], or from a byte buffer
/// that is suitably aligned on a little-endian target. Otherwise it owns a decoded copy.
#[derive(Clone, Debug)]
pub struct PackedTreeView<'a> {
    nodes: Cow<'a, [PackedNode]>,
}

impl<'a> PackedTreeView<'a> {
    /// A view borrowing already decoded records.
    pub fn new(nodes: &'a [PackedNode]) -> Self {
        Self {
            nodes: Cow::Borrowed(nodes),
        }
    }

    /// A view over little-endian bytes.
    ///
    /// Fails with [`BvhError::InvalidBuffer`] if the length is not a multiple of 32.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, BvhError> {
        if bytes.len() % PACKED_NODE_SIZE != 0 {
            return Err(BvhError::InvalidBuffer { len: bytes.len() });
        }

        if cfg!(target_endian = "little") {
            if let Ok(nodes) = bytemuck::try_cast_slice::<u8, PackedNode>(bytes) {
                return Ok(Self {
                    nodes: Cow::Borrowed(nodes),
                });
            }
        }

        let nodes = bytes
            .chunks_exact(PACKED_NODE_SIZE)
            .map(PackedNode::read_le_bytes)
            .collect();
        Ok(Self {
            nodes: Cow::Owned(nodes),
        })
    }

    /// Does this view borrow its records?
    pub fn is_borrowed(&self) -> bool {
        matches!(self.nodes, Cow::Borrowed(_))
    }

    /// The records of this view.
    #[inline]
    pub fn nodes(&self) -> &[PackedNode] {
        &self.nodes
    }

    /// Converts this view into an owned record buffer.
    pub fn into_owned(self) -> Vec<PackedNode> {
        self.nodes.into_owned()
    }

    /// The number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Does this view contain no record?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Is the `i`-th record a leaf?
    #[inline]
    pub fn is_leaf(&self, i: u32) -> bool {
        self.nodes[i as usize].is_leaf()
    }

    /// The bounds of the `i`-th record.
    #[inline]
    pub fn aabb(&self, i: u32) -> Aabb {
        self.nodes[i as usize].aabb()
    }

    /// The left child of the `i`-th record.
    #[inline]
    pub fn left_child(&self, i: u32) -> u32 {
        PackedNode::left_child(i)
    }

    /// The right child of the `i`-th record.
    #[inline]
    pub fn right_child(&self, i: u32) -> u32 {
        self.nodes[i as usize].right_child()
    }

    /// The first primitive slot of the `i`-th record.
    #[inline]
    pub fn offset(&self, i: u32) -> u32 {
        self.nodes[i as usize].offset()
    }

    /// The primitive count of the `i`-th record.
    #[inline]
    pub fn count(&self, i: u32) -> u32 {
        self.nodes[i as usize].count()
    }

    /// The split axis of the `i`-th record.
    #[inline]
    pub fn split_axis(&self, i: u32) -> usize {
        self.nodes[i as usize].split_axis()
    }

    /// Serializes this root to little-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        nodes_to_le_bytes(&self.nodes)
    }
}

#[cfg(test)]
mod test {
    use super::{PackedNode, PackedTreeView, MAX_LEAF_COUNT};
    use crate::bounding_volume::Aabb;
    use crate::math::Point;
    use crate::partitioning::BvhError;

    fn sample_root() -> Vec<PackedNode> {
        let aabb = Aabb::new(Point::new(-1.0, -2.0, -3.0), Point::new(1.0, 2.0, 3.5));
        let mut root = PackedNode::internal(&aabb, 2);
        root.right_or_offset = 2;
        vec![
            root,
            PackedNode::leaf(&aabb, 0, 3).unwrap(),
            PackedNode::leaf(&aabb, 3, MAX_LEAF_COUNT).unwrap(),
        ]
    }

    #[test]
    fn record_fields_are_decoded() {
        let nodes = sample_root();
        let view = PackedTreeView::new(&nodes);
        assert!(!view.is_leaf(0));
        assert_eq!(view.split_axis(0), 2);
        assert_eq!(view.left_child(0), 1);
        assert_eq!(view.right_child(0), 2);
        assert!(view.is_leaf(1) && view.is_leaf(2));
        assert_eq!((view.offset(2), view.count(2)), (3, MAX_LEAF_COUNT));
        assert_eq!(view.aabb(0).maxs, Point::new(1.0, 2.0, 3.5));
    }

    #[test]
    fn byte_layout_is_little_endian() {
        let nodes = sample_root();
        let bytes = PackedTreeView::new(&nodes).to_bytes();
        assert_eq!(bytes.len(), 96);
        assert_eq!(&bytes[0..4], &(-1.0f32).to_le_bytes());
        assert_eq!(&bytes[56..60], &3u32.to_le_bytes());
        assert_eq!(&bytes[60..64], &((0xFFFFu32 << 16) | 3).to_le_bytes());

        let view = PackedTreeView::from_bytes(&bytes).unwrap();
        assert_eq!(view.nodes(), &nodes[..]);

        // Misaligned input is decoded into an owned copy.
        let mut shifted = vec![0u8; 1];
        shifted.extend_from_slice(&bytes);
        let view = PackedTreeView::from_bytes(&shifted[1..]).unwrap();
        assert_eq!(view.nodes(), &nodes[..]);
    }

    #[test]
    fn bad_inputs_are_rejected() {
        assert_eq!(
            PackedTreeView::from_bytes(&[0u8; 33]).unwrap_err(),
            BvhError::InvalidBuffer { len: 33 }
        );

        let aabb = Aabb::new(Point::origin(), Point::origin());
        assert!(matches!(
            PackedNode::leaf(&aabb, 0, MAX_LEAF_COUNT + 1),
            Err(BvhError::EncodingOverflow { .. })
        ));
    }
}
