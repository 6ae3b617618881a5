use super::bvh_packed::PackedNode;
use super::bvh_traverse::{LeafPrimitives, VisitStatus};
use super::bvh_tree::MeshBvh;
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Isometry, Real};
use arrayvec::ArrayVec;

/// A visitor driving [`MeshBvh::bvhcast`].
///
/// Every bounds is expressed in the local frame of the first BVH.
pub trait BvhCastVisitor {
    /// Called on each pair of leaves with overlapping bounds.
    fn intersects_ranges(
        &mut self,
        primitives1: LeafPrimitives,
        primitives2: LeafPrimitives,
        depth1: u32,
        node1: u32,
        depth2: u32,
        node2: u32,
    ) -> VisitStatus;

    /// A priority for a pair of nodes: the children of a split node are visited in increasing
    /// score order.
    fn traverse_score(&mut self, _aabb1: &Aabb, _aabb2: &Aabb) -> Option<Real> {
        None
    }
}

/// One of the two trees of a dual-tree traversal.
struct TreeRef<'a> {
    nodes: &'a [PackedNode],
    base: u32,
    indirect: Option<&'a [u32]>,
}

impl TreeRef<'_> {
    fn primitives(&self, index: u32) -> LeafPrimitives<'_> {
        LeafPrimitives::new(self.nodes[index as usize].range(), self.indirect)
    }
}

#[derive(Copy, Clone)]
struct Cursor {
    index: u32,
    depth: u32,
    /// Bounds expressed in the frame of the first tree.
    aabb: Aabb,
}

impl<S1> MeshBvh<S1> {
    /// Traverses this BVH simultaneously with `other`, placed at `pos12` relative to this one.
    ///
    /// The visitor is called on every pair of leaves whose bounds overlap. When both nodes of a
    /// pair are internal, the one with the larger volume is split, so the number of bounds tests
    /// stays close to the total size of both trees.
    ///
    /// Returns `true` if the visitor aborted the traversal.
    pub fn bvhcast<S2>(
        &self,
        other: &MeshBvh<S2>,
        pos12: &Isometry<Real>,
        visitor: &mut impl BvhCastVisitor,
    ) -> bool {
        for (nodes1, base1) in self.roots.iter().zip(self.root_bases.iter()) {
            let side1 = TreeRef {
                nodes: nodes1,
                base: *base1,
                indirect: self.indirect.as_deref(),
            };

            for (nodes2, base2) in other.roots.iter().zip(other.root_bases.iter()) {
                let side2 = TreeRef {
                    nodes: nodes2,
                    base: *base2,
                    indirect: other.indirect.as_deref(),
                };

                let cursor1 = Cursor {
                    index: 0,
                    depth: 0,
                    aabb: nodes1[0].aabb(),
                };
                let cursor2 = Cursor {
                    index: 0,
                    depth: 0,
                    aabb: nodes2[0].aabb().transform_by(pos12),
                };

                if cursor1.aabb.intersects(&cursor2.aabb)
                    && bvhcast_nodes(&side1, &side2, cursor1, cursor2, pos12, visitor)
                {
                    return true;
                }
            }
        }

        false
    }
}

fn bvhcast_nodes(
    side1: &TreeRef,
    side2: &TreeRef,
    cursor1: Cursor,
    cursor2: Cursor,
    pos12: &Isometry<Real>,
    visitor: &mut impl BvhCastVisitor,
) -> bool {
    let node1 = &side1.nodes[cursor1.index as usize];
    let node2 = &side2.nodes[cursor2.index as usize];

    let split_first = match (node1.is_leaf(), node2.is_leaf()) {
        (true, true) => {
            return visitor.intersects_ranges(
                side1.primitives(cursor1.index),
                side2.primitives(cursor2.index),
                cursor1.depth,
                side1.base + cursor1.index,
                cursor2.depth,
                side2.base + cursor2.index,
            ) == VisitStatus::ExitEarly;
        }
        (true, false) => false,
        (false, true) => true,
        (false, false) => cursor1.aabb.volume() >= cursor2.aabb.volume(),
    };

    if split_first {
        let mut children = ArrayVec::<(Cursor, Option<Real>), 2>::new();
        for index in [PackedNode::left_child(cursor1.index), node1.right_child()] {
            let child = Cursor {
                index,
                depth: cursor1.depth + 1,
                aabb: side1.nodes[index as usize].aabb(),
            };
            children.push((child, visitor.traverse_score(&child.aabb, &cursor2.aabb)));
        }
        sort_by_score(&mut children);

        for (child, _) in children {
            if child.aabb.intersects(&cursor2.aabb)
                && bvhcast_nodes(side1, side2, child, cursor2, pos12, visitor)
            {
                return true;
            }
        }
    } else {
        let mut children = ArrayVec::<(Cursor, Option<Real>), 2>::new();
        for index in [PackedNode::left_child(cursor2.index), node2.right_child()] {
            let child = Cursor {
                index,
                depth: cursor2.depth + 1,
                aabb: side2.nodes[index as usize].aabb().transform_by(pos12),
            };
            children.push((child, visitor.traverse_score(&cursor1.aabb, &child.aabb)));
        }
        sort_by_score(&mut children);

        for (child, _) in children {
            if cursor1.aabb.intersects(&child.aabb)
                && bvhcast_nodes(side1, side2, cursor1, child, pos12, visitor)
            {
                return true;
            }
        }
    }

    false
}

fn sort_by_score(children: &mut ArrayVec<(Cursor, Option<Real>), 2>) {
    if let (Some(s1), Some(s2)) = (children[0].1, children[1].1) {
        if s2 < s1 {
            children.swap(0, 1);
        }
    }
}
