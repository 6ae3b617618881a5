use super::bvh_packed::PackedNode;
use super::bvh_tree::{resolve, MeshBvh};
use crate::bounding_volume::Aabb;
use crate::math::Real;
use crate::shape::{PrimitiveRange, PrimitiveSource};
use arrayvec::ArrayVec;
use smallvec::SmallVec;

const TRAVERSAL_STACK_SIZE: usize = 32;

/// The result of testing a node's bounds against a query shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundsIntersection {
    /// The bounds do not touch the query shape: the subtree is pruned.
    NotIntersected,
    /// The bounds touch the query shape: the traversal descends into the node.
    Intersected,
    /// The bounds lie entirely inside of the query shape: the whole subtree is handed to the
    /// range callback at once, without any further bounds test.
    Contained,
}

/// Whether a traversal should keep going after a callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VisitStatus {
    /// Keep traversing.
    Continue,
    /// Abort the whole traversal.
    ExitEarly,
}

/// Controls the execution flow of [`MeshBvh::traverse_nodes`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraversalAction {
    /// The traversal will continue on the children of the tested node.
    Continue,
    /// The traversal will skip all descendants of the tested node.
    Prune,
    /// The traversal will exit immediately.
    EarlyExit,
}

/// The primitives covered by a range of leaf slots.
#[derive(Copy, Clone, Debug)]
pub struct LeafPrimitives<'a> {
    /// The covered slots.
    pub slots: PrimitiveRange,
    indirect: Option<&'a [u32]>,
}

impl<'a> LeafPrimitives<'a> {
    pub(crate) fn new(slots: PrimitiveRange, indirect: Option<&'a [u32]>) -> Self {
        Self { slots, indirect }
    }

    /// The number of primitives.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.count as usize
    }

    /// Is this range empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The primitive indices, resolved through the indirection table if there is one.
    pub fn iter(&self) -> impl Iterator<Item = u32> + 'a {
        let indirect = self.indirect;
        self.slots.iter().map(move |slot| resolve(indirect, slot))
    }
}

/// What a node visited by [`MeshBvh::traverse_nodes`] is.
#[derive(Copy, Clone, Debug)]
pub enum NodeVisit<'a> {
    /// A leaf with its primitives.
    Leaf {
        /// The primitives of the leaf.
        primitives: LeafPrimitives<'a>,
    },
    /// An internal node.
    Internal {
        /// The axis its primitives were split along.
        split_axis: usize,
    },
}

/// A query shape driving [`MeshBvh::shapecast`].
///
/// Only [`ShapeCast::intersects_bounds`] is required. Without a range callback, every
/// primitive of a reached leaf is handed to [`ShapeCast::intersects_primitive`].
pub trait ShapeCast<S: ?Sized> {
    /// Tests a node's bounds against the query shape.
    ///
    /// `score` is the value [`ShapeCast::traverse_score`] returned for this node, if any.
    /// `node` is the global id of the record.
    fn intersects_bounds(
        &mut self,
        aabb: &Aabb,
        is_leaf: bool,
        score: Option<Real>,
        depth: u32,
        node: u32,
    ) -> BoundsIntersection;

    /// A priority for a node: the child with the lowest score is visited first.
    fn traverse_score(&mut self, _aabb: &Aabb) -> Option<Real> {
        None
    }

    /// Handles a whole range of primitives at once.
    ///
    /// `contained` is set when an ancestor's bounds were reported as
    /// [`BoundsIntersection::Contained`]. Returning `None` falls through to
    /// [`ShapeCast::intersects_primitive`].
    fn intersects_range(
        &mut self,
        _source: &S,
        _primitives: LeafPrimitives,
        _contained: bool,
        _depth: u32,
        _node: u32,
    ) -> Option<VisitStatus> {
        None
    }

    /// Handles one primitive.
    fn intersects_primitive(
        &mut self,
        _source: &S,
        _primitive: u32,
        _contained: bool,
        _depth: u32,
    ) -> VisitStatus {
        VisitStatus::Continue
    }
}

/// The slots covered by the subtree rooted at `index`.
pub(crate) fn subtree_slots(nodes: &[PackedNode], index: u32) -> PrimitiveRange {
    let mut first = index;
    while !nodes[first as usize].is_leaf() {
        first = PackedNode::left_child(first);
    }

    let mut last = index;
    while !nodes[last as usize].is_leaf() {
        last = nodes[last as usize].right_child();
    }

    let offset = nodes[first as usize].offset();
    let end = nodes[last as usize].range().end();
    PrimitiveRange::new(offset, end - offset)
}

impl<S: PrimitiveSource> MeshBvh<S> {
    /// Runs a generic shape cast over every root.
    ///
    /// At each internal node, both children are scored with [`ShapeCast::traverse_score`] and
    /// visited in increasing score order. Each child's bounds are tested right before it is
    /// visited, so a caster tightening its bounds test as it finds results (e.g. a
    /// branch-and-bound search) prunes the second child with up-to-date information.
    ///
    /// Returns `true` if a callback aborted the traversal.
    pub fn shapecast(&self, caster: &mut impl ShapeCast<S>) -> bool {
        for (root, base) in self.roots.iter().zip(self.root_bases.iter()) {
            if self.shapecast_node(root, *base, 0, 0, caster) {
                return true;
            }
        }

        false
    }

    fn shapecast_node(
        &self,
        nodes: &[PackedNode],
        base: u32,
        index: u32,
        depth: u32,
        caster: &mut impl ShapeCast<S>,
    ) -> bool {
        let node = &nodes[index as usize];

        if node.is_leaf() {
            return self.visit_range(caster, node.range(), false, depth, base + index);
        }

        let mut children = ArrayVec::<(u32, Option<Real>), 2>::new();
        for child in [PackedNode::left_child(index), node.right_child()] {
            let score = caster.traverse_score(&nodes[child as usize].aabb());
            children.push((child, score));
        }

        if let (Some(s1), Some(s2)) = (children[0].1, children[1].1) {
            if s2 < s1 {
                children.swap(0, 1);
            }
        }

        for (child, score) in children {
            let record = &nodes[child as usize];
            let stop = match caster.intersects_bounds(
                &record.aabb(),
                record.is_leaf(),
                score,
                depth + 1,
                base + child,
            ) {
                BoundsIntersection::NotIntersected => false,
                BoundsIntersection::Intersected => {
                    self.shapecast_node(nodes, base, child, depth + 1, caster)
                }
                BoundsIntersection::Contained => self.visit_range(
                    caster,
                    subtree_slots(nodes, child),
                    true,
                    depth + 1,
                    base + child,
                ),
            };

            if stop {
                return true;
            }
        }

        false
    }

    fn visit_range(
        &self,
        caster: &mut impl ShapeCast<S>,
        slots: PrimitiveRange,
        contained: bool,
        depth: u32,
        node: u32,
    ) -> bool {
        let primitives = LeafPrimitives::new(slots, self.indirect.as_deref());

        match caster.intersects_range(&self.source, primitives, contained, depth, node) {
            Some(status) => status == VisitStatus::ExitEarly,
            None => primitives.iter().any(|primitive| {
                caster.intersects_primitive(&self.source, primitive, contained, depth)
                    == VisitStatus::ExitEarly
            }),
        }
    }
}

impl<S> MeshBvh<S> {
    /// Traverses every root in depth-first order with full control over the traversal.
    ///
    /// The closure receives the global node id, its depth, its bounds and whether it is a leaf
    /// or an internal node. Returning [`TraversalAction::Prune`] skips the node's descendants;
    /// [`TraversalAction::EarlyExit`] stops the whole traversal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use meshbvh::math::Point;
    /// use meshbvh::partitioning::{BvhOptions, MeshBvh, NodeVisit, TraversalAction};
    /// use meshbvh::shape::PointCloud;
    ///
    /// let points = (0..100).map(|i| Point::new(i as f32, 0.0, 0.0)).collect();
    /// let bvh = MeshBvh::new(PointCloud::new(points), &BvhOptions::default()).unwrap();
    ///
    /// let mut primitives = 0;
    /// bvh.traverse_nodes(|_, _, _, visit| {
    ///     if let NodeVisit::Leaf { primitives: leaf } = visit {
    ///         primitives += leaf.len();
    ///     }
    ///     TraversalAction::Continue
    /// });
    /// assert_eq!(primitives, 100);
    /// ```
    pub fn traverse_nodes(
        &self,
        mut check_node: impl FnMut(u32, u32, &Aabb, NodeVisit) -> TraversalAction,
    ) {
        let indirect = self.indirect.as_deref();
        let mut stack: SmallVec<[(u32, u32); TRAVERSAL_STACK_SIZE]> = SmallVec::new();

        for (nodes, base) in self.roots.iter().zip(self.root_bases.iter()) {
            if nodes.is_empty() {
                continue;
            }

            stack.push((0, 0));

            while let Some((index, depth)) = stack.pop() {
                let node = &nodes[index as usize];
                let visit = if node.is_leaf() {
                    NodeVisit::Leaf {
                        primitives: LeafPrimitives::new(node.range(), indirect),
                    }
                } else {
                    NodeVisit::Internal {
                        split_axis: node.split_axis(),
                    }
                };

                match check_node(base + index, depth, &node.aabb(), visit) {
                    TraversalAction::Continue => {
                        if !node.is_leaf() {
                            stack.push((node.right_child(), depth + 1));
                            stack.push((PackedNode::left_child(index), depth + 1));
                        }
                    }
                    TraversalAction::Prune => {}
                    TraversalAction::EarlyExit => return,
                }
            }
        }
    }
}
