//! Top-down construction of one root.

use super::bvh_bounds::{range_bounds, PrimitiveBounds};
use super::bvh_options::{BvhOptions, ProgressCallback};
use super::bvh_packed::{encode_index, PackedNode};
use super::bvh_partition::partition;
use super::bvh_split::find_split;
use crate::bounding_volume::Aabb;
use crate::math::Real;
use crate::partitioning::BvhError;
use crate::shape::PrimitiveRange;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A node of the intermediate build graph.
///
/// Nodes live in an arena and refer to each other by arena index. The graph is discarded once
/// encoded.
#[derive(Clone, Debug)]
pub(crate) enum BuildNode {
    Leaf {
        range: PrimitiveRange,
        aabb: Aabb,
    },
    Internal {
        left: usize,
        right: usize,
        split_axis: usize,
        aabb: Aabb,
    },
    /// A subtree left to be built by another task.
    Pending {
        range: PrimitiveRange,
        aabb: Aabb,
        centroid_aabb: Aabb,
        depth: u32,
    },
    /// An already encoded subtree with record indices relative to its own first record.
    Subtree(Vec<PackedNode>),
}

/// State shared by every task of one build.
pub(crate) struct BuildContext<'a> {
    pub options: &'a BvhOptions,
    progress: Option<ProgressCallback>,
    total: u64,
    done: AtomicU64,
    depth_warned: AtomicBool,
}

impl<'a> BuildContext<'a> {
    pub fn new(options: &'a BvhOptions, total: u64) -> Self {
        Self {
            options,
            progress: options.on_progress.clone(),
            total,
            done: AtomicU64::new(0),
            depth_warned: AtomicBool::new(false),
        }
    }

    fn leaf_done(&self, count: u32) {
        let done = self.done.fetch_add(count as u64, Ordering::Relaxed) + count as u64;
        if let Some(progress) = &self.progress {
            if self.total > 0 {
                progress(done as Real / self.total as Real);
            }
        }
    }

    fn warn_max_depth(&self, range: PrimitiveRange) {
        if self.options.verbose && !self.depth_warned.swap(true, Ordering::Relaxed) {
            log::warn!(
                "BVH build reached the max depth of {}; {} primitives at slot {} were merged into a single leaf.",
                self.options.max_depth,
                range.count,
                range.offset
            );
        }
    }
}

/// Builds the intermediate graph of the slots `base..base + order.len()`.
///
/// `order` and `bounds` cover exactly those slots and are reordered in lockstep. Nodes reaching
/// `pending_depth` are emitted as [`BuildNode::Pending`] instead of being built.
pub(crate) struct BvhBuilder<'a, 'b> {
    ctx: &'a BuildContext<'b>,
    order: &'a mut [u32],
    bounds: &'a mut [PrimitiveBounds],
    base: u32,
    pending_depth: Option<u32>,
    pub nodes: Vec<BuildNode>,
}

impl<'a, 'b> BvhBuilder<'a, 'b> {
    pub fn new(
        ctx: &'a BuildContext<'b>,
        order: &'a mut [u32],
        bounds: &'a mut [PrimitiveBounds],
        base: u32,
        pending_depth: Option<u32>,
    ) -> Self {
        Self {
            ctx,
            order,
            bounds,
            base,
            pending_depth,
            nodes: Vec::new(),
        }
    }

    /// Builds the whole range, starting at the given depth. The root ends up at index 0.
    pub fn build(mut self, depth: u32) -> Vec<BuildNode> {
        let (node_aabb, centroid_aabb) = range_bounds(self.bounds);
        self.build_with_bounds(depth, node_aabb, centroid_aabb)
    }

    /// Same as [`Self::build`] with the range bounds already known.
    pub fn build_with_bounds(
        mut self,
        depth: u32,
        node_aabb: Aabb,
        centroid_aabb: Aabb,
    ) -> Vec<BuildNode> {
        if !self.order.is_empty() {
            let _ = self.build_node(0, self.order.len(), depth, node_aabb, centroid_aabb);
        }
        self.nodes
    }

    fn range(&self, lo: usize, hi: usize) -> PrimitiveRange {
        PrimitiveRange::new(self.base + lo as u32, (hi - lo) as u32)
    }

    fn push_leaf(&mut self, lo: usize, hi: usize, aabb: Aabb) -> usize {
        let range = self.range(lo, hi);
        self.ctx.leaf_done(range.count);
        self.nodes.push(BuildNode::Leaf { range, aabb });
        self.nodes.len() - 1
    }

    fn build_node(
        &mut self,
        lo: usize,
        hi: usize,
        depth: u32,
        node_aabb: Aabb,
        centroid_aabb: Aabb,
    ) -> usize {
        let options = self.ctx.options;
        let count = hi - lo;

        if count <= options.max_leaf_size as usize {
            return self.push_leaf(lo, hi, node_aabb);
        }

        if depth >= options.max_depth {
            self.ctx.warn_max_depth(self.range(lo, hi));
            return self.push_leaf(lo, hi, node_aabb);
        }

        if self.pending_depth == Some(depth) {
            self.nodes.push(BuildNode::Pending {
                range: self.range(lo, hi),
                aabb: node_aabb,
                centroid_aabb,
                depth,
            });
            return self.nodes.len() - 1;
        }

        let Some(split) = find_split(
            options.strategy,
            &options.sah,
            &self.bounds[lo..hi],
            &node_aabb,
            &centroid_aabb,
        ) else {
            log::debug!(
                "No beneficial split for {} primitives at slot {}; making a leaf.",
                count,
                self.base as usize + lo
            );
            return self.push_leaf(lo, hi, node_aabb);
        };

        let mid = lo + partition(&mut self.order[lo..hi], &mut self.bounds[lo..hi], &split);

        if mid == lo || mid == hi {
            log::debug!(
                "Degenerate split of {} primitives at slot {}; making a leaf.",
                count,
                self.base as usize + lo
            );
            return self.push_leaf(lo, hi, node_aabb);
        }

        let id = self.nodes.len();
        self.nodes.push(BuildNode::Internal {
            left: 0,
            right: 0,
            split_axis: split.axis,
            aabb: node_aabb,
        });

        let (left_aabb, left_centroids) = range_bounds(&self.bounds[lo..mid]);
        let left = self.build_node(lo, mid, depth + 1, left_aabb, left_centroids);
        let (right_aabb, right_centroids) = range_bounds(&self.bounds[mid..hi]);
        let right = self.build_node(mid, hi, depth + 1, right_aabb, right_centroids);

        if let BuildNode::Internal { left: l, right: r, .. } = &mut self.nodes[id] {
            *l = left;
            *r = right;
        }

        id
    }
}

/// Writes the graph rooted at `nodes[0]` as pre-ordered packed records.
///
/// [`BuildNode::Subtree`] nodes are spliced in place, with their right child pointers shifted by
/// the splice position.
pub(crate) fn encode(nodes: &[BuildNode]) -> Result<Vec<PackedNode>, BvhError> {
    let mut out = Vec::new();
    if !nodes.is_empty() {
        encode_node(nodes, 0, &mut out)?;
    }
    Ok(out)
}

fn encode_node(nodes: &[BuildNode], id: usize, out: &mut Vec<PackedNode>) -> Result<(), BvhError> {
    match &nodes[id] {
        BuildNode::Leaf { range, aabb } | BuildNode::Pending { range, aabb, .. } => {
            out.push(PackedNode::leaf(aabb, range.offset, range.count)?)
        }
        BuildNode::Internal {
            left,
            right,
            split_axis,
            aabb,
        } => {
            let index = out.len();
            out.push(PackedNode::internal(aabb, *split_axis));
            encode_node(nodes, *left, out)?;
            out[index].right_or_offset = encode_index(out.len())?;
            encode_node(nodes, *right, out)?;
        }
        BuildNode::Subtree(records) => {
            let shift = encode_index(out.len())?;
            for record in records {
                let mut record = *record;
                if !record.is_leaf() {
                    record.right_or_offset = record
                        .right_or_offset
                        .checked_add(shift)
                        .ok_or(BvhError::EncodingOverflow {
                            what: "child record index",
                            value: record.right_or_offset as u64 + shift as u64,
                            limit: u32::MAX as u64,
                        })?;
                }
                out.push(record);
            }
        }
    }

    Ok(())
}

/// Builds and encodes one root on the current thread.
pub(crate) fn build_root(
    ctx: &BuildContext,
    order: &mut [u32],
    bounds: &mut [PrimitiveBounds],
    base: u32,
) -> Result<Vec<PackedNode>, BvhError> {
    let nodes = BvhBuilder::new(ctx, order, bounds, base, None).build(0);
    encode(&nodes)
}
