//! Parallel construction of one root.
//!
//! The top of the tree is built on the calling thread down to `log2(worker_count)` levels. The
//! disjoint ranges left pending at that depth are then built and encoded by a rayon thread pool,
//! and their records are spliced back into the top-level buffer.

use super::bvh_bounds::PrimitiveBounds;
use super::bvh_build::{encode, BuildContext, BuildNode, BvhBuilder};
use super::bvh_packed::PackedNode;
use crate::bounding_volume::Aabb;
use crate::partitioning::BvhError;
use crate::shape::PrimitiveRange;
use rayon::prelude::*;

struct PendingTask<'a> {
    node: usize,
    range: PrimitiveRange,
    aabb: Aabb,
    centroid_aabb: Aabb,
    depth: u32,
    order: &'a mut [u32],
    bounds: &'a mut [PrimitiveBounds],
}

impl PendingTask<'_> {
    fn run(
        self,
        ctx: &BuildContext,
        shared_memory: bool,
    ) -> Result<(usize, Vec<PackedNode>), BvhError> {
        log::trace!(
            "Building a BVH subtree of {} primitives at slot {} on a worker thread.",
            self.range.count,
            self.range.offset
        );

        let nodes = if shared_memory {
            BvhBuilder::new(ctx, self.order, self.bounds, self.range.offset, None)
                .build_with_bounds(self.depth, self.aabb, self.centroid_aabb)
        } else {
            let mut order = self.order.to_vec();
            let mut bounds = self.bounds.to_vec();
            let nodes = BvhBuilder::new(ctx, &mut order, &mut bounds, self.range.offset, None)
                .build_with_bounds(self.depth, self.aabb, self.centroid_aabb);
            self.order.copy_from_slice(&order);
            self.bounds.copy_from_slice(&bounds);
            nodes
        };

        Ok((self.node, encode(&nodes)?))
    }
}

/// The depth at which subtrees are handed to workers: `log2` of the worker count rounded down
/// to a power of two.
pub(crate) fn pending_depth(worker_count: usize) -> u32 {
    if worker_count <= 1 {
        0
    } else {
        usize::BITS - 1 - worker_count.leading_zeros()
    }
}

/// Builds and encodes one root with a pool of `ctx.options.worker_count` threads.
pub(crate) fn build_root_parallel(
    ctx: &BuildContext,
    order: &mut [u32],
    bounds: &mut [PrimitiveBounds],
    base: u32,
) -> Result<Vec<PackedNode>, BvhError> {
    let options = ctx.options;
    let depth = pending_depth(options.worker_count);
    let mut nodes = BvhBuilder::new(ctx, order, bounds, base, Some(depth)).build(0);

    let mut pending: Vec<_> = nodes
        .iter()
        .enumerate()
        .filter_map(|(id, node)| match node {
            BuildNode::Pending {
                range,
                aabb,
                centroid_aabb,
                depth,
            } => Some((id, *range, *aabb, *centroid_aabb, *depth)),
            _ => None,
        })
        .collect();
    pending.sort_by_key(|p| p.1.offset);

    // Carve disjoint slices for every pending range.
    let mut tasks = Vec::with_capacity(pending.len());
    let mut order_rest = order;
    let mut bounds_rest = bounds;
    let mut cursor = base;

    for (node, range, aabb, centroid_aabb, depth) in pending {
        let skip = (range.offset - cursor) as usize;
        let (_, order_tail) = order_rest.split_at_mut(skip);
        let (_, bounds_tail) = bounds_rest.split_at_mut(skip);
        let (task_order, order_tail) = order_tail.split_at_mut(range.count as usize);
        let (task_bounds, bounds_tail) = bounds_tail.split_at_mut(range.count as usize);

        tasks.push(PendingTask {
            node,
            range,
            aabb,
            centroid_aabb,
            depth,
            order: task_order,
            bounds: task_bounds,
        });

        order_rest = order_tail;
        bounds_rest = bounds_tail;
        cursor = range.end();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.worker_count)
        .build()
        .map_err(|e| {
            BvhError::UnsupportedConfiguration(format!("cannot start build workers: {}", e))
        })?;

    let shared_memory = options.use_shared_memory;
    let subtrees: Vec<_> = pool.install(|| {
        tasks
            .into_par_iter()
            .map(|task| task.run(ctx, shared_memory))
            .collect::<Result<_, _>>()
    })?;

    for (node, records) in subtrees {
        nodes[node] = BuildNode::Subtree(records);
    }

    encode(&nodes)
}
