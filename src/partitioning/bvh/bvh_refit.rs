use super::bvh_bounds::{compute_primitive_bounds, range_bounds, PrimitiveBounds};
use super::bvh_packed::PackedNode;
use super::bvh_tree::MeshBvh;
use crate::bounding_volume::BoundingVolume;
use crate::shape::PrimitiveSource;
use smallvec::SmallVec;
use std::collections::HashSet;

/// Restricts [`MeshBvh::refit_partial`] to part of the hierarchy.
///
/// Both sets contain global node ids, as passed to [`ShapeCast`](super::ShapeCast) callbacks.
#[derive(Clone, Debug, Default)]
pub struct RefitFilter {
    /// Children listed here are descended into.
    ///
    /// An internal node none of whose children are listed has its whole subtree refitted.
    pub visit: HashSet<u32>,
    /// Nodes whose whole subtree is refitted.
    pub force: HashSet<u32>,
}

impl RefitFilter {
    /// A filter descending toward the given leaves.
    ///
    /// Every ancestor of the listed leaves is visited and the leaves themselves are refitted.
    /// Siblings of the visited nodes keep their current bounds.
    pub fn from_leaves<S>(bvh: &MeshBvh<S>, leaves: &[u32]) -> Self {
        let targets: HashSet<u32> = leaves.iter().copied().collect();
        let mut result = Self::default();
        let mut path = Vec::new();

        for (nodes, base) in bvh.roots.iter().zip(bvh.root_bases.iter()) {
            collect_paths(nodes, *base, 0, &targets, &mut path, &mut result.visit);
        }

        result.force = targets;
        result
    }
}

fn collect_paths(
    nodes: &[PackedNode],
    base: u32,
    index: u32,
    targets: &HashSet<u32>,
    path: &mut Vec<u32>,
    visit: &mut HashSet<u32>,
) {
    path.push(base + index);

    if targets.contains(&(base + index)) {
        visit.extend(path.iter().copied());
    } else if !nodes[index as usize].is_leaf() {
        let right = nodes[index as usize].right_child();
        collect_paths(nodes, base, PackedNode::left_child(index), targets, path, visit);
        collect_paths(nodes, base, right, targets, path, visit);
    }

    let _ = path.pop();
}

struct Refitter<'a, S> {
    source: &'a S,
    indirect: Option<&'a [u32]>,
    filter: Option<&'a RefitFilter>,
    base: u32,
    changed: usize,
    scratch: SmallVec<[PrimitiveBounds; 16]>,
}

impl<S: PrimitiveSource> Refitter<'_, S> {
    /// Refits the subtree at `index`, returning `true` if its bounds changed.
    fn refit_node(&mut self, nodes: &mut [PackedNode], index: u32, force: bool) -> bool {
        let force = force
            || self
                .filter
                .map(|f| f.force.contains(&(self.base + index)))
                .unwrap_or(false);
        let node = nodes[index as usize];

        let new_aabb = if node.is_leaf() {
            self.scratch.clear();
            self.scratch.resize(node.count() as usize, [0.0; 6]);
            compute_primitive_bounds(self.source, self.indirect, node.offset(), &mut self.scratch);
            range_bounds(&self.scratch).0
        } else {
            let left = PackedNode::left_child(index);
            let right = node.right_child();

            let (visit_left, visit_right, force_children) = match self.filter {
                Some(filter) if !force => {
                    let l = filter.visit.contains(&(self.base + left));
                    let r = filter.visit.contains(&(self.base + right));
                    if l || r {
                        (l, r, false)
                    } else {
                        (true, true, true)
                    }
                }
                _ => (true, true, force),
            };

            let left_changed = visit_left && self.refit_node(nodes, left, force_children);
            let right_changed = visit_right && self.refit_node(nodes, right, force_children);

            if !left_changed && !right_changed {
                return false;
            }

            nodes[left as usize]
                .aabb()
                .merged(&nodes[right as usize].aabb())
        };

        if new_aabb != node.aabb() {
            nodes[index as usize].set_aabb(&new_aabb);
            self.changed += 1;
            true
        } else {
            false
        }
    }
}

impl<S: PrimitiveSource> MeshBvh<S> {
    /// Recomputes the bounds of every node from the current vertex data.
    ///
    /// The topology is left untouched. Returns the number of records whose bounds changed.
    pub fn refit(&mut self) -> usize {
        self.refit_with(None)
    }

    /// Recomputes the bounds of the part of the hierarchy selected by `filter`.
    ///
    /// Roots are always visited. Returns the number of records whose bounds changed.
    pub fn refit_partial(&mut self, filter: &RefitFilter) -> usize {
        self.refit_with(Some(filter))
    }

    fn refit_with(&mut self, filter: Option<&RefitFilter>) -> usize {
        let mut changed = 0;

        for (nodes, base) in self.roots.iter_mut().zip(self.root_bases.iter()) {
            if nodes.is_empty() {
                continue;
            }

            let mut refitter = Refitter {
                source: &self.source,
                indirect: self.indirect.as_deref(),
                filter,
                base: *base,
                changed: 0,
                scratch: SmallVec::new(),
            };
            let _ = refitter.refit_node(nodes, 0, filter.is_none());
            changed += refitter.changed;
        }

        if changed > 0 {
            log::trace!("Refit updated the bounds of {} BVH nodes.", changed);
        }

        changed
    }
}
