use super::bvh_packed::PackedNode;
use super::bvh_tree::{resolve, MeshBvh};
use crate::bounding_volume::BoundingVolume;
use crate::math::{Real, DIM};
use crate::partitioning::BvhValidationError;
use crate::shape::PrimitiveSource;

/// Structural statistics of a [`MeshBvh`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BvhStats {
    /// The number of records over all roots.
    pub node_count: usize,
    /// The number of leaf records.
    pub leaf_count: usize,
    /// The smallest depth of a leaf.
    pub min_depth: u32,
    /// The largest depth of a leaf.
    pub max_depth: u32,
    /// The number of primitive slots covered by leaves.
    pub primitive_count: u64,
    /// How many internal nodes split along each axis.
    pub split_axes: [u32; 3],
    /// The SAH cost of the hierarchy, relative to the surface area of each root.
    pub sah_score: Real,
}

impl<S: PrimitiveSource> MeshBvh<S> {
    /// Checks that every node contains its children and every leaf contains the vertices of its
    /// primitives.
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), BvhValidationError> {
        let indirect = self.indirect.as_deref();
        let vertex_count = self.source.kind().vertex_count();

        for (nodes, base) in self.roots.iter().zip(self.root_bases.iter()) {
            for (i, node) in nodes.iter().enumerate() {
                let aabb = node.aabb();
                let id = base + i as u32;

                if node.is_leaf() {
                    for slot in node.range().iter() {
                        let primitive = resolve(indirect, slot);
                        for k in 0..vertex_count {
                            let vtx = self.source.vertex(primitive, k);
                            let mut excess: Real = 0.0;
                            for d in 0..DIM {
                                excess = excess
                                    .max(aabb.mins[d] - vtx[d])
                                    .max(vtx[d] - aabb.maxs[d]);
                            }

                            if excess > 0.0 {
                                return Err(BvhValidationError::PrimitiveNotContained {
                                    node: id,
                                    primitive,
                                    excess,
                                });
                            }
                        }
                    }
                } else {
                    for child in [PackedNode::left_child(i as u32), node.right_child()] {
                        if !aabb.contains(&nodes[child as usize].aabb()) {
                            return Err(BvhValidationError::ChildNotContained {
                                parent: id,
                                child: base + child,
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl<S> MeshBvh<S> {
    /// Computes structural statistics of this BVH.
    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats {
            min_depth: u32::MAX,
            ..Default::default()
        };
        let sah = self.options.sah;

        for nodes in &self.roots {
            let Some(root) = nodes.first() else {
                continue;
            };
            let root_area = root.aabb().surface_area();
            let mut root_cost = 0.0;
            let mut stack = vec![(0u32, 0u32)];

            while let Some((index, depth)) = stack.pop() {
                let node = &nodes[index as usize];
                stats.node_count += 1;
                let area = node.aabb().surface_area();

                if node.is_leaf() {
                    stats.leaf_count += 1;
                    stats.min_depth = stats.min_depth.min(depth);
                    stats.max_depth = stats.max_depth.max(depth);
                    stats.primitive_count += node.count() as u64;
                    root_cost += area * sah.intersection_cost * node.count() as Real;
                } else {
                    stats.split_axes[node.split_axis().min(2)] += 1;
                    root_cost += area * sah.traversal_cost;
                    stack.push((node.right_child(), depth + 1));
                    stack.push((PackedNode::left_child(index), depth + 1));
                }
            }

            if root_area > 0.0 {
                stats.sah_score += root_cost / root_area;
            }
        }

        if stats.leaf_count == 0 {
            stats.min_depth = 0;
        }

        stats
    }
}

#[cfg(test)]
mod test {
    use crate::math::Point;
    use crate::partitioning::{BvhOptions, BvhValidationError, MeshBvh, SplitStrategy};
    use crate::shape::TriMesh;

    fn grid(n: u32) -> TriMesh {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for i in 0..=n {
            for j in 0..=n {
                vertices.push(Point::new(i as f32, j as f32, ((i * j) % 3) as f32 * 0.25));
            }
        }
        for i in 0..n {
            for j in 0..n {
                let a = i * (n + 1) + j;
                let b = a + n + 1;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
        TriMesh::new(vertices, Some(indices)).unwrap()
    }

    #[test]
    fn stats_count_every_primitive() {
        for strategy in [SplitStrategy::Midpoint, SplitStrategy::Mean, SplitStrategy::Sah] {
            let options = BvhOptions::default().with_strategy(strategy);
            let bvh = MeshBvh::new(grid(12), &options).unwrap();
            let stats = bvh.stats();

            assert_eq!(bvh.validate(), Ok(()));
            assert_eq!(stats.primitive_count, 12 * 12 * 2);
            assert_eq!(stats.node_count, bvh.node_count());
            assert_eq!(stats.node_count, 2 * stats.leaf_count - 1);
            assert_eq!(
                stats.split_axes.iter().sum::<u32>() as usize,
                stats.node_count - stats.leaf_count
            );
            assert!(stats.min_depth <= stats.max_depth);
            assert!(stats.sah_score > 0.0);
        }
    }

    #[test]
    fn moved_vertex_is_reported() {
        let mut bvh = MeshBvh::new(grid(4), &BvhOptions::default()).unwrap();
        bvh.source_mut().vertices_mut()[0].z = -2.0;

        match bvh.validate() {
            Err(BvhValidationError::PrimitiveNotContained { excess, .. }) => {
                assert!(excess >= 1.9)
            }
            other => panic!("unexpected validation result: {:?}", other),
        }
    }
}
