use super::bvh_bounds::{compute_primitive_bounds, PrimitiveBounds};
use super::bvh_build::{build_root, BuildContext};
use super::bvh_options::BvhOptions;
use super::bvh_packed::{PackedNode, PackedTreeView};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::partitioning::BvhError;
use crate::shape::primitive_source::check_groups;
use crate::shape::{PrimitiveRange, PrimitiveSource};

/// A bounding volume hierarchy over the primitives of a mesh.
///
/// The hierarchy is stored as one or more roots, each a flat buffer of 32-byte
/// [`PackedNode`] records covering a disjoint range of primitive slots. Leaves address
/// contiguous slot ranges: slot `i` holds the primitive `i` once the source has been reordered
/// by the build, or the primitive `indirect_buffer()[i]` in indirect mode.
///
/// The BVH owns its primitive source. Vertex data mutated through [`MeshBvh::source_mut`] must
/// be followed by a call to [`MeshBvh::refit`] or [`MeshBvh::rebuild`] before querying again.
///
/// # Example
///
/// ```rust
/// use meshbvh::math::Point;
/// use meshbvh::partitioning::{BvhOptions, MeshBvh};
/// use meshbvh::shape::TriMesh;
///
/// let vertices = vec![
///     Point::new(0.0, 0.0, 0.0),
///     Point::new(1.0, 0.0, 0.0),
///     Point::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = TriMesh::new(vertices, Some(vec![0, 1, 2])).unwrap();
/// let bvh = MeshBvh::new(mesh, &BvhOptions::default()).unwrap();
/// assert_eq!(bvh.node_count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct MeshBvh<S> {
    pub(crate) source: S,
    pub(crate) roots: Vec<Vec<PackedNode>>,
    pub(crate) root_bases: Vec<u32>,
    pub(crate) indirect: Option<Vec<u32>>,
    pub(crate) options: BvhOptions,
}

impl<S: PrimitiveSource> MeshBvh<S> {
    /// Builds a BVH over the primitives of `source`.
    ///
    /// Unless indirect mode is requested or the source cannot be reordered, the primitives of
    /// `source` are physically reordered to match the leaf layout.
    pub fn new(source: S, options: &BvhOptions) -> Result<Self, BvhError> {
        let mut result = Self {
            source,
            roots: Vec::new(),
            root_bases: Vec::new(),
            indirect: None,
            options: options.clone(),
        };
        result.rebuild()?;
        Ok(result)
    }

    /// Discards the current hierarchy and builds it again from the current primitive data.
    pub fn rebuild(&mut self) -> Result<(), BvhError> {
        let options = &self.options;
        self.source.validate()?;
        let count = self.source.primitive_count();
        let groups = self.source.groups();
        check_groups(&groups, count)?;
        check_configuration(options)?;

        let indirect = options.indirect || !self.source.supports_reordering();
        if indirect && !options.indirect {
            log::debug!(
                "The primitive source cannot be reordered; building the BVH in indirect mode."
            );
        }

        let full = PrimitiveRange::new(0, count);
        let ranges: Vec<PrimitiveRange> = if groups.is_empty() {
            vec![full]
        } else {
            groups
        }
        .into_iter()
        .filter_map(|group| match &options.range {
            Some(range) => group.intersection(range),
            None => Some(group),
        })
        .filter(|range| !range.is_empty())
        .collect();

        let mut order: Vec<u32> = (0..count).collect();
        let mut bounds: Vec<PrimitiveBounds> = vec![[0.0; 6]; count as usize];
        let total = ranges.iter().map(|r| r.count as u64).sum();
        let ctx = BuildContext::new(options, total);

        let mut roots = Vec::with_capacity(ranges.len());
        for range in &ranges {
            let slots = range.offset as usize..range.end() as usize;
            compute_primitive_bounds(&self.source, None, range.offset, &mut bounds[slots.clone()]);

            let (root_order, root_bounds) = (&mut order[slots.clone()], &mut bounds[slots]);
            let root = if options.worker_count > 1 {
                build_root_on_workers(&ctx, root_order, root_bounds, range.offset)?
            } else {
                build_root(&ctx, root_order, root_bounds, range.offset)?
            };
            roots.push(root);
        }

        if indirect {
            self.indirect = Some(order);
        } else {
            self.source.apply_permutation(&order)?;
            self.indirect = None;
        }

        self.root_bases = root_bases(&roots);
        self.roots = roots;
        Ok(())
    }
}

#[cfg(feature = "parallel")]
fn build_root_on_workers(
    ctx: &BuildContext,
    order: &mut [u32],
    bounds: &mut [PrimitiveBounds],
    base: u32,
) -> Result<Vec<PackedNode>, BvhError> {
    super::bvh_parallel_build::build_root_parallel(ctx, order, bounds, base)
}

#[cfg(not(feature = "parallel"))]
fn build_root_on_workers(
    ctx: &BuildContext,
    order: &mut [u32],
    bounds: &mut [PrimitiveBounds],
    base: u32,
) -> Result<Vec<PackedNode>, BvhError> {
    build_root(ctx, order, bounds, base)
}

fn check_configuration(options: &BvhOptions) -> Result<(), BvhError> {
    if options.worker_count == 0 {
        return Err(BvhError::UnsupportedConfiguration(
            "the worker count must be at least 1".to_string(),
        ));
    }

    if cfg!(not(feature = "parallel")) && (options.worker_count > 1 || options.use_shared_memory)
    {
        return Err(BvhError::UnsupportedConfiguration(
            "parallel builds and shared memory require the `parallel` feature".to_string(),
        ));
    }

    Ok(())
}

/// The global id of the first record of each root.
pub(crate) fn root_bases(roots: &[Vec<PackedNode>]) -> Vec<u32> {
    let mut base = 0;
    roots
        .iter()
        .map(|root| {
            let result = base;
            base += root.len() as u32;
            result
        })
        .collect()
}

impl<S> MeshBvh<S> {
    /// The primitive source of this BVH.
    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the primitive source.
    ///
    /// Moving vertices invalidates the node bounds until [`MeshBvh::refit`] is called.
    #[inline]
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consumes this BVH, returning its primitive source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// The options this BVH was built with.
    #[inline]
    pub fn options(&self) -> &BvhOptions {
        &self.options
    }

    /// The number of roots.
    #[inline]
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// A read-only view of the `i`-th root.
    #[inline]
    pub fn root(&self, i: usize) -> PackedTreeView<'_> {
        PackedTreeView::new(&self.roots[i])
    }

    /// Read-only views of every root.
    pub fn roots(&self) -> impl ExactSizeIterator<Item = PackedTreeView<'_>> {
        self.roots.iter().map(|root| PackedTreeView::new(root))
    }

    /// The global id of the first record of each root.
    #[inline]
    pub fn root_bases(&self) -> &[u32] {
        &self.root_bases
    }

    /// The total number of records over all roots.
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|root| root.len()).sum()
    }

    /// Is this BVH empty?
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// The slot-to-primitive table, in indirect mode.
    #[inline]
    pub fn indirect_buffer(&self) -> Option<&[u32]> {
        self.indirect.as_deref()
    }

    /// The primitive stored at the given leaf slot.
    #[inline]
    pub fn resolve_primitive(&self, slot: u32) -> u32 {
        resolve(self.indirect.as_deref(), slot)
    }

    /// The root record and local index of a global node id.
    pub fn locate_node(&self, node: u32) -> Option<(usize, u32)> {
        let root = self.root_bases.partition_point(|base| *base <= node).checked_sub(1)?;
        let local = node - self.root_bases[root];
        ((local as usize) < self.roots[root].len()).then_some((root, local))
    }

    /// The bounds of the whole hierarchy.
    ///
    /// Returns [`Aabb::new_invalid`] for an empty BVH.
    pub fn aabb(&self) -> Aabb {
        self.roots
            .iter()
            .filter_map(|root| root.first())
            .fold(Aabb::new_invalid(), |acc, node| acc.merged(&node.aabb()))
    }
}

#[inline(always)]
pub(crate) fn resolve(indirect: Option<&[u32]>, slot: u32) -> u32 {
    indirect.map(|ind| ind[slot as usize]).unwrap_or(slot)
}
