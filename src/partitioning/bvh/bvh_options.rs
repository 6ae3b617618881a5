use crate::math::Real;
use crate::shape::PrimitiveRange;
use std::fmt;
use std::sync::Arc;

/// The strategy used to pick the split plane of each node during a build.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Default, Clone, Debug, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Split the longest axis of the centroid bounds at its middle.
    Midpoint,
    /// Split the longest axis of the node bounds at the mean primitive centroid.
    Mean,
    /// Pick the split minimizing the binned Surface-Area-Heuristic cost.
    #[default]
    Sah,
}

/// Tuning constants of the Surface-Area-Heuristic.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct SahParams {
    /// The number of bins used for ranges that are not small enough for exact evaluation.
    pub bins: usize,
    /// The cost of traversing an internal node.
    pub traversal_cost: Real,
    /// The cost of testing one primitive.
    pub intersection_cost: Real,
}

impl Default for SahParams {
    fn default() -> Self {
        Self {
            bins: 32,
            traversal_cost: 1.0,
            intersection_cost: 1.25,
        }
    }
}

/// A callback receiving the build progress, between 0 and 1.
pub type ProgressCallback = Arc<dyn Fn(Real) + Send + Sync>;

/// Options controlling the construction of a [`MeshBvh`](super::MeshBvh).
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone)]
pub struct BvhOptions {
    /// The split strategy.
    pub strategy: SplitStrategy,
    /// The SAH constants, used when `strategy` is [`SplitStrategy::Sah`].
    pub sah: SahParams,
    /// Nodes at this depth are turned into leaves regardless of their primitive count.
    pub max_depth: u32,
    /// Ranges with at most this many primitives become leaves.
    pub max_leaf_size: u32,
    /// Keep the primitive source untouched and read leaves through an indirection table.
    pub indirect: bool,
    /// Let parallel build tasks borrow the bounds and index buffers instead of copying them.
    pub use_shared_memory: bool,
    /// The number of worker threads of the build. Values above 1 need the `parallel` feature.
    pub worker_count: usize,
    /// Restricts the build to a sub-range of the primitives.
    pub range: Option<PrimitiveRange>,
    /// Called with the build progress.
    #[cfg_attr(feature = "serde-serialize", serde(skip))]
    pub on_progress: Option<ProgressCallback>,
    /// Emits a warning when the depth cap is reached.
    pub verbose: bool,
}

impl Default for BvhOptions {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::Sah,
            sah: SahParams::default(),
            max_depth: 40,
            max_leaf_size: 10,
            indirect: false,
            use_shared_memory: false,
            worker_count: 1,
            range: None,
            on_progress: None,
            verbose: true,
        }
    }
}

impl fmt::Debug for BvhOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BvhOptions")
            .field("strategy", &self.strategy)
            .field("sah", &self.sah)
            .field("max_depth", &self.max_depth)
            .field("max_leaf_size", &self.max_leaf_size)
            .field("indirect", &self.indirect)
            .field("use_shared_memory", &self.use_shared_memory)
            .field("worker_count", &self.worker_count)
            .field("range", &self.range)
            .field("on_progress", &self.on_progress.is_some())
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl BvhOptions {
    /// Sets the split strategy.
    pub fn with_strategy(mut self, strategy: SplitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the maximum depth.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum leaf size.
    pub fn with_max_leaf_size(mut self, max_leaf_size: u32) -> Self {
        self.max_leaf_size = max_leaf_size;
        self
    }

    /// Enables or disables the indirection table.
    pub fn with_indirect(mut self, indirect: bool) -> Self {
        self.indirect = indirect;
        self
    }

    /// Sets the number of build workers and whether they share memory.
    pub fn with_workers(mut self, worker_count: usize, use_shared_memory: bool) -> Self {
        self.worker_count = worker_count;
        self.use_shared_memory = use_shared_memory;
        self
    }

    /// Restricts the build to a sub-range of the primitives.
    pub fn with_range(mut self, range: PrimitiveRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Sets the progress callback.
    pub fn with_progress(mut self, on_progress: impl Fn(Real) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(on_progress));
        self
    }
}
