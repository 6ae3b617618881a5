use crate::math::Real;

/// Errors that can occur while building, refitting or deserializing a [`MeshBvh`](super::MeshBvh).
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum BvhError {
    /// The primitive source is inconsistent (bad index count, out-of-range index, bad group).
    #[error("malformed geometry: {reason}")]
    MalformedGeometry {
        /// Human-readable description of the inconsistency.
        reason: String,
    },
    /// A value does not fit in its packed node field.
    #[error("{what} = {value} exceeds the packed node limit of {limit}")]
    EncodingOverflow {
        /// Name of the overflowing field.
        what: &'static str,
        /// The value that had to be encoded.
        value: u64,
        /// The largest value the field can hold.
        limit: u64,
    },
    /// The requested build configuration cannot be honored.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),
    /// A serialized BVH was produced by an incompatible layout version.
    #[error("incompatible serialized format: expected version {expected}, found {found}")]
    IncompatibleFormat {
        /// The version this crate reads.
        expected: u32,
        /// The version found in the input.
        found: u32,
    },
    /// A root buffer has a byte length that is not a whole number of node records.
    #[error("invalid root buffer of {len} bytes: not a multiple of the 32-byte node size")]
    InvalidBuffer {
        /// The byte length of the rejected buffer.
        len: usize,
    },
}

impl BvhError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        BvhError::MalformedGeometry {
            reason: reason.into(),
        }
    }
}

/// A containment violation reported by [`MeshBvh::validate`](super::MeshBvh::validate).
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum BvhValidationError {
    /// A child record is not enclosed by its parent.
    #[error("node {child} is not contained in its parent {parent}")]
    ChildNotContained {
        /// Global id of the parent record.
        parent: u32,
        /// Global id of the offending child.
        child: u32,
    },
    /// A vertex of a leaf primitive lies outside of the leaf bounds.
    #[error("primitive {primitive} of leaf {node} sticks out of its bounds by {excess}")]
    PrimitiveNotContained {
        /// Global id of the leaf record.
        node: u32,
        /// The primitive index.
        primitive: u32,
        /// The largest per-axis distance between the vertex and the leaf bounds.
        excess: Real,
    },
}
