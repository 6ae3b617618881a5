use super::bvh_options::BvhOptions;
use super::bvh_packed::{nodes_to_le_bytes, PackedNode, PackedTreeView};
use super::bvh_tree::{root_bases, MeshBvh};
use crate::partitioning::BvhError;
use crate::shape::primitive_source::check_permutation;
use crate::shape::PrimitiveSource;
use smallvec::SmallVec;

/// The layout version written by [`MeshBvh::serialize`].
pub const SERIALIZATION_VERSION: u32 = 1;

/// A BVH serialized as little-endian root buffers.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializedBvh {
    /// The layout version.
    pub version: u32,
    /// One byte buffer of 32-byte records per root.
    pub roots: Vec<Vec<u8>>,
    /// The connectivity buffer of the primitive source, if it has one.
    pub index: Option<Vec<u32>>,
    /// The slot-to-primitive table, in indirect mode.
    pub indirect_buffer: Option<Vec<u32>>,
}

/// Options of [`MeshBvh::deserialize`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeserializeOptions {
    /// Write the serialized connectivity buffer back into the primitive source.
    pub set_index: bool,
}

impl<S: PrimitiveSource> MeshBvh<S> {
    /// Serializes the packed roots of this BVH together with the connectivity it refers to.
    pub fn serialize(&self) -> SerializedBvh {
        SerializedBvh {
            version: SERIALIZATION_VERSION,
            roots: self.roots.iter().map(|root| nodes_to_le_bytes(root)).collect(),
            index: self.source.index_buffer().map(|index| index.to_vec()),
            indirect_buffer: self.indirect.clone(),
        }
    }

    /// Rebuilds a query-ready BVH from serialized roots, without running a build.
    ///
    /// The primitive data of `source` must be consistent with the serialized connectivity,
    /// which `options.set_index` can restore.
    pub fn deserialize(
        data: &SerializedBvh,
        mut source: S,
        options: &DeserializeOptions,
    ) -> Result<Self, BvhError> {
        if data.version != SERIALIZATION_VERSION {
            return Err(BvhError::IncompatibleFormat {
                expected: SERIALIZATION_VERSION,
                found: data.version,
            });
        }

        if options.set_index {
            if let Some(index) = &data.index {
                source.set_index_buffer(index.clone())?;
            }
        }

        let count = source.primitive_count();
        if let Some(indirect) = &data.indirect_buffer {
            check_permutation(indirect, count)?;
        }

        let roots = data
            .roots
            .iter()
            .map(|bytes| {
                let nodes = PackedTreeView::from_bytes(bytes)?.into_owned();
                check_root(&nodes, count)?;
                Ok(nodes)
            })
            .collect::<Result<Vec<_>, BvhError>>()?;

        let options = BvhOptions::default().with_indirect(data.indirect_buffer.is_some());

        Ok(Self {
            source,
            root_bases: root_bases(&roots),
            roots,
            indirect: data.indirect_buffer.clone(),
            options,
        })
    }
}

/// Checks that the records of a root form one pre-order tree whose leaves stay inside of
/// the primitive slots of the source.
///
/// Every record must be reached exactly once: the right child of an internal record is the
/// record following the last one of its left subtree, and the walk ends on the last record.
fn check_root(nodes: &[PackedNode], primitive_count: u32) -> Result<(), BvhError> {
    if nodes.is_empty() {
        return Err(BvhError::malformed("empty root buffer"));
    }

    let mut pending_right: SmallVec<[u32; 32]> = SmallVec::new();
    let mut cursor = 0;

    loop {
        let Some(node) = nodes.get(cursor) else {
            return Err(BvhError::malformed(format!(
                "record {} is addressed past the end of a root of {} records",
                cursor,
                nodes.len()
            )));
        };

        if node.is_leaf() {
            if node.offset() as u64 + node.count() as u64 > primitive_count as u64 {
                return Err(BvhError::malformed(format!(
                    "leaf {} addresses slots past the {} primitives of the source",
                    cursor, primitive_count
                )));
            }

            cursor += 1;
            match pending_right.pop() {
                Some(right) if right as usize == cursor => {}
                Some(right) => {
                    return Err(BvhError::malformed(format!(
                        "right child {} does not follow its left subtree ending at record {}",
                        right, cursor
                    )))
                }
                None => break,
            }
        } else {
            if node.split_axis() > 2 {
                return Err(BvhError::malformed(format!(
                    "internal record {} has split axis {}",
                    cursor,
                    node.split_axis()
                )));
            }

            pending_right.push(node.right_child());
            cursor += 1;
        }
    }

    if cursor != nodes.len() {
        return Err(BvhError::malformed(format!(
            "{} of the {} records of a root are unreachable",
            nodes.len() - cursor,
            nodes.len()
        )));
    }

    Ok(())
}
