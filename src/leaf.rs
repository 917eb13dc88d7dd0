use crate::block::DataBlock;
use crate::config::Config;
use crate::digest::Digest;
use crate::error::MerkleError;
use crate::hash::HashFunction;
use crate::parallel::{collect_in_order, map_indexed_parallel, map_indexed_serial};

/// Computes the digest of a single leaf, honouring `disable_leaf_hashing`.
pub(crate) fn leaf_digest<B: DataBlock>(
    block: &B,
    hash_function: &HashFunction,
    disable_leaf_hashing: bool,
    expected_len: usize,
    index: usize,
) -> Result<Digest, MerkleError> {
    let bytes = block
        .serialize()
        .map_err(|source| MerkleError::BlockSerializeError {
            index,
            source: Box::new(source),
        })?;

    if disable_leaf_hashing {
        if bytes.len() != expected_len {
            return Err(MerkleError::MalformedLeaf {
                index,
                expected: expected_len,
                actual: bytes.len(),
            });
        }
        Ok(Digest::from(bytes))
    } else {
        let digest = hash_function
            .hash(&bytes)
            .map_err(|source| MerkleError::HashError {
                level: 0,
                position: index,
                source,
            })?;
        if digest.len() != expected_len {
            return Err(MerkleError::HashLengthMismatch {
                expected: expected_len,
                actual: digest.len(),
            });
        }
        Ok(digest)
    }
}

/// Builds the leaf level (level 0) for the given blocks, in parallel if
/// `config.parallel` is set.
pub(crate) fn build_leaves<B: DataBlock>(
    blocks: &[B],
    config: &Config,
    expected_len: usize,
) -> Result<Vec<Digest>, MerkleError> {
    let compute = |i: usize| {
        leaf_digest(
            &blocks[i],
            &config.hash_function,
            config.disable_leaf_hashing,
            expected_len,
            i,
        )
    };

    let results = if config.parallel {
        map_indexed_parallel(blocks.len(), config.resolved_num_workers(), compute)
    } else {
        map_indexed_serial(blocks.len(), compute)
    };

    collect_in_order(results)
}
