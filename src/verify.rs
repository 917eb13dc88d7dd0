//! Stateless inclusion-proof verification.
//!
//! Unlike [`crate::MerkleTree::verify`], these functions need no tree
//! object — only a root digest, the hash function and sibling-ordering
//! convention the tree was built with, and the block and proof in question.

use crate::block::DataBlock;
use crate::digest::Digest;
use crate::error::MerkleError;
use crate::hash::HashFunction;
use crate::leaf::leaf_digest;
use crate::proof::Proof;

/// Verifies `proof` proves inclusion of `block` under `root`, using SHA-256
/// (or `hash_fn` if given) and the default (unsorted) sibling-pair
/// convention.
///
/// Returns `Ok(false)` for a structurally valid proof that simply does not
/// match `root`; returns `Err` only for malformed input (a sibling of the
/// wrong length, a hash function that errors).
pub fn verify<B: DataBlock>(
    block: &B,
    proof: &Proof,
    root: &Digest,
    hash_fn: Option<HashFunction>,
) -> Result<bool, MerkleError> {
    verify_with_config(block, proof, root, hash_fn, false, false)
}

/// As [`verify`], but with explicit control over the sibling-ordering and
/// leaf-hashing conventions the tree was built with. Use this when verifying
/// proofs from a tree built with [`crate::Config::with_sort_siblings`] or
/// [`crate::Config::with_disable_leaf_hashing`] set.
pub fn verify_with_config<B: DataBlock>(
    block: &B,
    proof: &Proof,
    root: &Digest,
    hash_fn: Option<HashFunction>,
    sort_siblings: bool,
    disable_leaf_hashing: bool,
) -> Result<bool, MerkleError> {
    let span = tracing::trace_span!("merkle_verify", depth = proof.depth());
    let _guard = span.enter();

    let hash_function = hash_fn.unwrap_or_else(HashFunction::sha256);
    let expected_len = hash_function.output_len()?;

    let mut running = leaf_digest(block, &hash_function, disable_leaf_hashing, expected_len, 0)?;

    for (level_index, sibling) in proof.siblings().iter().enumerate() {
        if sibling.len() != expected_len {
            return Err(MerkleError::ProofMalformed {
                expected: expected_len,
                actual: sibling.len(),
            });
        }

        let bit = (proof.path_bits() >> level_index) & 1;
        let (x, y) = if bit == 1 {
            (sibling, &running)
        } else {
            (&running, sibling)
        };
        let (x, y) = if sort_siblings && y < x { (y, x) } else { (x, y) };

        let mut combined = Vec::with_capacity(x.len() + y.len());
        combined.extend_from_slice(x);
        combined.extend_from_slice(y);

        running = hash_function
            .hash(&combined)
            .map_err(|source| MerkleError::HashError {
                level: level_index + 1,
                position: 0,
                source,
            })?;
    }

    let matches = running == *root;
    tracing::trace!(matches, "verification complete");
    Ok(matches)
}

/// Verifies a batch of `(block, proof)` pairs against the same root.
///
/// This is a convenience over calling [`verify_with_config`] in a loop: any
/// internal error (a malformed proof, a failing hash function) is treated as
/// a failed verification rather than aborting the batch, so the result is
/// always one boolean per input pair, fail-closed.
pub fn verify_all<B: DataBlock>(
    blocks: &[B],
    proofs: &[Proof],
    root: &Digest,
    hash_fn: Option<HashFunction>,
    sort_siblings: bool,
    disable_leaf_hashing: bool,
) -> Vec<bool> {
    let hash_function = hash_fn.unwrap_or_else(HashFunction::sha256);

    blocks
        .iter()
        .zip(proofs.iter())
        .map(|(block, proof)| {
            verify_with_config(
                block,
                proof,
                root,
                Some(hash_function.clone()),
                sort_siblings,
                disable_leaf_hashing,
            )
            .unwrap_or(false)
        })
        .collect()
}
