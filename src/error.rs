use thiserror::Error;

/// The error type produced by every fallible operation in this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MerkleError {
    /// Fewer than two blocks were supplied to [`crate::MerkleTree::new`].
    #[error("a tree needs at least two blocks, got {0}")]
    EmptyOrSingleBlock(usize),

    /// A block's [`crate::DataBlock::serialize`] call failed.
    #[error("block at index {index} failed to serialize: {source}")]
    BlockSerializeError {
        /// Index of the offending block.
        index: usize,
        /// The underlying serialization error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The hash function failed while combining a level.
    #[error("hash function failed at level {level}, position {position}: {source}")]
    HashError {
        /// Level at which the failure occurred (0 = leaves).
        level: usize,
        /// Position within that level.
        position: usize,
        /// The underlying hash error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The hash function's output length was not constant across calls.
    #[error("hash output length changed from {expected} to {actual} bytes")]
    HashLengthMismatch {
        /// The length established by the first call.
        expected: usize,
        /// The length observed on a later call.
        actual: usize,
    },

    /// `disable_leaf_hashing` was set but a leaf's bytes did not match the hash length.
    #[error("leaf {index} is {actual} bytes, expected exactly {expected} (disable_leaf_hashing is set)")]
    MalformedLeaf {
        /// Index of the offending leaf.
        index: usize,
        /// Expected length (the hash function's output length).
        expected: usize,
        /// Actual length of the leaf bytes.
        actual: usize,
    },

    /// `generate_proof` was called for a block that is not part of the tree.
    #[error("block not found in tree")]
    BlockNotFound,

    /// `generate_proof` was called on a tree built with a mode that discards levels.
    #[error("tree was built in a mode that does not retain levels; use Mode::TreeBuild or Mode::ProofAndTreeBuild")]
    ModeNotSupported,

    /// A proof's sibling digest length disagreed with the recomputed digest length.
    #[error("proof sibling length mismatch: expected {expected} bytes, got {actual}")]
    ProofMalformed {
        /// Expected digest length.
        expected: usize,
        /// Length actually found in the proof.
        actual: usize,
    },

    /// The tree is deeper than the path-bits representation can address.
    #[error("tree depth {depth} exceeds the maximum representable path width of {max_depth} levels")]
    TreeTooDeep {
        /// The depth that was required.
        depth: usize,
        /// The maximum depth `Proof::path_bits` (a `u128`) can represent.
        max_depth: usize,
    },
}
