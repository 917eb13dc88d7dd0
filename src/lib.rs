//! A binary Merkle tree over an ordered sequence of opaque data blocks.
//!
//! The tree commits to the blocks by recursively hashing them pairwise into
//! levels until a single root digest remains. Each leaf has a compact
//! inclusion proof, verifiable against the root without access to the tree.
//!
//! Construction can run serially or fan per-level work out across a bounded
//! worker pool ([`Config::with_parallel`]); the resulting root and proofs are
//! identical either way (see [`tree::MerkleTree`] for the determinism
//! contract). The hash function and the sibling-pair ordering convention
//! (plain concatenation vs. sorted-siblings) are both pluggable through
//! [`Config`].
//!
//! ```
//! use merkle_tree::{Config, MerkleTree};
//!
//! let blocks = vec!["A".to_string(), "B".to_string(), "C".to_string()];
//! let tree = MerkleTree::new(Config::default(), blocks.clone()).unwrap();
//! let proof = tree.proofs().unwrap()[1].clone();
//! assert!(tree.verify(&blocks[1], &proof).unwrap());
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_lifetimes)]
#![warn(unused_qualifications, missing_docs)]
#![warn(clippy::all, clippy::panic)]

mod block;
mod config;
mod digest;
mod error;
mod hash;
mod leaf;
mod parallel;
mod proof;
mod tree;
mod verify;

pub use block::DataBlock;
pub use config::{Config, Mode};
pub use digest::Digest;
pub use error::MerkleError;
pub use hash::HashFunction;
pub use proof::Proof;
pub use tree::MerkleTree;
pub use verify::{verify, verify_all, verify_with_config};
