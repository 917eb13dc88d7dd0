use crate::block::DataBlock;
use crate::config::{Config, Mode};
use crate::digest::Digest;
use crate::error::MerkleError;
use crate::leaf::build_leaves;
use crate::parallel::{collect_in_order, map_indexed_parallel, map_indexed_serial};
use crate::proof::{generate_proof_from_levels, Proof};
use crate::verify::verify_with_config;

/// A constructed Merkle tree over an ordered sequence of blocks.
///
/// Once built, a tree is read-only: there is no incremental update. What it
/// retains beyond the root depends on [`Config::with_mode`] — see [`Mode`].
/// Reading from a `MerkleTree` (and calling [`MerkleTree::verify`]) requires
/// no synchronisation; it may be shared across any number of readers.
pub struct MerkleTree<B: DataBlock> {
    root: Digest,
    blocks: Vec<B>,
    depth: usize,
    mode: Mode,
    config: Config,
    levels: Option<Vec<Vec<Digest>>>,
    proofs: Option<Vec<Proof>>,
}

impl<B: DataBlock> MerkleTree<B> {
    /// Builds a tree over `blocks` using `config`.
    ///
    /// Fails with [`MerkleError::EmptyOrSingleBlock`] if fewer than two
    /// blocks are given. The root and every proof produced are a pure
    /// function of `(blocks, config)`: whether `config.parallel` is set does
    /// not change the result, only how many threads compute it (see
    /// [`crate::parallel`]).
    pub fn new(config: Config, blocks: Vec<B>) -> Result<Self, MerkleError> {
        let span = tracing::debug_span!(
            "merkle_tree_construct",
            leaf_count = blocks.len(),
            mode = ?config.mode,
            parallel = config.parallel,
        );
        let _guard = span.enter();

        if blocks.len() < 2 {
            tracing::warn!(leaf_count = blocks.len(), "refusing to build a tree with fewer than two blocks");
            return Err(MerkleError::EmptyOrSingleBlock(blocks.len()));
        }

        let expected_len = config.hash_function.output_len()?;
        let leaves = build_leaves(&blocks, &config, expected_len)?;
        let leaf_count = leaves.len();

        let mut levels: Vec<Vec<Digest>> = vec![leaves];
        let mut level_index = 0usize;
        while levels[level_index].len() > 1 {
            tracing::trace!(level = level_index, width = levels[level_index].len(), "reducing level");
            let next = match reduce_level(&levels[level_index], &config, level_index, expected_len) {
                Ok(next) => next,
                Err(error) => {
                    tracing::warn!(level = level_index, %error, "level reduction failed");
                    return Err(error);
                }
            };
            levels.push(next);
            level_index += 1;
        }
        let depth = level_index;
        let root = levels[depth][0].clone();

        let proofs = if config.mode.retains_proofs() {
            let mut proofs = Vec::with_capacity(leaf_count);
            for leaf_index in 0..leaf_count {
                proofs.push(generate_proof_from_levels(&levels, leaf_index)?);
            }
            Some(proofs)
        } else {
            None
        };

        let retained_levels = config.mode.retains_levels().then_some(levels);

        tracing::debug!(depth, root = %root, "tree construction complete");

        Ok(Self {
            root,
            blocks,
            depth,
            mode: config.mode,
            config,
            levels: retained_levels,
            proofs,
        })
    }

    /// The root digest.
    pub fn root(&self) -> &Digest {
        &self.root
    }

    /// The ordered input blocks.
    pub fn blocks(&self) -> &[B] {
        &self.blocks
    }

    /// The number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.blocks.len()
    }

    /// The tree's depth: the number of levels above the leaves, after
    /// odd-length padding. Every proof this tree produces has exactly this
    /// many siblings.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The mode this tree was built with.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The precomputed per-leaf proofs, indexed by input position, if the
    /// tree's mode retains them (`Mode::ProofGen` or `Mode::ProofAndTreeBuild`).
    pub fn proofs(&self) -> Option<&[Proof]> {
        self.proofs.as_deref()
    }

    /// Derives an inclusion proof for `block` on demand.
    ///
    /// Requires a mode that retains levels (`Mode::TreeBuild` or
    /// `Mode::ProofAndTreeBuild`); otherwise fails with
    /// [`MerkleError::ModeNotSupported`]. The block is located by comparing
    /// serialized bytes against every stored block, in order, and the first
    /// match wins; a block not present in the tree fails with
    /// [`MerkleError::BlockNotFound`].
    pub fn generate_proof(&self, block: &B) -> Result<Proof, MerkleError> {
        let levels = self.levels.as_ref().ok_or(MerkleError::ModeNotSupported)?;

        // `self.blocks.len()` is used as the index for the queried block's
        // own serialize failure: it is not a member of the tree, so there is
        // no real leaf index to report.
        let target = block
            .serialize()
            .map_err(|source| MerkleError::BlockSerializeError {
                index: self.blocks.len(),
                source: Box::new(source),
            })?;

        let mut found = None;
        for (index, candidate) in self.blocks.iter().enumerate() {
            let candidate_bytes =
                candidate
                    .serialize()
                    .map_err(|source| MerkleError::BlockSerializeError {
                        index,
                        source: Box::new(source),
                    })?;
            if candidate_bytes == target {
                found = Some(index);
                break;
            }
        }

        let index = found.ok_or(MerkleError::BlockNotFound)?;
        generate_proof_from_levels(levels, index)
    }

    /// Verifies `proof` proves inclusion of `block` under this tree's root,
    /// using this tree's hash function and sibling-ordering convention.
    /// Equivalent to the stateless [`crate::verify`] with this tree's
    /// configuration, but does not require recomputing which convention was
    /// used out of band.
    pub fn verify(&self, block: &B, proof: &Proof) -> Result<bool, MerkleError> {
        verify_with_config(
            block,
            proof,
            &self.root,
            Some(self.config.hash_function.clone()),
            self.config.sort_siblings,
            self.config.disable_leaf_hashing,
        )
    }
}

/// Reduces one level to the next: pads an odd-length level by duplicating
/// its last digest, then hashes each pair (optionally sorted) into the
/// parent level, fanning the per-pair work out across the worker pool when
/// `config.parallel` is set.
fn reduce_level(
    level: &[Digest],
    config: &Config,
    level_index: usize,
    expected_len: usize,
) -> Result<Vec<Digest>, MerkleError> {
    let padded = pad_to_even(level);
    let pair_count = padded.len() / 2;

    let hash_function = &config.hash_function;
    let sort_siblings = config.sort_siblings;

    let compute = |k: usize| {
        let a = &padded[2 * k];
        let b = &padded[2 * k + 1];
        let (x, y) = if sort_siblings {
            if a <= b { (a, b) } else { (b, a) }
        } else {
            (a, b)
        };

        let mut combined = Vec::with_capacity(x.len() + y.len());
        combined.extend_from_slice(x);
        combined.extend_from_slice(y);

        let digest = hash_function
            .hash(&combined)
            .map_err(|source| MerkleError::HashError {
                level: level_index + 1,
                position: k,
                source,
            })?;
        if digest.len() != expected_len {
            return Err(MerkleError::HashLengthMismatch {
                expected: expected_len,
                actual: digest.len(),
            });
        }
        Ok(digest)
    };

    let results = if config.parallel {
        map_indexed_parallel(pair_count, config.resolved_num_workers(), compute)
    } else {
        map_indexed_serial(pair_count, compute)
    };

    collect_in_order(results)
}

fn pad_to_even(level: &[Digest]) -> Vec<Digest> {
    let mut padded = level.to_vec();
    if padded.len() % 2 == 1 {
        let last = padded.last().expect("level is non-empty").clone();
        padded.push(last);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tree(blocks: Vec<&'static str>, config: Config) -> MerkleTree<String> {
        let owned: Vec<String> = blocks.into_iter().map(String::from).collect();
        MerkleTree::new(config, owned).unwrap()
    }

    #[test]
    fn rejects_fewer_than_two_blocks() {
        let err = MerkleTree::new(Config::default(), vec!["A".to_string()]).unwrap_err();
        assert!(matches!(err, MerkleError::EmptyOrSingleBlock(1)));

        let err = MerkleTree::new(Config::default(), Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, MerkleError::EmptyOrSingleBlock(0)));
    }

    #[test]
    fn two_block_tree_has_depth_one() {
        let t = tree(vec!["A", "B"], Config::default());
        assert_eq!(t.depth(), 1);
        let proofs = t.proofs().unwrap();
        assert_eq!(proofs.len(), 2);
        assert_eq!(proofs[0].depth(), 1);
    }

    #[test]
    fn worked_example_two_blocks() {
        let hash_function = crate::HashFunction::sha256();
        let a = hash_function.hash(b"A").unwrap();
        let b = hash_function.hash(b"B").unwrap();
        let mut root_input = Vec::new();
        root_input.extend_from_slice(&a);
        root_input.extend_from_slice(&b);
        let expected_root = hash_function.hash(&root_input).unwrap();

        let t = tree(vec!["A", "B"], Config::default());
        assert_eq!(t.root(), &expected_root);

        let proofs = t.proofs().unwrap();
        assert_eq!(proofs[0].siblings(), &[b]);
        assert_eq!(proofs[0].path_bits(), 0);
        assert!(t.verify(&"A".to_string(), &proofs[0]).unwrap());
    }

    #[test]
    fn odd_leaf_count_pads_with_self_pair() {
        let t = tree(vec!["A", "B", "C"], Config::default());
        assert_eq!(t.depth(), 2);
        let proofs = t.proofs().unwrap();
        assert_eq!(proofs[2].path_bits(), 0b10);
        assert_eq!(proofs[2].depth(), 2);

        for (block, proof) in t.blocks().iter().zip(proofs.iter()) {
            assert!(t.verify(block, proof).unwrap());
        }
    }

    #[test]
    fn proof_length_matches_ceil_log2() {
        let blocks: Vec<String> = (0..10).map(|i| format!("block-{i}")).collect();
        let t = MerkleTree::new(Config::default().with_mode(Mode::TreeBuild), blocks.clone()).unwrap();
        let proof = t.generate_proof(&blocks[5]).unwrap();
        assert_eq!(proof.depth(), 4);
        assert!(t.verify(&blocks[5], &proof).unwrap());
    }

    #[test]
    fn wrong_leaf_proof_fails_verification() {
        let t = tree(vec!["A", "B", "C"], Config::default());
        let proofs = t.proofs().unwrap();
        assert!(!t.verify(&"B".to_string(), &proofs[0]).unwrap());
    }

    #[test]
    fn tamper_with_sibling_breaks_verification() {
        let t = tree(vec!["A", "B", "C", "D"], Config::default());
        let proofs = t.proofs().unwrap();
        let mut tampered = proofs[0].clone();
        let mut siblings = tampered.siblings().to_vec();
        let mut bytes = siblings[0].as_bytes().to_vec();
        bytes[0] ^= 0xFF;
        siblings[0] = Digest::from(bytes);
        tampered = Proof::new(siblings, tampered.path_bits());

        assert!(!t.verify(&"A".to_string(), &tampered).unwrap());
    }

    #[test]
    fn proof_gen_mode_rejects_generate_proof() {
        let t = tree(vec!["A", "B"], Config::default().with_mode(Mode::ProofGen));
        let err = t.generate_proof(&"A".to_string()).unwrap_err();
        assert!(matches!(err, MerkleError::ModeNotSupported));
    }

    #[test]
    fn tree_build_mode_has_no_precomputed_proofs() {
        let t = tree(vec!["A", "B"], Config::default().with_mode(Mode::TreeBuild));
        assert!(t.proofs().is_none());
        assert!(t.generate_proof(&"B".to_string()).is_ok());
    }

    #[test]
    fn proof_and_tree_build_mode_supports_both() {
        let t = tree(
            vec!["A", "B", "C"],
            Config::default().with_mode(Mode::ProofAndTreeBuild),
        );
        assert!(t.proofs().is_some());
        assert!(t.generate_proof(&"C".to_string()).is_ok());
    }

    #[test]
    fn generate_proof_for_missing_block_fails() {
        let t = tree(vec!["A", "B"], Config::default().with_mode(Mode::TreeBuild));
        let err = t.generate_proof(&"Z".to_string()).unwrap_err();
        assert!(matches!(err, MerkleError::BlockNotFound));
    }

    #[test]
    fn sort_siblings_tolerates_reordered_proof_bits() {
        let t = tree(
            vec!["A", "B", "C"],
            Config::default().with_sort_siblings(true),
        );
        let proofs = t.proofs().unwrap();
        for (block, proof) in t.blocks().iter().zip(proofs.iter()) {
            let flipped = Proof::new(proof.siblings().to_vec(), proof.path_bits() ^ u128::MAX);
            assert!(t.verify(block, &flipped).unwrap(), "orientation bits should not matter when sort_siblings is set");
        }
    }

    #[test]
    fn unsorted_siblings_are_order_sensitive() {
        let t = tree(vec!["A", "B", "C", "D"], Config::default());
        let proofs = t.proofs().unwrap();
        let flipped = Proof::new(proofs[0].siblings().to_vec(), proofs[0].path_bits() ^ 1);
        assert!(!t.verify(&"A".to_string(), &flipped).unwrap());
    }

    #[test]
    fn serial_and_parallel_construction_agree() {
        let blocks: Vec<String> = (0..1000).map(|i| format!("block-{i}")).collect();

        let serial = MerkleTree::new(Config::default().with_mode(Mode::ProofGen), blocks.clone()).unwrap();
        let parallel = MerkleTree::new(
            Config::default()
                .with_mode(Mode::ProofGen)
                .with_parallel(true)
                .with_num_workers(8),
            blocks,
        )
        .unwrap();

        assert_eq!(serial.root(), parallel.root());
        assert_eq!(serial.proofs().unwrap(), parallel.proofs().unwrap());
    }

    #[test]
    fn disable_leaf_hashing_uses_bytes_directly() {
        let hash_function = crate::HashFunction::sha256();
        let expected_len = hash_function.output_len().unwrap();
        let blocks = vec![vec![1u8; expected_len], vec![2u8; expected_len]];
        let config = Config::default()
            .with_hash_function(hash_function.clone())
            .with_disable_leaf_hashing(true);

        let t = MerkleTree::new(config, blocks.clone()).unwrap();
        let mut root_input = blocks[0].clone();
        root_input.extend_from_slice(&blocks[1]);
        let expected_root = hash_function.hash(&root_input).unwrap();
        assert_eq!(t.root(), &expected_root);
    }
}
