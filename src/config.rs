use crate::hash::HashFunction;

/// What a constructed [`crate::MerkleTree`] retains, and therefore what it
/// can do afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Proofs for every leaf are materialised during construction; no
    /// intermediate levels are kept. [`crate::MerkleTree::generate_proof`]
    /// fails with [`crate::MerkleError::ModeNotSupported`].
    ProofGen,
    /// Intermediate levels are kept, proofs are not precomputed.
    /// [`crate::MerkleTree::generate_proof`] derives a proof on demand.
    TreeBuild,
    /// Both: proofs are precomputed and levels are retained.
    ProofAndTreeBuild,
}

impl Mode {
    pub(crate) fn retains_levels(self) -> bool {
        matches!(self, Mode::TreeBuild | Mode::ProofAndTreeBuild)
    }

    pub(crate) fn retains_proofs(self) -> bool {
        matches!(self, Mode::ProofGen | Mode::ProofAndTreeBuild)
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::ProofGen
    }
}

/// Construction-time configuration for a [`crate::MerkleTree`].
///
/// `Config` is an ordinary, cloneable value — there is no global or
/// thread-local hash function to configure. Build one with
/// [`Config::default`] and the `with_*` setters.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) hash_function: HashFunction,
    pub(crate) mode: Mode,
    pub(crate) parallel: bool,
    pub(crate) num_workers: usize,
    pub(crate) sort_siblings: bool,
    pub(crate) disable_leaf_hashing: bool,
}

impl Config {
    /// Sets the hash function. Defaults to SHA-256.
    pub fn with_hash_function(mut self, hash_function: HashFunction) -> Self {
        self.hash_function = hash_function;
        self
    }

    /// Sets the operating mode. Defaults to [`Mode::ProofGen`].
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables or disables parallel construction. Defaults to `false`.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the worker count used when `parallel` is enabled. `0` means "use
    /// the number of available CPUs" and is the default.
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Enables the sorted-siblings convention: each pair is ordered by byte
    /// value before concatenation, so proofs do not need correct orientation
    /// bits to verify. Defaults to `false`.
    ///
    /// Note this does not change the behaviour of odd-level padding: a
    /// duplicated digest is still paired with itself, producing the same
    /// parent hash as an unpadded leaf would under some other construction.
    /// This is a known property of this convention, preserved here rather
    /// than redesigned; see the crate's `DESIGN.md` for the caller-facing
    /// implications.
    pub fn with_sort_siblings(mut self, sort_siblings: bool) -> Self {
        self.sort_siblings = sort_siblings;
        self
    }

    /// If `true`, leaf bytes are used as leaf digests directly instead of
    /// being hashed. Every block's serialized bytes must then already be
    /// exactly the hash function's output length. Defaults to `false`.
    pub fn with_disable_leaf_hashing(mut self, disable_leaf_hashing: bool) -> Self {
        self.disable_leaf_hashing = disable_leaf_hashing;
        self
    }

    /// Resolves `num_workers`, expanding `0` to the available parallelism.
    pub(crate) fn resolved_num_workers(&self) -> usize {
        if self.num_workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.num_workers
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash_function: HashFunction::sha256(),
            mode: Mode::default(),
            parallel: false,
            num_workers: 0,
            sort_siblings: false,
            disable_leaf_hashing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.mode, Mode::ProofGen);
        assert!(!config.parallel);
        assert!(!config.sort_siblings);
        assert!(!config.disable_leaf_hashing);
    }

    #[test]
    fn zero_workers_resolves_to_available_parallelism() {
        let config = Config::default().with_parallel(true);
        assert!(config.resolved_num_workers() >= 1);
    }

    #[test]
    fn explicit_worker_count_is_kept() {
        let config = Config::default().with_parallel(true).with_num_workers(4);
        assert_eq!(config.resolved_num_workers(), 4);
    }
}
