use std::fmt;
use std::sync::Arc;

use digest::Digest as _;
use sha2::Sha256;

use crate::digest::Digest;
use crate::error::MerkleError;

/// The error type a [`HashFunction`] may return.
pub type HashError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A pluggable hash function: `bytes -> digest | error`.
///
/// This is the crate's only other polymorphic point besides
/// [`crate::DataBlock`], and deliberately a function value rather than a
/// trait with an associated algorithm type: the tree only ever needs to call
/// it, never to dispatch on which algorithm it is. The default is SHA-256
/// ([`HashFunction::sha256`]).
///
/// The function MUST return digests of a constant length across calls; the
/// tree establishes that length once (by hashing the empty input) and
/// rejects any later divergence with [`MerkleError::HashLengthMismatch`].
/// It MUST also be safe to call concurrently from multiple threads when
/// [`crate::Config::with_parallel`] is enabled — this crate never
/// serializes calls to it.
#[derive(Clone)]
pub struct HashFunction(Arc<dyn Fn(&[u8]) -> Result<Digest, HashError> + Send + Sync>);

impl HashFunction {
    /// Wraps an arbitrary function as a [`HashFunction`].
    pub fn new(f: impl Fn(&[u8]) -> Result<Digest, HashError> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// The default hash function: SHA-256.
    pub fn sha256() -> Self {
        Self::new(|bytes| Ok(Digest::from(Sha256::digest(bytes).to_vec())))
    }

    /// Invokes the hash function.
    pub fn hash(&self, bytes: &[u8]) -> Result<Digest, HashError> {
        (self.0)(bytes)
    }

    /// The digest length this function produces, established by hashing the
    /// empty input once. Used to validate `disable_leaf_hashing` leaves and
    /// to detect [`MerkleError::HashLengthMismatch`] deterministically,
    /// independent of worker scheduling order.
    pub(crate) fn output_len(&self) -> Result<usize, MerkleError> {
        let digest = self.hash(&[]).map_err(|source| MerkleError::HashError {
            level: 0,
            position: 0,
            source,
        })?;
        Ok(digest.len())
    }
}

impl Default for HashFunction {
    fn default() -> Self {
        Self::sha256()
    }
}

impl fmt::Debug for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashFunction(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic() {
        let hash_fn = HashFunction::sha256();
        let a = hash_fn.hash(b"hello").unwrap();
        let b = hash_fn.hash(b"hello").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn custom_hash_function_is_used() {
        let hash_fn = HashFunction::new(|bytes| Ok(Digest::from(vec![bytes.len() as u8; 4])));
        let digest = hash_fn.hash(b"abc").unwrap();
        assert_eq!(digest.as_bytes(), &[3, 3, 3, 3]);
    }

    #[test]
    fn output_len_matches_empty_hash() {
        let hash_fn = HashFunction::sha256();
        assert_eq!(hash_fn.output_len().unwrap(), 32);
    }
}
