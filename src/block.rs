use std::convert::Infallible;

/// A data block: an externally supplied value exposing only its canonical
/// byte representation. The tree never inspects a block's semantic content,
/// only the bytes `serialize` returns.
///
/// `serialize` is called at most once per block per tree-construction or
/// verification, except when searching for a block by equality (see
/// [`crate::MerkleTree::generate_proof`]), where it may be called again for
/// comparison. Implementations need not be idempotent but should be.
pub trait DataBlock {
    /// The error type returned by [`DataBlock::serialize`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the canonical byte representation of this block.
    fn serialize(&self) -> Result<Vec<u8>, Self::Error>;
}

impl<T> DataBlock for T
where
    T: AsRef<[u8]>,
{
    type Error = Infallible;

    fn serialize(&self) -> Result<Vec<u8>, Self::Error> {
        Ok(self.as_ref().to_vec())
    }
}
