//! A bounded, per-level parallel map, plus its serial fallback.
//!
//! Both return `Vec<Result<T, MerkleError>>` indexed exactly like the input,
//! so callers get the same deterministic, lowest-index-first error selection
//! whether or not `parallel` was enabled: scan the results in order and
//! return the first `Err`.

use crate::error::MerkleError;

/// Applies `f` to every index in `0..len`, sequentially.
pub(crate) fn map_indexed_serial<T, F>(len: usize, f: F) -> Vec<Result<T, MerkleError>>
where
    F: Fn(usize) -> Result<T, MerkleError>,
{
    (0..len).map(f).collect()
}

/// Applies `f` to every index in `0..len`, fanned out across `num_workers`
/// threads.
///
/// The index range is split into `num_workers` contiguous chunks, one per
/// worker; each worker writes its results by index into its slice of a
/// pre-allocated output vector, so the result order never depends on which
/// worker finishes first. This call is a barrier: it blocks until every
/// worker has finished the current level before returning, matching the
/// per-level barrier the tree engine relies on between levels.
pub(crate) fn map_indexed_parallel<T, F>(
    len: usize,
    num_workers: usize,
    f: F,
) -> Vec<Result<T, MerkleError>>
where
    T: Send,
    F: Fn(usize) -> Result<T, MerkleError> + Sync,
{
    if len == 0 {
        return Vec::new();
    }

    let workers = num_workers.max(1).min(len);
    let chunk_size = len.div_ceil(workers);

    let mut slots: Vec<Option<Result<T, MerkleError>>> = (0..len).map(|_| None).collect();

    std::thread::scope(|scope| {
        for (chunk_index, chunk) in slots.chunks_mut(chunk_size).enumerate() {
            let base = chunk_index * chunk_size;
            let f = &f;
            scope.spawn(move || {
                for (offset, slot) in chunk.iter_mut().enumerate() {
                    *slot = Some(f(base + offset));
                }
            });
        }
    });

    slots
        .into_iter()
        .map(|slot| slot.expect("every slot is written exactly once by its owning worker"))
        .collect()
}

/// Collects `results` into `Vec<T>`, or the first error by index.
pub(crate) fn collect_in_order<T>(results: Vec<Result<T, MerkleError>>) -> Result<Vec<T>, MerkleError> {
    let mut out = Vec::with_capacity(results.len());
    for result in results {
        out.push(result?);
    }
    Ok(out)
}
