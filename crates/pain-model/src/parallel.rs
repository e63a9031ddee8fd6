use rayon::prelude::*;

/// Batches at or above this size are processed on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 512;

/// Maps every item with its index, on worker threads once `items` reaches
/// `threshold`. Results always come back in input order.
pub fn ordered_map<T, R, F>(items: &[T], threshold: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync + Send,
{
    if items.len() < threshold.max(1) {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| f(index, item))
            .collect()
    } else {
        items
            .par_iter()
            .enumerate()
            .map(|(index, item)| f(index, item))
            .collect()
    }
}
