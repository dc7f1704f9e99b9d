//! Concurrency helper: map independent work items, in parallel unless limited to one thread.

use anyhow::{Context, Result};
use rayon::prelude::*;

/// Map `f` over `items`, preserving order.
/// - `threads == Some(1)` runs inline on the caller's thread
/// - `threads == Some(n)` runs on a dedicated n-thread pool
/// - `None` uses the global rayon pool
pub fn map_limited<T, R, F>(items: &[T], threads: Option<usize>, f: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Sync + Fn(&T) -> R,
{
    match threads {
        Some(n) if n <= 1 => Ok(items.iter().map(&f).collect()),
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .with_context(|| format!("build {n}-thread pool"))?;
            Ok(pool.install(|| items.par_iter().map(&f).collect()))
        }
        None => Ok(items.par_iter().map(&f).collect()),
    }
}
