/// Concurrency management for ldgraph.
/// Sizes worker pools so external package lookups stay bounded.

use anyhow::Result;
use log::debug;

/// Number of workers to use when the configuration asks for "auto" (0).
/// Reserves ~50% of CPU capacity, minimum 1 worker.
pub fn worker_count(configured: usize) -> usize {
    if configured > 0 {
        return configured;
    }
    std::cmp::max(1, num_cpus::get() / 2)
}

/// Build a dedicated pool for attribution lookups.
/// Kept separate from the global pool used by graph expansion.
pub fn lookup_pool(configured: usize) -> Result<rayon::ThreadPool> {
    let workers = worker_count(configured);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("ldgraph-lookup-{}", i))
        .build()?;

    debug!(
        "[ldgraph] lookup pool: {} workers (system has {} cores)",
        workers,
        num_cpus::get()
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count() {
        assert_eq!(worker_count(3), 3);
        assert!(worker_count(0) >= 1);
    }

    #[test]
    fn test_lookup_pool_size() {
        let pool = lookup_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }
}
