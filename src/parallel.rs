//! Parallel worker pool (§5) used by the Orphan Resolver's per-read
//! placement fan-out (§4.2.2). Every other pass in this crate runs
//! single-threaded over the cooperative `TigVector`; this is the only stage
//! that benefits from, and tolerates, concurrency.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::read::ReadId;

/// `max(workerCount, readCount/999)` (spec.md §5): the number of reads
/// handed to each rayon work item, so that thread-pool overhead stays small
/// relative to batch size on very large read sets.
pub fn block_size(worker_count: usize, read_count: usize) -> usize {
    worker_count.max(read_count / 999).max(1)
}

/// Run `f` over every read id in `rids`, in parallel, discarding `None`
/// results. `threads = None` uses rayon's default global pool sized to the
/// available cores; `Some(n)` builds a scoped pool capped at `n` threads.
pub fn place_reads_parallel<F, T>(rids: &[ReadId], threads: Option<usize>, f: F) -> Vec<T>
where
    F: Fn(ReadId) -> Option<T> + Sync + Send,
    T: Send,
{
    let worker_count = threads.unwrap_or_else(rayon::current_num_threads);
    let block = block_size(worker_count, rids.len());

    let run = || {
        rids.par_iter()
            .with_min_len(block)
            .filter_map(|&rid| f(rid))
            .collect()
    };

    match threads {
        Some(n) => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .expect("failed to build thread pool");
            pool.install(run)
        }
        None => run(),
    }
}
