//! Fan-out/fan-in driver for one index run.
//!
//! Each call to [`IndexingCoordinator::run`] partitions the input, starts
//! exactly one worker per shard on a dedicated thread pool, and blocks until
//! every worker has settled. Workers share nothing but an abort flag: a
//! worker that fails raises it, and the others stop before their next insert
//! rather than loading the rest of their slice. The first failure observed
//! is returned once all workers are done.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::batch_buffer::BatchBuffer;
use crate::config::TailPolicy;
use crate::document::DocId;
use crate::error::{IndexerError, Result};
use crate::partition::PartitionPlan;
use crate::shard::Shard;

/// Outcome of one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    /// Shard ordinal.
    pub shard: usize,
    /// Length of the slice assigned to the worker.
    pub slice_len: usize,
    /// Documents committed to the shard.
    pub documents_committed: usize,
    /// Bulk commits issued.
    pub commits: usize,
    /// Tail documents discarded under [`TailPolicy::Drop`].
    pub dropped: usize,
    /// Wall time spent by the worker.
    pub elapsed: Duration,
}

/// Outcome of a successful index run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingReport {
    /// Documents supplied to the run.
    pub documents: usize,
    /// One report per shard, in ordinal order.
    pub workers: Vec<WorkerReport>,
    /// Wall time from partitioning to the last worker finishing.
    pub elapsed: Duration,
}

impl IndexingReport {
    /// Documents committed across all shards.
    pub fn documents_committed(&self) -> usize {
        self.workers.iter().map(|w| w.documents_committed).sum()
    }

    /// Bulk commits issued across all shards.
    pub fn commits(&self) -> usize {
        self.workers.iter().map(|w| w.commits).sum()
    }

    /// Tail documents dropped across all shards.
    pub fn dropped(&self) -> usize {
        self.workers.iter().map(|w| w.dropped).sum()
    }

    /// Committed documents per second of wall time.
    pub fn docs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.documents_committed() as f64 / secs
        } else {
            0.0
        }
    }
}

/// Runs one batch-loading worker per shard.
pub struct IndexingCoordinator {
    pool: ThreadPool,
    batch_size: usize,
    tail_policy: TailPolicy,
}

impl std::fmt::Debug for IndexingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexingCoordinator")
            .field("threads", &self.pool.current_num_threads())
            .field("batch_size", &self.batch_size)
            .field("tail_policy", &self.tail_policy)
            .finish()
    }
}

impl IndexingCoordinator {
    /// Create a coordinator with one worker thread per shard.
    pub fn new(shard_count: usize, batch_size: usize, tail_policy: TailPolicy) -> Result<Self> {
        if shard_count == 0 {
            return Err(IndexerError::invalid_config("Shard count cannot be zero"));
        }
        if batch_size == 0 {
            return Err(IndexerError::invalid_config("Batch size cannot be zero"));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(shard_count)
            .thread_name(|i| format!("shard-worker-{i}"))
            .build()
            .map_err(|e| IndexerError::initialization(format!("Failed to create thread pool: {e}")))?;

        Ok(Self {
            pool,
            batch_size,
            tail_policy,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn tail_policy(&self) -> TailPolicy {
        self.tail_policy
    }

    /// Load `docs` into `shards`, one contiguous slice per shard.
    ///
    /// Input whose length does not divide evenly by the shard count is
    /// rejected before any worker starts.
    pub fn run<S>(&self, shards: &[Arc<Shard>], docs: &[S]) -> Result<IndexingReport>
    where
        S: AsRef<str> + Sync,
    {
        let plan = PartitionPlan::new(docs.len(), shards.len())?;
        let slices = plan.split(docs)?;
        let started = Instant::now();

        info!(
            "Indexing {} documents across {} shards ({} per shard, batch size {}, tail {:?})",
            docs.len(),
            shards.len(),
            plan.slice_len(),
            self.batch_size,
            self.tail_policy
        );

        let (tx, rx) = crossbeam_channel::unbounded();
        let abort = AtomicBool::new(false);
        let abort = &abort;
        let batch_size = self.batch_size;
        let tail_policy = self.tail_policy;

        self.pool.scope(|scope| {
            for (shard, slice) in shards.iter().zip(slices) {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = catch_unwind(AssertUnwindSafe(|| {
                        run_worker(shard, slice, batch_size, tail_policy, abort)
                    }))
                    .unwrap_or_else(|_| {
                        Err(IndexerError::write(shard.ordinal(), "worker panicked"))
                    });

                    if let Err(e) = &outcome {
                        warn!("Worker for shard {} failed: {e}", shard.ordinal());
                        abort.store(true, Ordering::Release);
                    }
                    let _ = tx.send(outcome);
                });
            }
        });
        drop(tx);

        let mut first_error = None;
        let mut workers = Vec::with_capacity(shards.len());
        for outcome in rx.iter() {
            match outcome {
                Ok(report) => workers.push(report),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        workers.sort_by_key(|w| w.shard);
        let report = IndexingReport {
            documents: docs.len(),
            workers,
            elapsed: started.elapsed(),
        };
        info!(
            "Indexed {} documents in {} commits in {:?}",
            report.documents_committed(),
            report.commits(),
            report.elapsed
        );
        Ok(report)
    }
}

/// Feed one slice through a batch buffer into one shard.
///
/// Ids are the ordinal position within the slice.
fn run_worker<S: AsRef<str>>(
    shard: &Shard,
    slice: &[S],
    batch_size: usize,
    tail_policy: TailPolicy,
    abort: &AtomicBool,
) -> Result<WorkerReport> {
    let started = Instant::now();
    let mut buffer = BatchBuffer::new(shard, batch_size)?;
    let mut aborted = false;

    for (n, body) in slice.iter().enumerate() {
        if abort.load(Ordering::Acquire) {
            aborted = true;
            break;
        }
        buffer.add(n as DocId, body.as_ref())?;
    }

    let summary = if aborted {
        buffer.abandon()
    } else {
        buffer.finish(tail_policy)?
    };

    Ok(WorkerReport {
        shard: shard.ordinal(),
        slice_len: slice.len(),
        documents_committed: summary.documents_committed,
        commits: summary.commits,
        dropped: summary.dropped,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::file::FileEngine;
    use crate::engine::mapping::IndexMapping;
    use crate::error::ErrorKind;

    fn open_shards(dir: &std::path::Path, n: usize) -> Vec<Arc<Shard>> {
        (0..n)
            .map(|i| {
                Arc::new(
                    Shard::open_or_create(
                        &FileEngine::new(),
                        i,
                        &dir.join(i.to_string()),
                        &IndexMapping::default(),
                    )
                    .unwrap(),
                )
            })
            .collect()
    }

    fn docs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("document number {i}")).collect()
    }

    #[test]
    fn test_two_shards_forty_documents() {
        let dir = tempfile::tempdir().unwrap();
        let shards = open_shards(dir.path(), 2);
        let coordinator = IndexingCoordinator::new(2, 10, TailPolicy::Flush).unwrap();

        let report = coordinator.run(&shards, &docs(40)).unwrap();

        assert_eq!(report.workers.len(), 2);
        for (i, worker) in report.workers.iter().enumerate() {
            assert_eq!(worker.shard, i);
            assert_eq!(worker.slice_len, 20);
            assert_eq!(worker.commits, 2);
            assert_eq!(worker.documents_committed, 20);
        }
        assert_eq!(report.documents_committed(), 40);
        assert_eq!(shards[0].document_count().unwrap(), 20);
        assert_eq!(shards[1].document_count().unwrap(), 20);
    }

    #[test]
    fn test_uneven_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let shards = open_shards(dir.path(), 2);
        let coordinator = IndexingCoordinator::new(2, 10, TailPolicy::Flush).unwrap();

        let err = coordinator.run(&shards, &docs(7)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PartitionPrecondition);
        for shard in &shards {
            assert_eq!(shard.stats().unwrap().commit_count, 0);
        }
    }

    #[test]
    fn test_commit_counts_per_tail_policy() {
        for (policy, commits, committed) in
            [(TailPolicy::Flush, 3, 25), (TailPolicy::Drop, 2, 20)]
        {
            let dir = tempfile::tempdir().unwrap();
            let shards = open_shards(dir.path(), 3);
            let coordinator = IndexingCoordinator::new(3, 10, policy).unwrap();

            let report = coordinator.run(&shards, &docs(75)).unwrap();
            for worker in &report.workers {
                assert_eq!(worker.commits, commits);
                assert_eq!(worker.documents_committed, committed);
                assert_eq!(worker.dropped, 25 - committed);
            }
        }
    }

    #[test]
    fn test_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let shards = open_shards(dir.path(), 2);
        let coordinator = IndexingCoordinator::new(2, 10, TailPolicy::Flush).unwrap();

        let report = coordinator.run(&shards, &Vec::<String>::new()).unwrap();
        assert_eq!(report.commits(), 0);
        assert_eq!(report.documents_committed(), 0);
    }

    #[test]
    fn test_invalid_coordinator() {
        assert!(IndexingCoordinator::new(0, 10, TailPolicy::Flush).is_err());
        assert!(IndexingCoordinator::new(2, 0, TailPolicy::Flush).is_err());
    }
}
