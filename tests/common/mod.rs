#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender};

use sharded_indexer::engine::batch::Batch;
use sharded_indexer::engine::file::FileEngine;
use sharded_indexer::engine::mapping::IndexMapping;
use sharded_indexer::engine::search::{SearchRequest, SearchResults};
use sharded_indexer::engine::{CommitInfo, FullTextIndex, IndexEngine, IndexStats};
use sharded_indexer::error::{IndexerError, Result};

/// Generate `count` short documents drawn from a small vocabulary.
pub fn generate_documents(count: usize) -> Vec<String> {
    let words = [
        "search", "engine", "shard", "index", "query", "document", "batch", "commit", "union",
        "worker",
    ];

    (0..count)
        .map(|i| {
            (0..5)
                .map(|j| words[(i * 3 + j * 7) % words.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// A file engine whose shard in directory `failing_shard` rejects commits
/// once it has accepted `commits_before_failure` of them.
#[derive(Debug)]
pub struct FaultyEngine {
    inner: FileEngine,
    failing_shard: String,
    commits_before_failure: usize,
}

impl FaultyEngine {
    pub fn new(failing_shard: usize, commits_before_failure: usize) -> Self {
        Self {
            inner: FileEngine::new(),
            failing_shard: failing_shard.to_string(),
            commits_before_failure,
        }
    }

    fn wrap(&self, path: &Path, index: Arc<dyn FullTextIndex>) -> Arc<dyn FullTextIndex> {
        let failing = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy() == self.failing_shard);
        if failing {
            Arc::new(FaultyIndex {
                inner: index,
                remaining: AtomicUsize::new(self.commits_before_failure),
            })
        } else {
            index
        }
    }
}

impl IndexEngine for FaultyEngine {
    fn open(&self, path: &Path) -> Result<Arc<dyn FullTextIndex>> {
        let index = self.inner.open(path)?;
        Ok(self.wrap(path, index))
    }

    fn create(&self, path: &Path, mapping: &IndexMapping) -> Result<Arc<dyn FullTextIndex>> {
        let index = self.inner.create(path, mapping)?;
        Ok(self.wrap(path, index))
    }

    fn name(&self) -> &'static str {
        "faulty"
    }
}

#[derive(Debug)]
struct FaultyIndex {
    inner: Arc<dyn FullTextIndex>,
    remaining: AtomicUsize,
}

impl FullTextIndex for FaultyIndex {
    fn mapping(&self) -> &IndexMapping {
        self.inner.mapping()
    }

    fn new_batch(&self) -> Batch {
        self.inner.new_batch()
    }

    fn commit(&self, batch: Batch) -> Result<CommitInfo> {
        let allowed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if allowed {
            self.inner.commit(batch)
        } else {
            Err(IndexerError::storage("injected commit failure"))
        }
    }

    fn document_count(&self) -> Result<u64> {
        self.inner.document_count()
    }

    fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.inner.search(request)
    }

    fn stats(&self) -> Result<IndexStats> {
        self.inner.stats()
    }
}

/// A file engine whose commits block until the paired [`Gate`] is opened.
///
/// Every commit announces itself on `Gate::entered` before waiting, so a
/// test can tell that an index run is in flight.
#[derive(Debug)]
pub struct GatedEngine {
    inner: FileEngine,
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Control side of a [`GatedEngine`].
pub struct Gate {
    pub entered: Receiver<()>,
    release: Sender<()>,
}

impl Gate {
    /// Let every pending and future commit through.
    pub fn open(self) {
        drop(self.release);
    }
}

impl GatedEngine {
    pub fn new() -> (Self, Gate) {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let engine = Self {
            inner: FileEngine::new(),
            entered: entered_tx,
            release: release_rx,
        };
        let gate = Gate {
            entered: entered_rx,
            release: release_tx,
        };
        (engine, gate)
    }

    fn wrap(&self, index: Arc<dyn FullTextIndex>) -> Arc<dyn FullTextIndex> {
        Arc::new(GatedIndex {
            inner: index,
            entered: self.entered.clone(),
            release: self.release.clone(),
        })
    }
}

impl IndexEngine for GatedEngine {
    fn open(&self, path: &Path) -> Result<Arc<dyn FullTextIndex>> {
        let index = self.inner.open(path)?;
        Ok(self.wrap(index))
    }

    fn create(&self, path: &Path, mapping: &IndexMapping) -> Result<Arc<dyn FullTextIndex>> {
        let index = self.inner.create(path, mapping)?;
        Ok(self.wrap(index))
    }

    fn name(&self) -> &'static str {
        "gated"
    }
}

#[derive(Debug)]
struct GatedIndex {
    inner: Arc<dyn FullTextIndex>,
    entered: Sender<()>,
    release: Receiver<()>,
}

impl FullTextIndex for GatedIndex {
    fn mapping(&self) -> &IndexMapping {
        self.inner.mapping()
    }

    fn new_batch(&self) -> Batch {
        self.inner.new_batch()
    }

    fn commit(&self, batch: Batch) -> Result<CommitInfo> {
        let _ = self.entered.send(());
        // Returns once the gate's sender is dropped.
        let _ = self.release.recv();
        self.inner.commit(batch)
    }

    fn document_count(&self) -> Result<u64> {
        self.inner.document_count()
    }

    fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.inner.search(request)
    }

    fn stats(&self) -> Result<IndexStats> {
        self.inner.stats()
    }
}
