//! Boundary with the full-text engine that backs each shard.
//!
//! The indexing core never builds postings or scores queries itself. It asks
//! an [`IndexEngine`] to open or create an index at a path and then talks to
//! the returned [`FullTextIndex`] through batches, commits, document counts
//! and searches.
//!
//! [`file::FileEngine`] is the engine shipped with the crate: analyzed
//! documents are committed as checksummed segment files and served from an
//! in-memory inverted index.

pub mod batch;
pub mod file;
pub mod inverted;
pub mod mapping;
pub mod scoring;
pub mod search;
pub mod segment;

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::batch::Batch;
use crate::engine::mapping::IndexMapping;
use crate::engine::search::{SearchRequest, SearchResults};
use crate::error::Result;

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitInfo {
    /// Sequence number of the segment the commit produced.
    pub segment: u64,
    /// Number of documents in the committed batch.
    pub documents: usize,
}

/// Point-in-time statistics for one index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Live documents.
    pub document_count: u64,
    /// Committed segments.
    pub commit_count: u64,
    /// Distinct terms across all fields.
    pub term_count: u64,
    /// Time of the most recent commit, if any.
    pub last_commit_time: Option<DateTime<Utc>>,
}

/// A single full-text index instance.
///
/// Implementations must allow reads (`document_count`, `search`, `stats`)
/// to run concurrently with a commit from one writer.
pub trait FullTextIndex: Send + Sync + Debug {
    /// The mapping the index was created with.
    fn mapping(&self) -> &IndexMapping;

    /// Start a new, empty batch of insert operations.
    fn new_batch(&self) -> Batch;

    /// Apply a batch as one bulk write.
    ///
    /// Documents are visible to counts and searches only once this returns.
    fn commit(&self, batch: Batch) -> Result<CommitInfo>;

    /// Number of live documents committed so far.
    fn document_count(&self) -> Result<u64>;

    /// Run a search against this index alone.
    fn search(&self, request: &SearchRequest) -> Result<SearchResults>;

    /// Index statistics.
    fn stats(&self) -> Result<IndexStats>;
}

/// Factory for [`FullTextIndex`] instances bound to storage paths.
pub trait IndexEngine: Send + Sync + Debug {
    /// Open an existing index, preserving its contents.
    fn open(&self, path: &Path) -> Result<Arc<dyn FullTextIndex>>;

    /// Create a fresh index at a path that does not exist yet.
    fn create(&self, path: &Path, mapping: &IndexMapping) -> Result<Arc<dyn FullTextIndex>>;

    /// Engine name, for logging.
    fn name(&self) -> &'static str;
}
