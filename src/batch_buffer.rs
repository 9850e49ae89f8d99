//! Per-shard accumulator of pending insert operations.

use log::{debug, warn};

use crate::config::TailPolicy;
use crate::document::DocId;
use crate::engine::CommitInfo;
use crate::engine::batch::Batch;
use crate::error::{IndexerError, Result};
use crate::shard::Shard;

/// What a buffer did over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferSummary {
    /// Documents written to the shard.
    pub documents_committed: usize,
    /// Bulk commits issued.
    pub commits: usize,
    /// Documents discarded by [`TailPolicy::Drop`].
    pub dropped: usize,
}

/// Buffers inserts for one shard and commits them `capacity` at a time.
///
/// The buffer never holds more than `capacity` operations: reaching the
/// capacity triggers a commit and a fresh, empty batch. Errors are reported
/// as [`IndexerError::Write`] for the buffer's shard.
pub struct BatchBuffer<'a> {
    shard: &'a Shard,
    capacity: usize,
    field: String,
    pending: Batch,
    summary: BufferSummary,
}

impl<'a> BatchBuffer<'a> {
    /// Create a buffer writing document bodies into the shard's default
    /// field.
    pub fn new(shard: &'a Shard, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(IndexerError::invalid_config("Batch size cannot be zero"));
        }
        let field = shard.index().mapping().default_field.clone();
        Ok(Self {
            shard,
            capacity,
            field,
            pending: shard.new_batch(),
            summary: BufferSummary::default(),
        })
    }

    /// Number of operations waiting for a commit.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue a document, committing if the buffer becomes full.
    pub fn add(&mut self, id: DocId, body: &str) -> Result<Option<CommitInfo>> {
        self.pending
            .index(id, [(self.field.as_str(), body)])
            .map_err(|e| self.write_error(format!("failed to index document {id}: {e}")))?;

        if self.pending.len() >= self.capacity {
            return self.flush();
        }
        Ok(None)
    }

    /// Commit whatever is pending. Does nothing when the buffer is empty.
    pub fn flush(&mut self) -> Result<Option<CommitInfo>> {
        if self.pending.is_empty() {
            return Ok(None);
        }

        let batch = std::mem::replace(&mut self.pending, self.shard.new_batch());
        let size = batch.len();
        let info = self
            .shard
            .commit(batch)
            .map_err(|e| self.write_error(format!("failed to commit batch: {e}")))?;

        self.summary.commits += 1;
        self.summary.documents_committed += size;
        debug!(
            "Shard {} committed segment {} with {} documents",
            self.shard.ordinal(),
            info.segment,
            size
        );
        Ok(Some(info))
    }

    /// Handle the final partial batch and report what the buffer did.
    pub fn finish(mut self, policy: TailPolicy) -> Result<BufferSummary> {
        match policy {
            TailPolicy::Flush => {
                self.flush()?;
            }
            TailPolicy::Drop => {
                let dropped = self.pending.len();
                if dropped > 0 {
                    warn!(
                        "Shard {} dropped {} documents of its final partial batch",
                        self.shard.ordinal(),
                        dropped
                    );
                }
                self.summary.dropped += dropped;
            }
        }
        Ok(self.summary)
    }

    /// Discard pending operations without committing them.
    ///
    /// Used when a sibling worker failed and the run is being torn down.
    pub fn abandon(self) -> BufferSummary {
        if !self.pending.is_empty() {
            debug!(
                "Shard {} abandoned {} pending documents",
                self.shard.ordinal(),
                self.pending.len()
            );
        }
        self.summary
    }

    fn write_error(&self, message: String) -> IndexerError {
        IndexerError::write(self.shard.ordinal(), message)
    }
}
