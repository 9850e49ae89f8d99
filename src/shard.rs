//! A shard: one full-text index bound to a storage directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::engine::batch::Batch;
use crate::engine::mapping::IndexMapping;
use crate::engine::search::{SearchRequest, SearchResults};
use crate::engine::{CommitInfo, FullTextIndex, IndexEngine};
use crate::error::{IndexerError, Result};

/// How a shard came to be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShardOrigin {
    /// The directory did not exist; a fresh index was created.
    Created,
    /// The directory existed; its contents were preserved.
    Opened,
}

/// Statistics for one shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardStats {
    pub ordinal: usize,
    pub path: PathBuf,
    pub origin: ShardOrigin,
    pub document_count: u64,
    pub commit_count: u64,
    pub term_count: u64,
    pub last_commit_time: Option<DateTime<Utc>>,
}

/// One independently stored index instance.
#[derive(Debug)]
pub struct Shard {
    ordinal: usize,
    path: PathBuf,
    origin: ShardOrigin,
    index: Arc<dyn FullTextIndex>,
}

impl Shard {
    /// Open the shard at `path`, creating it with `mapping` if the directory
    /// does not exist.
    ///
    /// Any failure is reported as [`IndexerError::Shard`] carrying the
    /// ordinal.
    pub fn open_or_create(
        engine: &dyn IndexEngine,
        ordinal: usize,
        path: &Path,
        mapping: &IndexMapping,
    ) -> Result<Self> {
        let (index, origin) = if path.exists() {
            (engine.open(path), ShardOrigin::Opened)
        } else {
            (engine.create(path, mapping), ShardOrigin::Created)
        };
        let index = index.map_err(|e| IndexerError::shard(ordinal, e))?;

        match origin {
            ShardOrigin::Created => info!("Created shard {ordinal} at {}", path.display()),
            ShardOrigin::Opened => info!("Opened shard {ordinal} at {}", path.display()),
        }

        Ok(Self {
            ordinal,
            path: path.to_path_buf(),
            origin,
            index,
        })
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> ShardOrigin {
        self.origin
    }

    /// The underlying index handle.
    pub fn index(&self) -> &Arc<dyn FullTextIndex> {
        &self.index
    }

    pub fn new_batch(&self) -> Batch {
        self.index.new_batch()
    }

    pub fn commit(&self, batch: Batch) -> Result<CommitInfo> {
        self.index.commit(batch)
    }

    pub fn document_count(&self) -> Result<u64> {
        self.index.document_count()
    }

    pub fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.index.search(request)
    }

    pub fn stats(&self) -> Result<ShardStats> {
        let stats = self.index.stats()?;
        Ok(ShardStats {
            ordinal: self.ordinal,
            path: self.path.clone(),
            origin: self.origin,
            document_count: stats.document_count,
            commit_count: stats.commit_count,
            term_count: stats.term_count,
            last_commit_time: stats.last_commit_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::file::FileEngine;
    use crate::error::ErrorKind;

    #[test]
    fn test_create_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0");
        let engine = FileEngine::new();

        let shard = Shard::open_or_create(&engine, 0, &path, &IndexMapping::default()).unwrap();
        assert_eq!(shard.origin(), ShardOrigin::Created);
        let mut batch = shard.new_batch();
        batch.index(0, [("body", "text")]).unwrap();
        shard.commit(batch).unwrap();
        drop(shard);

        let shard = Shard::open_or_create(&engine, 0, &path, &IndexMapping::default()).unwrap();
        assert_eq!(shard.origin(), ShardOrigin::Opened);
        assert_eq!(shard.document_count().unwrap(), 1);

        let stats = shard.stats().unwrap();
        assert_eq!(stats.ordinal, 0);
        assert_eq!(stats.commit_count, 1);
        assert_eq!(stats.origin, ShardOrigin::Opened);
    }

    #[test]
    fn test_unreadable_shard_reports_ordinal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("3");
        std::fs::create_dir_all(&path).unwrap();

        let err = Shard::open_or_create(&FileEngine::new(), 3, &path, &IndexMapping::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Initialization);
        assert_eq!(err.shard_ordinal(), Some(3));
    }
}
