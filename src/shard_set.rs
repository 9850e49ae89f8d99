//! The user-facing handle over N shards.
//!
//! A [`ShardSet`] is opened from an [`IndexerConfig`]. Opening creates the
//! storage root if needed and then opens or creates every shard directory in
//! ordinal order, registering each one with the union view. Opening an
//! existing set is idempotent: nothing on disk is reset.
//!
//! # Examples
//!
//! ```no_run
//! use sharded_indexer::{IndexerConfig, ShardSet};
//!
//! let config = IndexerConfig::new("/tmp/corpus", 2, 10);
//! let set = ShardSet::open(&config)?;
//!
//! let docs: Vec<String> = (0..40).map(|i| format!("document {i}")).collect();
//! set.index(&docs)?;
//! assert_eq!(set.count()?, 40);
//! # Ok::<(), sharded_indexer::IndexerError>(())
//! ```

use std::fs;
use std::sync::Arc;

use log::info;
use parking_lot::Mutex;

use crate::config::IndexerConfig;
use crate::coordinator::{IndexingCoordinator, IndexingReport};
use crate::engine::IndexEngine;
use crate::engine::file::FileEngine;
use crate::engine::search::{SearchRequest, SearchResults};
use crate::error::{IndexerError, Result};
use crate::shard::{Shard, ShardStats};
use crate::union::UnionView;

/// N full-text index shards under one root, readable as one logical index.
#[derive(Debug)]
pub struct ShardSet {
    config: IndexerConfig,
    union: Arc<UnionView>,
    coordinator: IndexingCoordinator,
    run_lock: Mutex<()>,
}

impl ShardSet {
    /// Open or create a shard set backed by the file engine.
    pub fn open(config: &IndexerConfig) -> Result<Self> {
        Self::open_with_engine(config, Arc::new(FileEngine::new()))
    }

    /// Open or create a shard set backed by `engine`.
    ///
    /// Fails fast: the first shard that cannot be opened or created aborts
    /// the whole open.
    pub fn open_with_engine(config: &IndexerConfig, engine: Arc<dyn IndexEngine>) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.storage_path).map_err(|e| {
            IndexerError::initialization(format!(
                "Failed to create storage root {}: {e}",
                config.storage_path.display()
            ))
        })?;

        let union = Arc::new(UnionView::new());
        for ordinal in 0..config.shard_count {
            let path = config.shard_path(ordinal);
            let shard = Shard::open_or_create(engine.as_ref(), ordinal, &path, &config.mapping)?;
            union.add(Arc::new(shard));
        }

        let coordinator =
            IndexingCoordinator::new(config.shard_count, config.batch_size, config.tail_policy)?;

        info!(
            "Opened {} shards under {} using the {} engine",
            config.shard_count,
            config.storage_path.display(),
            engine.name()
        );

        Ok(Self {
            config: config.clone(),
            union,
            coordinator,
            run_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn shard_count(&self) -> usize {
        self.union.shard_count()
    }

    /// Shards in ordinal order.
    pub fn shards(&self) -> Vec<Arc<Shard>> {
        self.union.shards()
    }

    /// The aggregate read view. It may be shared with readers that outlive
    /// an index run.
    pub fn union_view(&self) -> Arc<UnionView> {
        Arc::clone(&self.union)
    }

    /// Load `docs` into the shards, one contiguous slice per shard.
    ///
    /// The length of `docs` must be a multiple of the shard count. Only one
    /// run may be active at a time; a concurrent call fails with
    /// [`IndexerError::InvalidOperation`].
    pub fn index<S>(&self, docs: &[S]) -> Result<IndexingReport>
    where
        S: AsRef<str> + Sync,
    {
        let _guard = self.run_lock.try_lock().ok_or_else(|| {
            IndexerError::invalid_operation("An index run is already in progress")
        })?;
        self.coordinator.run(&self.union.shards(), docs)
    }

    /// Total committed documents across all shards.
    pub fn count(&self) -> Result<u64> {
        self.union.count()
    }

    /// Search all shards as one index.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.union.search(request)
    }

    /// Per-shard statistics in ordinal order.
    pub fn stats(&self) -> Result<Vec<ShardStats>> {
        self.union.stats()
    }
}
