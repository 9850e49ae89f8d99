//! Configuration for a shard set and its index runs.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::engine::mapping::IndexMapping;
use crate::error::{IndexerError, Result};

/// What a worker does with a final batch smaller than the batch size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TailPolicy {
    /// Commit the remainder, so every document of the slice is indexed.
    #[default]
    Flush,

    /// Discard the remainder. Only whole batches are committed, which keeps
    /// throughput numbers comparable with runs that never flush a partial
    /// batch.
    Drop,
}

/// Configuration for opening and loading a shard set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Root directory; shard `i` lives in `<storage_path>/<i>`.
    pub storage_path: PathBuf,

    /// Number of shards.
    pub shard_count: usize,

    /// Number of insert operations per bulk commit.
    pub batch_size: usize,

    /// Handling of the final partial batch of each worker.
    #[serde(default)]
    pub tail_policy: TailPolicy,

    /// Mapping used when a shard has to be created.
    #[serde(default)]
    pub mapping: IndexMapping,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("indexes"),
            shard_count: 2,
            batch_size: 100,
            tail_policy: TailPolicy::Flush,
            mapping: IndexMapping::default(),
        }
    }
}

impl IndexerConfig {
    /// Create a configuration with the default tail policy and mapping.
    pub fn new<P: Into<PathBuf>>(storage_path: P, shard_count: usize, batch_size: usize) -> Self {
        Self {
            storage_path: storage_path.into(),
            shard_count,
            batch_size,
            ..Default::default()
        }
    }

    /// Set the storage root.
    pub fn with_storage_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.storage_path = path.into();
        self
    }

    /// Set the number of shards.
    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the tail policy.
    pub fn with_tail_policy(mut self, tail_policy: TailPolicy) -> Self {
        self.tail_policy = tail_policy;
        self
    }

    /// Set the mapping for newly created shards.
    pub fn with_mapping(mut self, mapping: IndexMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Directory of the shard with the given ordinal.
    pub fn shard_path(&self, ordinal: usize) -> PathBuf {
        self.storage_path.join(ordinal.to_string())
    }

    /// Check the configuration before anything touches storage.
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(IndexerError::invalid_config("Shard count cannot be zero"));
        }
        if self.batch_size == 0 {
            return Err(IndexerError::invalid_config("Batch size cannot be zero"));
        }
        self.mapping
            .validate()
            .map_err(|e| IndexerError::invalid_config(format!("Invalid mapping: {e}")))
    }

    /// Load a configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save the configuration as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
