//! # sharded-indexer
//!
//! Bulk-load a text corpus into N independent full-text index shards and
//! query them as one logical index.
//!
//! - [`ShardSet`] opens (or creates) N shard directories under one root.
//! - [`partition`] splits the input into N contiguous, equal slices.
//! - [`coordinator`] runs one worker per shard, each committing through a
//!   [`batch_buffer::BatchBuffer`].
//! - [`union::UnionView`] answers counts and searches across every shard.
//!
//! The full-text engine sits behind the [`engine::IndexEngine`] and
//! [`engine::FullTextIndex`] traits; [`engine::file::FileEngine`] is the
//! bundled implementation.

pub mod analysis;
pub mod batch_buffer;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod engine;
pub mod error;
pub mod partition;
pub mod shard;
pub mod shard_set;
pub mod union;

pub use config::{IndexerConfig, TailPolicy};
pub use coordinator::{IndexingReport, WorkerReport};
pub use engine::search::{SearchHit, SearchRequest, SearchResults};
pub use error::{ErrorKind, IndexerError, Result};
pub use shard_set::ShardSet;
pub use union::UnionView;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
