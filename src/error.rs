//! Error types for the sharded indexer.
//!
//! All fallible operations return [`IndexerError`]. Failures that matter to a
//! caller deciding what to do next (wipe storage and retry, fix the input,
//! give up) are exposed through [`IndexerError::kind`].
//!
//! # Examples
//!
//! ```
//! use sharded_indexer::error::{ErrorKind, IndexerError, Result};
//!
//! fn check(documents: usize, shards: usize) -> Result<()> {
//!     if documents % shards != 0 {
//!         return Err(IndexerError::PartitionPrecondition { documents, shards });
//!     }
//!     Ok(())
//! }
//!
//! let err = check(7, 2).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::PartitionPrecondition);
//! ```

use std::io;

use thiserror::Error;

/// The main error type for indexer operations.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// I/O errors (file operations, directory creation, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The storage root or a shard could not be created or opened.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// A single shard failed to open or be created.
    #[error("Shard {shard} failed to initialize: {source}")]
    Shard {
        shard: usize,
        #[source]
        source: Box<IndexerError>,
    },

    /// The document count does not divide evenly across the shards.
    #[error("{documents} documents cannot be split evenly across {shards} shards")]
    PartitionPrecondition { documents: usize, shards: usize },

    /// A document insert or batch commit failed inside a worker.
    #[error("Write error on shard {shard}: {message}")]
    Write { shard: usize, message: String },

    /// A count or query through the union view failed on one shard.
    #[error("Aggregation error on shard {shard}: {message}")]
    Aggregation { shard: usize, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Storage-related errors (segment files, mapping files)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Analysis-related errors (unknown analyzer, tokenization)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Field-related errors
    #[error("Field error: {0}")]
    Field(String),

    /// Query-related errors
    #[error("Query error: {0}")]
    Query(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with IndexerError.
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Coarse classification of an [`IndexerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Startup failed; the storage root or a shard is unusable.
    Initialization,
    /// The input was rejected before any shard was written.
    PartitionPrecondition,
    /// An index run failed while writing.
    Write,
    /// A count or query failed on an underlying shard.
    Aggregation,
    /// The configuration is invalid.
    Configuration,
    /// Any other failure raised by the full-text engine or its storage.
    Engine,
}

impl IndexerError {
    /// Create a new initialization error.
    pub fn initialization<S: Into<String>>(msg: S) -> Self {
        IndexerError::Initialization(msg.into())
    }

    /// Create a new write error for a shard.
    pub fn write<S: Into<String>>(shard: usize, msg: S) -> Self {
        IndexerError::Write {
            shard,
            message: msg.into(),
        }
    }

    /// Create a new aggregation error for a shard.
    pub fn aggregation<S: Into<String>>(shard: usize, msg: S) -> Self {
        IndexerError::Aggregation {
            shard,
            message: msg.into(),
        }
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        IndexerError::Config(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        IndexerError::Storage(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        IndexerError::Analysis(msg.into())
    }

    /// Create a new field error.
    pub fn field<S: Into<String>>(msg: S) -> Self {
        IndexerError::Field(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        IndexerError::Query(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        IndexerError::Serialization(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        IndexerError::InvalidOperation(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        IndexerError::Other(msg.into())
    }

    /// Wrap an error raised while opening or creating a shard.
    pub fn shard(shard: usize, source: IndexerError) -> Self {
        IndexerError::Shard {
            shard,
            source: Box::new(source),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexerError::Initialization(_) | IndexerError::Shard { .. } => {
                ErrorKind::Initialization
            }
            IndexerError::PartitionPrecondition { .. } => ErrorKind::PartitionPrecondition,
            IndexerError::Write { .. } => ErrorKind::Write,
            IndexerError::Aggregation { .. } => ErrorKind::Aggregation,
            IndexerError::Config(_) => ErrorKind::Configuration,
            _ => ErrorKind::Engine,
        }
    }

    /// The shard ordinal this error is attributed to, if any.
    pub fn shard_ordinal(&self) -> Option<usize> {
        match self {
            IndexerError::Shard { shard, .. }
            | IndexerError::Write { shard, .. }
            | IndexerError::Aggregation { shard, .. } => Some(*shard),
            _ => None,
        }
    }
}
