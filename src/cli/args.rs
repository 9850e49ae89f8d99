//! Command line argument parsing using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::TailPolicy;

/// Bulk-load a text corpus into N full-text index shards and query them as one
#[derive(Parser, Debug, Clone)]
#[command(name = "sharded-indexer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct IndexerArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl IndexerArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Index a CSV document file into a fresh shard set
    Index(IndexArgs),

    /// Print the total document count of a shard set
    Count(CountArgs),

    /// Search all shards of a shard set
    Search(SearchArgs),

    /// Show per-shard statistics
    Stats(StatsArgs),
}

/// Arguments for indexing a document file
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// CSV file with a header row; one document per row
    #[arg(short, long, value_name = "DOCS_FILE")]
    pub docs: PathBuf,

    /// Zero-based column holding the document text
    #[arg(long, default_value = "3")]
    pub column: usize,

    /// Index storage root
    #[arg(short, long, default_value = "indexes")]
    pub index: PathBuf,

    /// Number of shards
    #[arg(short, long, default_value = "2")]
    pub shards: usize,

    /// Documents per bulk commit
    #[arg(short, long = "batch-size", default_value = "100")]
    pub batch_size: usize,

    /// What to do with each worker's final partial batch
    #[arg(long, value_enum, default_value_t = TailPolicy::Flush)]
    pub tail: TailPolicy,

    /// Threads in the global pool used for reads (defaults to the CPU count)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Keep an existing index root instead of removing it first
    #[arg(long)]
    pub keep_existing: bool,

    /// Also print a one-line CSV summary
    #[arg(long)]
    pub csv: bool,
}

/// Arguments for counting documents
#[derive(Parser, Debug, Clone)]
pub struct CountArgs {
    /// Index storage root
    #[arg(short, long, default_value = "indexes")]
    pub index: PathBuf,

    /// Number of shards
    #[arg(short, long, default_value = "2")]
    pub shards: usize,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Index storage root
    #[arg(short, long, default_value = "indexes")]
    pub index: PathBuf,

    /// Number of shards
    #[arg(short, long, default_value = "2")]
    pub shards: usize,

    /// Field to search in (default: the mapping's default field)
    #[arg(long)]
    pub field: Option<String>,

    /// Maximum number of results to return
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Offset for pagination
    #[arg(short, long, default_value = "0")]
    pub offset: usize,

    /// Minimum score threshold for results
    #[arg(long)]
    pub min_score: Option<f32>,
}

/// Arguments for showing statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Index storage root
    #[arg(short, long, default_value = "indexes")]
    pub index: PathBuf,

    /// Number of shards
    #[arg(short, long, default_value = "2")]
    pub shards: usize,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
