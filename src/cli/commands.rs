//! Command implementations for the CLI.

use std::fs;
use std::path::Path;
use std::time::Instant;

use csv::ReaderBuilder;
use log::{info, warn};
use rayon::ThreadPoolBuilder;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::IndexerConfig;
use crate::engine::search::SearchRequest;
use crate::error::{IndexerError, Result};
use crate::partition::even_prefix_len;
use crate::shard_set::ShardSet;

/// Execute a CLI command.
pub fn execute_command(args: IndexerArgs) -> Result<()> {
    match &args.command {
        Command::Index(index_args) => index_documents(index_args, &args),
        Command::Count(count_args) => count_documents(count_args, &args),
        Command::Search(search_args) => search_index(search_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
    }
}

/// Read the text column of every data row of a CSV file.
///
/// The first row is a header and is skipped. Rows may have differing
/// lengths, but every row must have the requested column.
pub fn read_documents(path: &Path, column: usize) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            IndexerError::other(format!("Failed to open docs file {}: {e}", path.display()))
        })?;

    let mut docs = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| IndexerError::other(format!("Failed to read docs file: {e}")))?;
        let text = record.get(column).ok_or_else(|| {
            // +2: one for the header, one for 1-based numbering.
            IndexerError::field(format!("Row {} has no column {column}", row + 2))
        })?;
        docs.push(text.to_string());
    }

    Ok(docs)
}

/// Index a CSV file into a fresh shard set and report the rate.
fn index_documents(args: &IndexArgs, cli_args: &IndexerArgs) -> Result<()> {
    let threads = args.threads.unwrap_or_else(num_cpus::get);
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| IndexerError::initialization(format!("Failed to size thread pool: {e}")))?;

    if args.index.exists() && !args.keep_existing {
        info!("Removing existing index at {}", args.index.display());
        fs::remove_dir_all(&args.index).map_err(|e| {
            IndexerError::initialization(format!(
                "Failed to remove {}: {e}",
                args.index.display()
            ))
        })?;
    }

    info!("Opening docs file {}", args.docs.display());
    let mut docs = read_documents(&args.docs, args.column)?;
    let documents_read = docs.len();

    let usable = even_prefix_len(docs.len(), args.shards.max(1));
    if usable < docs.len() {
        warn!(
            "Dropping {} trailing documents so {} shards receive equal slices",
            docs.len() - usable,
            args.shards
        );
        docs.truncate(usable);
    }

    let config = IndexerConfig::new(&args.index, args.shards, args.batch_size)
        .with_tail_policy(args.tail);
    let set = ShardSet::open(&config)?;

    let report = set.index(&docs)?;
    let count = set.count()?;

    let secs = report.elapsed.as_secs_f64();
    let docs_per_second = if secs > 0.0 {
        (count as f64 / secs) as u64
    } else {
        0
    };

    let summary = IndexSummary {
        docs_path: args.docs.clone(),
        index_path: args.index.clone(),
        documents_read,
        documents: docs.len(),
        count,
        threads,
        batch_size: args.batch_size,
        shards: args.shards,
        duration_ms: report.elapsed.as_millis() as u64,
        docs_per_second,
        workers: report.workers,
    };

    output_result(&summary, cli_args)?;
    if args.csv {
        println!("{}", summary.csv_line());
    }

    Ok(())
}

/// Print the total document count.
fn count_documents(args: &CountArgs, cli_args: &IndexerArgs) -> Result<()> {
    let set = open_existing(&args.index, args.shards)?;
    let per_shard = set.union_view().shard_counts()?;

    let summary = CountSummary {
        index_path: args.index.clone(),
        shards: set.shard_count(),
        count: per_shard.iter().sum(),
        per_shard,
    };
    output_result(&summary, cli_args)
}

/// Run a query across all shards.
fn search_index(args: &SearchArgs, cli_args: &IndexerArgs) -> Result<()> {
    let set = open_existing(&args.index, args.shards)?;

    let mut request = SearchRequest::new(args.query.clone())
        .with_limit(args.limit)
        .with_offset(args.offset);
    if let Some(field) = &args.field {
        request = request.with_field(field.clone());
    }
    if let Some(min_score) = args.min_score {
        request = request.with_min_score(min_score);
    }

    let start_time = Instant::now();
    let results = set.search(&request)?;
    let duration = start_time.elapsed();

    let summary = SearchSummary {
        query: args.query.clone(),
        total_hits: results.total_hits,
        max_score: results.max_score,
        duration_ms: duration.as_millis() as u64,
        hits: results.hits,
    };
    output_result(&summary, cli_args)
}

/// Print per-shard statistics.
fn show_stats(args: &StatsArgs, cli_args: &IndexerArgs) -> Result<()> {
    let set = open_existing(&args.index, args.shards)?;
    let shards = set.stats()?;

    let summary = StatsSummary {
        index_path: args.index.clone(),
        total_documents: shards.iter().map(|s| s.document_count).sum(),
        shards,
    };
    output_result(&summary, cli_args)
}

/// Open a shard set that must already exist on disk.
fn open_existing(index: &Path, shards: usize) -> Result<ShardSet> {
    if !index.is_dir() {
        return Err(IndexerError::invalid_operation(format!(
            "No index found at {}",
            index.display()
        )));
    }

    let config = IndexerConfig::default()
        .with_storage_path(index)
        .with_shard_count(shards);
    // Opening would create any missing shard as an empty index.
    if let Some(missing) = (0..shards).find(|&i| !config.shard_path(i).is_dir()) {
        return Err(IndexerError::invalid_operation(format!(
            "Shard {missing} not found at {}",
            config.shard_path(missing).display()
        )));
    }
    ShardSet::open(&config)
}
