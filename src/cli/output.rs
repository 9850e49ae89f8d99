//! Output formatting for CLI commands.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::args::{IndexerArgs, OutputFormat};
use crate::coordinator::WorkerReport;
use crate::engine::search::SearchHit;
use crate::error::Result;
use crate::shard::ShardStats;

/// A command result that can render itself for people.
pub trait HumanOutput {
    fn print_human(&self, args: &IndexerArgs);
}

/// Result of the `index` command.
#[derive(Debug, Serialize)]
pub struct IndexSummary {
    pub docs_path: PathBuf,
    pub index_path: PathBuf,
    pub documents_read: usize,
    pub documents: usize,
    pub count: u64,
    pub threads: usize,
    pub batch_size: usize,
    pub shards: usize,
    pub duration_ms: u64,
    pub docs_per_second: u64,
    pub workers: Vec<WorkerReport>,
}

impl IndexSummary {
    /// The single-line summary used to collect benchmark runs.
    pub fn csv_line(&self) -> String {
        format!(
            "csv,{},{},{},{},{},{}",
            self.documents,
            self.count,
            self.threads,
            self.batch_size,
            self.shards,
            self.docs_per_second
        )
    }
}

impl HumanOutput for IndexSummary {
    fn print_human(&self, args: &IndexerArgs) {
        println!(
            "{} documents read for indexing from {}.",
            self.documents,
            self.docs_path.display()
        );
        println!(
            "Threads: {}, batch size: {}, shards: {}.",
            self.threads, self.batch_size, self.shards
        );
        println!("Indexing operation took {}ms", self.duration_ms);
        println!("{} documents indexed.", self.count);
        println!("Indexing rate: {} docs/sec.", self.docs_per_second);

        if args.verbosity() > 1 {
            println!();
            for worker in &self.workers {
                println!(
                    "  shard {}: {} committed in {} commits, {} dropped, {}ms",
                    worker.shard,
                    worker.documents_committed,
                    worker.commits,
                    worker.dropped,
                    worker.elapsed.as_millis()
                );
            }
        }
    }
}

/// Result of the `count` command.
#[derive(Debug, Serialize)]
pub struct CountSummary {
    pub index_path: PathBuf,
    pub shards: usize,
    pub count: u64,
    pub per_shard: Vec<u64>,
}

impl HumanOutput for CountSummary {
    fn print_human(&self, args: &IndexerArgs) {
        println!("doc count: {}", self.count);
        if args.verbosity() > 1 {
            for (ordinal, count) in self.per_shard.iter().enumerate() {
                println!("  shard {ordinal}: {count}");
            }
        }
    }
}

/// Result of the `search` command.
#[derive(Debug, Serialize)]
pub struct SearchSummary {
    pub query: String,
    pub total_hits: u64,
    pub max_score: f32,
    pub duration_ms: u64,
    pub hits: Vec<SearchHit>,
}

impl HumanOutput for SearchSummary {
    fn print_human(&self, _args: &IndexerArgs) {
        println!("Search Results:");
        println!("═══════════════");

        for (i, hit) in self.hits.iter().enumerate() {
            println!();
            println!(
                "Result {}: shard {} doc {} (Score: {:.3})",
                i + 1,
                hit.shard,
                hit.doc_id,
                hit.score
            );
            for (name, text) in &hit.fields {
                println!("{name}: {text}");
            }
        }

        println!();
        println!("Total hits: {}", self.total_hits);
        println!("Search time: {}ms", self.duration_ms);
    }
}

/// Result of the `stats` command.
#[derive(Debug, Serialize)]
pub struct StatsSummary {
    pub index_path: PathBuf,
    pub total_documents: u64,
    pub shards: Vec<ShardStats>,
}

impl HumanOutput for StatsSummary {
    fn print_human(&self, _args: &IndexerArgs) {
        println!("Index Statistics:");
        println!("════════════════");
        println!("Index path: {}", self.index_path.display());
        println!("Total documents: {}", self.total_documents);

        for shard in &self.shards {
            println!();
            println!("Shard {}: {}", shard.ordinal, shard.path.display());
            println!("  Documents: {}", shard.document_count);
            println!("  Commits: {}", shard.commit_count);
            println!("  Terms: {}", shard.term_count);
            if let Some(time) = shard.last_commit_time {
                println!("  Last commit: {}", time.to_rfc3339());
            }
        }
    }
}

/// Output a result in the selected format.
pub fn output_result<T>(result: &T, args: &IndexerArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            result.print_human(args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

fn output_json<T: Serialize>(result: &T, args: &IndexerArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_line() {
        let summary = IndexSummary {
            docs_path: PathBuf::from("docs.csv"),
            index_path: PathBuf::from("indexes"),
            documents_read: 41,
            documents: 40,
            count: 40,
            threads: 8,
            batch_size: 10,
            shards: 2,
            duration_ms: 20,
            docs_per_second: 2000,
            workers: Vec::new(),
        };

        assert_eq!(summary.csv_line(), "csv,40,40,8,10,2,2000");
    }
}
