//! Criterion benchmarks for the sharded indexer.
//!
//! - Text analysis with the standard analyzer
//! - Bulk indexing throughput across shard counts
//! - Union view search over a loaded shard set

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sharded_indexer::analysis::analyzer::{Analyzer, standard_analyzer};
use sharded_indexer::{IndexerConfig, SearchRequest, ShardSet};

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<String> {
    let words = [
        "search",
        "engine",
        "full",
        "text",
        "index",
        "query",
        "document",
        "shard",
        "batch",
        "commit",
        "union",
        "worker",
        "partition",
        "relevance",
        "score",
        "analysis",
        "tokenization",
        "storage",
        "retrieval",
        "ranking",
    ];

    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        let doc_length = 20 + (i % 40);
        let doc: Vec<&str> = (0..doc_length)
            .map(|j| words[(i * 7 + j * 13) % words.len()])
            .collect();
        documents.push(doc.join(" "));
    }
    documents
}

fn bench_text_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_analysis");
    let analyzer = standard_analyzer();
    let texts = generate_test_documents(100);

    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("standard_analyzer_batch", |b| {
        b.iter(|| {
            for text in &texts {
                black_box(analyzer.terms(black_box(text)).unwrap());
            }
        })
    });

    group.finish();
}

fn bench_indexing(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexing");
    group.sample_size(10);

    let docs = generate_test_documents(2_400);
    group.throughput(Throughput::Elements(docs.len() as u64));

    for shards in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("shards", shards), &shards, |b, &shards| {
            b.iter_with_setup(
                || {
                    let dir = tempfile::tempdir().unwrap();
                    let config = IndexerConfig::new(dir.path().join("indexes"), shards, 100);
                    let set = ShardSet::open(&config).unwrap();
                    (dir, set)
                },
                |(_dir, set)| {
                    black_box(set.index(&docs).unwrap());
                },
            )
        });
    }

    group.finish();
}

fn bench_union_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("union_search");

    let dir = tempfile::tempdir().unwrap();
    let config = IndexerConfig::new(dir.path().join("indexes"), 4, 100);
    let set = ShardSet::open(&config).unwrap();
    set.index(&generate_test_documents(4_000)).unwrap();

    let request = SearchRequest::new("shard relevance").with_limit(20);
    group.bench_function("two_term_query", |b| {
        b.iter(|| black_box(set.search(black_box(&request)).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_text_analysis,
    bench_indexing,
    bench_union_search
);
criterion_main!(benches);
