//! Aggregate read view over every shard of a set.
//!
//! The union view owns no storage. Counts and searches fan out to the
//! registered shards in parallel and are merged here; a failure on any shard
//! is reported as [`IndexerError::Aggregation`] with that shard's ordinal.

use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;

use crate::engine::search::{SearchHit, SearchRequest, SearchResults};
use crate::error::{IndexerError, Result};
use crate::shard::{Shard, ShardStats};

/// All registered shards presented as one logical index.
#[derive(Debug, Default)]
pub struct UnionView {
    shards: RwLock<Vec<Arc<Shard>>>,
}

impl UnionView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shard. Shards are registered once, in ordinal order.
    pub(crate) fn add(&self, shard: Arc<Shard>) {
        self.shards.write().push(shard);
    }

    /// Number of registered shards.
    pub fn shard_count(&self) -> usize {
        self.shards.read().len()
    }

    /// Snapshot of the registered shards.
    pub fn shards(&self) -> Vec<Arc<Shard>> {
        self.shards.read().clone()
    }

    /// Committed document count of each shard, in ordinal order.
    pub fn shard_counts(&self) -> Result<Vec<u64>> {
        self.shards()
            .par_iter()
            .map(|shard| {
                shard
                    .document_count()
                    .map_err(|e| IndexerError::aggregation(shard.ordinal(), e.to_string()))
            })
            .collect()
    }

    /// Total committed documents across all shards.
    pub fn count(&self) -> Result<u64> {
        Ok(self.shard_counts()?.into_iter().sum())
    }

    /// Search every shard and merge the hits by score.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        let per_shard = SearchRequest {
            offset: 0,
            limit: request.offset.saturating_add(request.limit),
            ..request.clone()
        };

        let results = self
            .shards()
            .par_iter()
            .map(|shard| {
                shard
                    .search(&per_shard)
                    .map(|results| (shard.ordinal(), results))
                    .map_err(|e| IndexerError::aggregation(shard.ordinal(), e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(merge_results(results, request.offset, request.limit))
    }

    /// Statistics of each shard, in ordinal order.
    pub fn stats(&self) -> Result<Vec<ShardStats>> {
        self.shards()
            .iter()
            .map(|shard| {
                shard
                    .stats()
                    .map_err(|e| IndexerError::aggregation(shard.ordinal(), e.to_string()))
            })
            .collect()
    }
}

/// Merge per-shard results, tagging each hit with its shard ordinal.
pub fn merge_results(
    results: Vec<(usize, SearchResults)>,
    offset: usize,
    limit: usize,
) -> SearchResults {
    let mut total_hits = 0;
    let mut max_score = 0.0f32;
    let mut hits: Vec<SearchHit> = Vec::new();

    for (ordinal, shard_results) in results {
        total_hits += shard_results.total_hits;
        if shard_results.total_hits > 0 {
            max_score = max_score.max(shard_results.max_score);
        }
        hits.extend(shard_results.hits.into_iter().map(|mut hit| {
            hit.shard = ordinal;
            hit
        }));
    }

    hits.sort_by(SearchHit::rank_cmp);

    SearchResults {
        hits: hits.into_iter().skip(offset).take(limit).collect(),
        total_hits,
        max_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(scores: &[(u64, f32)]) -> SearchResults {
        SearchResults {
            hits: scores
                .iter()
                .map(|(doc_id, score)| SearchHit {
                    shard: 0,
                    doc_id: *doc_id,
                    score: *score,
                    fields: Vec::new(),
                })
                .collect(),
            total_hits: scores.len() as u64,
            max_score: scores.iter().map(|(_, s)| *s).fold(0.0, f32::max),
        }
    }

    #[test]
    fn test_merge_orders_across_shards() {
        let merged = merge_results(
            vec![
                (0, results(&[(0, 3.0), (1, 1.0)])),
                (1, results(&[(0, 2.0), (5, 1.0)])),
            ],
            0,
            10,
        );

        let order: Vec<(usize, u64)> = merged.hits.iter().map(|h| (h.shard, h.doc_id)).collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (0, 1), (1, 5)]);
        assert_eq!(merged.total_hits, 4);
        assert_eq!(merged.max_score, 3.0);
    }

    #[test]
    fn test_merge_pages() {
        let merged = merge_results(
            vec![
                (0, results(&[(0, 4.0), (1, 2.0)])),
                (1, results(&[(0, 3.0), (1, 1.0)])),
            ],
            1,
            2,
        );

        let order: Vec<(usize, u64)> = merged.hits.iter().map(|h| (h.shard, h.doc_id)).collect();
        assert_eq!(order, vec![(1, 0), (0, 1)]);
        assert_eq!(merged.total_hits, 4);
    }

    #[test]
    fn test_empty_view() {
        let view = UnionView::new();
        assert_eq!(view.shard_count(), 0);
        assert_eq!(view.count().unwrap(), 0);
        assert!(view.search(&SearchRequest::new("x")).unwrap().hits.is_empty());
    }
}
