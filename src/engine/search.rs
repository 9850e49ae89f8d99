//! Search request and result types shared by shards and the union view.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::document::DocId;

/// A free-text query against one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text; analyzed with the field's analyzer.
    pub query: String,

    /// Field to search; the mapping's default field when unset.
    pub field: Option<String>,

    /// Maximum number of hits to return.
    pub limit: usize,

    /// Number of top hits to skip.
    pub offset: usize,

    /// Hits scoring below this are discarded.
    pub min_score: Option<f32>,
}

impl SearchRequest {
    /// Create a request for the top 10 hits of a query.
    pub fn new<S: Into<String>>(query: S) -> Self {
        SearchRequest {
            query: query.into(),
            field: None,
            limit: 10,
            offset: 0,
            min_score: None,
        }
    }

    pub fn with_field<S: Into<String>>(mut self, field: S) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }
}

/// A matching document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Ordinal of the shard holding the document.
    pub shard: usize,

    /// Document id within its shard.
    pub doc_id: DocId,

    /// Relevance score.
    pub score: f32,

    /// Stored fields, if the mapping stores any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<(String, String)>,
}

impl SearchHit {
    /// Order hits best first: higher score, then lower shard, then lower id.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.shard.cmp(&other.shard))
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

/// Search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// The returned hits, best first.
    pub hits: Vec<SearchHit>,

    /// Total number of matching documents.
    pub total_hits: u64,

    /// Maximum score among all matches.
    pub max_score: f32,
}
