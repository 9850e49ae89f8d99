//! Text analysis used by the bundled full-text engine.
//!
//! An [`Analyzer`](analyzer::Analyzer) turns a field's text into the terms
//! stored in a shard's inverted index. Analyzers are looked up by the name a
//! shard's [`IndexMapping`](crate::engine::mapping::IndexMapping) carries, so
//! the indexing core never needs to know which one is in use.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
