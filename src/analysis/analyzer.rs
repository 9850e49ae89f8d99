//! Analyzers combine a tokenizer with a chain of filters.
//!
//! Named analyzers are resolved with [`analyzer_by_name`]:
//!
//! | name         | pipeline                                        |
//! |--------------|-------------------------------------------------|
//! | `standard`   | Unicode word tokenizer, lowercase, stop words   |
//! | `simple`     | Unicode word tokenizer, lowercase               |
//! | `whitespace` | whitespace tokenizer, lowercase                 |
//!
//! ```
//! use sharded_indexer::analysis::analyzer::{Analyzer, analyzer_by_name};
//!
//! let analyzer = analyzer_by_name("standard").unwrap();
//! let terms = analyzer.terms("The Quick fox").unwrap();
//! assert_eq!(terms, vec!["quick", "fox"]);
//! ```

use std::sync::Arc;

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{Filter, LowercaseFilter, StopFilter};
use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer, WhitespaceTokenizer};
use crate::error::{IndexerError, Result};

/// Name of the analyzer used when a mapping does not name one.
pub const DEFAULT_ANALYZER: &str = "standard";

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer.
    fn name(&self) -> &str;

    /// Analyze the text and collect the surviving term texts.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .analyze(text)?
            .filter(|t| !t.is_stopped() && !t.text.is_empty())
            .map(|t| t.text)
            .collect())
    }
}

/// An analyzer built from a tokenizer and an ordered list of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a pipeline with the given tokenizer and no filters.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Append a filter to the chain.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the analyzer name.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = self.tokenizer.tokenize(text)?;
        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }
        Ok(tokens)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build the standard analyzer.
pub fn standard_analyzer() -> PipelineAnalyzer {
    PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
        .add_filter(Arc::new(LowercaseFilter::new()))
        .add_filter(Arc::new(StopFilter::new()))
        .with_name("standard")
}

/// Resolve an analyzer by name.
pub fn analyzer_by_name(name: &str) -> Result<Arc<dyn Analyzer>> {
    let analyzer = match name {
        "standard" => standard_analyzer(),
        "simple" => PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .with_name("simple"),
        "whitespace" => PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .with_name("whitespace"),
        other => {
            return Err(IndexerError::analysis(format!(
                "Unknown analyzer '{other}'"
            )));
        }
    };
    Ok(Arc::new(analyzer))
}
