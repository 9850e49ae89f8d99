//! Token filters applied after tokenization.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform a token stream.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter.
    fn name(&self) -> &'static str;
}

/// A filter that converts tokens to lowercase.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(|token| {
            if token.is_stopped() {
                token
            } else {
                let lowered = token.text.to_lowercase();
                token.with_text(lowered)
            }
        })))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

static ENGLISH_STOP_WORDS: LazyLock<Arc<HashSet<String>>> = LazyLock::new(|| {
    Arc::new(
        DEFAULT_ENGLISH_STOP_WORDS
            .iter()
            .map(|w| w.to_string())
            .collect(),
    )
});

/// A filter that removes stop words.
///
/// Stopped tokens are dropped from the stream entirely, so positions of the
/// remaining tokens keep the gaps the removed words left behind.
#[derive(Clone, Debug)]
pub struct StopFilter {
    stop_words: Arc<HashSet<String>>,
}

impl StopFilter {
    /// Create a stop filter with the default English stop word list.
    pub fn new() -> Self {
        StopFilter {
            stop_words: Arc::clone(&ENGLISH_STOP_WORDS),
        }
    }

    /// Create a stop filter from a custom word list.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StopFilter {
            stop_words: Arc::new(words.into_iter().map(Into::into).collect()),
        }
    }

    /// Check whether a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }
}

impl Default for StopFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for StopFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let stop_words = Arc::clone(&self.stop_words);
        Ok(Box::new(tokens.filter(move |token| {
            !token.is_stopped() && !stop_words.contains(&token.text)
        })))
    }

    fn name(&self) -> &'static str {
        "stop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    fn stream(words: &[&str]) -> TokenStream {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        Box::new(tokens.into_iter())
    }

    #[test]
    fn test_lowercase_filter() {
        let filtered: Vec<_> = LowercaseFilter::new()
            .filter(stream(&["Hello", "WORLD"]))
            .unwrap()
            .collect();

        assert_eq!(filtered[0].text, "hello");
        assert_eq!(filtered[1].text, "world");
    }

    #[test]
    fn test_stop_filter_keeps_positions() {
        let filtered: Vec<_> = StopFilter::new()
            .filter(stream(&["the", "quick", "and", "brown"]))
            .unwrap()
            .collect();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].text, "quick");
        assert_eq!(filtered[0].position, 1);
        assert_eq!(filtered[1].position, 3);
    }

    #[test]
    fn test_custom_stop_words() {
        let filter = StopFilter::from_words(["foo"]);
        assert!(filter.is_stop_word("foo"));
        assert!(!filter.is_stop_word("the"));
    }
}
