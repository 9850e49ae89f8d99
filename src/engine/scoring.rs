//! BM25 relevance scoring.

use serde::{Deserialize, Serialize};

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25 {
    /// Term frequency saturation.
    pub k1: f32,
    /// Length normalization.
    pub b: f32,
}

impl Default for Bm25 {
    fn default() -> Self {
        Bm25 { k1: 1.2, b: 0.75 }
    }
}

impl Bm25 {
    /// Inverse document frequency of a term found in `doc_freq` of
    /// `total_docs` documents. Always positive.
    pub fn idf(&self, doc_freq: u64, total_docs: u64) -> f32 {
        let df = doc_freq as f32;
        let n = total_docs as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Score contribution of one term occurring `term_freq` times in a
    /// document of `doc_len` terms.
    pub fn term_score(&self, idf: f32, term_freq: u32, doc_len: u32, avg_doc_len: f32) -> f32 {
        let tf = term_freq as f32;
        let avg = if avg_doc_len > 0.0 { avg_doc_len } else { 1.0 };
        let norm = 1.0 - self.b + self.b * (doc_len as f32 / avg);
        idf * (tf * (self.k1 + 1.0)) / (tf + self.k1 * norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idf_prefers_rare_terms() {
        let bm25 = Bm25::default();
        let rare = bm25.idf(1, 100);
        let common = bm25.idf(90, 100);

        assert!(rare > common);
        assert!(common > 0.0);
    }

    #[test]
    fn test_term_score_saturates() {
        let bm25 = Bm25::default();
        let idf = bm25.idf(1, 10);
        let once = bm25.term_score(idf, 1, 10, 10.0);
        let many = bm25.term_score(idf, 10, 10, 10.0);

        assert!(many > once);
        assert!(many < once * 10.0);
    }

    #[test]
    fn test_shorter_documents_score_higher() {
        let bm25 = Bm25::default();
        let idf = bm25.idf(1, 10);
        assert!(bm25.term_score(idf, 1, 5, 10.0) > bm25.term_score(idf, 1, 20, 10.0));
    }
}
