//! In-memory inverted index built from committed segments.

use ahash::AHashMap;

use crate::document::DocId;
use crate::engine::scoring::Bm25;
use crate::engine::search::SearchHit;
use crate::engine::segment::{SegmentData, SegmentDocument};

/// Occurrence of a term in one document slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub slot: u32,
    pub term_freq: u32,
}

#[derive(Debug, Clone)]
struct DocSlot {
    id: DocId,
    live: bool,
    field_lengths: Vec<(String, u32)>,
    stored: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
struct FieldIndex {
    terms: AHashMap<String, Vec<Posting>>,
    live_docs: u64,
    total_length: u64,
}

impl FieldIndex {
    fn avg_length(&self) -> f32 {
        if self.live_docs == 0 {
            0.0
        } else {
            self.total_length as f32 / self.live_docs as f32
        }
    }
}

/// Term → postings per field, plus the live-document table.
///
/// Documents are never physically removed. Re-indexing an id marks the old
/// slot dead; dead slots are skipped by counts and searches.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    slots: Vec<DocSlot>,
    live: AHashMap<DocId, u32>,
    fields: AHashMap<String, FieldIndex>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live documents.
    pub fn document_count(&self) -> u64 {
        self.live.len() as u64
    }

    /// Number of distinct terms across all fields.
    pub fn term_count(&self) -> u64 {
        self.fields.values().map(|f| f.terms.len() as u64).sum()
    }

    /// Apply every document of a committed segment, in order.
    pub fn apply_segment(&mut self, segment: &SegmentData) {
        for doc in &segment.documents {
            self.apply_document(doc);
        }
    }

    fn apply_document(&mut self, doc: &SegmentDocument) {
        if let Some(old) = self.live.remove(&doc.id) {
            self.retire(old);
        }

        let slot = self.slots.len() as u32;
        let mut field_lengths = Vec::with_capacity(doc.fields.len());
        let mut stored = Vec::new();

        for field in &doc.fields {
            let index = self.fields.entry(field.name.clone()).or_default();
            index.live_docs += 1;
            index.total_length += u64::from(field.length);
            for (term, term_freq) in &field.terms {
                index
                    .terms
                    .entry(term.clone())
                    .or_default()
                    .push(Posting {
                        slot,
                        term_freq: *term_freq,
                    });
            }
            field_lengths.push((field.name.clone(), field.length));
            if let Some(text) = &field.stored {
                stored.push((field.name.clone(), text.clone()));
            }
        }

        self.slots.push(DocSlot {
            id: doc.id,
            live: true,
            field_lengths,
            stored,
        });
        self.live.insert(doc.id, slot);
    }

    fn retire(&mut self, slot: u32) {
        let doc = &mut self.slots[slot as usize];
        doc.live = false;
        for (name, length) in &doc.field_lengths {
            if let Some(index) = self.fields.get_mut(name) {
                index.live_docs = index.live_docs.saturating_sub(1);
                index.total_length = index.total_length.saturating_sub(u64::from(*length));
            }
        }
    }

    /// Score live documents matching any of `terms` in `field`.
    ///
    /// Returns every match, best first.
    pub fn search(&self, field: &str, terms: &[String], bm25: &Bm25) -> Vec<SearchHit> {
        let Some(index) = self.fields.get(field) else {
            return Vec::new();
        };
        let avg_length = index.avg_length();
        let mut scores: AHashMap<u32, f32> = AHashMap::new();

        let mut unique_terms: Vec<&String> = terms.iter().collect();
        unique_terms.sort_unstable();
        unique_terms.dedup();

        for term in unique_terms {
            let Some(postings) = index.terms.get(term) else {
                continue;
            };
            let live_postings: Vec<&Posting> = postings
                .iter()
                .filter(|p| self.slots[p.slot as usize].live)
                .collect();
            if live_postings.is_empty() {
                continue;
            }

            let idf = bm25.idf(live_postings.len() as u64, index.live_docs);
            for posting in live_postings {
                let length = self.field_length(posting.slot, field);
                *scores.entry(posting.slot).or_insert(0.0) +=
                    bm25.term_score(idf, posting.term_freq, length, avg_length);
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .map(|(slot, score)| {
                let doc = &self.slots[slot as usize];
                SearchHit {
                    shard: 0,
                    doc_id: doc.id,
                    score,
                    fields: doc.stored.clone(),
                }
            })
            .collect();
        hits.sort_by(SearchHit::rank_cmp);
        hits
    }

    fn field_length(&self, slot: u32, field: &str) -> u32 {
        self.slots[slot as usize]
            .field_lengths
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, length)| *length)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::segment::SegmentField;

    fn doc(id: DocId, terms: &[&str]) -> SegmentDocument {
        let mut counts: Vec<(String, u32)> = Vec::new();
        for term in terms {
            match counts.iter_mut().find(|(t, _)| t == term) {
                Some((_, c)) => *c += 1,
                None => counts.push((term.to_string(), 1)),
            }
        }
        SegmentDocument {
            id,
            fields: vec![SegmentField {
                name: "body".to_string(),
                length: terms.len() as u32,
                terms: counts,
                stored: None,
            }],
        }
    }

    fn segment(sequence: u64, documents: Vec<SegmentDocument>) -> SegmentData {
        SegmentData {
            sequence,
            committed_at_ms: 0,
            documents,
        }
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_apply_and_count() {
        let mut index = InvertedIndex::new();
        index.apply_segment(&segment(
            1,
            vec![doc(0, &["rust", "search"]), doc(1, &["go", "search"])],
        ));

        assert_eq!(index.document_count(), 2);
        assert_eq!(index.term_count(), 3);
        assert_eq!(index.search("body", &terms(&["go"]), &Bm25::default())[0].doc_id, 1);
    }

    #[test]
    fn test_reindex_replaces_document() {
        let mut index = InvertedIndex::new();
        index.apply_segment(&segment(1, vec![doc(0, &["old"])]));
        index.apply_segment(&segment(2, vec![doc(0, &["new"])]));

        assert_eq!(index.document_count(), 1);
        assert!(index.search("body", &terms(&["old"]), &Bm25::default()).is_empty());
        assert_eq!(
            index.search("body", &terms(&["new"]), &Bm25::default())[0].doc_id,
            0
        );
    }

    #[test]
    fn test_search_ranks_by_relevance() {
        let mut index = InvertedIndex::new();
        index.apply_segment(&segment(
            1,
            vec![
                doc(0, &["search", "engine"]),
                doc(1, &["rust", "search", "rust"]),
                doc(2, &["database"]),
            ],
        ));

        let hits = index.search("body", &terms(&["rust", "search"]), &Bm25::default());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].doc_id, 1);
        assert_eq!(hits[1].doc_id, 0);
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_search_unknown_field_or_term() {
        let mut index = InvertedIndex::new();
        index.apply_segment(&segment(1, vec![doc(0, &["rust"])]));

        assert!(index.search("title", &terms(&["rust"]), &Bm25::default()).is_empty());
        assert!(index.search("body", &terms(&["java"]), &Bm25::default()).is_empty());
    }
}
