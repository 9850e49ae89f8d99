//! File-backed full-text engine.
//!
//! Each index lives in its own directory:
//!
//! ```text
//! <path>/
//! +-- mapping.json       # IndexMapping, written at creation
//! +-- seg_000001.seg     # one file per commit
//! +-- seg_000002.seg
//! ```
//!
//! Opening an index replays its segments into an [`InvertedIndex`]. A commit
//! analyzes its batch without holding any lock, writes the segment file, and
//! only then takes the write lock to publish the new documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use parking_lot::{Mutex, RwLock};

use crate::analysis::analyzer::Analyzer;
use crate::document::Document;
use crate::engine::batch::Batch;
use crate::engine::inverted::InvertedIndex;
use crate::engine::mapping::IndexMapping;
use crate::engine::scoring::Bm25;
use crate::engine::search::{SearchRequest, SearchResults};
use crate::engine::segment::{
    SegmentData, SegmentDocument, SegmentField, list_segments, read_segment, remove_temp_files,
    write_segment,
};
use crate::engine::{CommitInfo, FullTextIndex, IndexEngine, IndexStats};
use crate::error::{IndexerError, Result};

/// Engine that stores each index as a directory of segment files.
#[derive(Debug, Clone, Default)]
pub struct FileEngine {
    bm25: Bm25,
}

impl FileEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndexEngine for FileEngine {
    fn open(&self, path: &Path) -> Result<Arc<dyn FullTextIndex>> {
        Ok(Arc::new(FileIndex::open(path, self.bm25)?))
    }

    fn create(&self, path: &Path, mapping: &IndexMapping) -> Result<Arc<dyn FullTextIndex>> {
        Ok(Arc::new(FileIndex::create(path, mapping.clone(), self.bm25)?))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[derive(Debug, Default)]
struct IndexState {
    inverted: InvertedIndex,
    commit_count: u64,
    last_commit_ms: Option<i64>,
}

/// A single index directory.
pub struct FileIndex {
    path: PathBuf,
    mapping: Arc<IndexMapping>,
    analyzers: AHashMap<String, Arc<dyn Analyzer>>,
    bm25: Bm25,
    state: RwLock<IndexState>,
    /// Next segment sequence number; also serializes segment writes.
    next_sequence: Mutex<u64>,
}

impl std::fmt::Debug for FileIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileIndex")
            .field("path", &self.path)
            .field("mapping", &self.mapping)
            .finish()
    }
}

impl FileIndex {
    /// Create a new index directory. Fails if the path already exists.
    pub fn create<P: AsRef<Path>>(path: P, mapping: IndexMapping, bm25: Bm25) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        mapping.validate()?;
        if path.exists() {
            return Err(IndexerError::storage(format!(
                "Cannot create index at {}: path already exists",
                path.display()
            )));
        }

        fs::create_dir_all(&path)?;
        mapping.save(&path)?;
        debug!("Created index at {}", path.display());

        Self::from_parts(path, mapping, bm25, IndexState::default(), 1)
    }

    /// Open an existing index directory and replay its segments.
    pub fn open<P: AsRef<Path>>(path: P, bm25: Bm25) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(IndexerError::storage(format!(
                "No index at {}",
                path.display()
            )));
        }

        let mapping = IndexMapping::load(&path)?;
        remove_temp_files(&path)?;

        let mut state = IndexState::default();
        let mut next_sequence = 1;
        for (sequence, segment_path) in list_segments(&path)? {
            let segment = read_segment(&segment_path)?;
            if segment.sequence != sequence {
                return Err(IndexerError::storage(format!(
                    "{} claims sequence {}",
                    segment_path.display(),
                    segment.sequence
                )));
            }
            state.inverted.apply_segment(&segment);
            state.commit_count += 1;
            state.last_commit_ms = Some(segment.committed_at_ms);
            next_sequence = sequence + 1;
        }
        debug!(
            "Opened index at {} with {} segments and {} documents",
            path.display(),
            state.commit_count,
            state.inverted.document_count()
        );

        Self::from_parts(path, mapping, bm25, state, next_sequence)
    }

    fn from_parts(
        path: PathBuf,
        mapping: IndexMapping,
        bm25: Bm25,
        state: IndexState,
        next_sequence: u64,
    ) -> Result<Self> {
        let mut analyzers = AHashMap::new();
        for field in &mapping.fields {
            analyzers.insert(field.name.clone(), mapping.analyzer_for(&field.name)?);
        }

        Ok(FileIndex {
            path,
            mapping: Arc::new(mapping),
            analyzers,
            bm25,
            state: RwLock::new(state),
            next_sequence: Mutex::new(next_sequence),
        })
    }

    /// Directory the index lives in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn analyzer(&self, field: &str) -> Result<Arc<dyn Analyzer>> {
        match self.analyzers.get(field) {
            Some(analyzer) => Ok(Arc::clone(analyzer)),
            None => self.mapping.analyzer_for(field),
        }
    }

    fn analyze_document(&self, doc: &Document) -> Result<SegmentDocument> {
        let mut fields = Vec::with_capacity(doc.fields().len());
        for (name, text) in doc.fields() {
            let terms = self.analyzer(name)?.terms(text)?;
            let mut counts: AHashMap<String, u32> = AHashMap::new();
            for term in &terms {
                *counts.entry(term.clone()).or_insert(0) += 1;
            }
            let mut terms_with_freq: Vec<(String, u32)> = counts.into_iter().collect();
            terms_with_freq.sort_unstable();

            fields.push(SegmentField {
                name: name.clone(),
                length: terms.len() as u32,
                terms: terms_with_freq,
                stored: self.mapping.is_stored(name).then(|| text.clone()),
            });
        }
        Ok(SegmentDocument {
            id: doc.id(),
            fields,
        })
    }
}

fn millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

impl FullTextIndex for FileIndex {
    fn mapping(&self) -> &IndexMapping {
        &self.mapping
    }

    fn new_batch(&self) -> Batch {
        Batch::new(Arc::clone(&self.mapping))
    }

    fn commit(&self, batch: Batch) -> Result<CommitInfo> {
        let documents = batch
            .documents()
            .iter()
            .map(|doc| self.analyze_document(doc))
            .collect::<Result<Vec<_>>>()?;
        let count = documents.len();

        let mut next_sequence = self.next_sequence.lock();
        let segment = SegmentData {
            sequence: *next_sequence,
            committed_at_ms: Utc::now().timestamp_millis(),
            documents,
        };
        write_segment(&self.path, &segment)?;
        *next_sequence += 1;

        let mut state = self.state.write();
        state.inverted.apply_segment(&segment);
        state.commit_count += 1;
        state.last_commit_ms = Some(segment.committed_at_ms);

        Ok(CommitInfo {
            segment: segment.sequence,
            documents: count,
        })
    }

    fn document_count(&self) -> Result<u64> {
        Ok(self.state.read().inverted.document_count())
    }

    fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        let field = request
            .field
            .as_deref()
            .unwrap_or(&self.mapping.default_field);
        if !self.mapping.accepts(field) {
            return Err(IndexerError::query(format!("Field '{field}' is not mapped")));
        }

        let terms = self.analyzer(field)?.terms(&request.query)?;
        let mut hits = self.state.read().inverted.search(field, &terms, &self.bm25);

        if let Some(min_score) = request.min_score {
            hits.retain(|hit| hit.score >= min_score);
        }
        let total_hits = hits.len() as u64;
        let max_score = hits.first().map(|hit| hit.score).unwrap_or(0.0);

        Ok(SearchResults {
            hits: hits
                .into_iter()
                .skip(request.offset)
                .take(request.limit)
                .collect(),
            total_hits,
            max_score,
        })
    }

    fn stats(&self) -> Result<IndexStats> {
        let state = self.state.read();
        Ok(IndexStats {
            document_count: state.inverted.document_count(),
            commit_count: state.commit_count,
            term_count: state.inverted.term_count(),
            last_commit_time: state.last_commit_ms.and_then(millis_to_datetime),
        })
    }
}
