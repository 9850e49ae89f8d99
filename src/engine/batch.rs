//! Pending insert operations for one index.

use std::sync::Arc;

use crate::document::{DocId, Document};
use crate::engine::mapping::IndexMapping;
use crate::error::{IndexerError, Result};

/// An ordered group of insert operations committed as one bulk write.
///
/// Fields are checked against the index mapping as they are added, so a
/// document the index cannot accept is rejected before it reaches a commit.
#[derive(Debug, Clone)]
pub struct Batch {
    mapping: Arc<IndexMapping>,
    documents: Vec<Document>,
}

impl Batch {
    /// Create an empty batch for an index with the given mapping.
    pub fn new(mapping: Arc<IndexMapping>) -> Self {
        Batch {
            mapping,
            documents: Vec::new(),
        }
    }

    /// Queue a document for insertion.
    ///
    /// Indexing an id that already exists in the index replaces the earlier
    /// document once the batch is committed.
    pub fn index<I, S, T>(&mut self, id: DocId, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut doc = Document::new(id);
        for (name, text) in fields {
            let name = name.into();
            if !self.mapping.accepts(&name) {
                return Err(IndexerError::field(format!(
                    "Field '{name}' is not mapped for document {id}"
                )));
            }
            doc.add_field(name, text);
        }
        if doc.is_empty() {
            return Err(IndexerError::field(format!("Document {id} has no fields")));
        }

        self.documents.push(doc);
        Ok(())
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}
