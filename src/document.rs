//! Documents handed to a shard's full-text index.
//!
//! Identifiers are assigned by the indexing worker: a document's id is its
//! ordinal position within the slice its shard received. Ids are therefore
//! only unique per shard; `(shard, id)` names a document across the set.

use serde::{Deserialize, Serialize};

/// Identifier of a document within one shard.
pub type DocId = u64;

/// A document: an id plus named text fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: DocId,
    fields: Vec<(String, String)>,
}

impl Document {
    /// Create an empty document with the given id.
    pub fn new(id: DocId) -> Self {
        Document {
            id,
            fields: Vec::new(),
        }
    }

    /// Add a text field, returning the document.
    pub fn with_field<S: Into<String>, T: Into<String>>(mut self, name: S, text: T) -> Self {
        self.add_field(name, text);
        self
    }

    /// Add a text field.
    ///
    /// A field added twice keeps the last value.
    pub fn add_field<S: Into<String>, T: Into<String>>(&mut self, name: S, text: T) {
        let name = name.into();
        let text = text.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, value)) => *value = text,
            None => self.fields.push((name, text)),
        }
    }

    pub fn id(&self) -> DocId {
        self.id
    }

    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_fields() {
        let doc = Document::new(7)
            .with_field("body", "first")
            .with_field("title", "t")
            .with_field("body", "second");

        assert_eq!(doc.id(), 7);
        assert_eq!(doc.fields().len(), 2);
        assert_eq!(doc.get_field("body"), Some("second"));
        assert_eq!(doc.get_field("missing"), None);
        assert!(!doc.is_empty());
    }
}
