//! Document mapping: which fields exist and how each is analyzed.
//!
//! A mapping is fixed when a shard is created and written next to its
//! segments, so a reopened shard analyzes new documents and queries exactly
//! as it did before.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, DEFAULT_ANALYZER, analyzer_by_name};
use crate::error::{IndexerError, Result};

/// File name of the persisted mapping inside an index directory.
pub const MAPPING_FILE: &str = "mapping.json";

/// Name of the field document bodies are indexed under by default.
pub const DEFAULT_FIELD: &str = "body";

/// Mapping for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Field name.
    pub name: String,

    /// Analyzer override; the mapping's default analyzer is used when unset.
    #[serde(default)]
    pub analyzer: Option<String>,

    /// Whether the original text is kept and returned with search hits.
    #[serde(default)]
    pub store: bool,
}

impl FieldMapping {
    /// Create an analyzed, unstored field mapping.
    pub fn new<S: Into<String>>(name: S) -> Self {
        FieldMapping {
            name: name.into(),
            analyzer: None,
            store: false,
        }
    }

    /// Set the analyzer for this field.
    pub fn with_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    /// Set whether the field is stored.
    pub fn with_store(mut self, store: bool) -> Self {
        self.store = store;
        self
    }
}

/// Mapping for a whole index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMapping {
    /// Analyzer used by fields that do not name their own.
    pub default_analyzer: String,

    /// Field searched when a query does not name one.
    pub default_field: String,

    /// Declared fields.
    pub fields: Vec<FieldMapping>,

    /// Whether undeclared fields are accepted (analyzed with the default
    /// analyzer, not stored).
    #[serde(default)]
    pub dynamic: bool,
}

impl Default for IndexMapping {
    fn default() -> Self {
        IndexMapping {
            default_analyzer: DEFAULT_ANALYZER.to_string(),
            default_field: DEFAULT_FIELD.to_string(),
            fields: vec![FieldMapping::new(DEFAULT_FIELD)],
            dynamic: false,
        }
    }
}

impl IndexMapping {
    /// Set the default analyzer.
    pub fn with_default_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.default_analyzer = analyzer.into();
        self
    }

    /// Add or replace a field mapping.
    pub fn with_field(mut self, field: FieldMapping) -> Self {
        self.fields.retain(|f| f.name != field.name);
        self.fields.push(field);
        self
    }

    /// Allow undeclared fields.
    pub fn with_dynamic(mut self, dynamic: bool) -> Self {
        self.dynamic = dynamic;
        self
    }

    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether documents may carry this field.
    pub fn accepts(&self, name: &str) -> bool {
        self.dynamic || self.field(name).is_some()
    }

    /// Whether the text of this field is stored.
    pub fn is_stored(&self, name: &str) -> bool {
        self.field(name).map(|f| f.store).unwrap_or(false)
    }

    /// Name of the analyzer applied to a field.
    pub fn analyzer_name(&self, field: &str) -> &str {
        self.field(field)
            .and_then(|f| f.analyzer.as_deref())
            .unwrap_or(&self.default_analyzer)
    }

    /// Resolve the analyzer applied to a field.
    pub fn analyzer_for(&self, field: &str) -> Result<std::sync::Arc<dyn Analyzer>> {
        analyzer_by_name(self.analyzer_name(field))
    }

    /// Check that every analyzer resolves and field names are unique.
    pub fn validate(&self) -> Result<()> {
        analyzer_by_name(&self.default_analyzer)?;

        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(IndexerError::field("Field name cannot be empty"));
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(IndexerError::field(format!(
                    "Field '{}' is mapped more than once",
                    field.name
                )));
            }
            if let Some(analyzer) = &field.analyzer {
                analyzer_by_name(analyzer)?;
            }
        }

        if !self.accepts(&self.default_field) {
            return Err(IndexerError::field(format!(
                "Default field '{}' is not mapped",
                self.default_field
            )));
        }

        Ok(())
    }

    /// Read the mapping stored in an index directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MAPPING_FILE);
        if !path.exists() {
            return Err(IndexerError::storage(format!(
                "{} is not an index: {MAPPING_FILE} is missing",
                dir.display()
            )));
        }
        let contents = fs::read_to_string(&path)?;
        let mapping: Self = serde_json::from_str(&contents)?;
        mapping.validate()?;
        Ok(mapping)
    }

    /// Write the mapping into an index directory.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(MAPPING_FILE), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let mapping = IndexMapping::default();
        assert_eq!(mapping.default_field, "body");
        assert!(mapping.accepts("body"));
        assert!(!mapping.accepts("title"));
        assert!(!mapping.is_stored("body"));
        assert_eq!(mapping.analyzer_name("body"), "standard");
        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn test_field_overrides() {
        let mapping = IndexMapping::default()
            .with_field(FieldMapping::new("body").with_store(true))
            .with_field(FieldMapping::new("tags").with_analyzer("whitespace"));

        assert_eq!(mapping.fields.len(), 2);
        assert!(mapping.is_stored("body"));
        assert_eq!(mapping.analyzer_name("tags"), "whitespace");
        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn test_invalid_mappings() {
        let mapping = IndexMapping::default().with_default_analyzer("gojieba");
        assert!(matches!(
            mapping.validate(),
            Err(IndexerError::Analysis(_))
        ));

        let mut mapping = IndexMapping::default();
        mapping.default_field = "title".to_string();
        assert!(mapping.validate().is_err());
        assert!(mapping.clone().with_dynamic(true).validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mapping = IndexMapping::default().with_field(FieldMapping::new("title"));
        mapping.save(dir.path()).unwrap();

        let loaded = IndexMapping::load(dir.path()).unwrap();
        assert_eq!(loaded, mapping);
    }

    #[test]
    fn test_load_missing_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexMapping::load(dir.path()).unwrap_err();
        assert!(matches!(err, IndexerError::Storage(_)));
    }
}
