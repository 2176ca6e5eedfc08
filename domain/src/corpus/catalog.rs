//! Catalog entity: the Librarian's inventory of a corpus.

use super::listing::{DirectoryListing, FileCategory};
use serde::{Deserialize, Serialize};

/// Outcome of a catalog build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum CatalogStatus {
    Ready,
    Error(String),
}

/// One cataloged corpus file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub format: String,
    pub category: FileCategory,
    /// Critical sources are incorporated into every knowledge extraction.
    pub is_critical: bool,
    pub summary: String,
    #[serde(default)]
    pub content_details: serde_json::Value,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, category: FileCategory) -> Self {
        let name = name.into();
        let format = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        Self {
            name,
            format,
            category,
            is_critical: false,
            summary: String::new(),
            content_details: serde_json::Value::Null,
        }
    }

    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

/// Structured inventory of one corpus path.
///
/// Immutable once built; the catalog cache hands out shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub corpus_path: String,
    pub entries: Vec<FileEntry>,
    pub relationships: Vec<String>,
    pub constraints: Vec<String>,
    pub usage_guidelines: Vec<String>,
    pub status: CatalogStatus,
    /// The Librarian's unparsed reply, kept when it could not be fully structured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl Catalog {
    pub fn new(corpus_path: impl Into<String>, entries: Vec<FileEntry>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            entries,
            relationships: Vec::new(),
            constraints: Vec::new(),
            usage_guidelines: Vec::new(),
            status: CatalogStatus::Ready,
            raw_response: None,
        }
    }

    /// An error catalog. Returned to callers but never cached.
    pub fn error(corpus_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: CatalogStatus::Error(message.into()),
            ..Self::new(corpus_path, Vec::new())
        }
    }

    /// Entries derived from the listing alone (no criticality known).
    pub fn from_listing(listing: &DirectoryListing) -> Self {
        let entries = listing
            .files
            .iter()
            .map(|f| FileEntry::new(&f.name, f.category))
            .collect();
        Self::new(&listing.directory_path, entries)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, CatalogStatus::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            CatalogStatus::Error(msg) => Some(msg),
            CatalogStatus::Ready => None,
        }
    }

    pub fn critical_entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter().filter(|e| e.is_critical)
    }

    pub fn entry(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Pretty JSON for embedding in prompts
    pub fn to_prompt_json(&self) -> String {
        if let Some(raw) = self.raw_response.as_ref().filter(|_| self.entries.is_empty()) {
            return raw.clone();
        }
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
