//! Domain knowledge extracted for one query.

use serde::{Deserialize, Serialize};

/// Outcome of a knowledge extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum KnowledgeStatus {
    Ready,
    /// Corpus-level failure, carried verbatim from the listing or catalog
    Error(String),
}

/// Per-(query, corpus path) extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainKnowledge {
    pub query: String,
    pub corpus_path: String,
    /// Every critical catalog entry, whether or not the query seems to need it
    pub critical_sources: Vec<String>,
    pub response: String,
    pub status: KnowledgeStatus,
}

impl DomainKnowledge {
    pub fn new(
        query: impl Into<String>,
        corpus_path: impl Into<String>,
        critical_sources: Vec<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            corpus_path: corpus_path.into(),
            critical_sources,
            response: response.into(),
            status: KnowledgeStatus::Ready,
        }
    }

    pub fn error(
        query: impl Into<String>,
        corpus_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            corpus_path: corpus_path.into(),
            critical_sources: Vec::new(),
            response: String::new(),
            status: KnowledgeStatus::Error(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, KnowledgeStatus::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            KnowledgeStatus::Error(msg) => Some(msg),
            KnowledgeStatus::Ready => None,
        }
    }

    /// Critical sources the Librarian's reply never mentions (case-insensitive).
    pub fn unmentioned_critical_sources(&self) -> Vec<&str> {
        let response = self.response.to_lowercase();
        self.critical_sources
            .iter()
            .filter(|name| !response.contains(&name.to_lowercase()))
            .map(String::as_str)
            .collect()
    }
}
