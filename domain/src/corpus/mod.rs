//! Corpus domain module
//!
//! Everything the Librarian learns about the evidence corpus:
//!
//! - [`listing::DirectoryListing`]: the deterministic, pre-computed file listing
//! - [`catalog::Catalog`]: the model-built inventory with criticality flags
//! - [`knowledge::DomainKnowledge`]: per-query extraction derived from a catalog

pub mod catalog;
pub mod catalog_parser;
pub mod knowledge;
pub mod listing;

pub use catalog::{Catalog, CatalogStatus, FileEntry};
pub use catalog_parser::parse_catalog;
pub use knowledge::{DomainKnowledge, KnowledgeStatus};
pub use listing::{DirectoryListing, FileCategory, ListedDirectory, ListedFile};
