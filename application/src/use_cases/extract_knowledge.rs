//! Domain knowledge extraction
//!
//! Asks the Librarian for query-specific knowledge on top of the cached
//! catalog. Every critical catalog entry is named in the request and recorded
//! in the result, whatever the query.

use super::catalog_cache::CatalogCache;
use crate::ports::directory_lister::DirectoryLister;
use crate::ports::role_agent::{AgentRunError, RoleAgent};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use triad_domain::{AgentRole, Catalog, DomainKnowledge, RolePromptTemplate};

pub struct KnowledgeExtractor {
    agent: Arc<dyn RoleAgent>,
    lister: Arc<dyn DirectoryLister>,
    catalogs: Arc<CatalogCache>,
}

impl KnowledgeExtractor {
    pub fn new(
        agent: Arc<dyn RoleAgent>,
        lister: Arc<dyn DirectoryLister>,
        catalogs: Arc<CatalogCache>,
    ) -> Self {
        Self {
            agent,
            lister,
            catalogs,
        }
    }

    /// Extract knowledge for `query`, resolving the catalog through the cache
    /// when none is supplied.
    ///
    /// Corpus problems (missing directory, error catalog) come back as an
    /// error-status [`DomainKnowledge`]; only Librarian failures are `Err`.
    pub async fn extract(
        &self,
        query: &str,
        corpus_path: &Path,
        catalog: Option<Arc<Catalog>>,
    ) -> Result<DomainKnowledge, AgentRunError> {
        let path = corpus_path.display().to_string();
        let catalog = match catalog {
            Some(catalog) => catalog,
            None => self.catalogs.get_or_build(corpus_path, false).await?,
        };

        if let Some(message) = catalog.error_message() {
            warn!("Cannot extract domain knowledge: {}", message);
            return Ok(DomainKnowledge::error(query, path, message));
        }

        let listing = self.lister.list(corpus_path);
        if listing.is_error() {
            warn!("Directory error: {}", listing.status);
            return Ok(DomainKnowledge::error(query, path, listing.status));
        }

        let critical: Vec<String> = catalog.critical_entries().map(|e| e.name.clone()).collect();
        info!(
            "Librarian extracting domain knowledge ({} critical sources)",
            critical.len()
        );

        let request = RolePromptTemplate::knowledge_request(query, &listing, &catalog);
        let response = self.agent.run(AgentRole::Librarian, &request).await?;

        let knowledge = DomainKnowledge::new(query, path, critical, response);
        for name in knowledge.unmentioned_critical_sources() {
            warn!("Librarian reply does not mention critical source {}", name);
        }
        Ok(knowledge)
    }
}
