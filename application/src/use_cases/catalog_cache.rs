//! Catalog cache
//!
//! Memoizes the Librarian's corpus exploration per corpus path. The decision
//! to build or reuse is serialized per path: each path owns an async slot
//! lock that is held for the whole build, so concurrent callers for the same
//! path wait for the first build and then read its result.
//!
//! An error catalog is returned to the caller but never stored, so the next
//! call tries again.

use crate::ports::directory_lister::DirectoryLister;
use crate::ports::role_agent::{AgentRunError, RoleAgent};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use triad_domain::{AgentRole, Catalog, RolePromptTemplate, parse_catalog};

type Slot = Arc<tokio::sync::Mutex<Option<Arc<Catalog>>>>;

pub struct CatalogCache {
    agent: Arc<dyn RoleAgent>,
    lister: Arc<dyn DirectoryLister>,
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl CatalogCache {
    pub fn new(agent: Arc<dyn RoleAgent>, lister: Arc<dyn DirectoryLister>) -> Self {
        Self {
            agent,
            lister,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, corpus_path: &Path) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(corpus_path.to_path_buf()).or_default())
    }

    /// Cached catalog for `corpus_path`, if one is stored and no build holds the slot
    pub fn get(&self, corpus_path: &Path) -> Option<Arc<Catalog>> {
        let slot = self.slot(corpus_path);
        let guard = slot.try_lock().ok()?;
        guard.clone()
    }

    /// Drop the stored catalog so the next lookup rebuilds it
    pub async fn invalidate(&self, corpus_path: &Path) {
        let slot = self.slot(corpus_path);
        slot.lock().await.take();
    }

    /// Return the stored catalog, or build and store one.
    ///
    /// `force_refresh` always builds and replaces the stored value. Only a
    /// cancelled Librarian run is an `Err`; every other failure comes back as
    /// an error catalog.
    pub async fn get_or_build(
        &self,
        corpus_path: &Path,
        force_refresh: bool,
    ) -> Result<Arc<Catalog>, AgentRunError> {
        let slot = self.slot(corpus_path);
        let mut guard = slot.lock().await;

        if !force_refresh && let Some(catalog) = guard.as_ref() {
            debug!("Using cached catalog for {}", corpus_path.display());
            return Ok(Arc::clone(catalog));
        }

        let catalog = Arc::new(self.build(corpus_path).await?);
        if catalog.is_error() {
            warn!(
                "Catalog for {} not cached: {}",
                corpus_path.display(),
                catalog.error_message().unwrap_or_default()
            );
        } else {
            info!(
                "Catalog cached for {} ({} entries)",
                corpus_path.display(),
                catalog.entries.len()
            );
            *guard = Some(Arc::clone(&catalog));
        }
        Ok(catalog)
    }

    async fn build(&self, corpus_path: &Path) -> Result<Catalog, AgentRunError> {
        let path = corpus_path.display().to_string();
        let listing = self.lister.list(corpus_path);
        if listing.is_error() {
            warn!("Directory error: {}", listing.status);
            return Ok(Catalog::error(path, listing.status));
        }

        info!(
            "Librarian cataloging {} ({} files)",
            path, listing.total_files
        );
        let request = RolePromptTemplate::catalog_request(&listing);
        match self.agent.run(AgentRole::Librarian, &request).await {
            Ok(response) => Ok(parse_catalog(&listing, &response)),
            Err(AgentRunError::Cancelled) => Err(AgentRunError::Cancelled),
            Err(e) => Ok(Catalog::error(path, format!("Librarian failed: {e}"))),
        }
    }
}
