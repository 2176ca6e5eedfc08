//! Directory listing port

use std::path::Path;
use triad_domain::DirectoryListing;

/// Port for pre-reading a corpus directory.
///
/// Listing failures are reported in the listing's status, never as errors.
pub trait DirectoryLister: Send + Sync {
    fn list(&self, path: &Path) -> DirectoryListing;
}
