//! Local file system directory lister
//!
//! Provides [`LocalDirectoryLister`], the [`DirectoryLister`] used to
//! snapshot a corpus directory before the Librarian catalogs it. Only the
//! top level is listed; sub-directories are reported by name.
//!
//! # Example
//!
//! ```
//! use triad_application::DirectoryLister;
//! use triad_infrastructure::LocalDirectoryLister;
//! use std::path::Path;
//!
//! let listing = LocalDirectoryLister::new().list(Path::new("/definitely/not/here"));
//! assert!(listing.is_error());
//! ```

use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use triad_application::DirectoryLister;
use triad_domain::{DirectoryListing, ListedDirectory, ListedFile};

/// Directory lister that reads from the local file system.
#[derive(Debug, Clone, Default)]
pub struct LocalDirectoryLister;

impl LocalDirectoryLister {
    pub fn new() -> Self {
        Self
    }
}

impl DirectoryLister for LocalDirectoryLister {
    fn list(&self, path: &Path) -> DirectoryListing {
        let dir_display = path.display().to_string();
        if !path.is_dir() {
            warn!("Corpus directory does not exist: {}", dir_display);
            return DirectoryListing::missing(dir_display);
        }

        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot read corpus directory {}: {}", dir_display, e);
                return DirectoryListing::unreadable(dir_display, e);
            }
        };

        let mut files = Vec::new();
        let mut directories = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let entry_path = entry.path().display().to_string();
            let Ok(metadata) = entry.metadata() else {
                debug!("Skipping {}: metadata unavailable", entry_path);
                continue;
            };
            if metadata.is_dir() {
                directories.push(ListedDirectory {
                    name,
                    path: entry_path,
                });
            } else if metadata.is_file() {
                files.push(ListedFile::new(name, entry_path, metadata.len()));
            }
        }

        debug!(
            "Listed {}: {} files, {} directories",
            dir_display,
            files.len(),
            directories.len()
        );
        DirectoryListing::success(dir_display, files, directories)
    }
}
