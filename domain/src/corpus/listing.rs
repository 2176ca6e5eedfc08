//! Directory listing value objects.
//!
//! The listing is computed once per catalog build and handed to the Librarian
//! so it never has to explore the corpus (and hallucinate files) by itself.

use serde::{Deserialize, Serialize};

/// Classification of a corpus file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Data,
    Documentation,
    Code,
    #[default]
    Other,
}

impl FileCategory {
    /// Classify by extension (with or without the leading dot, any case).
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "json" | "parquet" | "xlsx" => FileCategory::Data,
            "md" | "txt" | "pdf" | "doc" | "docx" => FileCategory::Documentation,
            "py" | "ipynb" | "r" | "sql" => FileCategory::Code,
            _ => FileCategory::Other,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileCategory::Data => "data",
            FileCategory::Documentation => "documentation",
            FileCategory::Code => "code",
            FileCategory::Other => "other",
        }
    }
}

impl std::str::FromStr for FileCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "data" => FileCategory::Data,
            "documentation" | "docs" => FileCategory::Documentation,
            "code" => FileCategory::Code,
            _ => FileCategory::Other,
        })
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A regular file found in the corpus directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedFile {
    pub name: String,
    pub path: String,
    pub size_bytes: u64,
    /// Lower-cased extension including the dot (e.g. `.csv`), empty if none
    pub extension: String,
    pub category: FileCategory,
}

impl ListedFile {
    pub fn new(name: impl Into<String>, path: impl Into<String>, size_bytes: u64) -> Self {
        let name = name.into();
        let extension = name
            .rfind('.')
            .filter(|&i| i > 0)
            .map(|i| name[i..].to_ascii_lowercase())
            .unwrap_or_default();
        let category = FileCategory::from_extension(&extension);
        Self {
            name,
            path: path.into(),
            size_bytes,
            extension,
            category,
        }
    }
}

/// A sub-directory found in the corpus directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedDirectory {
    pub name: String,
    pub path: String,
}

/// Snapshot of one corpus directory (not recursive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub directory_path: String,
    pub total_files: usize,
    pub total_directories: usize,
    pub files: Vec<ListedFile>,
    pub directories: Vec<ListedDirectory>,
    /// `"success"` or an error description containing "Error"
    pub status: String,
}

impl DirectoryListing {
    /// Build a successful listing; entries are sorted by name.
    pub fn success(
        directory_path: impl Into<String>,
        mut files: Vec<ListedFile>,
        mut directories: Vec<ListedDirectory>,
    ) -> Self {
        files.sort_by(|a, b| a.name.cmp(&b.name));
        directories.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            directory_path: directory_path.into(),
            total_files: files.len(),
            total_directories: directories.len(),
            files,
            directories,
            status: "success".to_string(),
        }
    }

    pub fn missing(directory_path: impl Into<String>) -> Self {
        let path = directory_path.into();
        let status = format!("Error. Directory does not exist: {path}");
        Self::error(path, status)
    }

    pub fn unreadable(directory_path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let path = directory_path.into();
        let status = format!("Error. Cannot read directory {path}: {reason}");
        Self::error(path, status)
    }

    fn error(directory_path: String, status: String) -> Self {
        Self {
            directory_path,
            total_files: 0,
            total_directories: 0,
            files: Vec::new(),
            directories: Vec::new(),
            status,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status.to_ascii_lowercase().contains("error")
    }

    /// Pretty JSON for embedding in prompts
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.status.clone())
    }
}
