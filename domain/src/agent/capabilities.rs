//! Read-only capability filter for the code sandbox
//!
//! The sandbox receives an [`ExecutionCapabilities`] value at setup time and
//! enforces it on every `open`, every import and the blocked dynamic-execution
//! builtins. All rule data travels in the value itself; the checks here are
//! the semantics the sandbox must reproduce.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Modules agent code may import besides the standard prelude
pub const AUTHORIZED_IMPORTS: &[&str] = &["numpy", "pandas", "json", "csv", "glob", "markdown", "os"];

/// Standard-library modules always importable
pub const BASE_IMPORTS: &[&str] = &[
    "collections",
    "datetime",
    "itertools",
    "math",
    "queue",
    "random",
    "re",
    "stat",
    "statistics",
    "time",
    "unicodedata",
];

/// Builtins that would let agent code escape the filter
pub const BLOCKED_OPERATIONS: &[&str] = &["exec", "eval", "compile"];

/// Mode characters that request write access
const WRITE_MODE_CHARS: &str = "wax+";

/// A request the capability filter rejects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityViolation {
    #[error("Only read mode ('r', 'rb', 'rt') is allowed, got '{0}'")]
    WriteMode(String),

    #[error("Operation '{0}' is not allowed in read-only mode")]
    BlockedOperation(String),
}

/// Capabilities granted to sandboxed agent code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionCapabilities {
    pub read_only: bool,
    /// Any of these in an `open` mode is a violation under `read_only`
    pub denied_mode_chars: String,
    pub blocked_operations: Vec<String>,
    /// Shown to the model and importable
    pub authorized_imports: Vec<String>,
    /// Importable without being advertised
    pub base_imports: Vec<String>,
}

impl Default for ExecutionCapabilities {
    fn default() -> Self {
        Self::read_only()
    }
}

impl ExecutionCapabilities {
    /// Read-only file access, no dynamic execution, the standard import list
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            denied_mode_chars: WRITE_MODE_CHARS.to_string(),
            blocked_operations: BLOCKED_OPERATIONS.iter().map(|s| s.to_string()).collect(),
            authorized_imports: AUTHORIZED_IMPORTS.iter().map(|s| s.to_string()).collect(),
            base_imports: BASE_IMPORTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// `open` is allowed iff the mode reads and never writes, appends,
    /// creates or updates.
    pub fn check_open_mode(&self, mode: &str) -> Result<(), CapabilityViolation> {
        if !self.read_only {
            return Ok(());
        }
        if mode.contains('r') && !mode.chars().any(|c| self.denied_mode_chars.contains(c)) {
            Ok(())
        } else {
            Err(CapabilityViolation::WriteMode(mode.to_string()))
        }
    }

    pub fn check_operation(&self, name: &str) -> Result<(), CapabilityViolation> {
        if self.blocked_operations.iter().any(|op| op == name) {
            Err(CapabilityViolation::BlockedOperation(name.to_string()))
        } else {
            Ok(())
        }
    }

    /// Whether the top-level package of `module` may be imported
    pub fn is_import_authorized(&self, module: &str) -> bool {
        let root = module.split('.').next().unwrap_or(module);
        self.authorized_imports
            .iter()
            .chain(&self.base_imports)
            .any(|m| m == root)
    }

    /// Import list as shown to the model
    pub fn imports_display(&self) -> String {
        self.authorized_imports.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_modes_allowed() {
        let caps = ExecutionCapabilities::read_only();
        for mode in ["r", "rb", "rt"] {
            assert!(caps.check_open_mode(mode).is_ok(), "{mode}");
        }
    }

    #[test]
    fn test_write_modes_denied() {
        let caps = ExecutionCapabilities::read_only();
        for mode in ["w", "wb", "a", "x", "r+", "rb+", "", "b"] {
            assert_eq!(
                caps.check_open_mode(mode),
                Err(CapabilityViolation::WriteMode(mode.to_string())),
                "{mode}"
            );
        }
    }

    #[test]
    fn test_dynamic_execution_blocked() {
        let caps = ExecutionCapabilities::read_only();
        for op in ["exec", "eval", "compile"] {
            let err = caps.check_operation(op).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Operation '{op}' is not allowed in read-only mode")
            );
        }
        assert!(caps.check_operation("print").is_ok());
    }

    #[test]
    fn test_submodule_imports() {
        let caps = ExecutionCapabilities::read_only();
        assert!(caps.is_import_authorized("pandas"));
        assert!(caps.is_import_authorized("os.path"));
        assert!(!caps.is_import_authorized("subprocess"));
    }

    #[test]
    fn test_base_imports_are_not_advertised() {
        let caps = ExecutionCapabilities::read_only();
        assert!(caps.is_import_authorized("math"));
        assert!(caps.is_import_authorized("collections.abc"));
        assert!(!caps.imports_display().contains("math"));
    }

    #[test]
    fn test_rules_travel_in_serialized_form() {
        let json = serde_json::to_value(ExecutionCapabilities::read_only()).unwrap();
        assert_eq!(json["denied_mode_chars"], "wax+");
        assert_eq!(json["blocked_operations"][1], "eval");
        assert_eq!(json["base_imports"].as_array().unwrap().len(), BASE_IMPORTS.len());
    }
}
