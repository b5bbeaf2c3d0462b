//! Error types for rmdrender-core.
//!
//! Every failure surfaces synchronously to the caller; there are no
//! retries and no degraded modes. A render either fully succeeds or
//! fails, though output files already written are not rolled back.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while rendering a document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A dependency record is malformed (empty or missing field).
    #[error("Invalid dependency '{name}': missing or empty {field}")]
    Validation {
        /// The dependency name ("<unnamed>" when the name itself is missing)
        name: String,
        /// The field that failed validation
        field: &'static str,
    },

    /// A dependency references a source path that does not exist on disk.
    #[error("Dependency '{name}' source path not found: {path}")]
    MissingAsset {
        /// The dependency name
        name: String,
        /// The missing path
        path: PathBuf,
    },

    /// No usable pandoc installation was found.
    #[error("pandoc{} was not found. Install it from https://pandoc.org/installing.html or set RMDRENDER_PANDOC", min_version_suffix(.min_version))]
    PandocNotFound {
        /// Minimum version required, if the caller asked for one
        min_version: Option<String>,
    },

    /// Inputs span multiple directories and no working directory was given.
    #[error("Inputs span multiple directories ({dirs}); specify an explicit working directory")]
    AmbiguousInput {
        /// Display list of the conflicting directories
        dirs: String,
    },

    /// The converter exited with a nonzero status.
    #[error("pandoc document conversion failed with error {code}")]
    Conversion {
        /// The converter's exit code
        code: i32,
        /// Captured stderr, when the invocation ran quiet
        stderr: String,
    },

    /// Options that cannot be combined in one render.
    #[error("Incompatible options: {0}")]
    IncompatibleOptions(String),

    /// IO error during rendering.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed dependency metadata JSON.
    #[error("Invalid dependency metadata: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

fn min_version_suffix(min_version: &Option<String>) -> String {
    match min_version {
        Some(v) => format!(" >= {}", v),
        None => String::new(),
    }
}

impl RenderError {
    /// Create a validation error for a dependency field.
    pub fn validation(name: impl Into<String>, field: &'static str) -> Self {
        Self::Validation {
            name: name.into(),
            field,
        }
    }

    /// Create a missing-asset error.
    pub fn missing_asset(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingAsset {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create an incompatible-options error.
    pub fn incompatible(msg: impl Into<String>) -> Self {
        Self::IncompatibleOptions(msg.into())
    }

    /// Create an error from any message.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pandoc_not_found_message() {
        let err = RenderError::PandocNotFound {
            min_version: Some("1.12.3".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains(">= 1.12.3"));
        assert!(msg.contains("RMDRENDER_PANDOC"));

        let bare = RenderError::PandocNotFound { min_version: None };
        assert!(!bare.to_string().contains(">="));
    }

    #[test]
    fn test_conversion_message_includes_code() {
        let err = RenderError::Conversion {
            code: 64,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("64"));
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = RenderError::validation("jquery", "version");
        assert!(err.to_string().contains("jquery"));
        assert!(err.to_string().contains("version"));
    }
}
