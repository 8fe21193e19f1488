//! Indexer error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during discovery and extraction.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a source file with tree-sitter
    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Ignore pattern file could not be compiled
    #[error("Invalid ignore pattern in {path}: {message}")]
    Pattern { path: PathBuf, message: String },

    /// Path not found
    #[error("Path not found: {0}")]
    NotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexerError::NotFound(PathBuf::from("/test/path"));
        assert!(err.to_string().contains("/test/path"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: IndexerError = io_err.into();
        assert!(matches!(err, IndexerError::Io(_)));
    }

    #[test]
    fn test_pattern_error_names_file() {
        let err = IndexerError::Pattern {
            path: PathBuf::from(".docignore"),
            message: "unclosed character class".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains(".docignore"));
        assert!(text.contains("unclosed"));
    }
}
