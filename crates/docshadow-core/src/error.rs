//! Core error types for docShadow.

use docshadow_indexer::IndexerError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a docShadow operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No git work tree at the project root
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Explicitly requested commit does not resolve
    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    /// git failed or produced unexpected output
    #[error("Git error: {0}")]
    Git(String),

    /// `docshadow.config.json` is missing
    #[error("docShadow not initialized in {0}")]
    NotInitialized(PathBuf),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An artifact could not be written
    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Discovery failed
    #[error(transparent)]
    Indexer(#[from] IndexerError),

    /// Worker task panicked or was aborted
    #[error("Worker task failed: {0}")]
    Task(String),

    /// Run cancelled before completion
    #[error("Snapshot cancelled")]
    Cancelled,

    /// Run exceeded its deadline
    #[error("Snapshot deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}
