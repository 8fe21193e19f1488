//! `.docignore` pattern matching.

use crate::IndexerError;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;
use tracing::{debug, warn};

/// Compiled gitignore-style exclusion rules.
///
/// Patterns are evaluated in declaration order and the last matching pattern
/// decides: a plain pattern excludes, a `!` pattern re-includes. A path is also
/// excluded when one of its parent directories matches a directory pattern
/// such as `build/` and nothing later re-includes the path itself.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    rules: Gitignore,
}

impl IgnoreMatcher {
    /// A matcher that excludes nothing.
    pub fn empty() -> Self {
        Self {
            rules: Gitignore::empty(),
        }
    }

    /// Compile pattern lines relative to `root`.
    ///
    /// Blank lines and `#` comments are skipped. The first malformed pattern
    /// fails the whole compilation.
    pub fn from_lines<I, S>(root: &Path, lines: I) -> Result<Self, IndexerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new(root);
        for line in lines {
            builder
                .add_line(None, line.as_ref())
                .map_err(|e| IndexerError::Pattern {
                    path: root.to_path_buf(),
                    message: e.to_string(),
                })?;
        }

        let rules = builder.build().map_err(|e| IndexerError::Pattern {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(patterns = rules.len(), "Compiled ignore patterns");

        Ok(Self { rules })
    }

    /// Read and compile the pattern file at `root/file_name`.
    ///
    /// A missing file yields [`IgnoreMatcher::empty`]. Read, decode or pattern
    /// errors are returned so the caller can decide how to degrade.
    pub fn from_file(root: &Path, file_name: &str) -> Result<Self, IndexerError> {
        let path = root.join(file_name);
        if !path.exists() {
            return Ok(Self::empty());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_lines(root, content.lines()).map_err(|e| match e {
            IndexerError::Pattern { message, .. } => IndexerError::Pattern { path, message },
            other => other,
        })
    }

    /// Load the pattern file, degrading to "exclude nothing" with a warning
    /// when it cannot be read or compiled.
    pub fn load(root: &Path, file_name: &str) -> Self {
        match Self::from_file(root, file_name) {
            Ok(matcher) => matcher,
            Err(e) => {
                warn!(file = %file_name, error = %e, "Could not load ignore file, excluding nothing");
                Self::empty()
            }
        }
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no patterns were compiled.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a file path relative to the project root is excluded.
    pub fn is_excluded(&self, relative_path: &Path) -> bool {
        if self.rules.is_empty() || relative_path.has_root() {
            return false;
        }
        self.rules
            .matched_path_or_any_parents(relative_path, false)
            .is_ignore()
    }
}

impl Default for IgnoreMatcher {
    fn default() -> Self {
        Self::empty()
    }
}
