//! Source file discovery.
//!
//! Walks the project tree, keeps Python sources and filters them through the
//! project's `.docignore` rules.

mod docignore;
mod walker;

pub use docignore::IgnoreMatcher;
pub use walker::{FileEntry, Walker};

use crate::IndexerError;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// File extension of the source language being documented.
pub const SOURCE_EXTENSION: &str = "py";

/// Options for scanning a project.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Whether to follow symlinks
    pub follow_symlinks: bool,
    /// Number of walker threads (0 = automatic)
    pub threads: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            threads: 0,
        }
    }
}

/// Result of scanning a project.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Root path that was scanned
    pub root: PathBuf,
    /// Included source files, relative to root, `/`-separated, lexically sorted
    pub files: Vec<String>,
    /// Source files dropped by ignore rules
    pub ignored_count: usize,
    /// Scan duration in milliseconds
    pub duration_ms: u64,
}

/// Discovers the source files a snapshot documents.
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    /// Create a new scanner with default options.
    pub fn new() -> Self {
        Self {
            options: ScanOptions::default(),
        }
    }

    /// Create a scanner with custom options.
    pub fn with_options(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Scan `root` and return every included source file.
    pub fn scan(&self, root: &Path, matcher: &IgnoreMatcher) -> Result<ScanResult, IndexerError> {
        let start = Instant::now();

        info!(path = ?root, "Starting scan");

        let walker =
            Walker::new(root, self.options.follow_symlinks).threads(self.options.threads);
        let entries = walker.walk()?;

        debug!(count = entries.len(), "Files discovered");

        let mut files = Vec::new();
        let mut ignored_count = 0;

        for entry in entries {
            if !is_source_file(&entry.path) {
                continue;
            }

            let Ok(relative) = entry.path.strip_prefix(root) else {
                continue;
            };

            if matcher.is_excluded(relative) {
                debug!(path = ?relative, "Excluded by ignore rules");
                ignored_count += 1;
                continue;
            }

            files.push(to_slash_path(relative));
        }

        files.sort();
        files.dedup();

        let duration = start.elapsed();

        info!(
            files = files.len(),
            ignored = ignored_count,
            duration_ms = duration.as_millis(),
            "Scan complete"
        );

        Ok(ScanResult {
            root: root.to_path_buf(),
            files,
            ignored_count,
            duration_ms: duration.as_millis() as u64,
        })
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a path carries the source-language extension.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == SOURCE_EXTENSION)
        .unwrap_or(false)
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
