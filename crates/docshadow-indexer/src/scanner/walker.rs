//! File system walker that prunes hidden directories.

use crate::IndexerError;
use ignore::{DirEntry, WalkBuilder, WalkState};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::debug;

/// A discovered file entry.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
}

/// File system walker.
///
/// Directories whose name starts with `.` are pruned before descending, which
/// also keeps `.git` and the snapshot output directory out of the walk. Hidden
/// files themselves are still reported. No ignore files are consulted here;
/// exclusion rules are applied by the caller.
pub struct Walker {
    root: PathBuf,
    follow_symlinks: bool,
    threads: usize,
}

impl Walker {
    /// Create a new walker for the given root directory.
    pub fn new(root: &Path, follow_symlinks: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            follow_symlinks,
            threads: 0,
        }
    }

    /// Set the number of walker threads (0 lets the walker choose).
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Walk the directory tree and return all discovered files.
    pub fn walk(&self) -> Result<Vec<FileEntry>, IndexerError> {
        if !self.root.is_dir() {
            return Err(IndexerError::NotFound(self.root.clone()));
        }

        let (tx, rx) = mpsc::channel();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(self.follow_symlinks)
            .threads(self.threads)
            .filter_entry(|entry| !is_hidden_dir(entry))
            .build_parallel();

        walker.run(|| {
            let tx = tx.clone();
            Box::new(move |result| {
                match result {
                    Ok(entry) => {
                        // Only process files, not directories
                        if entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                            let _ = tx.send(FileEntry {
                                path: entry.path().to_path_buf(),
                            });
                        }
                    }
                    Err(e) => {
                        // Unreadable entries are skipped, not fatal
                        debug!(error = %e, "Walk error");
                    }
                }
                WalkState::Continue
            })
        });

        // Drop the original sender so the receiver knows when we're done
        drop(tx);

        let mut entries: Vec<FileEntry> = rx.into_iter().collect();

        // Sort by path for deterministic ordering
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }
}

/// Hidden directory below the walk root. The root itself is never pruned.
fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false)
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn names(entries: &[FileEntry]) -> Vec<String> {
        entries
            .iter()
            .filter_map(|e| e.path.file_name().and_then(|n| n.to_str()))
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_walker_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let walker = Walker::new(temp_dir.path(), false);

        let entries = walker.walk().unwrap();
        assert_eq!(entries.len(), 0);
    }

    #[test]
    fn test_walker_missing_root() {
        let temp_dir = tempdir().unwrap();
        let walker = Walker::new(&temp_dir.path().join("nope"), false);

        assert!(matches!(walker.walk(), Err(IndexerError::NotFound(_))));
    }

    #[test]
    fn test_walker_prunes_hidden_directories() {
        let temp_dir = tempdir().unwrap();

        fs::create_dir_all(temp_dir.path().join(".git/objects")).unwrap();
        fs::create_dir_all(temp_dir.path().join(".docshadow")).unwrap();
        File::create(temp_dir.path().join(".git/objects/blob.py")).unwrap();
        File::create(temp_dir.path().join(".docshadow/a.py.json")).unwrap();
        File::create(temp_dir.path().join("a.py")).unwrap();

        let walker = Walker::new(temp_dir.path(), false);
        let entries = walker.walk().unwrap();

        assert_eq!(names(&entries), vec!["a.py"]);
    }

    #[test]
    fn test_walker_keeps_hidden_files() {
        let temp_dir = tempdir().unwrap();

        File::create(temp_dir.path().join("visible.py")).unwrap();
        File::create(temp_dir.path().join(".hidden.py")).unwrap();

        let walker = Walker::new(temp_dir.path(), false);
        let entries = walker.walk().unwrap();

        let found = names(&entries);
        assert!(found.contains(&"visible.py".to_string()));
        assert!(found.contains(&".hidden.py".to_string()));
    }

    #[test]
    fn test_walker_ignores_gitignore() {
        let temp_dir = tempdir().unwrap();

        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        fs::write(temp_dir.path().join(".gitignore"), "build/\n").unwrap();
        fs::create_dir(temp_dir.path().join("build")).unwrap();
        File::create(temp_dir.path().join("build/output.py")).unwrap();

        let walker = Walker::new(temp_dir.path(), false);
        let entries = walker.walk().unwrap();

        assert!(names(&entries).contains(&"output.py".to_string()));
    }

    #[test]
    fn test_walker_handles_nested_directories() {
        let temp_dir = tempdir().unwrap();

        fs::create_dir_all(temp_dir.path().join("a/b/c")).unwrap();
        File::create(temp_dir.path().join("a/file1.py")).unwrap();
        File::create(temp_dir.path().join("a/b/file2.py")).unwrap();
        File::create(temp_dir.path().join("a/b/c/file3.py")).unwrap();

        let walker = Walker::new(temp_dir.path(), false);
        let entries = walker.walk().unwrap();

        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_walker_results_are_sorted() {
        let temp_dir = tempdir().unwrap();

        File::create(temp_dir.path().join("c.py")).unwrap();
        File::create(temp_dir.path().join("a.py")).unwrap();
        File::create(temp_dir.path().join("b.py")).unwrap();

        let walker = Walker::new(temp_dir.path(), false);
        let entries = walker.walk().unwrap();

        assert_eq!(names(&entries), vec!["a.py", "b.py", "c.py"]);
    }
}
