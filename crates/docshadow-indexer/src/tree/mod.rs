//! Project structure map.
//!
//! A nested, directory-shaped index from path segments to the relative path
//! of each file's documentation record. Keys are kept in a `BTreeMap` so the
//! serialized map is ordered the same way on every run.

mod builder;

pub use builder::StructureBuilder;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Suffix appended to a source path to name its documentation record.
pub const RECORD_SUFFIX: &str = ".json";

/// Relative path of the record documenting `source_path`.
pub fn record_path(source_path: &str) -> String {
    format!("{source_path}{RECORD_SUFFIX}")
}

/// One level of the structure map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectStructure {
    entries: BTreeMap<String, StructureEntry>,
}

/// A file leaf or a nested directory level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructureEntry {
    /// Record path of the file
    File(String),
    Directory(ProjectStructure),
}

impl ProjectStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of this level, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StructureEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up a `/`-separated path (a directory or a file).
    pub fn get(&self, path: &str) -> Option<&StructureEntry> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut entry = self.entries.get(first)?;

        for segment in segments {
            match entry {
                StructureEntry::Directory(dir) => entry = dir.entries.get(segment)?,
                StructureEntry::File(_) => return None,
            }
        }

        Some(entry)
    }

    /// Number of file leaves at any depth.
    pub fn file_count(&self) -> usize {
        self.entries
            .values()
            .map(|entry| match entry {
                StructureEntry::File(_) => 1,
                StructureEntry::Directory(dir) => dir.file_count(),
            })
            .sum()
    }

    /// Add one source path.
    ///
    /// Keys are exact byte strings, so paths differing only by case stay
    /// separate entries. When a segment is both a directory and a file the
    /// directory is kept.
    pub fn insert(&mut self, source_path: &str) {
        let segments: Vec<&str> = source_path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((file, dirs)) = segments.split_last() else {
            return;
        };

        let mut level = self;
        for dir in dirs {
            let entry = level
                .entries
                .entry((*dir).to_string())
                .or_insert_with(|| StructureEntry::Directory(ProjectStructure::new()));
            if let StructureEntry::File(_) = entry {
                *entry = StructureEntry::Directory(ProjectStructure::new());
            }
            level = match entry {
                StructureEntry::Directory(dir) => dir,
                StructureEntry::File(_) => return,
            };
        }

        if let Some(StructureEntry::Directory(_)) = level.entries.get(*file) {
            return;
        }
        level
            .entries
            .insert((*file).to_string(), StructureEntry::File(record_path(source_path)));
    }
}
