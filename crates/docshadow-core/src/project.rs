//! Snapshot directory layout and artifact persistence.

use crate::{CommitInfo, CoreError, DocshadowConfig};
use chrono::{DateTime, Utc};
use docshadow_indexer::tree::record_path;
use docshadow_indexer::{DocumentationRecord, ProjectStructure};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Manifest file name inside the snapshot directory.
pub const MANIFEST_FILE: &str = "index.json";

/// Structure map file name inside the snapshot directory.
pub const STRUCTURE_FILE: &str = "docshadow.json";

/// Commit-scoped manifest of the latest snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub commit_hash: String,
    pub short_commit_hash: String,
    pub commit_date: String,
    pub commit_message: String,
    pub commit_author: String,
    /// Record paths relative to the snapshot directory, in source path order
    pub documented_files: Vec<String>,
}

impl SnapshotManifest {
    pub fn new(commit: &CommitInfo, source_files: &[String]) -> Self {
        Self {
            commit_hash: commit.hash.clone(),
            short_commit_hash: commit.short_hash.clone(),
            commit_date: commit.date.clone(),
            commit_message: commit.message.clone(),
            commit_author: commit.author.clone(),
            documented_files: source_files.iter().map(|f| record_path(f)).collect(),
        }
    }
}

/// The structure map artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureDocument {
    pub project_name: String,
    pub generated_at: DateTime<Utc>,
    pub commit_hash: String,
    pub structure: ProjectStructure,
}

/// Where a project's snapshot artifacts live.
#[derive(Debug, Clone)]
pub struct SnapshotLayout {
    output_dir: PathBuf,
}

impl SnapshotLayout {
    pub fn new(root: &Path, config: &DocshadowConfig) -> Self {
        Self {
            output_dir: config.output_dir(root),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Record file for a `/`-separated source path.
    pub fn record_file(&self, source_path: &str) -> PathBuf {
        self.output_dir.join(record_path(source_path))
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE)
    }

    pub fn structure_file(&self) -> PathBuf {
        self.output_dir.join(STRUCTURE_FILE)
    }

    pub async fn write_record(&self, record: &DocumentationRecord) -> Result<(), CoreError> {
        write_json(&self.record_file(&record.path), record).await
    }

    pub async fn write_structure(&self, document: &StructureDocument) -> Result<(), CoreError> {
        write_json(&self.structure_file(), document).await
    }

    pub async fn write_manifest(&self, manifest: &SnapshotManifest) -> Result<(), CoreError> {
        write_json(&self.manifest_file(), manifest).await
    }

    /// Latest manifest, `None` when no snapshot exists yet.
    pub async fn load_manifest(&self) -> Result<Option<SnapshotManifest>, CoreError> {
        let path = self.manifest_file();
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// Pretty-print `value` into `path`.
///
/// Written to a temp file next to the target and renamed over it, so readers
/// see either the previous artifact or the complete new one.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    let persist = |source: std::io::Error| CoreError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec_pretty(value)?;

    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(persist)?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artifact");
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    tokio::fs::write(&temp_path, &json).await.map_err(persist)?;
    tokio::fs::rename(&temp_path, path).await.map_err(persist)?;

    debug!(path = ?path, size = json.len(), "Wrote artifact");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn commit() -> CommitInfo {
        CommitInfo::new("abcdef1234567890", "Ada", "2024-01-01T00:00:00+00:00", "msg\n")
    }

    #[test]
    fn test_manifest_record_paths() {
        let manifest = SnapshotManifest::new(&commit(), &["a.py".to_string(), "pkg/b.py".to_string()]);
        assert_eq!(manifest.documented_files, vec!["a.py.json", "pkg/b.py.json"]);
        assert_eq!(manifest.short_commit_hash, "abcdef1");
        assert_eq!(manifest.commit_message, "msg");
    }

    #[tokio::test]
    async fn test_write_and_load_manifest() {
        let dir = tempdir().unwrap();
        let layout = SnapshotLayout::new(dir.path(), &DocshadowConfig::default());

        assert!(layout.load_manifest().await.unwrap().is_none());

        let manifest = SnapshotManifest::new(&commit(), &["a.py".to_string()]);
        layout.write_manifest(&manifest).await.unwrap();

        let loaded = layout.load_manifest().await.unwrap().unwrap();
        assert_eq!(loaded, manifest);
        assert!(!dir.path().join(".docshadow/.index.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_json_is_pretty_and_not_ascii_escaped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/value.json");
        write_json(&path, &serde_json::json!({"name": "café"}))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"name\": \"café\"\n}");
    }

    #[tokio::test]
    async fn test_record_mirrors_source_path() {
        let dir = tempdir().unwrap();
        let layout = SnapshotLayout::new(dir.path(), &DocshadowConfig::default());

        let record = DocumentationRecord::failed("pkg/mod.py", "boom");
        layout.write_record(&record).await.unwrap();

        let written = dir.path().join(".docshadow/pkg/mod.py.json");
        assert_eq!(layout.record_file("pkg/mod.py"), written);
        let loaded: DocumentationRecord =
            serde_json::from_str(&std::fs::read_to_string(&written).unwrap()).unwrap();
        assert_eq!(loaded.error(), Some("boom"));
    }

    #[tokio::test]
    async fn test_write_into_file_parent_fails() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("blocker"), "").unwrap();

        let err = write_json(&dir.path().join("blocker/index.json"), &1)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Persist { .. }));
    }
}
