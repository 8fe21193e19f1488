//! Snapshot orchestration.
//!
//! One run moves through `Idle → Discovering → Extracting → Indexing →
//! Persisting → Done`. Fatal errors (no repository, unknown commit,
//! cancellation, deadline expiry, artifact write failures) end in `Failed`.
//! Files that cannot be read or parsed become error records and never fail
//! the run.
//!
//! Extraction runs on a bounded pool of blocking workers. Nothing is written
//! until every file has been extracted, and the manifest is written last.

use crate::project::{SnapshotLayout, SnapshotManifest, StructureDocument};
use crate::{CommitInfo, CommitSource, CoreError, DocshadowConfig};
use chrono::Utc;
use docshadow_indexer::{
    DocumentationRecord, IgnoreMatcher, ScanOptions, Scanner, StructureBuilder,
    StructureExtractor,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotState {
    Idle,
    Discovering,
    Extracting,
    Indexing,
    Persisting,
    Done,
    Failed,
}

impl SnapshotState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SnapshotState::Done | SnapshotState::Failed)
    }
}

/// Cooperative cancellation flag, checked before each file starts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    pub commit: CommitInfo,
    /// Record paths, in source path order
    pub documented_files: Vec<String>,
    /// Source paths whose record is an error record
    pub failed_files: Vec<String>,
    /// Source files dropped by ignore rules
    pub ignored_count: usize,
    pub output_dir: PathBuf,
    pub duration_ms: u64,
}

/// Generates the snapshot of one project.
pub struct SnapshotGenerator {
    root: PathBuf,
    config: DocshadowConfig,
    commits: Arc<dyn CommitSource>,
    extractor: StructureExtractor,
    state: Mutex<SnapshotState>,
    cancel: CancelToken,
    deadline: Option<Duration>,
}

impl SnapshotGenerator {
    pub fn new(root: &Path, config: DocshadowConfig, commits: Arc<dyn CommitSource>) -> Self {
        let deadline = config.deadline();
        Self {
            root: root.to_path_buf(),
            config,
            commits,
            extractor: StructureExtractor::new(),
            state: Mutex::new(SnapshotState::Idle),
            cancel: CancelToken::new(),
            deadline,
        }
    }

    /// Override the configured deadline.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> SnapshotState {
        *self.state.lock()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run a snapshot and report only whether it succeeded.
    pub async fn generate(&self, rev: Option<&str>) -> bool {
        self.run(rev).await.is_ok()
    }

    /// Run a snapshot for `rev` (HEAD when `None`).
    pub async fn run(&self, rev: Option<&str>) -> Result<SnapshotReport, CoreError> {
        let started = Instant::now();

        match self.execute(rev, started).await {
            Ok(report) => {
                self.transition(SnapshotState::Done);
                info!(
                    commit = %report.commit.short_hash,
                    files = report.documented_files.len(),
                    failed = report.failed_files.len(),
                    duration_ms = report.duration_ms,
                    "Snapshot complete"
                );
                Ok(report)
            }
            Err(e) => {
                self.transition(SnapshotState::Failed);
                error!(error = %e, "Snapshot failed");
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        rev: Option<&str>,
        started: Instant,
    ) -> Result<SnapshotReport, CoreError> {
        self.transition(SnapshotState::Discovering);

        if !self.commits.is_repository() {
            return Err(CoreError::NotARepository(self.root.clone()));
        }
        let commit = self.commits.commit(rev)?;

        info!(commit = %commit.short_hash, root = ?self.root, "Generating snapshot");

        let matcher = IgnoreMatcher::load(&self.root, &self.config.ignore_file);
        let scanner = Scanner::with_options(ScanOptions {
            threads: self.config.workers(),
            ..ScanOptions::default()
        });
        let scan = scanner.scan(&self.root, &matcher)?;

        self.transition(SnapshotState::Extracting);
        let records = self.extract_all(&scan.files, started).await?;

        self.transition(SnapshotState::Indexing);
        let structure = StructureBuilder::new().build(&scan.files);
        let manifest = SnapshotManifest::new(&commit, &scan.files);
        let document = StructureDocument {
            project_name: self.config.project_name(&self.root),
            generated_at: Utc::now(),
            commit_hash: commit.hash.clone(),
            structure,
        };

        self.check_interrupt(started)?;

        self.transition(SnapshotState::Persisting);
        let layout = SnapshotLayout::new(&self.root, &self.config);
        for record in &records {
            layout.write_record(record).await?;
        }
        layout.write_structure(&document).await?;
        layout.write_manifest(&manifest).await?;

        Ok(SnapshotReport {
            failed_files: records
                .iter()
                .filter(|r| r.is_error())
                .map(|r| r.path.clone())
                .collect(),
            documented_files: manifest.documented_files,
            ignored_count: scan.ignored_count,
            output_dir: layout.output_dir().to_path_buf(),
            duration_ms: started.elapsed().as_millis() as u64,
            commit,
        })
    }

    /// Extract every file on the worker pool; records come back in `files` order.
    async fn extract_all(
        &self,
        files: &[String],
        started: Instant,
    ) -> Result<Vec<DocumentationRecord>, CoreError> {
        let semaphore = Arc::new(Semaphore::new(self.config.workers()));
        let mut workers = JoinSet::new();

        for (index, path) in files.iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| CoreError::Task(e.to_string()))?;
            self.check_interrupt(started)?;

            let root = self.root.clone();
            let path = path.clone();
            let extractor = self.extractor;
            workers.spawn_blocking(move || {
                let _permit = permit;
                (index, extractor.extract_file(&root, &path))
            });
        }

        let mut records = Vec::with_capacity(files.len());
        while let Some(result) = workers.join_next().await {
            let (index, record) = result.map_err(|e| CoreError::Task(e.to_string()))?;
            match record.error() {
                Some(error) => warn!(path = %record.path, error = %error, "Could not document file"),
                None => debug!(path = %record.path, "Documented file"),
            }
            records.push((index, record));
        }

        records.sort_by_key(|(index, _)| *index);
        Ok(records.into_iter().map(|(_, record)| record).collect())
    }

    fn check_interrupt(&self, started: Instant) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if started.elapsed() >= deadline => {
                Err(CoreError::DeadlineExceeded(deadline))
            }
            _ => Ok(()),
        }
    }

    fn transition(&self, next: SnapshotState) {
        let mut state = self.state.lock();
        debug!(from = ?*state, to = ?next, "Snapshot state");
        *state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoRepository;

    impl CommitSource for NoRepository {
        fn is_repository(&self) -> bool {
            false
        }

        fn commit(&self, _rev: Option<&str>) -> Result<CommitInfo, CoreError> {
            Err(CoreError::Git("no repository".to_string()))
        }

        fn current_branch(&self) -> Result<String, CoreError> {
            Err(CoreError::Git("no repository".to_string()))
        }

        fn hooks_dir(&self) -> Result<PathBuf, CoreError> {
            Err(CoreError::Git("no repository".to_string()))
        }
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_terminal_states() {
        assert!(SnapshotState::Done.is_terminal());
        assert!(SnapshotState::Failed.is_terminal());
        assert!(!SnapshotState::Extracting.is_terminal());
    }

    #[tokio::test]
    async fn test_no_repository_fails_in_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let generator = SnapshotGenerator::new(
            dir.path(),
            DocshadowConfig::default(),
            Arc::new(NoRepository),
        );
        assert_eq!(generator.state(), SnapshotState::Idle);

        let err = generator.run(None).await.unwrap_err();
        assert!(matches!(err, CoreError::NotARepository(_)));
        assert_eq!(generator.state(), SnapshotState::Failed);
        assert!(!dir.path().join(".docshadow").exists());
    }
}
