//! Project status for `docshadow status`.

use crate::bootstrap::{HOOK_MARKER, HOOK_NAME};
use crate::project::{SnapshotLayout, SnapshotManifest};
use crate::{CommitInfo, CommitSource, DocshadowConfig};
use docshadow_indexer::{IgnoreMatcher, Scanner};
use std::path::Path;
use tracing::warn;

/// Post-commit hook state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Installed,
    /// A hook exists but has no docShadow section
    Foreign,
    Missing,
}

/// Snapshot of everything `status` reports. Problems are captured as
/// messages instead of errors.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub initialized: bool,
    pub config: Option<DocshadowConfig>,
    pub config_error: Option<String>,
    pub project_name: String,
    pub repository: bool,
    pub branch: Option<String>,
    pub head: Option<CommitInfo>,
    pub git_error: Option<String>,
    /// Discoverable source files, sorted
    pub files: Vec<String>,
    pub output_dir_exists: bool,
    pub latest: Option<SnapshotManifest>,
    pub manifest_error: Option<String>,
    pub structure_present: bool,
    pub hook: Option<HookState>,
}

impl StatusReport {
    /// Inspect the project at `root`.
    pub async fn collect(root: &Path, commits: &dyn CommitSource) -> Self {
        let mut report = StatusReport {
            initialized: DocshadowConfig::exists(root),
            ..Default::default()
        };

        let config = if report.initialized {
            match DocshadowConfig::load_from(&DocshadowConfig::path(root)) {
                Ok(config) => {
                    report.config = Some(config.clone());
                    config
                }
                Err(e) => {
                    report.config_error = Some(e.to_string());
                    DocshadowConfig::for_project(root)
                }
            }
        } else {
            DocshadowConfig::for_project(root)
        };
        report.project_name = config.project_name(root);

        report.repository = commits.is_repository();
        if report.repository {
            match commits.commit(None) {
                Ok(head) => report.head = Some(head),
                Err(e) => report.git_error = Some(e.to_string()),
            }
            report.branch = commits.current_branch().ok();
            report.hook = commits.hooks_dir().ok().map(|dir| hook_state(&dir));
        }

        let matcher = IgnoreMatcher::load(root, &config.ignore_file);
        match Scanner::new().scan(root, &matcher) {
            Ok(scan) => report.files = scan.files,
            Err(e) => warn!(error = %e, "Could not scan project"),
        }

        let layout = SnapshotLayout::new(root, &config);
        report.output_dir_exists = layout.output_dir().is_dir();
        match layout.load_manifest().await {
            Ok(manifest) => report.latest = manifest,
            Err(e) => report.manifest_error = Some(e.to_string()),
        }
        report.structure_present = layout.structure_file().is_file();

        report
    }

    /// Whether the latest snapshot documents the current HEAD.
    pub fn is_current(&self) -> bool {
        match (&self.latest, &self.head) {
            (Some(latest), Some(head)) => latest.commit_hash == head.hash,
            _ => false,
        }
    }
}

fn hook_state(hooks_dir: &Path) -> HookState {
    match std::fs::read_to_string(hooks_dir.join(HOOK_NAME)) {
        Ok(content) if content.contains(HOOK_MARKER) => HookState::Installed,
        Ok(_) => HookState::Foreign,
        Err(_) => HookState::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_hook_state() {
        let dir = tempdir().unwrap();
        assert_eq!(hook_state(dir.path()), HookState::Missing);

        std::fs::write(dir.path().join(HOOK_NAME), "#!/bin/sh\nmake\n").unwrap();
        assert_eq!(hook_state(dir.path()), HookState::Foreign);

        std::fs::write(dir.path().join(HOOK_NAME), "# docShadow\n").unwrap();
        assert_eq!(hook_state(dir.path()), HookState::Installed);
    }
}
