//! Commit context from git.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Length of the abbreviated commit hash.
pub const SHORT_HASH_LEN: usize = 7;

/// Field separator for `git show --format`.
const FIELD_SEPARATOR: char = '\u{0}';

/// Metadata of one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub short_hash: String,
    /// Author name
    pub author: String,
    /// Committer date, strict ISO-8601
    pub date: String,
    /// Full message, surrounding whitespace trimmed
    pub message: String,
}

impl CommitInfo {
    pub fn new(
        hash: impl Into<String>,
        author: impl Into<String>,
        date: impl Into<String>,
        message: &str,
    ) -> Self {
        let hash = hash.into();
        Self {
            short_hash: hash.chars().take(SHORT_HASH_LEN).collect(),
            hash,
            author: author.into(),
            date: date.into(),
            message: message.trim().to_string(),
        }
    }

    /// Parse `%H%x00%an%x00%cI%x00%B` output.
    pub fn parse(output: &str) -> Result<Self, CoreError> {
        let mut fields = output.splitn(4, FIELD_SEPARATOR);
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(hash), Some(author), Some(date), Some(message)) if !hash.trim().is_empty() => {
                Ok(Self::new(hash.trim(), author, date.trim(), message))
            }
            _ => Err(CoreError::Git(format!(
                "unexpected commit format: {:?}",
                output.chars().take(80).collect::<String>()
            ))),
        }
    }
}

/// Read access to the repository a project lives in.
///
/// The snapshot pipeline only needs commit metadata, so tests can supply a
/// fixed commit without a git binary.
pub trait CommitSource: Send + Sync {
    /// Whether the project root is inside a git work tree.
    fn is_repository(&self) -> bool;

    /// Resolve `rev` (HEAD when `None`) to its commit metadata.
    ///
    /// # Errors
    ///
    /// [`CoreError::CommitNotFound`] when an explicit `rev` does not name a
    /// commit; [`CoreError::Git`] when HEAD cannot be resolved.
    fn commit(&self, rev: Option<&str>) -> Result<CommitInfo, CoreError>;

    /// Name of the checked-out branch (`HEAD` when detached).
    fn current_branch(&self) -> Result<String, CoreError>;

    /// Directory holding the repository's hooks.
    fn hooks_dir(&self) -> Result<PathBuf, CoreError>;
}

/// Live adapter that shells out to the `git` CLI.
#[derive(Debug, Clone)]
pub struct LiveGit {
    root: PathBuf,
}

impl LiveGit {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run git in the project root and return trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String, CoreError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .map_err(|e| CoreError::Git(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl CommitSource for LiveGit {
    fn is_repository(&self) -> bool {
        matches!(
            self.run(&["rev-parse", "--is-inside-work-tree"]).as_deref(),
            Ok("true")
        )
    }

    fn commit(&self, rev: Option<&str>) -> Result<CommitInfo, CoreError> {
        let hash = match rev {
            // option-looking revisions would be parsed as flags
            Some(rev) if rev.starts_with('-') || rev.trim().is_empty() => {
                return Err(CoreError::CommitNotFound(rev.to_string()));
            }
            Some(rev) => self
                .run(&["rev-parse", "--verify", "--quiet", &format!("{rev}^{{commit}}")])
                .map_err(|_| CoreError::CommitNotFound(rev.to_string()))?,
            None => self
                .run(&["rev-parse", "--verify", "--quiet", "HEAD^{commit}"])
                .map_err(|_| CoreError::Git("HEAD does not point to a commit".to_string()))?,
        };

        let output = self.run(&["show", "-s", "--format=%H%x00%an%x00%cI%x00%B", &hash])?;
        CommitInfo::parse(&output)
    }

    fn current_branch(&self) -> Result<String, CoreError> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    fn hooks_dir(&self) -> Result<PathBuf, CoreError> {
        let path = PathBuf::from(self.run(&["rev-parse", "--git-path", "hooks"])?);
        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(self.root.join(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_info_short_hash_and_trim() {
        let info = CommitInfo::new(
            "0123456789abcdef0123456789abcdef01234567",
            "Ada",
            "2024-05-01T10:00:00+02:00",
            "  Fix parser\n\nDetails.\n\n",
        );
        assert_eq!(info.short_hash, "0123456");
        assert_eq!(info.message, "Fix parser\n\nDetails.");
    }

    #[test]
    fn test_parse_show_output() {
        let output = "abcdef0123456789\u{0}Grace Hopper\u{0}2024-01-02T03:04:05Z\u{0}Initial commit";
        let info = CommitInfo::parse(output).unwrap();
        assert_eq!(info.hash, "abcdef0123456789");
        assert_eq!(info.short_hash, "abcdef0");
        assert_eq!(info.author, "Grace Hopper");
        assert_eq!(info.date, "2024-01-02T03:04:05Z");
        assert_eq!(info.message, "Initial commit");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            CommitInfo::parse("not a commit"),
            Err(CoreError::Git(_))
        ));
    }

    #[test]
    fn test_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let git = LiveGit::new(dir.path());
        // Without git installed or outside a work tree both report false
        assert!(!git.is_repository());
    }

    #[test]
    fn test_option_like_revision_is_rejected() {
        let git = LiveGit::new(".");
        assert!(matches!(
            git.commit(Some("--all")),
            Err(CoreError::CommitNotFound(_))
        ));
    }
}
