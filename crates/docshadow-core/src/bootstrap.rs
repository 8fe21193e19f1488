//! Repository bootstrap for `docshadow init`.
//!
//! Every step leaves existing state alone when it is already in place, so
//! running `init` twice is harmless.

use crate::{CommitSource, CoreError, DocshadowConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Marker identifying the docShadow section of a hook script.
pub const HOOK_MARKER: &str = "docShadow";

/// Hook installed as `post-commit`.
pub const HOOK_NAME: &str = "post-commit";

/// `.docignore` written when the project has no `.gitignore` to copy.
pub const DEFAULT_DOCIGNORE: &str = "# docShadow ignore file
# Add patterns to exclude files from documentation generation

# Common patterns
__pycache__/
*.pyc
*.pyo
*.pyd
.Python
build/
dist/
*.egg-info/
.pytest_cache/
.coverage
.tox/
.venv/
venv/

# Documentation
docs/
*.md
";

const HOOK_BODY: &str = "# docShadow: regenerate structural documentation after each commit
docshadow generate || true
";

/// Where the ignore file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocignoreSource {
    /// Left untouched
    Existing,
    CopiedFromGitignore,
    DefaultTemplate,
}

/// What happened to the post-commit hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookStatus {
    Installed(PathBuf),
    /// docShadow section appended to a user hook
    Appended(PathBuf),
    AlreadyInstalled(PathBuf),
    /// `hooks.post_commit` is false
    Disabled,
}

/// Summary of an `init` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub config_created: bool,
    pub docignore: DocignoreSource,
    pub hook: HookStatus,
}

/// Initialize docShadow in the repository at `root`.
pub fn init(root: &Path, commits: &dyn CommitSource) -> Result<InitReport, CoreError> {
    if !commits.is_repository() {
        return Err(CoreError::NotARepository(root.to_path_buf()));
    }

    let config_created = !DocshadowConfig::exists(root);
    let config = if config_created {
        let config = DocshadowConfig::for_project(root);
        config.save(root)?;
        info!(path = ?DocshadowConfig::path(root), "Created configuration");
        config
    } else {
        DocshadowConfig::load_from(&DocshadowConfig::path(root))?
    };

    let docignore = bootstrap_docignore(root, &config.ignore_file)?;

    let hook = if config.hooks.post_commit {
        install_hook(&commits.hooks_dir()?)?
    } else {
        HookStatus::Disabled
    };

    Ok(InitReport {
        config_created,
        docignore,
        hook,
    })
}

/// Create the ignore file from `.gitignore`, or from the default template.
pub fn bootstrap_docignore(root: &Path, ignore_file: &str) -> Result<DocignoreSource, CoreError> {
    let target = root.join(ignore_file);
    if target.exists() {
        return Ok(DocignoreSource::Existing);
    }

    let persist = |source: std::io::Error| CoreError::Persist {
        path: target.clone(),
        source,
    };

    let gitignore = root.join(".gitignore");
    if gitignore.is_file() {
        std::fs::copy(&gitignore, &target).map_err(persist)?;
        debug!(path = ?target, "Copied .gitignore");
        Ok(DocignoreSource::CopiedFromGitignore)
    } else {
        std::fs::write(&target, DEFAULT_DOCIGNORE).map_err(persist)?;
        debug!(path = ?target, "Wrote default ignore file");
        Ok(DocignoreSource::DefaultTemplate)
    }
}

/// Install (or append to) the post-commit hook in `hooks_dir`.
pub fn install_hook(hooks_dir: &Path) -> Result<HookStatus, CoreError> {
    let hook = hooks_dir.join(HOOK_NAME);
    let persist = |source: std::io::Error| CoreError::Persist {
        path: hook.clone(),
        source,
    };

    std::fs::create_dir_all(hooks_dir).map_err(persist)?;

    let status = if hook.exists() {
        let existing = std::fs::read_to_string(&hook).map_err(persist)?;
        if existing.contains(HOOK_MARKER) {
            return Ok(HookStatus::AlreadyInstalled(hook.clone()));
        }

        let mut content = existing;
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push('\n');
        content.push_str(HOOK_BODY);
        std::fs::write(&hook, content).map_err(persist)?;
        HookStatus::Appended(hook.clone())
    } else {
        std::fs::write(&hook, format!("#!/bin/sh\n{HOOK_BODY}")).map_err(persist)?;
        HookStatus::Installed(hook.clone())
    };

    make_executable(&hook).map_err(persist)?;
    info!(path = ?hook, "Installed post-commit hook");

    Ok(status)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    std::fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
