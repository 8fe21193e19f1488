//! Project configuration (`docshadow.config.json`).

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file name at the project root.
pub const CONFIG_FILE: &str = "docshadow.config.json";

/// Per-project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocshadowConfig {
    /// Project name (defaults to the root directory name)
    #[serde(default)]
    pub project_name: Option<String>,

    /// Documented languages (informational)
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Snapshot directory, relative to the project root
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Ignore pattern file, relative to the project root
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,

    /// Repository hooks
    #[serde(default)]
    pub hooks: HookConfig,

    /// Extraction workers
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Whole-run deadline in seconds
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

/// Hook configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    /// Regenerate after each commit
    #[serde(default = "default_true")]
    pub post_commit: bool,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self { post_commit: true }
    }
}

fn default_languages() -> Vec<String> {
    vec!["python".to_string()]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".docshadow")
}

fn default_ignore_file() -> String {
    ".docignore".to_string()
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_true() -> bool {
    true
}

impl Default for DocshadowConfig {
    fn default() -> Self {
        Self {
            project_name: None,
            languages: default_languages(),
            output_dir: default_output_dir(),
            ignore_file: default_ignore_file(),
            hooks: HookConfig::default(),
            parallelism: default_parallelism(),
            deadline_secs: None,
        }
    }
}

impl DocshadowConfig {
    /// Defaults with the project name taken from `root`.
    pub fn for_project(root: &Path) -> Self {
        Self {
            project_name: Some(dir_name(root)),
            ..Self::default()
        }
    }

    /// Path of the configuration file for `root`.
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Whether `root` has been initialized.
    pub fn exists(root: &Path) -> bool {
        Self::path(root).is_file()
    }

    /// Load configuration for `root`, falling back to defaults
    pub fn load(root: &Path) -> Self {
        let config_path = Self::path(root);

        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = ?config_path, error = %e, "Failed to load config file");
                }
            }
        }

        Self::for_project(root)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))
    }

    /// Load the configuration of an initialized project.
    pub fn load_initialized(root: &Path) -> Result<Self, CoreError> {
        if !Self::exists(root) {
            return Err(CoreError::NotInitialized(root.to_path_buf()));
        }
        Self::load_from(&Self::path(root))
    }

    /// Write the configuration file for `root`
    pub fn save(&self, root: &Path) -> Result<(), CoreError> {
        let path = Self::path(root);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).map_err(|source| CoreError::Persist { path, source })
    }

    /// Configured name, or the root directory name.
    pub fn project_name(&self, root: &Path) -> String {
        match &self.project_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => dir_name(root),
        }
    }

    /// Snapshot directory resolved against `root`.
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }

    /// Worker count, at least one.
    pub fn workers(&self) -> usize {
        self.parallelism.max(1)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

fn dir_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string()
}
