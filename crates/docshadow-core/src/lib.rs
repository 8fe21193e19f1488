//! docShadow Core
//!
//! Snapshot orchestration for docShadow: project configuration, commit
//! context from git, the snapshot state machine with its bounded worker pool,
//! artifact persistence, repository bootstrap and status reporting.

pub mod bootstrap;
pub mod config;
mod error;
pub mod git;
pub mod project;
pub mod snapshot;
pub mod status;

pub use bootstrap::{init, DocignoreSource, HookStatus, InitReport};
pub use config::{DocshadowConfig, HookConfig, CONFIG_FILE};
pub use error::CoreError;
pub use git::{CommitInfo, CommitSource, LiveGit};
pub use project::{SnapshotLayout, SnapshotManifest, StructureDocument};
pub use snapshot::{CancelToken, SnapshotGenerator, SnapshotReport, SnapshotState};
pub use status::{HookState, StatusReport};
