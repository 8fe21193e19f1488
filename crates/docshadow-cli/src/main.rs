//! docShadow CLI
//!
//! Snapshots the structural documentation of a Python project for a git
//! commit.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docshadow_core::{
    init, CommitSource, CoreError, DocignoreSource, DocshadowConfig, HookState, HookStatus,
    LiveGit, SnapshotGenerator, StatusReport,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Number of discoverable files listed by `status`.
const STATUS_FILE_PREVIEW: usize = 10;

#[derive(Parser)]
#[command(name = "docshadow")]
#[command(about = "docShadow - structural documentation snapshots for every git commit")]
#[command(version)]
struct Cli {
    /// Project root (default: current directory)
    #[arg(short = 'C', long, default_value = ".", global = true)]
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize docShadow in the current git repository
    Init,

    /// Generate documentation for the current or a given commit
    Generate {
        /// Commit to document (default: HEAD)
        #[arg(short, long)]
        commit: Option<String>,
    },

    /// Show docShadow status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let root = cli
        .path
        .canonicalize()
        .with_context(|| format!("Invalid project path: {}", cli.path.display()))?;

    match cli.command {
        Commands::Init => cmd_init(&root),
        Commands::Generate { commit } => cmd_generate(&root, commit.as_deref()).await,
        Commands::Status => cmd_status(&root).await,
    }
}

fn cmd_init(root: &Path) -> Result<()> {
    let git = LiveGit::new(root);
    let report = init(root, &git).context("Failed to initialize docShadow")?;

    if report.config_created {
        println!("✓ Created {}", DocshadowConfig::path(root).display());
    } else {
        println!("✓ Configuration already present");
    }

    match report.docignore {
        DocignoreSource::Existing => println!("✓ Ignore file already present"),
        DocignoreSource::CopiedFromGitignore => println!("✓ Created .docignore from .gitignore"),
        DocignoreSource::DefaultTemplate => println!("✓ Created default .docignore"),
    }

    match report.hook {
        HookStatus::Installed(path) => println!("✓ Installed hook {}", path.display()),
        HookStatus::Appended(path) => println!("✓ Added docShadow to hook {}", path.display()),
        HookStatus::AlreadyInstalled(_) => println!("✓ Post-commit hook already installed"),
        HookStatus::Disabled => println!("- Post-commit hook disabled in configuration"),
    }

    println!();
    println!("Generate documentation with: docshadow generate");

    Ok(())
}

async fn cmd_generate(root: &Path, commit: Option<&str>) -> Result<()> {
    let config = match DocshadowConfig::load_initialized(root) {
        Err(e @ CoreError::NotInitialized(_)) => {
            return Err(e).context("Run 'docshadow init' first");
        }
        other => other.context("Failed to load configuration")?,
    };

    let commits: Arc<dyn CommitSource> = Arc::new(LiveGit::new(root));
    let generator = SnapshotGenerator::new(root, config, commits);

    let cancel = generator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received SIGINT, cancelling snapshot");
            cancel.cancel();
        }
    });

    let report = generator
        .run(commit)
        .await
        .context("Documentation generation failed")?;

    println!(
        "✓ Documented commit {} ({} files)",
        report.commit.short_hash,
        report.documented_files.len()
    );
    if !report.failed_files.is_empty() {
        println!("  {} files could not be parsed:", report.failed_files.len());
        for path in &report.failed_files {
            println!("    {}", path);
        }
    }
    println!("  Index:     {}", report.output_dir.join("index.json").display());
    println!("  Structure: {}", report.output_dir.join("docshadow.json").display());

    Ok(())
}

async fn cmd_status(root: &Path) -> Result<()> {
    let git = LiveGit::new(root);
    let status = StatusReport::collect(root, &git).await;

    println!("docShadow Status");
    println!();

    if !status.initialized {
        println!("  Status:     Not initialized");
        println!();
        println!("Initialize with: docshadow init");
        return Ok(());
    }
    println!("  Status:     Initialized");

    match (&status.config, &status.config_error) {
        (Some(config), _) => {
            println!("  Project:    {}", status.project_name);
            println!("  Languages:  {}", config.languages.join(", "));
            println!("  Output dir: {}", config.output_dir.display());
            println!(
                "  Hook:       {}",
                if config.hooks.post_commit { "Enabled" } else { "Disabled" }
            );
        }
        (None, Some(error)) => println!("  Config:     {}", error),
        (None, None) => {}
    }

    println!();
    if !status.repository {
        println!("  Git:        Not a git repository");
        return Ok(());
    }
    if let Some(branch) = &status.branch {
        println!("  Branch:     {}", branch);
    }
    match (&status.head, &status.git_error) {
        (Some(head), _) => {
            println!("  Commit:     {}", head.short_hash);
            println!("  Message:    {}", first_line(&head.message));
        }
        (None, Some(error)) => println!("  Commit:     unavailable ({})", error),
        (None, None) => {}
    }

    println!();
    if status.files.is_empty() {
        println!("  Files:      No Python files found");
    } else {
        println!("  Files:      {} to document", status.files.len());
        for file in status.files.iter().take(STATUS_FILE_PREVIEW) {
            println!("    {}", file);
        }
        if status.files.len() > STATUS_FILE_PREVIEW {
            println!("    ... and {} more", status.files.len() - STATUS_FILE_PREVIEW);
        }
    }

    println!();
    match (&status.latest, &status.manifest_error) {
        (Some(latest), _) => {
            println!(
                "  Snapshot:   {}{}",
                latest.short_commit_hash,
                if status.is_current() { " (current)" } else { "" }
            );
            println!("  Date:       {}", latest.commit_date);
            println!("  Documented: {} files", latest.documented_files.len());
        }
        (None, Some(error)) => println!("  Snapshot:   unreadable ({})", error),
        (None, None) if status.output_dir_exists => println!("  Snapshot:   none yet"),
        (None, None) => println!("  Snapshot:   output directory not found"),
    }
    println!(
        "  Structure:  {}",
        if status.structure_present { "available" } else { "missing" }
    );

    let hook = match status.hook {
        Some(HookState::Installed) => "installed",
        Some(HookState::Foreign) => "present, not docShadow",
        Some(HookState::Missing) | None => "not installed",
    };
    println!("  Hook:       {}", hook);

    println!();
    if status.files.is_empty() {
        println!("Add Python files to the project to document them.");
    } else if status.latest.is_none() {
        println!("Create the first snapshot with: docshadow generate");
    } else if !status.is_current() {
        println!("Snapshot is behind HEAD. Update with: docshadow generate");
    }

    Ok(())
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}
