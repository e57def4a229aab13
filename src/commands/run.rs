//! Run command implementation
//!
//! The run command executes the full migration pipeline:
//! 1. Load both manifests
//! 2. Copy the source tree into an isolated output workspace
//! 3. Run the migration loop against the copy
//! 4. Write the updated manifests and report per-category errors
//!
//! Per-repository failures do not fail the command; the run still writes
//! whatever it produced so operators can inspect and re-run.

use anyhow::{Context, Result};
use clap::Args;
use log::{debug, info};
use std::path::PathBuf;

use branch_migrate::defaults;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the repository list manifest
    #[arg(long, value_name = "PATH", default_value = defaults::DEFAULT_REPOS_PATH)]
    pub repos: PathBuf,

    /// Path to the distribution manifest
    #[arg(long, value_name = "PATH", default_value = defaults::DEFAULT_DISTRIBUTION_PATH)]
    pub distribution: PathBuf,

    /// Root directory holding one working copy per repository (<root>/<org>/<name>)
    #[arg(long, value_name = "PATH", default_value = defaults::DEFAULT_SOURCE_PATH)]
    pub source: PathBuf,

    /// Output directory for the migrated tree and manifests
    #[arg(short, long, value_name = "PATH", default_value = defaults::DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,

    /// Push the created branches to each repository's remote
    #[arg(long)]
    pub push_branches: bool,
}

/// Execute the run command
pub fn execute(args: RunArgs) -> Result<()> {
    use branch_migrate::git::GitCli;
    use branch_migrate::migrate::{self, BranchRename};
    use branch_migrate::{distribution_file, repos_file, workspace};

    debug!("Loading repo and distribution files");
    let repos = repos_file::load_and_process(&args.repos)
        .with_context(|| format!("Failed to load {}", args.repos.display()))?;
    let distribution = distribution_file::load(&args.distribution)
        .with_context(|| format!("Failed to load {}", args.distribution.display()))?;

    debug!("Setting up output directory: {}", args.output.display());
    let out_src = workspace::prepare(&args.source, &args.output)?;

    let renames = defaults::DEFAULT_BRANCH_RENAMES
        .iter()
        .map(|(find, replace)| BranchRename::anchored(find, replace))
        .collect::<branch_migrate::error::Result<Vec<_>>>()?;

    let outcome = migrate::migrate(
        repos,
        distribution,
        &renames,
        &out_src,
        args.push_branches,
        &GitCli,
    )?;

    workspace::write_manifests(
        &args.output,
        &repos_file::to_repos_file(&outcome.repos),
        &outcome.distribution,
    )?;

    outcome.report();
    if outcome.has_errors() {
        info!("Finished with errors - created files in {}", args.output.display());
    } else {
        info!(
            "Finished without errors! - created files in {}",
            args.output.display()
        );
    }
    Ok(())
}
