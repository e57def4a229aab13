//! Version-control operations against local working copies.
//!
//! The migration loop consumes these through the [`VersionControl`] trait so
//! tests can drive it with a fake. The production implementation,
//! [`GitCli`], shells out to the system `git` binary, which automatically
//! picks up SSH keys, credential helpers and anything else configured in
//! `~/.gitconfig`.

use std::path::Path;
use std::process::Command;

use regex::Regex;

use crate::error::{Error, Result};

/// The version-control capability the migration loop depends on.
///
/// All calls are blocking and run to completion before the next one starts.
pub trait VersionControl {
    /// Whether any branch reference in the working copy matches `pattern`.
    ///
    /// The pattern is matched against short ref names (`master`,
    /// `origin/galactic`, ...). Anchoring is the caller's responsibility: a
    /// bare `galactic` also matches `galactic-devel`, so callers wanting an
    /// exact branch should anchor, e.g. `(^|/)galactic$`.
    fn has_branch(&self, repo_path: &Path, pattern: &Regex) -> Result<bool>;

    /// Create and check out `new_branch` based on `base_ref`.
    ///
    /// Fails if `base_ref` does not resolve in the working copy.
    fn checkout_branch(&self, repo_path: &Path, new_branch: &str, base_ref: &str) -> Result<()>;

    /// Push `branch` to the working copy's `origin` remote.
    fn push(&self, repo_path: &Path, branch: &str) -> Result<()>;
}

/// [`VersionControl`] implementation backed by the system `git` command.
pub struct GitCli;

fn run_git(repo_path: &Path, args: &[&str]) -> Result<String> {
    let command = format!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            path: repo_path.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command,
            path: repo_path.display().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

impl VersionControl for GitCli {
    fn has_branch(&self, repo_path: &Path, pattern: &Regex) -> Result<bool> {
        let stdout = run_git(
            repo_path,
            &["branch", "--all", "--format=%(refname:short)"],
        )?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .any(|branch| pattern.is_match(branch)))
    }

    fn checkout_branch(&self, repo_path: &Path, new_branch: &str, base_ref: &str) -> Result<()> {
        run_git(repo_path, &["checkout", "-b", new_branch, base_ref]).map(|_| ())
    }

    fn push(&self, repo_path: &Path, branch: &str) -> Result<()> {
        run_git(repo_path, &["push", "origin", branch]).map(|_| ())
    }
}

// Tests against real repositories live in tests/cli_e2e_run.rs behind the
// integration-tests feature, since they need a git binary on the host.
