//! # Migration Loop
//!
//! The batch workflow that walks every (rename pair, repository) combination
//! and moves the fleet from the old branches to the new ones.
//!
//! ## Process
//!
//! For each rename pair, in the order given, and for each repository, in the
//! manifest's (sorted) iteration order:
//!
//! 1. Resolve the working copy at `<root>/<org>/<name>`.
//! 2. Ask whether any branch ref matches the pair's find pattern. No match
//!    means the pair simply does not apply to this repository; move on.
//! 3. On a match, create and check out the target branch based on the
//!    repository's currently recorded version, unless the target already
//!    exists (a re-run performs no second checkout).
//! 4. Set the new version in the repos manifest, then in the distribution
//!    manifest, then push the branch if pushing is enabled. The three steps
//!    are independent: each failure is recorded in its own error log and the
//!    remaining steps are still attempted.
//!
//! Everything is strictly sequential. Each manifest mutation returns a new
//! snapshot that replaces the live one for later iterations, so a failed
//! update leaves the previous snapshot in effect and partial success is a
//! valid terminal state: the caller still gets both (possibly partially
//! updated) manifests plus the three error logs.
//!
//! A git failure in step 2 or 3 skips the repository for that pair without
//! touching either manifest, so the manifests never claim a branch that was
//! not actually created.

use std::collections::BTreeMap;

use log::{debug, error};
use regex::Regex;

use crate::distribution_file::{self, Distribution};
use crate::error::Result;
use crate::git::VersionControl;
use crate::repos_file::{self, Repos};

/// One migration instruction: replace branches matching `find` with
/// `replace`.
#[derive(Debug, Clone)]
pub struct BranchRename {
    /// Pattern matched against short branch ref names. Anchoring is the
    /// caller's responsibility.
    pub find: Regex,
    /// Name of the branch to create and record.
    pub replace: String,
}

impl BranchRename {
    pub fn new(find: Regex, replace: impl Into<String>) -> Self {
        Self {
            find,
            replace: replace.into(),
        }
    }

    /// Build a rename whose find pattern matches `find` exactly as a branch
    /// name, local (`galactic`) or remote (`origin/galactic`), without also
    /// matching longer names like `galactic-devel`.
    pub fn anchored(find: &str, replace: &str) -> Result<Self> {
        Ok(Self::new(anchored_branch_pattern(find)?, replace))
    }
}

fn anchored_branch_pattern(name: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("(^|/){}$", regex::escape(name)))?)
}

/// Per-category failure log: repository name to human-readable reason.
pub type ErrorLog = BTreeMap<String, String>;

/// Record a failure, keeping the first reason seen for a repository.
fn record(log: &mut ErrorLog, repo: &str, message: String) {
    error!("{}", message);
    log.entry(repo.to_string()).or_insert(message);
}

fn report_category(log: &ErrorLog, title: &str) {
    if log.is_empty() {
        return;
    }
    error!("{}", title);
    error!("{} repos with errors:", log.len());
    for (repo, reason) in log {
        error!("- {}: {}", repo, reason);
    }
}

/// The result of a migration run: the final manifest snapshots plus one
/// error log per failure category.
#[derive(Debug)]
pub struct MigrationOutcome {
    pub repos: Repos,
    pub distribution: Distribution,
    /// Repos-manifest update failures.
    pub repo_errors: ErrorLog,
    /// Distribution-manifest update failures.
    pub distro_errors: ErrorLog,
    /// Branch push failures.
    pub push_errors: ErrorLog,
}

impl MigrationOutcome {
    pub fn has_errors(&self) -> bool {
        !self.repo_errors.is_empty()
            || !self.distro_errors.is_empty()
            || !self.push_errors.is_empty()
    }

    /// Log a per-category summary of every failing repository and its
    /// reason. Errors here are informational; they do not fail the run.
    pub fn report(&self) {
        report_category(&self.repo_errors, "Repo set version errors");
        report_category(&self.distro_errors, "Distribution set version errors");
        report_category(&self.push_errors, "Branch push errors");
    }
}

/// Run the migration over every rename pair and repository.
///
/// `src_root` is the directory holding one working copy per repository at
/// `<src_root>/<org>/<name>`; all branch mutation happens there, so callers
/// should point it at the isolated output copy, never the original tree.
///
/// Only pattern-compilation errors abort the run. Per-repository failures
/// are captured in the outcome's error logs.
pub fn migrate<V: VersionControl>(
    mut repos: Repos,
    mut distribution: Distribution,
    renames: &[BranchRename],
    src_root: &std::path::Path,
    push_branches: bool,
    vcs: &V,
) -> Result<MigrationOutcome> {
    let mut repo_errors = ErrorLog::new();
    let mut distro_errors = ErrorLog::new();
    let mut push_errors = ErrorLog::new();

    for rename in renames {
        let target = rename.replace.as_str();
        let target_pattern = anchored_branch_pattern(target)?;

        let names: Vec<String> = repos.keys().cloned().collect();
        for name in names {
            let Some(repo) = repos_file::get(&repos, &name).cloned() else {
                continue;
            };
            let repo_path = src_root.join(&repo.org).join(&name);

            let matched = match vcs.has_branch(&repo_path, &rename.find) {
                Ok(matched) => matched,
                Err(err) => {
                    error!("Failed to list branches of '{}': {}", name, err);
                    continue;
                }
            };
            if !matched {
                debug!(
                    "No branch matching '{}' found in {}",
                    rename.find,
                    repo_path.display()
                );
                continue;
            }

            let target_exists = match vcs.has_branch(&repo_path, &target_pattern) {
                Ok(exists) => exists,
                Err(err) => {
                    error!("Failed to list branches of '{}': {}", name, err);
                    continue;
                }
            };
            if target_exists {
                debug!(
                    "Branch '{}' already exists in {}",
                    target,
                    repo_path.display()
                );
            } else {
                // Base the new branch on the currently recorded version, the
                // intended deployed state of the repository.
                if let Err(err) = vcs.checkout_branch(&repo_path, target, &repo.version) {
                    error!(
                        "Failed to check out '{}' in {}: {}",
                        target,
                        repo_path.display(),
                        err
                    );
                    continue;
                }
                debug!("Checked out {}@{} based on {}", name, target, repo.version);
            }

            match repos_file::set_version(&repos, &name, target) {
                Ok(next) => repos = next,
                Err(err) => record(
                    &mut repo_errors,
                    &name,
                    format!(
                        "Failed to set version for repo '{}' in repos file: {}",
                        name, err
                    ),
                ),
            }

            match distribution_file::set_version(&distribution, &name, target) {
                Ok(next) => distribution = next,
                Err(err) => record(
                    &mut distro_errors,
                    &name,
                    format!(
                        "Failed to set version for repo '{}' in distribution file: {}",
                        name, err
                    ),
                ),
            }

            if push_branches {
                match vcs.push(&repo_path, target) {
                    Ok(()) => debug!("Pushed branch '{}' to {}", target, repo_path.display()),
                    Err(err) => record(
                        &mut push_errors,
                        &name,
                        format!(
                            "Failed to push branch '{}' to repo '{}': {}",
                            target, name, err
                        ),
                    ),
                }
            }
        }
    }

    Ok(MigrationOutcome {
        repos,
        distribution,
        repo_errors,
        distro_errors,
        push_errors,
    })
}
