//! # Repository List Manifest
//!
//! Parsing, serialization and update operations for the repository list
//! manifest (`ros2.repos` shape). On disk the document groups entries under a
//! composite `"org/name"` key:
//!
//! ```yaml
//! repositories:
//!   ros2/rclcpp:
//!     type: git
//!     url: https://github.com/ros2/rclcpp.git
//!     version: master
//! ```
//!
//! In memory the entries are keyed by repository name alone, with the
//! organization promoted to a field on [`Repo`]. The two shapes convert in
//! both directions via [`process`] and [`to_repos_file`]; for entries that
//! carry only `type`/`url`/`version` the conversion round-trips exactly.
//! Any other per-entry fields are dropped on load and are not re-emitted.
//!
//! All update operations are persistent: they return a new map with a single
//! entry replaced and never mutate their input, so callers holding the old
//! snapshot keep observing the old versions.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single on-disk repository entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    /// Version-control kind, e.g. `git`.
    #[serde(rename = "type")]
    pub repo_type: String,
    /// Source URL of the repository.
    pub url: String,
    /// Branch, tag or commit reference.
    pub version: String,
}

/// The repository list manifest in its on-disk shape, keyed by `"org/name"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReposFile {
    pub repositories: BTreeMap<String, RepoEntry>,
}

/// An in-memory repository entry, with the organization promoted to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub org: String,
    pub repo_type: String,
    pub url: String,
    pub version: String,
}

/// The in-memory manifest shape, keyed by repository name.
///
/// `BTreeMap` keeps the iteration order deterministic; the migration loop
/// visits repositories in this (sorted) order.
pub type Repos = BTreeMap<String, Repo>;

/// A partial update for a repository entry; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct RepoPatch {
    pub org: Option<String>,
    pub repo_type: Option<String>,
    pub url: Option<String>,
    pub version: Option<String>,
}

/// Load the on-disk manifest from `path`.
pub fn load(path: &Path) -> Result<ReposFile> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Convert the on-disk shape to the in-memory shape.
///
/// Splits each composite key at the first `/`; a key without a separator is
/// a schema error.
pub fn process(file: ReposFile) -> Result<Repos> {
    let mut repos = Repos::new();
    for (key, entry) in file.repositories {
        let (org, name) = key.split_once('/').ok_or_else(|| Error::Schema {
            message: format!("repository key '{}' is missing an 'org/name' separator", key),
        })?;
        repos.insert(
            name.to_string(),
            Repo {
                org: org.to_string(),
                repo_type: entry.repo_type,
                url: entry.url,
                version: entry.version,
            },
        );
    }
    Ok(repos)
}

/// Load the manifest and convert it to the in-memory shape in one step.
pub fn load_and_process(path: &Path) -> Result<Repos> {
    process(load(path)?)
}

/// Convert the in-memory shape back to the on-disk shape.
///
/// Only `type`, `url` and `version` are re-emitted per entry.
pub fn to_repos_file(repos: &Repos) -> ReposFile {
    let mut repositories = BTreeMap::new();
    for (name, repo) in repos {
        repositories.insert(
            format!("{}/{}", repo.org, name),
            RepoEntry {
                repo_type: repo.repo_type.clone(),
                url: repo.url.clone(),
                version: repo.version.clone(),
            },
        );
    }
    ReposFile { repositories }
}

/// Look up a repository by name. Absence is `None`, never an error.
pub fn get<'a>(repos: &'a Repos, name: &str) -> Option<&'a Repo> {
    repos.get(name)
}

/// Apply a field patch to the named repository, returning a new snapshot.
///
/// Fails with [`Error::RepoNotFound`] if the name is absent. The input map is
/// never mutated.
pub fn set(repos: &Repos, name: &str, patch: RepoPatch) -> Result<Repos> {
    let current = repos.get(name).ok_or_else(|| Error::RepoNotFound {
        repo: name.to_string(),
        manifest: "repos file".to_string(),
    })?;

    let mut updated = current.clone();
    if let Some(org) = patch.org {
        updated.org = org;
    }
    if let Some(repo_type) = patch.repo_type {
        updated.repo_type = repo_type;
    }
    if let Some(url) = patch.url {
        updated.url = url;
    }
    if let Some(version) = patch.version {
        updated.version = version;
    }

    let mut next = repos.clone();
    next.insert(name.to_string(), updated);
    Ok(next)
}

/// Set the version reference of the named repository, returning a new
/// snapshot.
pub fn set_version(repos: &Repos, name: &str, version: &str) -> Result<Repos> {
    set(
        repos,
        name,
        RepoPatch {
            version: Some(version.to_string()),
            ..RepoPatch::default()
        },
    )
}
