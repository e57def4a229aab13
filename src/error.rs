//! # Error Handling
//!
//! Centralized error handling for `branch-migrate`, built on `thiserror`.
//!
//! The taxonomy splits along recoverability:
//!
//! - `Io`, `Yaml` and `Schema` are fatal at load time: a manifest that cannot
//!   be read or parsed halts the run before any mutation.
//! - `SourceTreeMissing` is fatal during workspace setup, again before any
//!   mutation happens.
//! - `RepoNotFound` and `GitCommand` are recoverable: the migration loop
//!   catches them per repository, records them in the matching error log and
//!   moves on to the next repository.
//!
//! The `Result<T>` alias is used throughout the library.

use thiserror::Error;

/// Main error type for branch-migrate operations
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A manifest parsed as valid YAML but violates the expected shape,
    /// e.g. a repository key without an `org/name` separator or a
    /// distribution entry missing its `doc` or `source` section.
    #[error("Manifest schema error: {message}")]
    Schema { message: String },

    /// A mutation was requested for a repository that is not present in the
    /// named manifest.
    #[error("Repo '{repo}' does not exist in the {manifest}")]
    RepoNotFound { repo: String, manifest: String },

    /// An error occurred while executing a Git command against a working copy.
    #[error("Git command failed in {path}: {command} - {stderr}")]
    GitCommand {
        command: String,
        path: String,
        stderr: String,
    },

    /// The source working-tree root to be copied does not exist.
    #[error("Directory {path} does not exist")]
    SourceTreeMissing { path: String },

    /// An error occurred while copying or writing the output workspace.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_schema() {
        let error = Error::Schema {
            message: "repository key 'rclcpp' is missing an 'org/name' separator".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Manifest schema error"));
        assert!(display.contains("org/name"));
    }

    #[test]
    fn test_error_display_repo_not_found() {
        let error = Error::RepoNotFound {
            repo: "rclcpp".to_string(),
            manifest: "distribution file".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Repo 'rclcpp' does not exist"));
        assert!(display.contains("distribution file"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "git checkout -b humble master".to_string(),
            path: "/data/src/ros2/rclcpp".to_string(),
            stderr: "fatal: not a valid object name: 'master'".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git command failed"));
        assert!(display.contains("checkout -b humble"));
        assert!(display.contains("not a valid object name"));
    }

    #[test]
    fn test_error_display_source_tree_missing() {
        let error = Error::SourceTreeMissing {
            path: "/data/src".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Directory /data/src does not exist"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_str = "invalid: [unclosed";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: Error = yaml_error.into();
        let display = format!("{}", error);
        assert!(display.contains("YAML parsing error"));
    }
}
