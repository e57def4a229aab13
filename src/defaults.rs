//! Default values for the branch-migrate CLI.
//!
//! This module centralizes the conventional local data layout used across
//! commands, ensuring consistency and avoiding duplication.

/// Default path of the repository list manifest.
pub const DEFAULT_REPOS_PATH: &str = "data/ros2.repos";

/// Default path of the distribution manifest.
pub const DEFAULT_DISTRIBUTION_PATH: &str = "data/distribution.yaml";

/// Default root directory holding one working copy per repository, laid out
/// as `<root>/<org>/<name>`.
pub const DEFAULT_SOURCE_PATH: &str = "data/src";

/// Default output directory.
pub const DEFAULT_OUTPUT_PATH: &str = "out";

/// Branch rename pairs applied by the run command, in order. The `-devel`
/// pair exists because the anchored find patterns deliberately do not match
/// suffixed branch names.
pub const DEFAULT_BRANCH_RENAMES: &[(&str, &str)] = &[
    ("galactic", "humble"),
    ("galactic-devel", "humble-devel"),
];
