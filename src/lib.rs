//! # Branch Migrate Library
//!
//! Core functionality for migrating a fleet of independently-versioned
//! repositories from one named branch to another while keeping two manifest
//! documents consistent with the new branch name: the repository list
//! manifest (`ros2.repos` shape, keyed `"org/name"`) and the distribution
//! manifest (`distribution.yaml` shape, keyed by name with nested
//! `doc`/`source` version records).
//!
//! ## Execution Flow
//!
//! The `run` command wires the modules together like this:
//!
//! 1. **Load** both manifests (`repos_file`, `distribution_file`). Parse
//!    failures are fatal; nothing has been mutated yet.
//! 2. **Prepare** an isolated output workspace (`workspace::prepare`): the
//!    source tree is deep-copied so all branch mutation happens against the
//!    copy.
//! 3. **Migrate** (`migrate::migrate`): for each rename pair and repository,
//!    conditionally create the target branch and update both manifests,
//!    collecting per-repository failures into three independent error logs
//!    instead of aborting the batch.
//! 4. **Write** the final manifests into the output directory
//!    (`workspace::write_manifests`) and report the error logs. Partial
//!    success is a valid terminal state.
//!
//! Manifest snapshots are persistent values: every update returns a new
//! snapshot and leaves the input untouched, which is what lets a failed
//! update simply keep the previous snapshot in play.
//!
//! Version-control operations go through the `git::VersionControl` trait;
//! production code shells out to system git, tests drive the loop with a
//! recording fake.

pub mod defaults;
pub mod distribution_file;
pub mod error;
pub mod git;
pub mod migrate;
pub mod repos_file;
pub mod workspace;
