//! Implementations of the CLI subcommands.

pub mod run;
