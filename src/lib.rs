//! Isolated development environments for Phoenix feature worktrees.
//!
//! Each feature gets its own git worktree, branch, HTTP port, databases and
//! (optionally) PostgreSQL container, all derived deterministically from the
//! feature name and the Mix project's app name. See [`feature`] for the
//! naming and port rules and [`environment`] for telling the main checkout
//! apart from a feature worktree.
//!
//! The library API is not stable; it exists for the `wtenv` binary and its
//! tests.

pub mod config;
pub mod docker;
pub mod environment;
pub mod error;
pub mod feature;
pub mod git;
pub mod override_file;
pub mod path;
pub mod project;
pub mod shell_exec;
pub mod styling;
