//! Git operations through the `git` CLI

use std::path::PathBuf;

use serde::Serialize;

mod parse;
mod repository;

pub use repository::Repository;

/// One entry of `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worktree {
    pub path: PathBuf,
    pub head: String,
    /// Branch name without `refs/heads/`; `None` when detached.
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
    pub locked: Option<String>,
    pub prunable: Option<String>,
}

impl Worktree {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            head: String::new(),
            branch: None,
            bare: false,
            detached: false,
            locked: None,
            prunable: None,
        }
    }
}
