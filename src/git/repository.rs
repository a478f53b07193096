use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Context;

use super::Worktree;
use crate::error::WtenvError;
use crate::path::canonicalize_or_keep;

/// A git repository addressed by any directory inside it.
///
/// Every query shells out to `git` with `current_dir` set to that directory,
/// so the same struct works from the main checkout or a linked worktree.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Repository for the process working directory (already moved by `-C`).
    pub fn current() -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Ok(Self::at(cwd))
    }

    fn logging_context(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string())
    }

    /// Root of the worktree containing the base path.
    pub fn worktree_root(&self) -> anyhow::Result<PathBuf> {
        let stdout = self.run_command(&["rev-parse", "--show-toplevel"])?;
        Ok(canonicalize_or_keep(Path::new(stdout.trim())))
    }

    /// All non-bare worktrees, main worktree first.
    pub fn list_worktrees(&self) -> anyhow::Result<Vec<Worktree>> {
        let stdout = self.run_command(&["worktree", "list", "--porcelain"])?;
        Ok(Worktree::parse_porcelain_list(&stdout)
            .into_iter()
            .filter(|wt| !wt.bare)
            .collect())
    }

    /// Root of the main worktree.
    ///
    /// Git always lists the main worktree first, whichever worktree the
    /// command runs from.
    pub fn main_worktree_root(&self) -> anyhow::Result<PathBuf> {
        let stdout = self.run_command(&["worktree", "list", "--porcelain"])?;
        let main = Worktree::parse_porcelain_list(&stdout)
            .into_iter()
            .next()
            .with_context(|| {
                format!(
                    "git worktree list returned no worktrees for {}",
                    self.path.display()
                )
            })?;
        Ok(canonicalize_or_keep(&main.path))
    }

    /// Registered worktree at `dir`, if any.
    pub fn worktree_at(&self, dir: &Path) -> anyhow::Result<Option<Worktree>> {
        let target = canonicalize_or_keep(dir);
        Ok(self
            .list_worktrees()?
            .into_iter()
            .find(|wt| canonicalize_or_keep(&wt.path) == target))
    }

    /// Current branch, `None` in detached HEAD state.
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        let stdout = self.run_command(&["branch", "--show-current"])?;
        let branch = stdout.trim();
        Ok((!branch.is_empty()).then(|| branch.to_string()))
    }

    /// Whether `refs/heads/<branch>` exists. Remote branches are not consulted.
    pub fn local_branch_exists(&self, branch: &str) -> anyhow::Result<bool> {
        self.run_command_check(&[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("refs/heads/{branch}"),
        ])
    }

    /// Paths with uncommitted changes, untracked files included.
    pub fn changed_paths(&self) -> anyhow::Result<Vec<String>> {
        let stdout = self.run_command(&["status", "--porcelain", "--untracked-files=all"])?;
        Ok(stdout
            .lines()
            .filter_map(|line| line.get(3..))
            .map(|path| match path.split_once(" -> ") {
                // Renames report `old -> new`
                Some((_, new)) => new.to_string(),
                None => path.to_string(),
            })
            .collect())
    }

    /// `git worktree add -b <branch> <dir> [<base>]`
    pub fn add_worktree(&self, branch: &str, dir: &Path, base: Option<&str>) -> anyhow::Result<()> {
        let dir_str = dir.to_string_lossy();
        let mut args = vec!["worktree", "add", "-b", branch, dir_str.as_ref()];
        if let Some(base) = base {
            args.push(base);
        }
        self.run_command(&args)?;
        Ok(())
    }

    pub fn remove_worktree(&self, dir: &Path, force: bool) -> anyhow::Result<()> {
        let dir_str = dir.to_string_lossy();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(dir_str.as_ref());
        self.run_command(&args)?;
        Ok(())
    }

    /// Forget worktrees whose directories no longer exist.
    pub fn prune_worktrees(&self) -> anyhow::Result<()> {
        self.run_command(&["worktree", "prune"])?;
        Ok(())
    }

    /// `git branch -d` (or `-D` when forced).
    pub fn delete_branch(&self, branch: &str, force: bool) -> anyhow::Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run_command(&["branch", flag, branch])?;
        Ok(())
    }

    /// Run a git command and return stdout.
    ///
    /// A missing `git` binary maps to [`WtenvError::ToolNotFound`]; a non-zero
    /// exit maps to [`WtenvError::CommandFailed`] carrying git's message.
    pub fn run_command(&self, args: &[&str]) -> anyhow::Result<String> {
        use crate::shell_exec::run;

        let mut cmd = Command::new("git");
        cmd.args(args);
        cmd.current_dir(&self.path);

        let output = match run(&mut cmd, Some(&self.logging_context())) {
            Ok(output) => output,
            Err(e) if is_missing_git(&e) => {
                return Err(WtenvError::ToolNotFound { tool: "git".into() }.into());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to execute: git {}", args.join(" ")));
            }
        };

        if !output.status.success() {
            // Git uses \r for progress updates
            let stderr = String::from_utf8_lossy(&output.stderr).replace('\r', "\n");
            for line in stderr.trim().lines() {
                log::debug!("  ! {}", line);
            }
            // Some git commands print errors to stdout
            let stdout = String::from_utf8_lossy(&output.stdout);
            let message = [stderr.trim(), stdout.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(WtenvError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                exit_code: output.status.code(),
                stderr: message,
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a git command and report only whether it succeeded.
    pub fn run_command_check(&self, args: &[&str]) -> anyhow::Result<bool> {
        use crate::shell_exec::run;

        let mut cmd = Command::new("git");
        cmd.args(args);
        cmd.current_dir(&self.path);

        match run(&mut cmd, Some(&self.logging_context())) {
            Ok(output) => Ok(output.status.success()),
            Err(e) if is_missing_git(&e) => {
                Err(WtenvError::ToolNotFound { tool: "git".into() }.into())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to execute: git {}", args.join(" "))),
        }
    }
}

/// Spawn failed because `git` itself is missing, not the working directory.
fn is_missing_git(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::NotFound && which::which("git").is_err()
}
