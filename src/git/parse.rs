//! Git output parsing functions

use std::path::PathBuf;

use super::Worktree;

impl Worktree {
    /// Parse `git worktree list --porcelain`.
    ///
    /// Attributes before the first `worktree` line and unknown attributes are
    /// ignored for forward compatibility.
    pub(crate) fn parse_porcelain_list(output: &str) -> Vec<Self> {
        let mut worktrees = Vec::new();
        let mut current: Option<Worktree> = None;

        for line in output.lines() {
            if line.is_empty() {
                if let Some(wt) = current.take() {
                    worktrees.push(wt);
                }
                continue;
            }

            let (key, value) = match line.split_once(' ') {
                Some((k, v)) => (k, Some(v)),
                None => (line, None),
            };

            match (key, current.as_mut()) {
                ("worktree", _) => {
                    if let Some(wt) = current.take() {
                        worktrees.push(wt);
                    }
                    match value {
                        Some(path) => current = Some(Worktree::new(PathBuf::from(path))),
                        None => log::debug!("worktree line missing path"),
                    }
                }
                ("HEAD", Some(wt)) => {
                    wt.head = value.unwrap_or_default().to_string();
                }
                ("branch", Some(wt)) => {
                    // Strip refs/heads/ prefix if present
                    wt.branch = value.map(|branch_ref| {
                        branch_ref
                            .strip_prefix("refs/heads/")
                            .unwrap_or(branch_ref)
                            .to_string()
                    });
                }
                ("bare", Some(wt)) => wt.bare = true,
                ("detached", Some(wt)) => wt.detached = true,
                ("locked", Some(wt)) => wt.locked = Some(value.unwrap_or_default().to_string()),
                ("prunable", Some(wt)) => {
                    wt.prunable = Some(value.unwrap_or_default().to_string());
                }
                _ => {}
            }
        }

        // Push the last worktree if the output doesn't end with a blank line
        if let Some(wt) = current {
            worktrees.push(wt);
        }

        worktrees
    }
}
