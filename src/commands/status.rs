use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use wtenv::environment::{EnvironmentKind, detect_environment};
use wtenv::git::Repository;
use wtenv::override_file::{DEV_OVERRIDE_FILE, parse_database};
use wtenv::path::format_path_for_display;
use wtenv::styling::println;

use crate::cli::StatusFormat;

#[derive(Debug, Serialize)]
struct StatusReport {
    #[serde(flatten)]
    environment: EnvironmentKind,
    root: PathBuf,
    url: Option<String>,
    branch: Option<String>,
    /// Dev database from the override file (worktrees only).
    database: Option<String>,
}

impl StatusReport {
    fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("environment: {}", self.environment),
            format!("root:        {}", format_path_for_display(&self.root)),
            format!("port:        {}", self.environment.port_display()),
        ];
        if let Some(url) = &self.url {
            lines.push(format!("url:         {url}"));
        }
        lines.push(format!(
            "branch:      {}",
            self.branch.as_deref().unwrap_or("(detached)")
        ));
        if self.environment.is_worktree() {
            lines.push(format!(
                "database:    {}",
                self.database.as_deref().unwrap_or("unknown")
            ));
        }
        lines
    }
}

pub(crate) fn handle_status(format: StatusFormat) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let repo = Repository::at(&cwd);

    // Detection is relative to the checkout root, not a subdirectory; outside
    // git the working directory itself is classified.
    let root = repo.worktree_root().unwrap_or_else(|e| {
        log::debug!("Not in a git worktree ({e}); using {}", cwd.display());
        cwd.clone()
    });
    let environment = detect_environment(&root);
    let branch = repo.current_branch().ok().flatten();
    let database = if environment.is_worktree() {
        std::fs::read_to_string(root.join(DEV_OVERRIDE_FILE))
            .ok()
            .and_then(|contents| parse_database(&contents))
    } else {
        None
    };

    let report = StatusReport {
        url: environment.port().map(|p| format!("http://localhost:{p}")),
        environment,
        root,
        branch,
        database,
    };

    match format {
        StatusFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        StatusFormat::Text => {
            for line in report.lines() {
                println!("{line}");
            }
        }
    }
    Ok(())
}
