//! Main-vs-worktree detection.
//!
//! The only state consulted is whether `config/dev.local.exs` exists under
//! the working directory and, if so, the first `port:` it declares. Reads go
//! through [`OverrideSource`] so detection can be tested without touching the
//! filesystem. Detection never writes and never fails: a malformed override
//! file yields a worktree with an unknown port.

use std::fmt;
use std::path::Path;

use crate::feature::MAIN_PORT;
use crate::override_file::{DEV_OVERRIDE_FILE, parse_port};

/// Read access to override files.
pub trait OverrideSource {
    fn exists(&self, path: &Path) -> bool;

    /// First `port:` declared in the file at `path`, if any.
    fn read_port(&self, path: &Path) -> Option<u32>;
}

/// [`OverrideSource`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOverrideSource;

impl OverrideSource for FsOverrideSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_port(&self, path: &Path) -> Option<u32> {
        match std::fs::read_to_string(path) {
            Ok(contents) => parse_port(&contents),
            Err(e) => {
                log::debug!("Could not read {}: {e}", path.display());
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EnvironmentKind {
    /// The main checkout, always on port 4000.
    Main { port: u32 },
    /// A feature worktree. `port` is `None` when the override file has no
    /// parseable `port:` yet.
    Worktree { port: Option<u32> },
}

impl EnvironmentKind {
    pub fn port(&self) -> Option<u32> {
        match self {
            Self::Main { port } => Some(*port),
            Self::Worktree { port } => *port,
        }
    }

    pub fn is_worktree(&self) -> bool {
        matches!(self, Self::Worktree { .. })
    }

    /// Port for display: the number, or `unknown`.
    pub fn port_display(&self) -> String {
        self.port()
            .map_or_else(|| "unknown".to_string(), |p| p.to_string())
    }
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main { .. } => f.write_str("main"),
            Self::Worktree { .. } => f.write_str("worktree"),
        }
    }
}

/// Classify `cwd` using `source` for all reads.
pub fn detect_environment_with(cwd: &Path, source: &impl OverrideSource) -> EnvironmentKind {
    let override_path = cwd.join(DEV_OVERRIDE_FILE);
    if !source.exists(&override_path) {
        return EnvironmentKind::Main { port: MAIN_PORT };
    }
    let port = source.read_port(&override_path);
    if port.is_none() {
        log::debug!(
            "{} has no port; reporting unknown",
            override_path.display()
        );
    }
    EnvironmentKind::Worktree { port }
}

/// Classify `cwd` against the real filesystem.
pub fn detect_environment(cwd: &Path) -> EnvironmentKind {
    detect_environment_with(cwd, &FsOverrideSource)
}
