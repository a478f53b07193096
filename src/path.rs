use std::path::{Path, PathBuf};

use normalize_path::NormalizePath;

/// Get the user's home directory.
///
/// Uses the `home` crate which handles platform-specific detection:
/// - Unix: `$HOME` environment variable
/// - Windows: `USERPROFILE` or `HOMEDRIVE`/`HOMEPATH`
pub fn home_dir() -> Option<PathBuf> {
    home::home_dir()
}

/// Format a filesystem path for user-facing output.
///
/// Replaces home directory prefix with `~` (e.g., `/Users/alex/projects/app` -> `~/projects/app`).
/// Paths outside home are returned unchanged.
pub fn format_path_for_display(path: &Path) -> String {
    if let Some(home) = home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }

        let mut display_path = PathBuf::from("~");
        display_path.push(stripped);
        return display_path.display().to_string();
    }

    path.display().to_string()
}

/// Resolve a worktree directory (e.g. `../myapp_login`) against the main
/// worktree root, collapsing `..` without touching the filesystem.
///
/// The target usually does not exist yet, so `canonicalize` is not an option.
pub fn resolve_worktree_dir(root: &Path, relative: &Path) -> PathBuf {
    root.join(relative).normalize()
}

/// Canonicalize an existing path without Windows verbatim prefixes.
///
/// Falls back to the input when the path cannot be resolved.
pub fn canonicalize_or_keep(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
