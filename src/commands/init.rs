use std::path::Path;

use anyhow::Context;
use color_print::cformat;
use wtenv::git::Repository;
use wtenv::override_file::{IMPORT_MARKER, import_block};
use wtenv::project::MixProject;
use wtenv::styling::{eprintln, hint_message, info_message, success_message, warning_message};

/// Pattern that keeps generated override files out of commits.
const GITIGNORE_ENTRY: &str = "/config/*.local.exs";

/// `(config file, override it should import)`, relative to the main root.
const IMPORTS: [(&str, &str); 2] = [
    ("config/dev.exs", "dev.local.exs"),
    ("config/test.exs", "test.local.exs"),
];

pub(crate) fn handle_init() -> anyhow::Result<()> {
    let root = Repository::current()?.main_worktree_root()?;
    // Fails early outside a Mix project
    MixProject::load(&root)?;

    let mut changed = false;
    for (config_file, local_file) in IMPORTS {
        let path = root.join(config_file);
        let Some(contents) = read_optional(&path)? else {
            eprintln!(
                "{}",
                warning_message(cformat!("<bold>{config_file}</> not found; skipped"))
            );
            continue;
        };
        match with_import_block(&contents, local_file) {
            Some(updated) => {
                write(&path, &updated)?;
                eprintln!(
                    "{}",
                    success_message(cformat!(
                        "Added <bold>{local_file}</> import to <bold>{config_file}</>"
                    ))
                );
                changed = true;
            }
            None => eprintln!(
                "{}",
                info_message(cformat!("<bold>{config_file}</> already imports overrides"))
            ),
        }
    }

    let gitignore = root.join(".gitignore");
    let contents = read_optional(&gitignore)?.unwrap_or_default();
    match with_gitignore_entry(&contents) {
        Some(updated) => {
            write(&gitignore, &updated)?;
            eprintln!(
                "{}",
                success_message(cformat!("Added <bold>{GITIGNORE_ENTRY}</> to .gitignore"))
            );
            changed = true;
        }
        None => eprintln!(
            "{}",
            info_message(".gitignore already ignores override files")
        ),
    }

    if changed {
        eprintln!(
            "{}",
            hint_message("Commit these changes so new worktrees pick them up")
        );
    }
    Ok(())
}

fn read_optional(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn write(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// `contents` with the import block appended, or `None` if already present.
fn with_import_block(contents: &str, local_file: &str) -> Option<String> {
    if contents.contains(IMPORT_MARKER) {
        return None;
    }
    let mut updated = contents.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&import_block(local_file));
    Some(updated)
}

/// `contents` with the override pattern added, or `None` if already present.
fn with_gitignore_entry(contents: &str) -> Option<String> {
    if contents.lines().any(|line| line.trim() == GITIGNORE_ENTRY) {
        return None;
    }
    let mut updated = contents.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(GITIGNORE_ENTRY);
    updated.push('\n');
    Some(updated)
}
