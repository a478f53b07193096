//! Command suggestion helpers for hint messages.
//!
//! Build copy-pasteable commands for user suggestions:
//!
//! ```
//! use wtenv::styling::suggest_command;
//!
//! let cmd = suggest_command("remove", &["login"], &["--force"]);
//! assert_eq!(cmd, "wtenv remove login --force");
//!
//! // Spaces are quoted
//! let cmd = suggest_command("create", &["my feature"], &[]);
//! assert_eq!(cmd, "wtenv create 'my feature'");
//! ```

use shell_escape::escape;
use std::borrow::Cow;

/// Build a suggested command string for hints.
///
/// Arguments are shell-escaped. If any positional argument starts with `-`,
/// a `--` separator is inserted before it so clap does not read it as a flag.
/// Global flags like `-C` are intentionally left out.
pub fn suggest_command(subcommand: &str, args: &[&str], flags: &[&str]) -> String {
    let mut parts = vec!["wtenv".to_string(), subcommand.to_string()];

    let needs_separator = args.iter().any(|arg| arg.starts_with('-'));
    let mut separator_inserted = false;

    for arg in args {
        if needs_separator && arg.starts_with('-') && !separator_inserted {
            parts.push("--".to_string());
            separator_inserted = true;
        }
        parts.push(escape(Cow::Borrowed(*arg)).into_owned());
    }

    parts.extend(flags.iter().map(|s| s.to_string()));
    parts.join(" ")
}
