//! Terminal output styling.
//!
//! Built on the anstyle ecosystem:
//! - anstream for auto-detecting color support (ANSI is stripped when piped)
//! - color-print `cformat!` for message markup
//!
//! ## stdout vs stderr principle
//!
//! - **stdout**: Primary data output (`wtenv port`, `wtenv list`, `wtenv status`)
//! - **stderr**: Status messages (progress, success, errors, hints, warnings)
//!
//! This separation allows `PORT=$(wtenv port login)` without status messages interfering.

mod constants;
mod format;
mod suggest;

// Re-exports from anstream (auto-detecting output)
pub use anstream::{eprint, eprintln, print, println};

pub use constants::*;
pub use format::format_with_gutter;
pub use suggest::suggest_command;

// ============================================================================
// Verbosity
// ============================================================================

use std::sync::atomic::{AtomicU8, Ordering};

/// Global verbosity level, set at startup.
/// 0 = normal, 1 = verbose (-v), 2+ = trace (-vv)
static VERBOSITY: AtomicU8 = AtomicU8::new(0);

/// Set the global verbosity level.
///
/// Call this once at startup after parsing CLI arguments.
pub fn set_verbosity(level: u8) {
    VERBOSITY.store(level, Ordering::Relaxed);
}

/// Get the current verbosity level.
pub fn verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

/// Get terminal width, or `usize::MAX` if detection fails.
///
/// Checks stderr first (status messages), then stdout, then `COLUMNS`.
/// When nothing is detected (piped context, no TTY), no wrapping happens.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) =
        terminal_size::terminal_size_of(std::io::stderr()).or_else(terminal_size::terminal_size)
    {
        return w as usize;
    }

    if let Ok(cols) = std::env::var("COLUMNS")
        && let Ok(width) = cols.parse::<usize>()
    {
        return width;
    }

    usize::MAX
}

/// Calculate visual width of a string, ignoring ANSI escape codes
///
/// Uses unicode-width for proper handling of wide characters (CJK, emoji).
pub fn visual_width(s: &str) -> usize {
    use ansi_str::AnsiStr;
    use unicode_width::UnicodeWidthStr;
    s.ansi_strip().width()
}
