//! Style constants and symbols for terminal output
//!
//! # Styling with color-print
//!
//! Use `cformat!` with HTML-like tags for all user-facing messages:
//!
//! ```
//! use color_print::cformat;
//!
//! let feature = "login";
//! let msg = cformat!("<green>Created worktree for <bold>{feature}</></>");
//!
//! // Semantic mapping:
//! // - Errors: <red>...</>
//! // - Warnings: <yellow>...</>
//! // - Hints: <dim>...</>
//! // - Progress: <cyan>...</>
//! // - Success: <green>...</>
//! ```

use anstyle::{AnsiColor, Color, Style};
use color_print::{cformat, cstr};
use std::fmt;

/// Gutter style for quoted content (generated files, command output)
pub const GUTTER: Style = Style::new().bg_color(Some(Color::Ansi(AnsiColor::BrightWhite)));

// Leading symbols, one per message kind. Text after the symbol takes the
// symbol's color, except info and prompt lines which stay neutral.
const PROGRESS_SYMBOL: &str = cstr!("<cyan>◎</>");
const SUCCESS_SYMBOL: &str = cstr!("<green>✓</>");
const ERROR_SYMBOL: &str = cstr!("<red>✗</>");
const WARNING_SYMBOL: &str = cstr!("<yellow>▲</>");
const HINT_SYMBOL: &str = cstr!("<dim>↳</>");
const INFO_SYMBOL: &str = cstr!("<dim>○</>");
const PROMPT_SYMBOL: &str = cstr!("<cyan>❯</>");

// ============================================================================
// Formatted Message Type
// ============================================================================

/// A message that has already been formatted with a symbol and styling.
///
/// Message functions take `impl AsRef<str>` and return `FormattedMessage`.
/// Since `FormattedMessage` does NOT implement `AsRef<str>`, passing it to a
/// message function is a compile error, which prevents double-formatting.
///
/// ```compile_fail
/// use wtenv::styling::error_message;
///
/// let msg = error_message("first error");
/// let double = error_message(msg);
/// ```
#[derive(Debug, Clone)]
pub struct FormattedMessage(String);

impl FormattedMessage {
    /// Borrow the inner string for inspection (e.g., in tests).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormattedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format an error message with symbol and red styling
///
/// ```
/// use color_print::cformat;
/// use wtenv::styling::error_message;
///
/// let branch = "feature/login";
/// println!("{}", error_message(cformat!("Branch <bold>{branch}</> already exists")));
/// ```
pub fn error_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{ERROR_SYMBOL} <red>{}</>", content.as_ref()))
}

pub fn hint_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{HINT_SYMBOL} <dim>{}</>", content.as_ref()))
}

pub fn warning_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{WARNING_SYMBOL} <yellow>{}</>", content.as_ref()))
}

pub fn success_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{SUCCESS_SYMBOL} <green>{}</>", content.as_ref()))
}

/// `◎ Doing something...` for steps that shell out.
pub fn progress_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(cformat!("{PROGRESS_SYMBOL} <cyan>{}</>", content.as_ref()))
}

/// Neutral status; only the symbol is styled.
pub fn info_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(format!("{INFO_SYMBOL} {}", content.as_ref()))
}

/// A question awaiting input. Callers print it without a trailing newline.
pub fn prompt_message(content: impl AsRef<str>) -> FormattedMessage {
    FormattedMessage(format!("{PROMPT_SYMBOL} {}", content.as_ref()))
}
