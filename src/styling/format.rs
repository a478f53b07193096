//! Gutter formatting for quoted content
//!
//! Generated config files and failing command output are shown with a
//! one-column colored gutter so they stand apart from status messages.

use super::{get_terminal_width, visual_width};

/// Wraps text at word boundaries to fit within the specified width
///
/// Width calculation ignores ANSI escape codes. A single word longer than
/// `max_width` is kept whole on its own line.
fn wrap_text_at_width(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 || visual_width(text) <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = visual_width(word);

        if current_line.is_empty() {
            current_line = word.to_string();
            current_width = word_width;
        } else if current_width + 1 + word_width <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
            current_width += 1 + word_width;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
            current_width = word_width;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Formats text with a gutter (single-space with background color) on each line
///
/// `max_width` overrides terminal detection (used in tests).
///
/// ```
/// use wtenv::styling::format_with_gutter;
///
/// print!("{}", format_with_gutter("import Config", Some(80)));
/// ```
pub fn format_with_gutter(content: &str, max_width: Option<usize>) -> String {
    let gutter = super::GUTTER;
    let term_width = max_width.unwrap_or_else(get_terminal_width);

    // Account for gutter (1) + space (1)
    let available_width = term_width.saturating_sub(2);

    content
        .lines()
        .flat_map(|line| {
            wrap_text_at_width(line, available_width)
                .into_iter()
                .map(|wrapped_line| format!("{gutter} {gutter:#} {wrapped_line}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
