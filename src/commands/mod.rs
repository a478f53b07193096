pub(crate) mod context;
mod create;
mod init;
mod list;
mod port;
mod remove;
mod status;

use std::io::{self, Write};

use color_print::cformat;
use wtenv::styling::{eprint, eprintln, prompt_message};

pub(crate) use create::{CreateOptions, handle_create};
pub(crate) use init::handle_init;
pub(crate) use list::handle_list;
pub(crate) use port::handle_port;
pub(crate) use remove::{RemoveOptions, handle_remove};
pub(crate) use status::handle_status;

/// Ask a `[y/N]` question on stderr and read the answer from stdin.
///
/// Only `y` / `yes` (any case) count as consent; EOF is a no.
pub(crate) fn confirm(question: &str) -> anyhow::Result<bool> {
    eprint!("{} ", prompt_message(cformat!("{question} <bold>[y/N]</>")));
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    // End the prompt line on stderr (user's input went to stdin, not stderr)
    eprintln!();

    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
