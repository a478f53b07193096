use clap::builder::styling::{AnsiColor, Color, Styles};
use clap::{Parser, Subcommand};

/// Custom styles for help output - matches wtenv's color scheme
fn help_styles() -> Styles {
    Styles::styled()
        .header(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .usage(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum ListFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON output
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum StatusFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// JSON output
    Json,
}

#[derive(Parser)]
#[command(name = "wtenv")]
#[command(about = "Isolated Phoenix environments for git worktrees", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
#[command(styles = help_styles())]
#[command(arg_required_else_help = true)]
#[command(after_long_help = "\
Getting started

  wtenv init                     # Make the main checkout load per-worktree overrides
  wtenv create user-management   # Worktree, branch, port and databases
  wtenv list                     # Show feature worktrees and their ports
  wtenv remove user-management   # Tear it all down again")]
pub(crate) struct Cli {
    /// Working directory for this command
    #[arg(
        short = 'C',
        global = true,
        value_name = "path",
        display_order = 100,
        help_heading = "Global Options"
    )]
    pub directory: Option<std::path::PathBuf>,

    /// User config file path
    #[arg(
        long,
        global = true,
        value_name = "path",
        display_order = 101,
        help_heading = "Global Options"
    )]
    pub config: Option<std::path::PathBuf>,

    /// Show debug info (-v), or also trace (-vv)
    #[arg(
        long,
        short = 'v',
        global = true,
        action = clap::ArgAction::Count,
        display_order = 102,
        help_heading = "Global Options"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create a feature worktree with its own port and databases
    ///
    /// Adds `../<app>_<feature>` on branch `feature/<feature>`, writes
    /// `config/dev.local.exs` and `config/test.local.exs` into it, and runs
    /// the configured setup commands.
    #[command(after_long_help = "\
Examples

  wtenv create user-management          # Port derived from the name
  wtenv create billing 4300             # Explicit port
  wtenv create search --base develop    # Branch off develop
  wtenv create reports --container      # Dedicated PostgreSQL container")]
    Create {
        /// Feature name (letters, digits, '-' and '_')
        feature: String,

        /// Application port (derived from the name when omitted)
        port: Option<u32>,

        /// Ref to branch from (defaults to HEAD of the main checkout)
        #[arg(long, value_name = "ref")]
        base: Option<String>,

        /// Run PostgreSQL in a dedicated container
        #[arg(long)]
        container: bool,

        /// Skip the setup commands
        #[arg(long)]
        no_setup: bool,
    },

    /// Remove a feature's worktree, branch and container
    Remove {
        /// Feature name
        feature: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,

        /// Remove a dirty worktree and an unmerged branch
        #[arg(short = 'f', long)]
        force: bool,

        /// Keep the feature branch
        #[arg(long)]
        keep_branch: bool,

        /// Drop the feature's databases first (shared isolation)
        #[arg(long)]
        drop_db: bool,
    },

    /// List feature worktrees
    List {
        /// Output format (table, json)
        #[arg(long, value_enum, default_value = "table", hide_possible_values = true)]
        format: ListFormat,
    },

    /// Show the environment of the current checkout
    Status {
        /// Output format (text, json)
        #[arg(long, value_enum, default_value = "text", hide_possible_values = true)]
        format: StatusFormat,
    },

    /// Print the port a feature would use
    Port {
        /// Feature name
        feature: String,

        /// Explicit port, echoed back
        port: Option<u32>,

        /// Also print the container database port
        #[arg(long)]
        container: bool,
    },

    /// Make the main checkout import per-worktree overrides
    Init,
}
