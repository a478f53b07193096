use std::io::Write;
use std::process;

use clap::{CommandFactory, Parser};
use color_print::cformat;
use wtenv::config::set_config_path;
use wtenv::error::WtenvError;
use wtenv::path::format_path_for_display;
use wtenv::styling::{eprintln, error_message, format_with_gutter, set_verbosity, verbosity};

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{
    CreateOptions, RemoveOptions, handle_create, handle_init, handle_list, handle_port,
    handle_remove, handle_status,
};

/// `RUST_LOG` wins when set; otherwise `-v` raises the level from `warn`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(buf, "{style}{}{style:#} {}", record.level(), record.args())
        })
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Create {
            feature,
            port,
            base,
            container,
            no_setup,
        } => handle_create(CreateOptions {
            feature,
            port,
            base,
            container,
            no_setup,
        }),
        Commands::Remove {
            feature,
            yes,
            force,
            keep_branch,
            drop_db,
        } => handle_remove(RemoveOptions {
            feature,
            yes,
            force,
            keep_branch,
            drop_db,
        }),
        Commands::List { format } => handle_list(format),
        Commands::Status { format } => handle_status(format),
        Commands::Port {
            feature,
            port,
            container,
        } => handle_port(&feature, port, container),
        Commands::Init => handle_init(),
    }
}

fn print_error(err: &anyhow::Error) {
    if let Some(err) = err.downcast_ref::<WtenvError>() {
        // Already styled
        eprintln!("{err}");
        return;
    }

    eprintln!("{}", error_message(err.to_string()));
    let causes: Vec<String> = err.chain().skip(1).map(|c| c.to_string()).collect();
    if !causes.is_empty() {
        eprintln!("{}", format_with_gutter(&causes.join("\n"), None));
    }
    if verbosity() > 1 {
        eprintln!("{err:?}");
    }
}

fn main() {
    let cli = Cli::parse();

    set_verbosity(cli.verbose);
    init_logging(cli.verbose);

    if let Some(dir) = &cli.directory
        && let Err(e) = std::env::set_current_dir(dir)
    {
        eprintln!(
            "{}",
            error_message(cformat!(
                "Cannot change to <bold>{}</>: {e}",
                format_path_for_display(dir)
            ))
        );
        process::exit(1);
    }

    if let Some(config) = cli.config {
        set_config_path(config);
    }

    let Some(command) = cli.command else {
        // arg_required_else_help covers a bare `wtenv`; this handles `wtenv -v`
        let _ = Cli::command().print_help();
        process::exit(2);
    };

    if let Err(err) = run(command) {
        print_error(&err);
        process::exit(1);
    }
}
