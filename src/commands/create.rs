use std::net::TcpListener;
use std::path::Path;
use std::process::Stdio;

use anyhow::Context;
use color_print::cformat;
use wtenv::config::Isolation;
use wtenv::docker::{Docker, READY_TIMEOUT};
use wtenv::environment::detect_environment;
use wtenv::error::WtenvError;
use wtenv::feature::{MAIN_PORT, PortAssignment};
use wtenv::override_file::{
    DEV_OVERRIDE_FILE, DatabaseTarget, TEST_OVERRIDE_FILE, render_dev, render_test,
};
use wtenv::path::format_path_for_display;
use wtenv::shell_exec::{ShellConfig, run_inherited};
use wtenv::styling::{
    eprintln, format_with_gutter, hint_message, info_message, progress_message, success_message,
    suggest_command, warning_message,
};

use super::context::{Feature, ProjectContext};

pub(crate) struct CreateOptions {
    pub feature: String,
    pub port: Option<u32>,
    pub base: Option<String>,
    pub container: bool,
    pub no_setup: bool,
}

pub(crate) fn handle_create(opts: CreateOptions) -> anyhow::Result<()> {
    let ctx = ProjectContext::load()?;
    let feature = ctx.feature(&opts.feature)?;
    let id = &feature.identity;
    let isolation = if opts.container {
        Isolation::Container
    } else {
        ctx.settings.isolation
    };
    let ports = PortAssignment::new(&id.safe_name, opts.port);

    // Nothing is touched until every collision check has passed.
    if feature.path.exists() {
        return Err(WtenvError::WorktreeDirExists {
            path: feature.path.clone(),
        }
        .into());
    }
    if ctx.repo.local_branch_exists(&id.branch_name)? {
        return Err(WtenvError::BranchAlreadyExists {
            branch: id.branch_name.clone(),
        }
        .into());
    }
    let docker = match isolation {
        Isolation::Container => {
            let docker = Docker::locate()?;
            if docker.container_exists(&id.container_name)? {
                return Err(WtenvError::ContainerAlreadyExists {
                    container: id.container_name.clone(),
                }
                .into());
            }
            Some(docker)
        }
        Isolation::Shared => None,
    };

    warn_port_conflicts(&ctx, &feature, ports.app_port)?;

    eprintln!(
        "{}",
        progress_message(cformat!(
            "Creating worktree for <bold>{}</> at <bold>{}</>...",
            id.branch_name,
            format_path_for_display(&feature.path)
        ))
    );
    ctx.repo
        .add_worktree(&id.branch_name, &feature.path, opts.base.as_deref())?;

    let db = match &docker {
        Some(docker) => {
            let settings = &ctx.settings.database;
            eprintln!(
                "{}",
                progress_message(cformat!(
                    "Starting <bold>{}</> ({}) on port {}...",
                    id.container_name,
                    settings.image,
                    ports.db_port
                ))
            );
            docker.run_postgres(&id.container_name, settings, ports.db_port)?;
            docker.wait_until_ready(&id.container_name, &settings.username, READY_TIMEOUT)?;
            DatabaseTarget {
                hostname: "localhost".to_string(),
                port: ports.db_port,
                username: settings.username.clone(),
                password: settings.password.clone(),
            }
        }
        None => DatabaseTarget {
            hostname: ctx.settings.database.host.clone(),
            port: ctx.settings.database.port,
            username: ctx.settings.database.username.clone(),
            password: ctx.settings.database.password.clone(),
        },
    };

    write_override(
        &feature.path,
        DEV_OVERRIDE_FILE,
        &render_dev(&ctx.project, id, ports.app_port, &db),
    )?;
    write_override(
        &feature.path,
        TEST_OVERRIDE_FILE,
        &render_test(&ctx.project, id, &db),
    )?;

    if opts.no_setup {
        log::debug!("Skipping setup commands");
    } else {
        run_setup(&ctx.settings.setup, &feature.path)?;
    }

    print_summary(&feature, &ports, docker.is_some());
    Ok(())
}

fn write_override(root: &Path, relative: &str, contents: &str) -> anyhow::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Warn when `port` is likely taken. Never fails the command on a conflict.
fn warn_port_conflicts(ctx: &ProjectContext, feature: &Feature, port: u32) -> anyhow::Result<()> {
    if port == MAIN_PORT {
        eprintln!(
            "{}",
            warning_message(cformat!(
                "Port <bold>{port}</> is the main checkout's port"
            ))
        );
    }

    let suggested_port = port.saturating_add(1).to_string();
    for wt in ctx.repo.list_worktrees()? {
        if wt.path == feature.path || wt.path == ctx.main_root {
            continue;
        }
        let env = detect_environment(&wt.path);
        if env.is_worktree() && env.port() == Some(port) {
            let owner = wt
                .branch
                .clone()
                .unwrap_or_else(|| format_path_for_display(&wt.path));
            eprintln!(
                "{}",
                warning_message(cformat!(
                    "Port <bold>{port}</> is already assigned to <bold>{owner}</>"
                ))
            );
            eprintln!(
                "{}",
                hint_message(cformat!(
                    "Pass an explicit port, e.g. <bright-black>{}</>",
                    suggest_command(
                        "create",
                        &[feature.identity.raw_name.as_str(), suggested_port.as_str()],
                        &[]
                    )
                ))
            );
        }
    }

    if port_in_use(port) {
        eprintln!(
            "{}",
            warning_message(cformat!(
                "Port <bold>{port}</> is currently in use on 127.0.0.1"
            ))
        );
    }
    Ok(())
}

/// Whether binding `127.0.0.1:<port>` fails right now.
///
/// Ports outside the TCP range count as unavailable.
fn port_in_use(port: u32) -> bool {
    match u16::try_from(port) {
        Ok(port) => TcpListener::bind(("127.0.0.1", port)).is_err(),
        Err(_) => true,
    }
}

/// Run setup commands in the new worktree, stopping at the first failure.
fn run_setup(commands: &[String], worktree: &Path) -> anyhow::Result<()> {
    let shell = ShellConfig::get();
    let context = worktree
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());

    for command in commands {
        eprintln!(
            "{}",
            progress_message(cformat!("Running <bold>{command}</>..."))
        );
        let mut cmd = shell.command(command);
        cmd.current_dir(worktree)
            .env("MIX_ENV", "dev")
            .stdin(Stdio::null())
            // Keep stdout for wtenv's own output
            .stdout(std::io::stderr());

        let status = run_inherited(&mut cmd, context.as_deref())
            .with_context(|| format!("Failed to run {} via {}", command, shell.name))?;
        if !status.success() {
            return Err(WtenvError::SetupCommandFailed {
                command: command.clone(),
                exit_code: status.code(),
                worktree: worktree.to_path_buf(),
            }
            .into());
        }
    }
    Ok(())
}

fn print_summary(feature: &Feature, ports: &PortAssignment, container: bool) {
    let id = &feature.identity;
    let path = format_path_for_display(&feature.path);

    eprintln!(
        "{}",
        success_message(cformat!(
            "Created <bold>{}</> at <bold>{path}</>",
            id.safe_name
        ))
    );

    let mut details = vec![
        format!("branch:    {}", id.branch_name),
        format!("url:       http://localhost:{}", ports.app_port),
        format!("dev db:    {}", id.dev_db_name),
        format!("test db:   {}", id.test_db_name),
    ];
    if container {
        details.push(format!(
            "container: {} (port {})",
            id.container_name, ports.db_port
        ));
    }
    eprintln!("{}", format_with_gutter(&details.join("\n"), None));

    eprintln!(
        "{}",
        info_message(cformat!(
            "Start it with <bright-black>cd {path} && mix phx.server</>"
        ))
    );
}
