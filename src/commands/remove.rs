use anyhow::Context;
use color_print::cformat;
use wtenv::docker::Docker;
use wtenv::error::WtenvError;
use wtenv::git::Repository;
use wtenv::override_file::{DEV_OVERRIDE_FILE, TEST_OVERRIDE_FILE};
use wtenv::path::format_path_for_display;
use wtenv::shell_exec::{ShellConfig, run_inherited};
use wtenv::styling::{
    eprintln, format_with_gutter, info_message, progress_message, success_message,
    warning_message,
};

use super::confirm;
use super::context::{Feature, ProjectContext};

pub(crate) struct RemoveOptions {
    pub feature: String,
    pub yes: bool,
    pub force: bool,
    pub keep_branch: bool,
    pub drop_db: bool,
}

/// What currently exists for a feature.
struct Existing {
    /// Directory is present on disk.
    dir: bool,
    /// Directory is a registered git worktree.
    worktree: bool,
    branch: bool,
    container: Option<Docker>,
}

impl Existing {
    fn is_empty(&self) -> bool {
        !self.dir && !self.worktree && !self.branch && self.container.is_none()
    }
}

pub(crate) fn handle_remove(opts: RemoveOptions) -> anyhow::Result<()> {
    let ctx = ProjectContext::load()?;
    let feature = ctx.feature(&opts.feature)?;
    let id = &feature.identity;

    let existing = Existing {
        dir: feature.path.exists(),
        worktree: ctx.repo.worktree_at(&feature.path)?.is_some(),
        branch: ctx.repo.local_branch_exists(&id.branch_name)?,
        container: find_container(&id.container_name)?,
    };
    if existing.is_empty() {
        return Err(WtenvError::FeatureNotFound {
            feature: id.safe_name.clone(),
        }
        .into());
    }

    let plan = removal_plan(&feature, &existing, &opts);
    if !opts.yes {
        eprintln!(
            "{}",
            info_message(cformat!("Removing <bold>{}</>:", id.safe_name))
        );
        eprintln!("{}", format_with_gutter(&plan.join("\n"), None));
        if !confirm("Proceed?")? {
            eprintln!("{}", info_message("Cancelled"));
            return Ok(());
        }
    }

    if opts.drop_db {
        if existing.container.is_some() {
            log::debug!("Databases live in {}; removing the container drops them", id.container_name);
        } else if existing.dir {
            drop_databases(&feature)?;
        } else {
            eprintln!(
                "{}",
                warning_message("Worktree is gone, so its databases cannot be dropped with mix")
            );
        }
    }

    if let Some(docker) = &existing.container {
        eprintln!(
            "{}",
            progress_message(cformat!("Removing container <bold>{}</>...", id.container_name))
        );
        docker.remove_container(&id.container_name)?;
    }

    if existing.worktree && !existing.dir {
        // Directory deleted by hand; drop git's stale record
        ctx.repo.prune_worktrees()?;
    } else if existing.worktree {
        // The generated override files alone don't make a worktree dirty
        let force = opts.force || only_overrides_changed(&feature)?;
        ctx.repo.remove_worktree(&feature.path, force)?;
    } else if existing.dir {
        eprintln!(
            "{}",
            warning_message(cformat!(
                "<bold>{}</> is not a git worktree; leaving it in place",
                format_path_for_display(&feature.path)
            ))
        );
    }

    if existing.branch && !opts.keep_branch {
        ctx.repo.delete_branch(&id.branch_name, opts.force)?;
    }

    eprintln!(
        "{}",
        success_message(cformat!("Removed <bold>{}</>", id.safe_name))
    );
    Ok(())
}

/// The docker runtime when a container named `name` exists.
///
/// Without docker there is no container to find; a docker that cannot answer
/// stops the removal before anything is deleted.
fn find_container(name: &str) -> anyhow::Result<Option<Docker>> {
    let Ok(docker) = Docker::locate() else {
        log::debug!("docker not found; not looking for {name}");
        return Ok(None);
    };
    Ok(docker.container_exists(name)?.then_some(docker))
}

/// Lines describing what `remove` is about to do.
fn removal_plan(feature: &Feature, existing: &Existing, opts: &RemoveOptions) -> Vec<String> {
    let id = &feature.identity;
    let mut plan = Vec::new();
    if opts.drop_db && existing.container.is_none() && existing.dir {
        plan.push(format!(
            "drop databases {} and {}",
            id.dev_db_name, id.test_db_name
        ));
    }
    if existing.container.is_some() {
        plan.push(format!("container {}", id.container_name));
    }
    if existing.worktree {
        plan.push(format!(
            "worktree {}",
            format_path_for_display(&feature.path)
        ));
    }
    if existing.branch && !opts.keep_branch {
        plan.push(format!("branch {}", id.branch_name));
    }
    plan
}

fn only_overrides_changed(feature: &Feature) -> anyhow::Result<bool> {
    let changed = Repository::at(&feature.path).changed_paths()?;
    Ok(changed
        .iter()
        .all(|path| path == DEV_OVERRIDE_FILE || path == TEST_OVERRIDE_FILE))
}

/// `mix ecto.drop` for the dev and test databases, from inside the worktree.
fn drop_databases(feature: &Feature) -> anyhow::Result<()> {
    let shell = ShellConfig::get();
    for mix_env in ["dev", "test"] {
        eprintln!(
            "{}",
            progress_message(cformat!("Dropping <bold>{mix_env}</> database..."))
        );
        let mut cmd = shell.command("mix ecto.drop");
        cmd.current_dir(&feature.path)
            .env("MIX_ENV", mix_env)
            .stdout(std::io::stderr());
        let status = run_inherited(&mut cmd, Some(&feature.identity.safe_name))
            .context("Failed to run mix ecto.drop")?;
        if !status.success() {
            return Err(WtenvError::CommandFailed {
                command: format!("MIX_ENV={mix_env} mix ecto.drop"),
                exit_code: status.code(),
                stderr: String::new(),
            }
            .into());
        }
    }
    Ok(())
}
