use std::path::{Path, PathBuf};

use serde::Serialize;
use wtenv::docker::Docker;
use wtenv::environment::{EnvironmentKind, detect_environment};
use wtenv::feature::{derive_identity, feature_from_branch};
use wtenv::path::format_path_for_display;
use wtenv::styling::{eprintln, info_message, println, visual_width};

use super::context::ProjectContext;
use crate::cli::ListFormat;

#[derive(Debug, Serialize)]
struct FeatureRow {
    feature: String,
    branch: String,
    path: PathBuf,
    /// `None` when the override file is missing or has no port.
    port: Option<u32>,
    /// Docker state of the feature's container, when one exists.
    container: Option<String>,
}

pub(crate) fn handle_list(format: ListFormat) -> anyhow::Result<()> {
    let ctx = ProjectContext::load()?;
    let docker = Docker::locate().ok();

    let rows: Vec<FeatureRow> = ctx
        .repo
        .list_worktrees()?
        .into_iter()
        .filter_map(|wt| {
            let branch = wt.branch?;
            let feature = feature_from_branch(&branch)?.to_string();
            let container = derive_identity(&feature, &ctx.project.app)
                .ok()
                .and_then(|id| container_state(docker.as_ref()?, &id.container_name));
            Some(FeatureRow {
                port: feature_port(&wt.path),
                path: wt.path,
                feature,
                branch,
                container,
            })
        })
        .collect();

    match format {
        ListFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        ListFormat::Table => {
            if rows.is_empty() {
                eprintln!("{}", info_message("No feature worktrees"));
            } else {
                for line in render_table(&rows) {
                    println!("{line}");
                }
            }
        }
    }
    Ok(())
}

/// Port from the worktree's override file.
///
/// A worktree without one has no port yet; it is not the main checkout's.
fn feature_port(path: &Path) -> Option<u32> {
    Some(detect_environment(path))
        .filter(EnvironmentKind::is_worktree)
        .and_then(|env| env.port())
}

/// Listing is best effort: a docker that cannot answer shows no state.
fn container_state(docker: &Docker, name: &str) -> Option<String> {
    docker.container_state(name).unwrap_or_else(|e| {
        log::debug!("Could not inspect {name}: {e:#}");
        None
    })
}

fn render_table(rows: &[FeatureRow]) -> Vec<String> {
    let header = ["FEATURE", "PORT", "CONTAINER", "PATH"].map(String::from);
    let body = rows.iter().map(|row| {
        [
            row.feature.clone(),
            row.port
                .map_or_else(|| "unknown".to_string(), |p| p.to_string()),
            row.container.clone().unwrap_or_else(|| "-".to_string()),
            format_path_for_display(&row.path),
        ]
    });
    let cells: Vec<[String; 4]> = std::iter::once(header).chain(body).collect();

    let mut widths = [0usize; 4];
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(visual_width(cell));
        }
    }

    cells
        .iter()
        .map(|row| {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                line.push_str(cell);
                if i + 1 < row.len() {
                    let pad = widths[i] - visual_width(cell) + 2;
                    line.push_str(&" ".repeat(pad));
                }
            }
            line
        })
        .collect()
}
