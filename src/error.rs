//! wtenv error types and formatting
//!
//! **`WtenvError`** is a typed enum for domain errors that can be
//! pattern-matched and tested. Use `.into()` to convert to `anyhow::Error`
//! while preserving the type for `downcast_ref`. Display produces styled
//! output for users: an error line, then a hint or a gutter block.
//!
//! Three families, all fatal to the invoking command:
//! - invalid input (feature name, manifest, config)
//! - collisions with existing worktrees, branches or containers, detected
//!   before anything is mutated
//! - external tool failures (`git`, `docker`, `mix` and setup commands)
//!
//! A malformed override file is deliberately not an error; see
//! [`crate::environment`].

use std::path::PathBuf;

use color_print::cformat;

use crate::path::format_path_for_display;
use crate::styling::{
    error_message, format_with_gutter, hint_message, info_message, suggest_command,
};

#[derive(Debug, Clone)]
pub enum WtenvError {
    // Invalid input
    EmptyFeatureName,
    InvalidFeatureName {
        name: String,
    },
    ManifestNotFound {
        path: PathBuf,
    },
    ProjectNameMissing {
        /// `None` when the name was supplied programmatically.
        manifest: Option<PathBuf>,
    },
    ConfigInvalid {
        path: PathBuf,
        message: String,
    },

    // Collisions
    WorktreeDirExists {
        path: PathBuf,
    },
    BranchAlreadyExists {
        branch: String,
    },
    ContainerAlreadyExists {
        container: String,
    },

    FeatureNotFound {
        feature: String,
    },

    // External tools
    ToolNotFound {
        tool: String,
    },
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    SetupCommandFailed {
        command: String,
        exit_code: Option<i32>,
        worktree: PathBuf,
    },
    DatabaseNotReady {
        container: String,
        waited_secs: u64,
    },
}

impl std::fmt::Display for WtenvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WtenvError::EmptyFeatureName => write!(
                f,
                "{}\n{}",
                error_message("Feature name cannot be empty"),
                hint_message(cformat!(
                    "For example: <bright-black>{}</>",
                    suggest_command("create", &["user-management"], &[])
                ))
            ),

            WtenvError::InvalidFeatureName { name } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("Invalid feature name <bold>{name}</>")),
                hint_message("Use letters, digits, '-' and '_' only")
            ),

            WtenvError::ManifestNotFound { path } => {
                let path = format_path_for_display(path);
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("No Mix project found: <bold>{path}</> is missing")),
                    hint_message("Run wtenv from inside a Phoenix project checkout")
                )
            }

            WtenvError::ProjectNameMissing { manifest } => match manifest {
                Some(path) => {
                    let path = format_path_for_display(path);
                    write!(
                        f,
                        "{}\n{}",
                        error_message(cformat!("Could not read the app name from <bold>{path}</>")),
                        hint_message(cformat!(
                            "Expected an <bright-black>app: :my_app</> entry in the project definition"
                        ))
                    )
                }
                None => write!(f, "{}", error_message("Project name cannot be empty")),
            },

            WtenvError::ConfigInvalid { path, message } => {
                let path = format_path_for_display(path);
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("Invalid config <bold>{path}</>")),
                    format_with_gutter(message.trim(), None)
                )
            }

            WtenvError::WorktreeDirExists { path } => {
                let path = format_path_for_display(path);
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!("Directory <bold>{path}</> already exists")),
                    hint_message("Pick another feature name, or remove the directory first")
                )
            }

            WtenvError::BranchAlreadyExists { branch } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("Branch <bold>{branch}</> already exists")),
                hint_message(cformat!(
                    "To delete it, run <bright-black>git branch -D {branch}</>"
                ))
            ),

            WtenvError::ContainerAlreadyExists { container } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("Container <bold>{container}</> already exists")),
                hint_message(cformat!(
                    "To remove it, run <bright-black>docker rm -f {container}</>"
                ))
            ),

            WtenvError::FeatureNotFound { feature } => write!(
                f,
                "{}\n{}",
                error_message(cformat!(
                    "No worktree, branch or container found for <bold>{feature}</>"
                )),
                hint_message(cformat!(
                    "To see existing features, run <bright-black>{}</>",
                    suggest_command("list", &[], &[])
                ))
            ),

            WtenvError::ToolNotFound { tool } => write!(
                f,
                "{}\n{}",
                error_message(cformat!("<bold>{tool}</> was not found in PATH")),
                hint_message(cformat!("Install {tool} or add it to PATH"))
            ),

            WtenvError::CommandFailed {
                command,
                exit_code,
                stderr,
            } => {
                let header = match exit_code {
                    Some(code) => error_message(cformat!(
                        "Command failed with exit code {code}: <bold>{command}</>"
                    )),
                    None => error_message(cformat!("Command failed: <bold>{command}</>")),
                };
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    write!(f, "{header}")
                } else {
                    write!(f, "{header}\n{}", format_with_gutter(stderr, None))
                }
            }

            WtenvError::SetupCommandFailed {
                command,
                exit_code,
                worktree,
            } => {
                let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                let path = format_path_for_display(worktree);
                write!(
                    f,
                    "{}\n{}\n{}",
                    error_message(cformat!("Setup command failed ({code}): <bold>{command}</>")),
                    info_message(cformat!("The worktree was created at <bold>{path}</>")),
                    hint_message("Fix the problem and rerun the command there by hand")
                )
            }

            WtenvError::DatabaseNotReady {
                container,
                waited_secs,
            } => write!(
                f,
                "{}\n{}",
                error_message(cformat!(
                    "PostgreSQL in <bold>{container}</> was not ready after {waited_secs}s"
                )),
                hint_message(cformat!(
                    "Check its logs with <bright-black>docker logs {container}</>"
                ))
            ),
        }
    }
}

impl std::error::Error for WtenvError {}
