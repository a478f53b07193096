//! Docker runtime detection and the per-feature PostgreSQL container.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::Context;
use which::which;

use crate::config::DatabaseSettings;
use crate::error::WtenvError;
use crate::shell_exec::{describe, run};

/// How long `create` waits for a fresh container to accept connections.
pub const READY_TIMEOUT: Duration = Duration::from_secs(30);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Port PostgreSQL listens on inside the container.
const CONTAINER_DB_PORT: u32 = 5432;

/// A located `docker` binary.
#[derive(Debug, Clone)]
pub struct Docker {
    runtime: PathBuf,
}

impl Docker {
    /// Find `docker` in PATH.
    pub fn locate() -> Result<Self, WtenvError> {
        which("docker")
            .map(|runtime| Self { runtime })
            .map_err(|_| WtenvError::ToolNotFound {
                tool: "docker".into(),
            })
    }

    /// Use the runtime at `runtime` instead of searching PATH.
    pub fn at(runtime: impl Into<PathBuf>) -> Self {
        Self {
            runtime: runtime.into(),
        }
    }

    fn command(&self) -> Command {
        Command::new(&self.runtime)
    }

    /// Container status (`running`, `exited`, ...), or `None` if there is no
    /// container with that name.
    ///
    /// Any other `docker inspect` failure, such as an unreachable daemon, is
    /// an error.
    pub fn container_state(&self, name: &str) -> anyhow::Result<Option<String>> {
        let mut cmd = self.command();
        cmd.args(["inspect", "--type", "container", "--format", "{{.State.Status}}", name]);
        let command = describe(&cmd);
        let output = run(&mut cmd, Some(name))
            .with_context(|| format!("Failed to execute: {command}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_missing_object(&stderr) {
                return Ok(None);
            }
            return Err(WtenvError::CommandFailed {
                command,
                exit_code: output.status.code(),
                stderr: stderr.into_owned(),
            }
            .into());
        }
        let state = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(if state.is_empty() {
            "unknown".to_string()
        } else {
            state
        }))
    }

    pub fn container_exists(&self, name: &str) -> anyhow::Result<bool> {
        Ok(self.container_state(name)?.is_some())
    }

    /// Start a detached PostgreSQL container publishing `db_port` on the host.
    pub fn run_postgres(
        &self,
        name: &str,
        db: &DatabaseSettings,
        db_port: u32,
    ) -> anyhow::Result<()> {
        let mut cmd = self.command();
        cmd.args(postgres_run_args(name, db, db_port));
        self.check(&mut cmd, name)?;
        Ok(())
    }

    /// Poll `pg_isready` inside the container until it succeeds or `timeout`
    /// elapses.
    pub fn wait_until_ready(
        &self,
        name: &str,
        username: &str,
        timeout: Duration,
    ) -> Result<(), WtenvError> {
        let started = Instant::now();
        loop {
            let ready = self
                .command()
                .args(["exec", name, "pg_isready", "-U", username])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|s| s.success())
                .unwrap_or(false);
            if ready {
                log::debug!(
                    "{name} ready after {:.1}s",
                    started.elapsed().as_secs_f64()
                );
                return Ok(());
            }
            if started.elapsed() >= timeout {
                return Err(WtenvError::DatabaseNotReady {
                    container: name.to_string(),
                    waited_secs: timeout.as_secs(),
                });
            }
            std::thread::sleep(READY_POLL_INTERVAL);
        }
    }

    /// `docker rm -f <name>`
    pub fn remove_container(&self, name: &str) -> anyhow::Result<()> {
        let mut cmd = self.command();
        cmd.args(["rm", "-f", name]);
        self.check(&mut cmd, name)?;
        Ok(())
    }

    fn check(&self, cmd: &mut Command, context: &str) -> anyhow::Result<()> {
        let command = describe(cmd);
        let output = run(cmd, Some(context))?;
        if !output.status.success() {
            return Err(WtenvError::CommandFailed {
                command,
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }
        Ok(())
    }
}

/// `docker inspect` reports an unknown name as "No such container" or, for
/// older engines, "No such object".
fn is_missing_object(stderr: &str) -> bool {
    stderr.contains("No such container") || stderr.contains("No such object")
}

/// Arguments after `docker` for the feature's PostgreSQL container.
pub fn postgres_run_args(name: &str, db: &DatabaseSettings, db_port: u32) -> Vec<String> {
    vec![
        "run".into(),
        "-d".into(),
        "--name".into(),
        name.into(),
        "-e".into(),
        format!("POSTGRES_USER={}", db.username),
        "-e".into(),
        format!("POSTGRES_PASSWORD={}", db.password),
        "-p".into(),
        format!("{db_port}:{CONTAINER_DB_PORT}"),
        db.image.clone(),
    ]
}
