//! External command execution
//!
//! Two entry points:
//! - [`run`] executes a prepared `Command` and captures its output, logging
//!   the command line and timing at debug level.
//! - [`ShellConfig`] builds commands that go through the platform shell, for
//!   user-configured setup commands like `mix deps.get && mix ecto.setup`.
//!
//! Setup commands use POSIX `sh -c` on Unix and PowerShell on Windows.

use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::sync::OnceLock;
use std::time::Instant;

/// Cached shell configuration for the current platform
static SHELL_CONFIG: OnceLock<ShellConfig> = OnceLock::new();

/// Shell configuration for command execution
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Path to the shell executable
    pub executable: PathBuf,
    /// Arguments to pass before the command (e.g., ["-c"] for sh)
    pub args: Vec<String>,
    /// Human-readable name for error messages
    pub name: String,
}

impl ShellConfig {
    /// Get the shell configuration for the current platform
    pub fn get() -> &'static ShellConfig {
        SHELL_CONFIG.get_or_init(detect_shell)
    }

    /// Create a Command configured for shell execution
    ///
    /// The command string will be passed to the shell for interpretation.
    pub fn command(&self, shell_command: &str) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(&self.args);
        cmd.arg(shell_command);
        cmd
    }
}

fn detect_shell() -> ShellConfig {
    #[cfg(unix)]
    {
        ShellConfig {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string()],
            name: "sh".to_string(),
        }
    }

    #[cfg(windows)]
    {
        ShellConfig {
            executable: PathBuf::from("powershell.exe"),
            args: vec!["-NoProfile".to_string(), "-Command".to_string()],
            name: "PowerShell".to_string(),
        }
    }
}

/// Render a command line for logs and error messages.
pub fn describe(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Execute a command, capturing stdout/stderr, with debug logging and timing.
///
/// ```text
/// $ git worktree add -b feature/login ../myapp_login [myapp]
/// [wtenv-trace] context=myapp cmd="git worktree add ..." dur=12.3ms ok=true
/// ```
///
/// `context` is typically the directory name the command runs in, or `None`
/// when the working directory does not matter.
pub fn run(cmd: &mut Command, context: Option<&str>) -> std::io::Result<std::process::Output> {
    let cmd_str = describe(cmd);
    match context {
        Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
        None => log::debug!("$ {}", cmd_str),
    }

    let t0 = Instant::now();
    let result = cmd.output();
    trace(&cmd_str, context, t0, result.as_ref().map(|o| o.status));
    result
}

/// Execute a command with inherited stdio (the user sees its output live).
///
/// Used for long-running setup steps like `mix deps.get`.
pub fn run_inherited(cmd: &mut Command, context: Option<&str>) -> std::io::Result<ExitStatus> {
    let cmd_str = describe(cmd);
    match context {
        Some(ctx) => log::debug!("$ {} [{}]", cmd_str, ctx),
        None => log::debug!("$ {}", cmd_str),
    }

    let t0 = Instant::now();
    let result = cmd.status();
    trace(&cmd_str, context, t0, result.as_ref().copied());
    result
}

fn trace(
    cmd_str: &str,
    context: Option<&str>,
    t0: Instant,
    status: Result<ExitStatus, &std::io::Error>,
) {
    let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;
    let ctx = context
        .map(|c| format!("context={c} "))
        .unwrap_or_default();
    match status {
        Ok(status) => log::debug!(
            "[wtenv-trace] {ctx}cmd=\"{cmd_str}\" dur={duration_ms:.1}ms ok={}",
            status.success()
        ),
        Err(e) => log::debug!(
            "[wtenv-trace] {ctx}cmd=\"{cmd_str}\" dur={duration_ms:.1}ms err=\"{e}\""
        ),
    }
}
