//! Per-worktree override config files.
//!
//! A feature worktree carries `config/dev.local.exs` (endpoint port and dev
//! database) and `config/test.local.exs` (test database). The main checkout
//! imports them when present; see [`import_block`]. Both files are generated
//! here and only ever read back through [`parse_port`] / [`parse_database`].
//!
//! The endpoint block is written first so that the first `port:` in the dev
//! file is always the application port, even when the repo block carries a
//! container port.

use regex::Regex;

use crate::feature::FeatureIdentity;
use crate::project::MixProject;

/// Dev override, relative to a worktree root.
pub const DEV_OVERRIDE_FILE: &str = "config/dev.local.exs";

/// Test override, relative to a worktree root.
pub const TEST_OVERRIDE_FILE: &str = "config/test.local.exs";

/// Marks the import block so `wtenv init` stays idempotent.
pub const IMPORT_MARKER: &str = "# wtenv: per-worktree overrides";

/// Where the feature's databases live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    pub hostname: String,
    pub port: u32,
    pub username: String,
    pub password: String,
}

/// Render `config/dev.local.exs`.
pub fn render_dev(
    project: &MixProject,
    identity: &FeatureIdentity,
    app_port: u32,
    db: &DatabaseTarget,
) -> String {
    format!(
        r#"# Generated by wtenv for feature `{safe}` (branch {branch}).
# Local to this worktree; not checked in.
import Config

config :{app}, {endpoint},
  http: [ip: {{127, 0, 0, 1}}, port: {app_port}]

config :{app}, {repo},
  database: "{database}",
  hostname: "{hostname}",
  port: {db_port},
  username: "{username}",
  password: "{password}"
"#,
        safe = identity.safe_name,
        branch = identity.branch_name,
        app = project.app,
        endpoint = project.endpoint_module(),
        repo = project.repo_module(),
        database = elixir_escape(&identity.dev_db_name),
        hostname = elixir_escape(&db.hostname),
        db_port = db.port,
        username = elixir_escape(&db.username),
        password = elixir_escape(&db.password),
    )
}

/// Render `config/test.local.exs`.
pub fn render_test(project: &MixProject, identity: &FeatureIdentity, db: &DatabaseTarget) -> String {
    format!(
        r#"# Generated by wtenv for feature `{safe}` (branch {branch}).
import Config

config :{app}, {repo},
  database: "{database}#{{System.get_env("MIX_TEST_PARTITION")}}",
  hostname: "{hostname}",
  port: {db_port},
  username: "{username}",
  password: "{password}"
"#,
        safe = identity.safe_name,
        branch = identity.branch_name,
        app = project.app,
        repo = project.repo_module(),
        database = elixir_escape(&identity.test_db_name),
        hostname = elixir_escape(&db.hostname),
        db_port = db.port,
        username = elixir_escape(&db.username),
        password = elixir_escape(&db.password),
    )
}

/// Escape `value` for use inside an Elixir double-quoted string.
///
/// `#` is escaped as well so a `#{` in a password is not interpolated.
fn elixir_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '#') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Block appended to `config/dev.exs` / `config/test.exs` so the override
/// file is picked up when it exists.
pub fn import_block(local_file: &str) -> String {
    format!(
        r#"
{IMPORT_MARKER}
if File.exists?(Path.expand("{local_file}", __DIR__)) do
  import_config "{local_file}"
end
"#
    )
}

/// First `port: <integer>` in `contents`.
///
/// Returns `None` when there is no such line or the number does not fit.
pub fn parse_port(contents: &str) -> Option<u32> {
    thread_local! {
        static PORT: Regex = Regex::new(r"\bport:\s*(\d+)").unwrap();
    }
    PORT.with(|re| re.captures(contents).and_then(|c| c[1].parse().ok()))
}

/// First `database: "<name>"` in `contents`.
pub fn parse_database(contents: &str) -> Option<String> {
    thread_local! {
        static DATABASE: Regex = Regex::new(r##"\bdatabase:\s*"([^"#]+)"##).unwrap();
    }
    DATABASE.with(|re| re.captures(contents).map(|c| c[1].to_string()))
}
