//! Test harness: an isolated git repository holding a minimal Phoenix project.
//!
//! Layout inside the temp dir:
//!
//! ```text
//! <tmp>/
//! ├── myapp/               # main worktree (git repo with mix.exs)
//! ├── myapp_<feature>/     # feature worktrees created by wtenv
//! ├── home/                # HOME for the wtenv process
//! ├── bin/docker           # stand-in docker, first on PATH
//! ├── test-config.toml     # WTENV_CONFIG_PATH target
//! └── test-gitconfig       # GIT_CONFIG_GLOBAL target
//! ```

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use insta_cmd::get_cargo_bin;
use tempfile::TempDir;

/// Null device path, platform-appropriate.
#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

pub const MIX_EXS: &str = r#"defmodule MyApp.MixProject do
  use Mix.Project

  def project do
    [
      app: :myapp,
      version: "0.1.0",
      elixir: "~> 1.15",
      deps: deps()
    ]
  end

  defp deps do
    [{:phoenix, "~> 1.7"}]
  end
end
"#;

/// `docker` that knows no containers, as on a machine with none running.
pub const DOCKER_WITHOUT_CONTAINERS: &str = r#"#!/bin/sh
for last; do :; done
echo "Error: No such object: $last" >&2
exit 1
"#;

/// `docker` whose daemon cannot be reached.
pub const DOCKER_DAEMON_DOWN: &str = r#"#!/bin/sh
echo "Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?" >&2
exit 1
"#;

pub const DEV_EXS: &str = "import Config\n\nconfig :myapp, dev_routes: true\n";
pub const TEST_EXS: &str = "import Config\n\nconfig :logger, level: :warning\n";

/// Canonicalize a path without Windows verbatim prefix (`\\?\`).
pub fn canonicalize(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap()
}

/// Configure a git command with isolated environment for testing.
pub fn configure_git_cmd(cmd: &mut Command, git_config_path: &Path) {
    cmd.env("GIT_CONFIG_GLOBAL", git_config_path);
    cmd.env("GIT_CONFIG_SYSTEM", NULL_DEVICE);
    cmd.env("GIT_AUTHOR_DATE", "2025-01-01T00:00:00Z");
    cmd.env("GIT_COMMITTER_DATE", "2025-01-01T00:00:00Z");
    cmd.env("LC_ALL", "C");
    cmd.env("LANG", "C");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
}

pub struct TestRepo {
    temp_dir: TempDir, // Must keep to ensure cleanup on drop
    root: PathBuf,
    test_config_path: PathBuf,
    git_config_path: PathBuf,
}

impl TestRepo {
    /// A `myapp` Mix project on `main` with one commit containing `mix.exs`,
    /// `config/dev.exs` and `config/test.exs`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("myapp");
        std::fs::create_dir_all(root.join("config")).unwrap();
        std::fs::create_dir_all(temp_dir.path().join("home")).unwrap();
        // Canonicalize to resolve symlinks (macOS /var is a symlink to /private/var)
        let root = canonicalize(&root);

        let git_config_path = temp_dir.path().join("test-gitconfig");
        std::fs::write(
            &git_config_path,
            "[user]\n\tname = Test User\n\temail = test@example.com\n\
             [init]\n\tdefaultBranch = main\n\
             [commit]\n\tgpgsign = false\n",
        )
        .unwrap();

        let repo = Self {
            test_config_path: temp_dir.path().join("test-config.toml"),
            temp_dir,
            root,
            git_config_path,
        };

        repo.write_fake_docker(DOCKER_WITHOUT_CONTAINERS);
        repo.write_file("mix.exs", MIX_EXS);
        repo.write_file("config/dev.exs", DEV_EXS);
        repo.write_file("config/test.exs", TEST_EXS);
        repo.run_git(&["init", "-q"]);
        repo.run_git(&["add", "."]);
        repo.run_git(&["commit", "-q", "-m", "Initial commit"]);
        repo
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Where wtenv puts the worktree for `safe_name`.
    pub fn worktree_path(&self, safe_name: &str) -> PathBuf {
        self.parent_path().join(format!("myapp_{safe_name}"))
    }

    /// Directory holding the root and its sibling worktrees.
    pub fn parent_path(&self) -> &Path {
        self.root.parent().unwrap()
    }

    fn bin_path(&self) -> PathBuf {
        self.parent_path().join("bin")
    }

    /// Replace the `docker` that wtenv finds on PATH.
    pub fn write_fake_docker(&self, script: &str) {
        let bin = self.bin_path();
        std::fs::create_dir_all(&bin).unwrap();
        let docker = bin.join("docker");
        std::fs::write(&docker, script).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&docker, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    pub fn home_path(&self) -> PathBuf {
        self.temp_dir.path().join("home")
    }

    pub fn write_file(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    pub fn read_file(&self, relative: &str) -> String {
        std::fs::read_to_string(self.root.join(relative)).unwrap()
    }

    /// User config read by wtenv (via `WTENV_CONFIG_PATH`).
    pub fn write_user_config(&self, contents: &str) {
        std::fs::write(&self.test_config_path, contents).unwrap();
    }

    /// Checked-in project config in the main worktree.
    pub fn write_project_config(&self, contents: &str) {
        self.write_file(".config/wtenv.toml", contents);
    }

    #[must_use]
    pub fn git_command(&self) -> Command {
        let mut cmd = Command::new("git");
        configure_git_cmd(&mut cmd, &self.git_config_path);
        cmd.current_dir(&self.root);
        cmd
    }

    /// Run a git command in the repo root, panicking on failure.
    pub fn run_git(&self, args: &[&str]) {
        let output = self.git_command().args(args).output().unwrap();
        check_status(&output, &format!("git {}", args.join(" ")));
    }

    /// Run a git command and return stdout as a trimmed string.
    pub fn git_output(&self, args: &[&str]) -> String {
        let output = self.git_command().args(args).output().unwrap();
        check_status(&output, &format!("git {}", args.join(" ")));
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn branch_exists(&self, branch: &str) -> bool {
        self.git_command()
            .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{branch}")])
            .output()
            .unwrap()
            .status
            .success()
    }

    /// A `wtenv` command running in the main worktree with isolated git,
    /// config and home.
    #[must_use]
    pub fn wtenv_command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin("wtenv"));
        for (key, _) in std::env::vars() {
            if key.starts_with("GIT_") || key.starts_with("WTENV_") {
                cmd.env_remove(&key);
            }
        }
        configure_git_cmd(&mut cmd, &self.git_config_path);
        cmd.env("WTENV_CONFIG_PATH", &self.test_config_path);
        cmd.env("HOME", self.home_path());
        cmd.env("XDG_CONFIG_HOME", self.home_path().join(".config"));
        cmd.env("RUST_LOG", "warn");
        cmd.env("COLUMNS", "150");
        cmd.env_remove("CLICOLOR_FORCE");
        let path = std::env::var_os("PATH").unwrap_or_default();
        let paths = std::iter::once(self.bin_path()).chain(std::env::split_paths(&path));
        cmd.env("PATH", std::env::join_paths(paths).unwrap());
        cmd.current_dir(&self.root);
        cmd
    }

    /// Run `wtenv <args>` from the main worktree.
    pub fn wtenv(&self, args: &[&str]) -> Output {
        self.wtenv_command().args(args).output().unwrap()
    }

    /// Run `wtenv <args>` from `dir`.
    pub fn wtenv_in(&self, dir: &Path, args: &[&str]) -> Output {
        self.wtenv_command()
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap()
    }

    /// `wtenv create <feature> [extra..] --no-setup`, asserting success.
    pub fn create_feature(&self, feature: &str, extra: &[&str]) -> PathBuf {
        let mut args = vec!["create", feature];
        args.extend_from_slice(extra);
        args.push("--no-setup");
        let output = self.wtenv(&args);
        check_status(&output, &format!("wtenv {}", args.join(" ")));
        self.worktree_path(&feature.to_lowercase().replace('-', "_"))
    }
}

/// `wtenv <subcommand> <args>` from `cwd` (default: the main worktree).
pub fn make_snapshot_cmd(
    repo: &TestRepo,
    subcommand: &str,
    args: &[&str],
    cwd: Option<&Path>,
) -> Command {
    let mut cmd = repo.wtenv_command();
    cmd.arg(subcommand).args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd
}

/// Snapshot settings that replace the temp directory with `[TMP]`.
///
/// Worktrees live next to the main checkout, so after filtering they read
/// `[TMP]/myapp_<feature>`.
pub fn setup_snapshot_settings(repo: &TestRepo) -> insta::Settings {
    let mut settings = insta::Settings::clone_current();
    settings.set_snapshot_path("../snapshots");
    settings.add_filter(&regex::escape(&repo.parent_path().display().to_string()), "[TMP]");
    // macOS: the temp dir is a symlink into /private
    settings.add_filter(
        &regex::escape(&repo.temp_dir.path().display().to_string()),
        "[TMP]",
    );
    settings
}

pub fn check_status(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{what} failed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
