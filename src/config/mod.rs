//! Configuration for wtenv
//!
//! Two optional TOML files, merged field by field:
//!
//! - **User config** (personal defaults): `--config <path>`, else
//!   `WTENV_CONFIG_PATH`, else `<config dir>/wtenv/config.toml`
//!   (`~/.config/wtenv/config.toml` on Linux and macOS, `%APPDATA%` on Windows).
//! - **Project config** (checked in): `<main worktree>/.config/wtenv.toml`.
//!
//! Project values win over user values. Anything left unset falls back to
//! the defaults in [`Settings::default`].

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};
use serde::{Deserialize, Serialize};

mod file;

pub use file::{ConfigFile, DatabaseFile};

use crate::error::WtenvError;

/// Project config location relative to the main worktree root.
pub const PROJECT_CONFIG_FILE: &str = ".config/wtenv.toml";

/// Override for user config path, set via --config CLI flag
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Set the user config path override (called from CLI --config flag)
pub fn set_config_path(path: PathBuf) {
    CONFIG_PATH.set(path).ok();
}

/// Resolve the user config path. `None` if no config directory can be found.
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(path) = CONFIG_PATH.get() {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var("WTENV_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }

    // XDG on Linux and macOS, %APPDATA% on Windows
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("wtenv").join("config.toml"))
}

pub fn project_config_path(main_root: &Path) -> PathBuf {
    main_root.join(PROJECT_CONFIG_FILE)
}

/// How a feature's databases are isolated from other checkouts.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Isolation {
    /// Databases on the shared local PostgreSQL server, named per feature.
    #[default]
    Shared,
    /// A dedicated PostgreSQL container per feature on its own host port.
    Container,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u32,
    pub username: String,
    pub password: String,
    /// Container image for `container` isolation.
    pub image: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            image: "postgres:16".to_string(),
        }
    }
}

/// Effective settings after merging user and project config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub isolation: Isolation,
    pub database: DatabaseSettings,
    /// Shell commands run in a new worktree, in order.
    pub setup: Vec<String>,
    /// Application module override (`MyApp`), when `mix.exs` can't be trusted.
    pub module: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            isolation: Isolation::default(),
            database: DatabaseSettings::default(),
            setup: ["mix deps.get", "mix ecto.create", "mix ecto.migrate"]
                .map(String::from)
                .to_vec(),
            module: None,
        }
    }
}

impl Settings {
    /// Fill unset fields of a (merged) config file from the defaults.
    pub fn from_file(file: ConfigFile) -> Self {
        let defaults = Settings::default();
        let db = file.database;
        Self {
            isolation: file.isolation.unwrap_or(defaults.isolation),
            database: DatabaseSettings {
                host: db.host.unwrap_or(defaults.database.host),
                port: db.port.unwrap_or(defaults.database.port),
                username: db.username.unwrap_or(defaults.database.username),
                password: db.password.unwrap_or(defaults.database.password),
                image: db.image.unwrap_or(defaults.database.image),
            },
            setup: file.setup.unwrap_or(defaults.setup),
            module: file.module.or(defaults.module),
        }
    }

    /// Load user and project config for the checkout rooted at `main_root`.
    ///
    /// Unknown keys produce warnings on stderr; malformed files are errors.
    pub fn load(main_root: &Path) -> Result<Self, WtenvError> {
        Self::load_from(user_config_path().as_deref(), main_root)
    }

    /// [`Settings::load`] with an explicit user config path.
    pub fn load_from(user_path: Option<&Path>, main_root: &Path) -> Result<Self, WtenvError> {
        let user = match user_path {
            Some(path) => ConfigFile::load(path)?,
            None => None,
        }
        .unwrap_or_default();
        user.warn_unknown_keys("User config");

        let project = ConfigFile::load(&project_config_path(main_root))?.unwrap_or_default();
        project.warn_unknown_keys("Project config");

        Ok(Self::from_file(user.merge(project)))
    }
}
