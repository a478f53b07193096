//! On-disk TOML layer: every field optional, unknown keys collected.

use std::collections::BTreeMap;
use std::path::Path;

use color_print::cformat;
use serde::{Deserialize, Deserializer};

use super::Isolation;
use crate::error::WtenvError;
use crate::styling::{eprintln, warning_message};

/// One config file as written by the user.
///
/// ```toml
/// isolation = "container"
/// setup = ["mix deps.get", "mix ecto.setup"]
///
/// [database]
/// image = "postgres:15"
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigFile {
    pub isolation: Option<Isolation>,

    #[serde(default)]
    pub database: DatabaseFile,

    /// Accepts a single string or an array of strings.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub setup: Option<Vec<String>>,

    pub module: Option<String>,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DatabaseFile {
    pub host: Option<String>,
    pub port: Option<u32>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

impl ConfigFile {
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Read `path`; a missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, WtenvError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(WtenvError::ConfigInvalid {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };

        let file = Self::from_toml(&contents).map_err(|e| WtenvError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(Some(file))
    }

    /// Unrecognized keys, nested ones dotted (`database.hots`), sorted.
    pub fn unknown_keys(&self) -> Vec<String> {
        self.unknown
            .keys()
            .cloned()
            .chain(self.database.unknown.keys().map(|k| format!("database.{k}")))
            .collect()
    }

    /// Print one warning per unknown key. `label` is e.g. "User config".
    pub fn warn_unknown_keys(&self, label: &str) {
        for key in self.unknown_keys() {
            eprintln!(
                "{}",
                warning_message(cformat!(
                    "{label} has unknown field <bold>{key}</> (will be ignored)"
                ))
            );
        }
    }

    /// Field-by-field overlay: values set in `over` win.
    pub fn merge(self, over: ConfigFile) -> ConfigFile {
        let mut unknown = self.unknown;
        unknown.extend(over.unknown);
        ConfigFile {
            isolation: over.isolation.or(self.isolation),
            database: self.database.merge(over.database),
            setup: over.setup.or(self.setup),
            module: over.module.or(self.module),
            unknown,
        }
    }
}

impl DatabaseFile {
    fn merge(self, over: DatabaseFile) -> DatabaseFile {
        let mut unknown = self.unknown;
        unknown.extend(over.unknown);
        DatabaseFile {
            host: over.host.or(self.host),
            port: over.port.or(self.port),
            username: over.username.or(self.username),
            password: over.password.or(self.password),
            image: over.image.or(self.image),
            unknown,
        }
    }
}

fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct StringOrVec;

    impl<'de> de::Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("string or array of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(elem) = seq.next_element()? {
                vec.push(elem);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec).map(Some)
}
