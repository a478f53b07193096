//! Feature identity and port derivation.
//!
//! Everything here is a pure function of its inputs. The names produced are
//! the contract with existing worktrees, branches, databases and containers,
//! so the concatenation formulas must not change.
//!
//! # Name collisions
//!
//! Normalization lowercases and maps `-` to `_`, so `user-management` and
//! `user_management` resolve to the same feature. Both spellings address the
//! same worktree, branch, databases and container.

use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::error::WtenvError;

/// Port the main checkout's server binds to.
pub const MAIN_PORT: u32 = 4000;

/// Lowest auto-derived application port.
pub const PORT_BASE: u32 = 4100;

/// Number of distinct auto-derived ports (`4100..=4999`).
pub const PORT_SPAN: u32 = 900;

/// Offset from application port to the container's host database port.
pub const DB_PORT_OFFSET: u32 = 1000;

/// Prefix for feature branches.
pub const BRANCH_PREFIX: &str = "feature/";

/// All names derived from one feature name and the project identifier.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FeatureIdentity {
    pub raw_name: String,
    pub safe_name: String,
    pub project_name: String,
    pub branch_name: String,
    /// Relative to the main worktree root.
    pub worktree_dir: PathBuf,
    pub dev_db_name: String,
    pub test_db_name: String,
    pub container_name: String,
}

/// Application port plus the database port used in container isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PortAssignment {
    pub app_port: u32,
    pub db_port: u32,
}

impl PortAssignment {
    pub fn new(safe_name: &str, explicit_port: Option<u32>) -> Self {
        let app_port = derive_port(safe_name, explicit_port);
        Self {
            app_port,
            db_port: derive_db_port(app_port),
        }
    }
}

/// Lowercase, then replace every `-` with `_`.
///
/// ```
/// use wtenv::feature::normalize;
///
/// assert_eq!(normalize("User-Management"), "user_management");
/// assert_eq!(normalize("user_management"), "user_management");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// Normalize `raw_name` and check it is usable in paths, branches and
/// database names.
///
/// Rejects empty input and names that do not normalize to `[a-z0-9_]+`
/// (path separators, whitespace, shell metacharacters).
pub fn safe_feature_name(raw_name: &str) -> Result<String, WtenvError> {
    if raw_name.trim().is_empty() {
        return Err(WtenvError::EmptyFeatureName);
    }
    let safe_name = normalize(raw_name);
    if !is_safe_name(&safe_name) {
        return Err(WtenvError::InvalidFeatureName {
            name: raw_name.to_string(),
        });
    }
    Ok(safe_name)
}

/// Derive every identifier for `raw_name` within `project_name`.
///
/// Accepted names map through the fixed formulas unchanged; see
/// [`safe_feature_name`] for what is rejected.
pub fn derive_identity(raw_name: &str, project_name: &str) -> Result<FeatureIdentity, WtenvError> {
    let safe_name = safe_feature_name(raw_name)?;
    if project_name.is_empty() {
        return Err(WtenvError::ProjectNameMissing { manifest: None });
    }

    Ok(FeatureIdentity {
        raw_name: raw_name.to_string(),
        branch_name: format!("{BRANCH_PREFIX}{safe_name}"),
        worktree_dir: PathBuf::from(format!("../{project_name}_{safe_name}")),
        dev_db_name: format!("{project_name}_{safe_name}_dev"),
        test_db_name: format!("{project_name}_{safe_name}_test"),
        container_name: format!("postgres_{project_name}_{safe_name}"),
        project_name: project_name.to_string(),
        safe_name,
    })
}

/// Application port for a feature.
///
/// An explicit port wins and is returned verbatim. Otherwise the first three
/// hex digits of the SHA-256 of `safe_name` are taken as a 12-bit integer
/// `h`, giving `h % 900 + 4100`.
///
/// The hash is part of the port contract. Scripts that derived ports from
/// SHA-1 give different ports for the same name, and switching hashes here
/// would move every existing feature to a new port.
///
/// Two names can land on the same port; this function does not detect it.
///
/// ```
/// use wtenv::feature::derive_port;
///
/// assert_eq!(derive_port("anything", Some(4242)), 4242);
/// assert!((4100..=4999).contains(&derive_port("user_management", None)));
/// ```
pub fn derive_port(safe_name: &str, explicit_port: Option<u32>) -> u32 {
    if let Some(port) = explicit_port {
        return port;
    }
    let digest = Sha256::digest(safe_name.as_bytes());
    // First three hex digits: the whole first byte and the high nibble of the second.
    let h = (u32::from(digest[0]) << 4) | (u32::from(digest[1]) >> 4);
    h % PORT_SPAN + PORT_BASE
}

/// Host port for the feature's database container.
pub fn derive_db_port(app_port: u32) -> u32 {
    app_port.saturating_add(DB_PORT_OFFSET)
}

/// Recover the safe feature name from a branch like `feature/user_management`.
pub fn feature_from_branch(branch: &str) -> Option<&str> {
    branch
        .strip_prefix(BRANCH_PREFIX)
        .filter(|name| !name.is_empty())
}
