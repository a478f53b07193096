use std::path::PathBuf;

use wtenv::config::Settings;
use wtenv::feature::{FeatureIdentity, derive_identity};
use wtenv::git::Repository;
use wtenv::path::resolve_worktree_dir;
use wtenv::project::MixProject;

/// Everything a command needs about the checkout it runs in.
///
/// Resolved from the main worktree, so commands behave the same from the
/// main checkout or from inside any feature worktree.
pub(crate) struct ProjectContext {
    /// Repository rooted at the main worktree.
    pub repo: Repository,
    pub main_root: PathBuf,
    pub project: MixProject,
    pub settings: Settings,
}

/// A feature resolved against a project.
pub(crate) struct Feature {
    pub identity: FeatureIdentity,
    /// Absolute worktree path.
    pub path: PathBuf,
}

impl ProjectContext {
    pub fn load() -> anyhow::Result<Self> {
        let main_root = Repository::current()?.main_worktree_root()?;
        log::debug!("Main worktree: {}", main_root.display());

        let settings = Settings::load(&main_root)?;
        let project = MixProject::load(&main_root)?.with_module(settings.module.as_deref());

        Ok(Self {
            repo: Repository::at(&main_root),
            main_root,
            project,
            settings,
        })
    }

    pub fn feature(&self, raw_name: &str) -> anyhow::Result<Feature> {
        let identity = derive_identity(raw_name, &self.project.app)?;
        let path = resolve_worktree_dir(&self.main_root, &identity.worktree_dir);
        Ok(Feature { identity, path })
    }
}
