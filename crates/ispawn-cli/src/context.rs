//! Shared state of commands that act on an existing setup.

use ispawn_common::config::{Config, InstallScope};
use ispawn_common::layout::DataLayout;
use ispawn_common::store::ConfigStore;
use ispawn_core::identity::{IdentityResolver, SystemIdentityResolver, running_as_root};
use ispawn_plan::{labels, naming};
use ispawn_runtime::backend::ContainerSummary;
use ispawn_runtime::engine::Engine;

/// Scope a command reads or writes when `--scope` is not given.
pub fn default_scope() -> InstallScope {
    if running_as_root() {
        InstallScope::System
    } else {
        InstallScope::User
    }
}

/// Loads the configuration of `scope`, or of the first scope that has one.
///
/// # Errors
///
/// Returns an error if no configuration exists, or if a configuration is
/// unreadable or disagrees with the other scope's copy.
pub fn load_config(scope: Option<InstallScope>) -> anyhow::Result<Config> {
    let scopes = scope.map_or_else(
        || vec![InstallScope::User, InstallScope::System],
        |s| vec![s],
    );
    for scope in scopes {
        let store = ConfigStore::for_scope(scope);
        if let Some(config) = store.load_scoped().map_err(|e| anyhow::anyhow!("{e}"))? {
            tracing::debug!(path = %store.path().display(), "configuration loaded");
            return Ok(config);
        }
    }
    Err(anyhow::anyhow!(
        "no configuration found; run `ispawn setup` first"
    ))
}

/// A loaded configuration, an engine, and the user whose runs are addressed.
pub struct Session {
    /// Loaded configuration.
    pub config: Config,
    /// Engine over the detected backend.
    pub engine: Engine,
    /// User name the container names are derived for.
    pub user: String,
}

impl Session {
    /// Opens a session for `user`, or for the invoking user.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded, the user
    /// is unknown, or no engine client is available.
    pub fn open(scope: Option<InstallScope>, user: Option<&str>) -> anyhow::Result<Self> {
        let config = load_config(scope)?;
        let user = SystemIdentityResolver
            .resolve(user)
            .map_err(|e| anyhow::anyhow!("{e}"))?
            .name;
        let engine = Engine::detect().map_err(|e| anyhow::anyhow!("{e}"))?;
        Ok(Self {
            config,
            engine,
            user,
        })
    }

    /// Container name of run `run`.
    pub fn container(&self, run: &str) -> String {
        naming::container_name(&self.config, &self.user, run)
    }

    /// Prefix shared by every container of this user.
    pub fn container_prefix(&self) -> String {
        naming::container_prefix(&self.config, &self.user)
    }

    /// Run name of a container, if it belongs to this user.
    pub fn run_of<'a>(&self, container: &'a ContainerSummary) -> Option<&'a str> {
        labels::owned_run(&self.config, &self.user, &container.name, &container.labels)
    }

    /// Data layout of the loaded namespace.
    pub fn layout(&self) -> DataLayout {
        DataLayout::for_namespace(self.config.name())
    }
}
