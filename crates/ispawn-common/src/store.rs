//! Persistence of the configuration document.
//!
//! One store owns one scope's file. Loading also inspects the other
//! scope's file: two installed configurations that disagree are refused
//! rather than silently ranked.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::config::{Config, InstallScope, RawConfig};
use crate::error::{IspawnError, Result};

/// Result of [`ConfigStore::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No configuration existed; it was written.
    Created,
    /// The persisted configuration already matched; nothing was written.
    Unchanged,
    /// A differing configuration was overwritten.
    Replaced,
}

/// Reads and writes one scope's configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    scope: InstallScope,
    path: PathBuf,
    other: Option<PathBuf>,
}

impl ConfigStore {
    /// Store at the fixed location of `scope`, aware of the other scope.
    #[must_use]
    pub fn for_scope(scope: InstallScope) -> Self {
        Self {
            scope,
            path: scope.config_path(),
            other: Some(scope.other().config_path()),
        }
    }

    /// Store at an explicit path, unaware of any other scope.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>, scope: InstallScope) -> Self {
        Self {
            scope,
            path: path.into(),
            other: None,
        }
    }

    /// Sets the path of the other scope's file checked by [`Self::load_scoped`].
    #[must_use]
    pub fn with_other(mut self, other: impl Into<PathBuf>) -> Self {
        self.other = Some(other.into());
        self
    }

    /// Path of the configuration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scope of the stored configuration.
    #[must_use]
    pub const fn scope(&self) -> InstallScope {
        self.scope
    }

    /// Loads this scope's configuration, if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded, declares a
    /// different scope, or fails validation.
    pub fn load(&self) -> Result<Option<Config>> {
        let Some(raw) = read_raw(&self.path)? else {
            return Ok(None);
        };
        if raw.install_scope != self.scope {
            return Err(IspawnError::config(format!(
                "{} declares install_scope {} but is the {} configuration file",
                self.path.display(),
                raw.install_scope,
                self.scope
            )));
        }
        Config::try_from(raw).map(Some)
    }

    /// Loads this scope's configuration and refuses a disagreeing copy in
    /// the other scope.
    ///
    /// Both copies are validated and normalized before the comparison; they
    /// agree when they differ at most in their scope and certificate
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if both files exist and disagree,
    /// plus every error of [`Self::load`].
    pub fn load_scoped(&self) -> Result<Option<Config>> {
        let Some(config) = self.load()? else {
            return Ok(None);
        };
        let Some(other_path) = &self.other else {
            return Ok(Some(config));
        };
        let Some(mut other) = read_raw(other_path)? else {
            return Ok(Some(config));
        };

        other.install_scope = self.scope;
        other.cert_dir = None;
        let other = Config::try_from(other).map_err(|e| {
            IspawnError::config(format!(
                "{} is not a valid configuration and cannot be compared with {}: {e}",
                other_path.display(),
                self.path.display()
            ))
        })?;
        let mut mine = RawConfig::from(&config);
        let mut theirs = RawConfig::from(&other);
        mine.cert_dir = None;
        theirs.cert_dir = None;
        if mine != theirs {
            return Err(IspawnError::config(format!(
                "{} and {} both exist and disagree; remove one or re-run setup with --force",
                self.path.display(),
                other_path.display()
            )));
        }
        tracing::debug!(other = %other_path.display(), "other scope holds an identical configuration");
        Ok(Some(config))
    }

    /// Writes `config` with the scope's file mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration belongs to another scope or
    /// the file cannot be written.
    pub fn save(&self, config: &Config) -> Result<()> {
        if config.install_scope() != self.scope {
            return Err(IspawnError::config(format!(
                "cannot save a {} configuration to the {} file {}",
                config.install_scope(),
                self.scope,
                self.path.display()
            )));
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| IspawnError::io(parent, e))?;
        }
        let yaml = serde_yaml::to_string(&RawConfig::from(config))?;
        std::fs::write(&self.path, yaml).map_err(|e| IspawnError::io(&self.path, e))?;
        std::fs::set_permissions(
            &self.path,
            std::fs::Permissions::from_mode(self.scope.file_mode()),
        )
        .map_err(|e| IspawnError::io(&self.path, e))?;
        tracing::info!(path = %self.path.display(), scope = %self.scope, "configuration saved");
        Ok(())
    }

    /// Persists `config` unless an identical copy exists.
    ///
    /// A differing or unreadable persisted copy is only overwritten when
    /// `force` is set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on drift without `force`, plus every
    /// error of [`Self::save`].
    pub fn apply(&self, config: &Config, force: bool) -> Result<ApplyOutcome> {
        match self.load() {
            Ok(None) => {
                self.save(config)?;
                Ok(ApplyOutcome::Created)
            }
            Ok(Some(existing)) if existing == *config => {
                tracing::debug!(path = %self.path.display(), "configuration unchanged");
                Ok(ApplyOutcome::Unchanged)
            }
            Ok(Some(_)) if !force => Err(IspawnError::config(format!(
                "{} holds a different configuration; pass --force to overwrite it",
                self.path.display()
            ))),
            Ok(Some(_)) => {
                self.save(config)?;
                Ok(ApplyOutcome::Replaced)
            }
            Err(e) if force => {
                tracing::warn!(path = %self.path.display(), error = %e, "overwriting unreadable configuration");
                self.save(config)?;
                Ok(ApplyOutcome::Replaced)
            }
            Err(e) => Err(e),
        }
    }
}

fn read_raw(path: &Path) -> Result<Option<RawConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    tracing::debug!(path = %path.display(), "loading configuration");
    let text = std::fs::read_to_string(path).map_err(|e| IspawnError::io(path, e))?;
    Ok(Some(serde_yaml::from_str(&text)?))
}
