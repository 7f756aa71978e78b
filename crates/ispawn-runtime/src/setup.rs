//! The `setup` operation: persist the configuration and prepare the engine.

use ispawn_common::config::{CertStrategy, Config, InstallScope};
use ispawn_common::error::{IspawnError, Result};
use ispawn_common::store::{ApplyOutcome, ConfigStore};

use crate::certs;
use crate::engine::Engine;

/// What `setup` changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupReport {
    /// Effect on the persisted configuration.
    pub config: ApplyOutcome,
    /// Whether the internal network was created.
    pub network_created: bool,
}

/// Applies a configuration.
///
/// In order: the privilege precondition of the system scope, the
/// provided-certificate check, the drift gate of the store, then the
/// internal network. Nothing reaches the engine if an earlier step fails.
///
/// # Errors
///
/// Returns a configuration error if the system scope is applied without
/// `privileged` or the persisted copy drifted without `force`, a
/// certificate error if provided certificates are missing, and a network
/// error if the network cannot be created.
pub fn apply(
    config: &Config,
    store: &ConfigStore,
    engine: &Engine,
    privileged: bool,
    force: bool,
) -> Result<SetupReport> {
    if config.install_scope() == InstallScope::System && !privileged {
        return Err(IspawnError::config(format!(
            "the system scope writes {} and requires root; re-run with sudo or use --scope user",
            config.config_path().display()
        )));
    }
    if let Some(CertStrategy::Provided) = config.cert_strategy() {
        let pair = certs::validate_provided(config.cert_dir())?;
        tracing::info!(cert = %pair.cert.display(), "using provided certificate");
    }
    let outcome = store.apply(config, force)?;
    let network_created = engine.ensure_network(&config.network_name(), config.subnet())?;
    tracing::info!(?outcome, network_created, "setup applied");
    Ok(SetupReport {
        config: outcome,
        network_created,
    })
}
