//! `ispawn setup`: Validate and persist the configuration.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use ispawn_common::config::{AccessModeKind, CertStrategyKind, Config, InstallScope, RawConfig};
use ispawn_common::store::{ApplyOutcome, ConfigStore};
use ispawn_core::identity::running_as_root;
use ispawn_runtime::engine::Engine;
use ispawn_runtime::setup;

use crate::context;
use crate::output::{BOLD, DIM, GREEN, RESET};

/// Arguments for the `setup` command.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Access mode.
    #[arg(long, value_enum)]
    pub mode: ModeArg,

    /// Base domain of the service domains.
    #[arg(long)]
    pub domain: String,

    /// Certificate strategy; required in remote mode.
    #[arg(long, value_enum)]
    pub cert_strategy: Option<CertStrategyArg>,

    /// Directory holding `cert.pem` and `key.pem` for provided certificates.
    #[arg(long)]
    pub cert_dir: Option<PathBuf>,

    /// ACME contact address.
    #[arg(long)]
    pub email: Option<String>,

    /// IPv4 CIDR of the internal network.
    #[arg(long)]
    pub subnet: Option<String>,

    /// Namespace name prefixing images, containers, and the network.
    #[arg(long)]
    pub name: Option<String>,

    /// DNS server handed to containers (repeatable).
    #[arg(long = "dns")]
    pub dns: Vec<String>,

    /// Default volume mounted into every container (repeatable).
    #[arg(short = 'v', long = "volume")]
    pub volumes: Vec<String>,

    /// In-container prefix for bare volume paths.
    #[arg(long)]
    pub mount_point: Option<String>,

    /// Include the user name in container names and domains.
    #[arg(long)]
    pub user_in_namespace: bool,

    /// In-container prefix of home directories.
    #[arg(long)]
    pub home_prefix: Option<String>,

    /// Container timezone.
    #[arg(long)]
    pub timezone: Option<String>,

    /// Overwrite a differing persisted configuration.
    #[arg(short, long)]
    pub force: bool,
}

/// `--mode` values.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Services under a `.localhost` domain.
    Local,
    /// Services under a public domain with real certificates.
    Remote,
}

/// `--cert-strategy` values.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CertStrategyArg {
    /// No certificates; local mode only.
    None,
    /// Operator-provided wildcard certificate.
    Provided,
    /// Certificates issued over ACME.
    Acme,
}

impl SetupArgs {
    /// Folds the flags into a configuration document for `scope`.
    fn to_raw(&self, scope: InstallScope) -> RawConfig {
        let mode = match self.mode {
            ModeArg::Local => AccessModeKind::Local,
            ModeArg::Remote => AccessModeKind::Remote,
        };
        let mut raw = RawConfig::new(scope, mode, self.domain.clone());
        raw.cert_strategy = self.cert_strategy.map(|s| match s {
            CertStrategyArg::None => CertStrategyKind::None,
            CertStrategyArg::Provided => CertStrategyKind::Provided,
            CertStrategyArg::Acme => CertStrategyKind::Acme,
        });
        raw.cert_dir.clone_from(&self.cert_dir);
        raw.email.clone_from(&self.email);
        if let Some(subnet) = &self.subnet {
            raw.subnet.clone_from(subnet);
        }
        if let Some(name) = &self.name {
            raw.name.clone_from(name);
        }
        if !self.dns.is_empty() {
            raw.dns.clone_from(&self.dns);
        }
        raw.volumes.clone_from(&self.volumes);
        if let Some(mount_point) = &self.mount_point {
            raw.mount_point.clone_from(mount_point);
        }
        raw.user_in_namespace = self.user_in_namespace;
        if let Some(home_prefix) = &self.home_prefix {
            raw.home_prefix.clone_from(home_prefix);
        }
        if let Some(timezone) = &self.timezone {
            raw.timezone.clone_from(timezone);
        }
        raw
    }
}

/// Executes the `setup` command.
///
/// The configuration is validated before the engine is contacted.
///
/// # Errors
///
/// Returns an error if the flags form an inconsistent configuration, the
/// persisted copy drifted without `--force`, or the engine fails.
pub fn execute(args: SetupArgs, scope: Option<InstallScope>) -> anyhow::Result<()> {
    let scope = scope.unwrap_or_else(context::default_scope);
    let config =
        Config::try_from(args.to_raw(scope)).map_err(|e| anyhow::anyhow!("{e}"))?;
    let store = ConfigStore::for_scope(scope);
    let engine = Engine::detect().map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing::info!(scope = %scope, domain = %config.domain(), "applying configuration");
    let report = setup::apply(&config, &store, &engine, running_as_root(), args.force)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let verb = match report.config {
        ApplyOutcome::Created => "written",
        ApplyOutcome::Unchanged => "unchanged",
        ApplyOutcome::Replaced => "replaced",
    };
    eprintln!(
        "  {GREEN}✓{RESET} configuration {verb} {DIM}({}){RESET}",
        store.path().display()
    );
    if report.network_created {
        eprintln!("  {GREEN}✓{RESET} network {BOLD}{}{RESET} created", config.network_name());
    } else {
        eprintln!("  {DIM}network {} already exists{RESET}", config.network_name());
    }
    Ok(())
}
