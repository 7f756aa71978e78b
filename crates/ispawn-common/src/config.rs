//! Global configuration model for ispawn.
//!
//! [`RawConfig`] is the flat document persisted on disk and filled from
//! command-line flags. [`Config`] is its validated form: the access mode
//! and certificate strategy are closed sum types, so a `Config` value can
//! only hold a consistent combination. Every conversion and every setter
//! goes through the same validation, which fails instead of coercing.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{IspawnError, Result};
use crate::types::{MountSpec, is_dns_label, validate_container_path};

/// Where the configuration is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallScope {
    /// System-wide under `/etc/ispawn`; applying it requires root.
    System,
    /// Per-user under `$HOME/.ispawn`.
    User,
}

impl InstallScope {
    /// Returns the configuration directory for this scope.
    #[must_use]
    pub fn config_dir(self) -> PathBuf {
        match self {
            Self::System => PathBuf::from(constants::SYSTEM_CONFIG_DIR),
            Self::User => constants::user_dir(),
        }
    }

    /// Returns the configuration file path for this scope.
    #[must_use]
    pub fn config_path(self) -> PathBuf {
        self.config_dir().join(constants::CONFIG_FILE_NAME)
    }

    /// Returns the file mode the configuration file is written with.
    #[must_use]
    pub const fn file_mode(self) -> u32 {
        match self {
            Self::System => constants::SYSTEM_CONFIG_MODE,
            Self::User => constants::USER_CONFIG_MODE,
        }
    }

    /// Returns the other scope.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::System => Self::User,
            Self::User => Self::System,
        }
    }
}

impl fmt::Display for InstallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
        }
    }
}

/// How TLS certificates are obtained for a remote deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CertStrategy {
    /// Wildcard certificate and key supplied by the operator.
    Provided,
    /// Certificates issued automatically through ACME.
    Acme {
        /// Contact address registered with the ACME provider.
        email: String,
    },
}

/// Who can reach the deployed services.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Only the operator's machine, under the reserved local suffix with
    /// self-issued certificates.
    Local,
    /// A network-routable domain with the given certificate strategy.
    Remote(CertStrategy),
}

/// Access mode as spelled in the persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessModeKind {
    /// See [`AccessMode::Local`].
    Local,
    /// See [`AccessMode::Remote`].
    Remote,
}

/// Certificate strategy as spelled in the persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertStrategyKind {
    /// No strategy; only valid in local access mode.
    None,
    /// See [`CertStrategy::Provided`].
    Provided,
    /// See [`CertStrategy::Acme`].
    Acme,
}

impl fmt::Display for CertStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Provided => write!(f, "provided"),
            Self::Acme => write!(f, "acme"),
        }
    }
}

/// Flat, unvalidated configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Installation scope.
    pub install_scope: InstallScope,
    /// Access mode.
    pub access_mode: AccessModeKind,
    /// Certificate strategy; mandatory in remote mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_strategy: Option<CertStrategyKind>,
    /// Certificate directory; defaults to `<config dir>/certs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_dir: Option<PathBuf>,
    /// ACME contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Base domain of the per-service domains.
    pub domain: String,
    /// IPv4 CIDR of the internal network.
    #[serde(default = "default_subnet")]
    pub subnet: String,
    /// Namespace name prefixing images, containers, and the network.
    #[serde(default = "default_name")]
    pub name: String,
    /// DNS servers handed to containers.
    #[serde(default = "default_dns")]
    pub dns: Vec<String>,
    /// Default volume specifications mounted into every container.
    #[serde(default)]
    pub volumes: Vec<String>,
    /// In-container prefix for bare volume specifications.
    #[serde(default = "default_mount_point")]
    pub mount_point: String,
    /// Whether container names and domains include the user name.
    #[serde(default)]
    pub user_in_namespace: bool,
    /// In-container prefix of home directories.
    #[serde(default = "default_home_prefix")]
    pub home_prefix: String,
    /// Container timezone.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_subnet() -> String {
    constants::DEFAULT_SUBNET.to_owned()
}

fn default_name() -> String {
    constants::DEFAULT_NAMESPACE.to_owned()
}

fn default_dns() -> Vec<String> {
    constants::DEFAULT_DNS.iter().map(|s| (*s).to_owned()).collect()
}

fn default_mount_point() -> String {
    constants::DEFAULT_MOUNT_POINT.to_owned()
}

fn default_home_prefix() -> String {
    constants::DEFAULT_HOME_PREFIX.to_owned()
}

fn default_timezone() -> String {
    constants::DEFAULT_TIMEZONE.to_owned()
}

impl RawConfig {
    /// Creates a document with every optional field at its default.
    #[must_use]
    pub fn new(
        install_scope: InstallScope,
        access_mode: AccessModeKind,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            install_scope,
            access_mode,
            cert_strategy: None,
            cert_dir: None,
            email: None,
            domain: domain.into(),
            subnet: default_subnet(),
            name: default_name(),
            dns: default_dns(),
            volumes: Vec::new(),
            mount_point: default_mount_point(),
            user_in_namespace: false,
            home_prefix: default_home_prefix(),
            timezone: default_timezone(),
        }
    }
}

/// Validated global configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    install_scope: InstallScope,
    access: AccessMode,
    cert_dir: PathBuf,
    domain: String,
    subnet: String,
    name: String,
    dns: Vec<String>,
    default_mounts: Vec<MountSpec>,
    mount_point: String,
    user_in_namespace: bool,
    home_prefix: String,
    timezone: String,
}

impl TryFrom<RawConfig> for Config {
    type Error = IspawnError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let email = raw.email.filter(|e| !e.trim().is_empty());
        let access = resolve_access(raw.access_mode, raw.cert_strategy, email)?;
        validate_domain(&raw.domain, &access)?;
        validate_subnet(&raw.subnet)?;
        if !is_dns_label(&raw.name) {
            return Err(IspawnError::config(format!(
                "name \"{}\" must be 1-63 ASCII letters, digits, or inner hyphens",
                raw.name
            )));
        }
        for server in &raw.dns {
            if server.parse::<IpAddr>().is_err() {
                return Err(IspawnError::config(format!(
                    "DNS server \"{server}\" is not an IP address"
                )));
            }
        }
        let mount_point = canonical_prefix("mount_point", &raw.mount_point)?;
        let home_prefix = canonical_prefix("home_prefix", &raw.home_prefix)?;
        let default_mounts = raw
            .volumes
            .iter()
            .map(|v| {
                MountSpec::parse(v, &mount_point)
                    .map_err(|e| IspawnError::config(format!("default volume rejected: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        if raw.timezone.trim().is_empty() {
            return Err(IspawnError::config("timezone must not be empty"));
        }
        let cert_dir = raw
            .cert_dir
            .unwrap_or_else(|| raw.install_scope.config_dir().join("certs"));

        Ok(Self {
            install_scope: raw.install_scope,
            access,
            cert_dir,
            domain: raw.domain,
            subnet: raw.subnet,
            name: raw.name,
            dns: raw.dns,
            default_mounts,
            mount_point,
            user_in_namespace: raw.user_in_namespace,
            home_prefix,
            timezone: raw.timezone,
        })
    }
}

impl From<&Config> for RawConfig {
    fn from(config: &Config) -> Self {
        let (access_mode, cert_strategy, email) = match &config.access {
            AccessMode::Local => (AccessModeKind::Local, None, None),
            AccessMode::Remote(CertStrategy::Provided) => {
                (AccessModeKind::Remote, Some(CertStrategyKind::Provided), None)
            }
            AccessMode::Remote(CertStrategy::Acme { email }) => (
                AccessModeKind::Remote,
                Some(CertStrategyKind::Acme),
                Some(email.clone()),
            ),
        };
        Self {
            install_scope: config.install_scope,
            access_mode,
            cert_strategy,
            cert_dir: Some(config.cert_dir.clone()),
            email,
            domain: config.domain.clone(),
            subnet: config.subnet.clone(),
            name: config.name.clone(),
            dns: config.dns.clone(),
            volumes: config.default_mounts.iter().map(ToString::to_string).collect(),
            mount_point: config.mount_point.clone(),
            user_in_namespace: config.user_in_namespace,
            home_prefix: config.home_prefix.clone(),
            timezone: config.timezone.clone(),
        }
    }
}

fn resolve_access(
    mode: AccessModeKind,
    strategy: Option<CertStrategyKind>,
    email: Option<String>,
) -> Result<AccessMode> {
    match mode {
        AccessModeKind::Local => {
            if let Some(kind @ (CertStrategyKind::Provided | CertStrategyKind::Acme)) = strategy {
                return Err(IspawnError::config(format!(
                    "certificate strategy \"{kind}\" is only valid in remote access mode; \
                     local mode uses self-issued certificates"
                )));
            }
            if let Some(email) = email {
                return Err(IspawnError::config(format!(
                    "email \"{email}\" is not used in local access mode"
                )));
            }
            Ok(AccessMode::Local)
        }
        AccessModeKind::Remote => match strategy {
            None | Some(CertStrategyKind::None) => Err(IspawnError::config(
                "remote access mode requires a certificate strategy (provided or acme)",
            )),
            Some(CertStrategyKind::Provided) => {
                if let Some(email) = email {
                    return Err(IspawnError::config(format!(
                        "email \"{email}\" is only used with the acme certificate strategy"
                    )));
                }
                Ok(AccessMode::Remote(CertStrategy::Provided))
            }
            Some(CertStrategyKind::Acme) => {
                let email = email.ok_or_else(|| {
                    IspawnError::config("the acme certificate strategy requires an email")
                })?;
                if !is_plausible_email(&email) {
                    return Err(IspawnError::config(format!(
                        "email \"{email}\" must look like local@domain"
                    )));
                }
                Ok(AccessMode::Remote(CertStrategy::Acme { email }))
            }
        },
    }
}

fn is_plausible_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.contains('@'))
}

fn validate_domain(domain: &str, access: &AccessMode) -> Result<()> {
    if domain.is_empty() || !domain.split('.').all(is_dns_label) {
        return Err(IspawnError::config(format!(
            "domain \"{domain}\" must be dot-separated DNS labels"
        )));
    }
    if *access == AccessMode::Local && !domain.ends_with(constants::LOCAL_DOMAIN_SUFFIX) {
        return Err(IspawnError::config(format!(
            "domain \"{domain}\" must end with \"{}\" in local access mode",
            constants::LOCAL_DOMAIN_SUFFIX
        )));
    }
    Ok(())
}

fn validate_subnet(subnet: &str) -> Result<()> {
    let valid = subnet.split_once('/').is_some_and(|(addr, prefix)| {
        addr.parse::<std::net::Ipv4Addr>().is_ok() && prefix.parse::<u8>().is_ok_and(|p| p <= 32)
    });
    if valid {
        Ok(())
    } else {
        Err(IspawnError::config(format!(
            "subnet \"{subnet}\" must be an IPv4 CIDR such as {}",
            constants::DEFAULT_SUBNET
        )))
    }
}

fn canonical_prefix(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim_end_matches('/');
    validate_container_path(trimmed)
        .map_err(|e| IspawnError::config(format!("{field} rejected: {e}")))?;
    Ok(trimmed.to_owned())
}

impl Config {
    /// Installation scope.
    #[must_use]
    pub const fn install_scope(&self) -> InstallScope {
        self.install_scope
    }

    /// Access mode, carrying the certificate strategy when remote.
    #[must_use]
    pub const fn access(&self) -> &AccessMode {
        &self.access
    }

    /// Returns whether the deployment is local-only.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.access == AccessMode::Local
    }

    /// Certificate strategy, if any.
    #[must_use]
    pub const fn cert_strategy(&self) -> Option<&CertStrategy> {
        match &self.access {
            AccessMode::Local => None,
            AccessMode::Remote(strategy) => Some(strategy),
        }
    }

    /// ACME contact address, if the strategy is ACME.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self.cert_strategy() {
            Some(CertStrategy::Acme { email }) => Some(email),
            _ => None,
        }
    }

    /// Certificate resolver routers must reference, if any.
    #[must_use]
    pub fn cert_resolver(&self) -> Option<&'static str> {
        matches!(self.cert_strategy(), Some(CertStrategy::Acme { .. }))
            .then_some(constants::ACME_RESOLVER)
    }

    /// Certificate directory.
    #[must_use]
    pub fn cert_dir(&self) -> &std::path::Path {
        &self.cert_dir
    }

    /// Base domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Internal network subnet.
    #[must_use]
    pub fn subnet(&self) -> &str {
        &self.subnet
    }

    /// Namespace name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the internal network.
    #[must_use]
    pub fn network_name(&self) -> String {
        format!("{}{}", self.name, constants::NETWORK_SUFFIX)
    }

    /// DNS servers, in order.
    #[must_use]
    pub fn dns(&self) -> &[String] {
        &self.dns
    }

    /// Default mounts, in order.
    #[must_use]
    pub fn default_mounts(&self) -> &[MountSpec] {
        &self.default_mounts
    }

    /// In-container prefix for bare volume specifications, without trailing slash.
    #[must_use]
    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    /// Whether names and domains include the user name.
    #[must_use]
    pub const fn user_in_namespace(&self) -> bool {
        self.user_in_namespace
    }

    /// In-container prefix of home directories, without trailing slash.
    #[must_use]
    pub fn home_prefix(&self) -> &str {
        &self.home_prefix
    }

    /// Container timezone.
    #[must_use]
    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Path the configuration persists to.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.install_scope.config_path()
    }

    /// Switches the access mode, keeping the rest of the state.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, leaving `self` untouched, if the new
    /// mode is inconsistent with the current domain.
    pub fn set_access_mode(&mut self, access: AccessMode) -> Result<()> {
        let mut candidate = self.clone();
        candidate.access = access;
        self.commit(candidate)
    }

    /// Changes the base domain.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, leaving `self` untouched, if the
    /// domain is malformed or violates the access mode's suffix rule.
    pub fn set_domain(&mut self, domain: impl Into<String>) -> Result<()> {
        let mut candidate = self.clone();
        candidate.domain = domain.into();
        self.commit(candidate)
    }

    /// Changes the internal network subnet.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, leaving `self` untouched, if the
    /// subnet is not an IPv4 CIDR.
    pub fn set_subnet(&mut self, subnet: impl Into<String>) -> Result<()> {
        let mut candidate = self.clone();
        candidate.subnet = subnet.into();
        self.commit(candidate)
    }

    /// Replaces the default mounts with freshly parsed specifications.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, leaving `self` untouched, if any
    /// specification is malformed.
    pub fn set_default_mounts(&mut self, volumes: &[String]) -> Result<()> {
        let mut raw = RawConfig::from(&*self);
        raw.volumes = volumes.to_vec();
        *self = Self::try_from(raw)?;
        Ok(())
    }

    fn commit(&mut self, candidate: Self) -> Result<()> {
        *self = Self::try_from(RawConfig::from(&candidate))?;
        tracing::debug!(scope = %self.install_scope, "configuration updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> RawConfig {
        let mut raw = RawConfig::new(InstallScope::User, AccessModeKind::Local, "demo.localhost");
        raw.cert_dir = Some(PathBuf::from("/tmp/certs"));
        raw
    }

    fn remote(strategy: Option<CertStrategyKind>, email: Option<&str>) -> RawConfig {
        let mut raw = RawConfig::new(InstallScope::System, AccessModeKind::Remote, "example.com");
        raw.cert_strategy = strategy;
        raw.email = email.map(Into::into);
        raw
    }

    fn config_err(raw: RawConfig) -> String {
        let err = Config::try_from(raw).unwrap_err();
        assert!(matches!(err, IspawnError::Configuration { .. }), "got: {err}");
        err.to_string()
    }

    #[test]
    fn local_config_is_valid() {
        let config = Config::try_from(local()).expect("local");
        assert!(config.is_local());
        assert_eq!(config.cert_strategy(), None);
        assert_eq!(config.cert_resolver(), None);
        assert_eq!(config.network_name(), "ispawn_internal");
    }

    #[test]
    fn remote_acme_config_is_valid() {
        let raw = remote(Some(CertStrategyKind::Acme), Some("admin@example.com"));
        let config = Config::try_from(raw).expect("acme");
        assert_eq!(config.email(), Some("admin@example.com"));
        assert_eq!(config.cert_resolver(), Some("letsencrypt"));
    }

    #[test]
    fn remote_provided_config_is_valid() {
        let config = Config::try_from(remote(Some(CertStrategyKind::Provided), None))
            .expect("provided");
        assert_eq!(
            config.access(),
            &AccessMode::Remote(CertStrategy::Provided)
        );
        assert_eq!(config.cert_resolver(), None);
    }

    #[test]
    fn local_rejects_non_local_domain() {
        let mut raw = local();
        raw.domain = "ispawn.test".into();
        assert!(config_err(raw).contains("must end with \".localhost\""));
    }

    #[test]
    fn local_rejects_email() {
        let mut raw = local();
        raw.email = Some("not@needed.com".into());
        assert!(config_err(raw).contains("not used in local access mode"));
    }

    #[test]
    fn local_ignores_blank_email() {
        let mut raw = local();
        raw.email = Some("  ".into());
        assert!(Config::try_from(raw).is_ok());
    }

    #[test]
    fn local_rejects_remote_strategies() {
        let mut raw = local();
        raw.cert_strategy = Some(CertStrategyKind::Acme);
        assert!(config_err(raw).contains("only valid in remote access mode"));
    }

    #[test]
    fn local_accepts_explicit_none_strategy() {
        let mut raw = local();
        raw.cert_strategy = Some(CertStrategyKind::None);
        assert!(Config::try_from(raw).is_ok());
    }

    #[test]
    fn remote_rejects_missing_strategy() {
        assert!(config_err(remote(None, None)).contains("requires a certificate strategy"));
        assert!(
            config_err(remote(Some(CertStrategyKind::None), None))
                .contains("requires a certificate strategy")
        );
    }

    #[test]
    fn acme_rejects_missing_email() {
        let msg = config_err(remote(Some(CertStrategyKind::Acme), None));
        assert!(msg.contains("requires an email"), "got: {msg}");
    }

    #[test]
    fn acme_rejects_malformed_email() {
        let msg = config_err(remote(Some(CertStrategyKind::Acme), Some("admin")));
        assert!(msg.contains("local@domain"), "got: {msg}");
    }

    #[test]
    fn provided_rejects_email() {
        let msg = config_err(remote(Some(CertStrategyKind::Provided), Some("a@b.com")));
        assert!(msg.contains("only used with the acme"), "got: {msg}");
    }

    #[test]
    fn rejects_bad_subnet_name_and_dns() {
        let mut raw = local();
        raw.subnet = "172.30.0.0".into();
        assert!(config_err(raw).contains("IPv4 CIDR"));

        let mut raw = local();
        raw.name = "my_name".into();
        assert!(config_err(raw).contains("name \"my_name\""));

        let mut raw = local();
        raw.dns = vec!["dns.google".into()];
        assert!(config_err(raw).contains("not an IP address"));
    }

    #[test]
    fn rejects_bad_default_volume_as_configuration_error() {
        let mut raw = local();
        raw.volumes = vec!["/a:/b:rx".into()];
        assert!(config_err(raw).contains("default volume rejected"));
    }

    #[test]
    fn default_volumes_use_mount_point() {
        let mut raw = local();
        raw.mount_point = "/mnt/".into();
        raw.volumes = vec!["/data".into()];
        let config = Config::try_from(raw).expect("valid");
        assert_eq!(config.mount_point(), "/mnt");
        let path = config.default_mounts()[0]
            .target
            .container_path(std::path::Path::new("/data"))
            .expect("path");
        assert_eq!(path, "/mnt/data");
    }

    #[test]
    fn cert_dir_defaults_under_scope_dir() {
        let raw = remote(Some(CertStrategyKind::Provided), None);
        let config = Config::try_from(raw).expect("valid");
        assert_eq!(config.cert_dir(), std::path::Path::new("/etc/ispawn/certs"));
    }

    #[test]
    fn raw_roundtrip_preserves_equality() {
        let mut raw = remote(Some(CertStrategyKind::Acme), Some("ops@example.com"));
        raw.volumes = vec!["/srv/shared".into(), "/opt/data:/data:ro".into()];
        raw.user_in_namespace = true;
        let config = Config::try_from(raw).expect("valid");
        let again = Config::try_from(RawConfig::from(&config)).expect("roundtrip");
        assert_eq!(config, again);
    }

    #[test]
    fn field_difference_breaks_equality() {
        let a = Config::try_from(local()).expect("a");
        let mut raw = local();
        raw.subnet = "10.0.0.0/24".into();
        let b = Config::try_from(raw).expect("b");
        assert_ne!(a, b);
    }

    #[test]
    fn set_access_mode_to_remote_then_back_requires_local_domain() {
        let mut config = Config::try_from(local()).expect("local");
        config
            .set_access_mode(AccessMode::Remote(CertStrategy::Provided))
            .expect("remote accepts any domain");
        config.set_domain("example.org").expect("domain");

        let before = config.clone();
        let err = config.set_access_mode(AccessMode::Local).unwrap_err();
        assert!(err.to_string().contains(".localhost"));
        assert_eq!(config, before);
    }

    #[test]
    fn set_subnet_validates() {
        let mut config = Config::try_from(local()).expect("local");
        assert!(config.set_subnet("10.1.0.0/16").is_ok());
        assert_eq!(config.subnet(), "10.1.0.0/16");
        assert!(config.set_subnet("nonsense").is_err());
        assert_eq!(config.subnet(), "10.1.0.0/16");
    }

    #[test]
    fn set_default_mounts_replaces_list() {
        let mut config = Config::try_from(local()).expect("local");
        config
            .set_default_mounts(&["/srv/a".to_owned(), "/srv/b:/b:ro".to_owned()])
            .expect("mounts");
        assert_eq!(config.default_mounts().len(), 2);
        assert!(config.set_default_mounts(&["/a:/b:c:d".to_owned()]).is_err());
        assert_eq!(config.default_mounts().len(), 2);
    }
}
