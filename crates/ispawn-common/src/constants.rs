//! System-wide constants and default paths.

use std::path::PathBuf;

/// Application name used in CLI output, labels, and default namespaces.
pub const APP_NAME: &str = "ispawn";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "ispawn";

/// Configuration directory for system-scoped installations.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/ispawn";

/// Directory under `$HOME` holding user-scoped configuration and data.
pub const USER_DIR_NAME: &str = ".ispawn";

/// File name of the persisted configuration document.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// File mode of a system-scoped configuration file (world-readable).
pub const SYSTEM_CONFIG_MODE: u32 = 0o644;

/// File mode of a user-scoped configuration file (owner-only).
pub const USER_CONFIG_MODE: u32 = 0o600;

/// Reserved domain suffix required in local access mode.
pub const LOCAL_DOMAIN_SUFFIX: &str = ".localhost";

/// Default namespace name.
pub const DEFAULT_NAMESPACE: &str = APP_NAME;

/// Default subnet of the internal network.
pub const DEFAULT_SUBNET: &str = "172.30.0.0/24";

/// Default DNS servers handed to containers.
pub const DEFAULT_DNS: [&str; 2] = ["8.8.8.8", "8.8.4.4"];

/// Default in-container prefix for bare volume specifications.
pub const DEFAULT_MOUNT_POINT: &str = "/mnt/host";

/// Default in-container prefix of home directories.
pub const DEFAULT_HOME_PREFIX: &str = "/home";

/// Default container timezone.
pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";

/// Base image used when a run or build names none.
pub const DEFAULT_BASE_IMAGE: &str = "ubuntu:24.04";

/// In-container path where the run's log directory is mounted.
pub const CONTAINER_LOG_DIR: &str = "/var/log/ispawn";

/// Suffix appended to the namespace to name the internal network.
pub const NETWORK_SUFFIX: &str = "_internal";

/// Label namespace read by the reverse proxy's container discovery.
pub const PROXY_LABEL_NAMESPACE: &str = "traefik";

/// Label namespace for ispawn's own metadata labels.
pub const METADATA_LABEL_NAMESPACE: &str = APP_NAME;

/// Secure entrypoint name declared by the reverse proxy.
pub const SECURE_ENTRYPOINT: &str = "websecure";

/// Shared middleware redirecting plain HTTP to HTTPS.
pub const REDIRECT_MIDDLEWARE: &str = "redirect-to-https";

/// Certificate resolver name used for ACME-issued certificates.
pub const ACME_RESOLVER: &str = "letsencrypt";

/// Certificate file expected in a provided certificate directory.
pub const CERT_FILE_NAME: &str = "cert.pem";

/// Private key file expected in a provided certificate directory.
pub const KEY_FILE_NAME: &str = "key.pem";

/// Environment variable keys understood by the in-container entrypoint.
pub mod env {
    /// Login name of the service user.
    pub const USERNAME: &str = "USERNAME";
    /// Service password or token.
    pub const PASSWORD: &str = "PASSWORD";
    /// Numeric user id.
    pub const UID: &str = "UID";
    /// Numeric primary group id.
    pub const GID: &str = "GID";
    /// Comma-joined service identifiers.
    pub const SERVICES: &str = "SERVICES";
    /// In-container home directory of the service user.
    pub const HOME_DIR: &str = "HOME_DIR";
    /// In-container log directory.
    pub const LOG_DIR: &str = "LOG_DIR";
    /// Container timezone.
    pub const TIMEZONE: &str = "TZ";
    /// Group the service user must belong to.
    pub const REQUIRED_GROUP: &str = "REQUIRED_GROUP";
    /// Grants the service user sudo rights when set.
    pub const SUDO: &str = "SUDO";
}

/// Returns the invoking user's home directory from `$HOME`.
///
/// Falls back to `/tmp` when the variable is unset so that paths stay
/// absolute.
pub fn home_dir() -> PathBuf {
    std::env::var_os("HOME").map_or_else(|| PathBuf::from("/tmp"), PathBuf::from)
}

/// Returns the per-user ispawn directory (`$HOME/.ispawn`).
pub fn user_dir() -> PathBuf {
    home_dir().join(USER_DIR_NAME)
}

/// Returns the root of the provisioned data tree for a namespace.
pub fn user_data_root(namespace: &str) -> PathBuf {
    user_dir().join("user").join(namespace)
}
