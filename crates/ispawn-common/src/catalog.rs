//! Static registry of the in-container services ispawn knows how to run.
//!
//! Each entry fixes the port the service listens on and the logical
//! volumes it persists. A volume's container path may start with `~`,
//! which stands for the service user's home directory inside the
//! container.

use crate::error::{IspawnError, Result};

/// Static metadata for one supported service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Service identifier used on the command line, in tags, and in domains.
    pub id: &'static str,
    /// Port the service listens on inside the container.
    pub port: u16,
    /// Logical volume name to container path template.
    pub volumes: &'static [(&'static str, &'static str)],
    /// Whether access URLs carry the password as a `token` query parameter.
    pub token_auth: bool,
}

impl ServiceDescriptor {
    /// Expands the `~` placeholder of each volume template against `home`.
    ///
    /// Entries keep the catalog order.
    #[must_use]
    pub fn container_volumes(&self, home: &str) -> Vec<(&'static str, String)> {
        self.volumes
            .iter()
            .map(|(name, template)| (*name, expand_home(template, home)))
            .collect()
    }
}

fn expand_home(template: &str, home: &str) -> String {
    if template == "~" {
        return home.to_owned();
    }
    template.strip_prefix("~/").map_or_else(
        || template.to_owned(),
        |rest| format!("{}/{rest}", home.trim_end_matches('/')),
    )
}

const JUPYTER_VOLUMES: &[(&str, &str)] = &[
    ("jupyter", "~/.jupyter"),
    ("ipython", "~/.ipython"),
    ("local_jupyter", "~/.local/share/jupyter"),
];

/// Every supported service, sorted by identifier.
pub static SERVICES: &[ServiceDescriptor] = &[
    ServiceDescriptor {
        id: "jupyter",
        port: 8888,
        volumes: JUPYTER_VOLUMES,
        token_auth: true,
    },
    ServiceDescriptor {
        id: "jupyterhub",
        port: 8000,
        volumes: &[
            ("jupyterhub_data", "~/.local/share/jupyterhub"),
            ("jupyterhub_config", "~/.jupyterhub"),
            ("jupyter", "~/.jupyter"),
            ("ipython", "~/.ipython"),
            ("local_jupyter", "~/.local/share/jupyter"),
        ],
        token_auth: false,
    },
    ServiceDescriptor {
        id: "jupyterlab",
        port: 8889,
        volumes: JUPYTER_VOLUMES,
        token_auth: true,
    },
    ServiceDescriptor {
        id: "rstudio",
        port: 8787,
        volumes: &[
            ("rstudio", "~/.config/rstudio"),
            ("local_rstudio", "~/.local/share/rstudio"),
        ],
        token_auth: false,
    },
    ServiceDescriptor {
        id: "vscode",
        port: 8042,
        volumes: &[("vscode", "~/.vscode"), ("config", "~/.config/Code")],
        token_auth: false,
    },
];

/// Looks up a service by identifier (case-insensitive).
///
/// # Errors
///
/// Returns a validation error listing the known services if `id` is unknown.
pub fn lookup(id: &str) -> Result<&'static ServiceDescriptor> {
    let wanted = id.trim().to_ascii_lowercase();
    SERVICES.iter().find(|s| s.id == wanted).ok_or_else(|| {
        IspawnError::validation(format!(
            "unknown service \"{id}\", expected one of: {}",
            ids().join(", ")
        ))
    })
}

/// Returns the identifiers of all known services.
#[must_use]
pub fn ids() -> Vec<&'static str> {
    SERVICES.iter().map(|s| s.id).collect()
}
