//! Per-run input.

use ispawn_common::types::Password;

use crate::image::ImageSelection;

/// Identity settings overriding the invoking user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityOverride {
    /// Run the services as this user instead of the invoking one.
    pub user: Option<String>,
    /// Group the service user must belong to inside the container.
    pub required_group: Option<String>,
    /// Grant the service user sudo rights.
    pub sudo: bool,
}

/// One request to launch a container.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Run name, unique within the namespace.
    pub name: String,
    /// Image and services.
    pub selection: ImageSelection,
    /// Raw volume specifications, `path` or `host:container[:mode]`.
    pub volumes: Vec<String>,
    /// Identity override.
    pub identity: IdentityOverride,
    /// Service password; generated when absent.
    pub password: Option<Password>,
}

impl RunRequest {
    /// Request with no extra mounts, no override, and a generated password.
    #[must_use]
    pub fn new(name: impl Into<String>, selection: ImageSelection) -> Self {
        Self {
            name: name.into(),
            selection,
            volumes: Vec::new(),
            identity: IdentityOverride::default(),
            password: None,
        }
    }

    /// Adds raw volume specifications.
    #[must_use]
    pub fn with_volumes(mut self, volumes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.volumes.extend(volumes.into_iter().map(Into::into));
        self
    }

    /// Sets the identity override.
    #[must_use]
    pub fn with_identity(mut self, identity: IdentityOverride) -> Self {
        self.identity = identity;
        self
    }

    /// Sets the service password.
    #[must_use]
    pub fn with_password(mut self, password: Password) -> Self {
        self.password = Some(password);
        self
    }
}
