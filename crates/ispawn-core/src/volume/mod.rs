//! Volume resolution, provisioning, and ordering.
//!
//! Operator mounts are resolved strictly: their host side must already
//! exist. Service-owned and log directories are provisioned on demand.
//! [`assemble`] fixes the order in which the engine sees the bindings,
//! since a later entry shadows an earlier one at the same container path.

pub mod provision;
pub mod resolve;

use std::fmt;
use std::path::PathBuf;

use ispawn_common::types::VolumeMode;
use serde::Serialize;

pub use provision::{DirAccess, Provisioned, Provisioner, can_use};
pub use resolve::{expand_home, resolve_strict};

/// A fully resolved bind mount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VolumeBinding {
    /// Absolute host path.
    pub host: PathBuf,
    /// Absolute in-container path.
    pub container: PathBuf,
    /// Access mode.
    pub mode: VolumeMode,
}

impl VolumeBinding {
    /// Creates a read-write binding.
    #[must_use]
    pub fn read_write(host: impl Into<PathBuf>, container: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            mode: VolumeMode::ReadWrite,
        }
    }
}

impl fmt::Display for VolumeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.host.display(),
            self.container.display(),
            self.mode
        )
    }
}

/// Builds the final mount list.
///
/// Order: global defaults, run mounts, the log mount, then service volumes.
#[must_use]
pub fn assemble(
    defaults: Vec<VolumeBinding>,
    run: Vec<VolumeBinding>,
    log: VolumeBinding,
    services: Vec<VolumeBinding>,
) -> Vec<VolumeBinding> {
    defaults
        .into_iter()
        .chain(run)
        .chain(std::iter::once(log))
        .chain(services)
        .collect()
}
