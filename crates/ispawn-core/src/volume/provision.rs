//! Provisioning of service-owned and log directories.
//!
//! A service directory that cannot be made usable by the effective user
//! is reported as a warning, not an error: the binding is kept and the
//! container engine decides whether the mount works.

use std::os::unix::fs::MetadataExt;
use std::path::Path;

use ispawn_common::catalog::ServiceDescriptor;
use ispawn_common::constants::CONTAINER_LOG_DIR;
use ispawn_common::error::{IspawnError, Result};
use ispawn_common::layout::DataLayout;

use super::VolumeBinding;
use crate::identity::Identity;

/// Ownership and permission bits of a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirAccess {
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
    /// Permission bits.
    pub mode: u32,
}

impl DirAccess {
    /// Reads ownership and mode of `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if `path` cannot be inspected.
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| IspawnError::io(path, e))?;
        Ok(Self {
            uid: meta.uid(),
            gid: meta.gid(),
            mode: meta.mode(),
        })
    }
}

/// Returns whether `identity` has read, write, and execute access.
///
/// Root always does. Otherwise the owner bits apply when the identity owns
/// the directory, else the group bits when it belongs to the owning group.
#[must_use]
pub fn can_use(access: DirAccess, identity: &Identity) -> bool {
    if identity.is_root() {
        return true;
    }
    if access.uid == identity.uid {
        return access.mode & 0o700 == 0o700;
    }
    identity.in_group(access.gid) && access.mode & 0o070 == 0o070
}

/// Service bindings together with the non-fatal problems met on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provisioned {
    /// One read-write binding per (service, logical volume).
    pub bindings: Vec<VolumeBinding>,
    /// Directories that could not be made usable.
    pub warnings: Vec<String>,
}

/// Creates the directories a run needs under a [`DataLayout`].
#[derive(Debug)]
pub struct Provisioner<'a> {
    layout: &'a DataLayout,
    privileged: bool,
}

impl<'a> Provisioner<'a> {
    /// Provisioner over `layout`; `privileged` allows fixing ownership.
    #[must_use]
    pub const fn new(layout: &'a DataLayout, privileged: bool) -> Self {
        Self { layout, privileged }
    }

    /// Creates one directory per service volume and binds it at the
    /// catalog path under `container_home`.
    ///
    /// Services are taken in the given order, volumes in catalog order.
    pub fn service_volumes(
        &self,
        run: &str,
        services: &[&ServiceDescriptor],
        identity: &Identity,
        container_home: &str,
    ) -> Provisioned {
        let mut out = Provisioned::default();
        for service in services {
            for (logical, container) in service.container_volumes(container_home) {
                let dir = self.layout.volume_dir(run, service.id, logical);
                if let Some(warning) = self.ensure_usable(&dir, identity) {
                    out.warnings.push(warning);
                }
                out.bindings.push(VolumeBinding::read_write(dir, container));
            }
        }
        out
    }

    /// Creates the next numbered log directory of `run`.
    ///
    /// Returns the binding at the fixed in-container log path and an
    /// optional warning if the directory is not usable by `identity`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn log_dir(&self, run: &str, identity: &Identity) -> Result<(VolumeBinding, Option<String>)> {
        let next = self.layout.log_indices(run)?.last().map_or(1, |n| n + 1);
        let dir = self.layout.log_dir(run, next);
        std::fs::create_dir_all(&dir).map_err(|e| IspawnError::io(&dir, e))?;
        tracing::debug!(path = %dir.display(), "created log directory");
        let warning = self.ensure_usable(&dir, identity);
        Ok((VolumeBinding::read_write(dir, CONTAINER_LOG_DIR), warning))
    }

    fn ensure_usable(&self, dir: &Path, identity: &Identity) -> Option<String> {
        let problem = match self.try_make_usable(dir, identity) {
            Ok(true) => return None,
            Ok(false) => format!(
                "{} is not readable, writable, and searchable by {} (uid {})",
                dir.display(),
                identity.name,
                identity.uid
            ),
            Err(e) => e.to_string(),
        };
        tracing::warn!(path = %dir.display(), user = %identity.name, "{problem}");
        Some(problem)
    }

    fn try_make_usable(&self, dir: &Path, identity: &Identity) -> Result<bool> {
        std::fs::create_dir_all(dir).map_err(|e| IspawnError::io(dir, e))?;
        if can_use(DirAccess::of(dir)?, identity) {
            return Ok(true);
        }
        if !self.privileged {
            return Ok(false);
        }
        nix::unistd::chown(
            dir,
            Some(nix::unistd::Uid::from_raw(identity.uid)),
            Some(nix::unistd::Gid::from_raw(identity.gid)),
        )
        .map_err(|e| IspawnError::io(dir, e.into()))?;
        tracing::debug!(path = %dir.display(), uid = identity.uid, "changed directory owner");
        Ok(can_use(DirAccess::of(dir)?, identity))
    }
}
