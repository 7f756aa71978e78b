//! Strict resolution of operator-supplied mounts.

use std::path::{Path, PathBuf};

use ispawn_common::error::{IspawnError, Result};
use ispawn_common::types::MountSpec;

use super::VolumeBinding;

/// Expands a leading `~` against `home`.
#[must_use]
pub fn expand_home(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        return home.to_path_buf();
    }
    path.strip_prefix("~/")
        .map_or_else(|| PathBuf::from(path), |rest| home.join(rest))
}

/// Resolves a mount specification whose host side must already exist.
///
/// The host path is `~`-expanded against `home` and canonicalized, so the
/// binding always carries an absolute path free of symlinks. A bare spec
/// takes its container path from the canonical host path's basename.
///
/// # Errors
///
/// Returns a validation error if the host path does not exist or cannot
/// be resolved, or if a bare spec resolves to a path without a usable
/// basename.
pub fn resolve_strict(spec: &MountSpec, home: &Path) -> Result<VolumeBinding> {
    let expanded = expand_home(&spec.host, home);
    let host = std::fs::canonicalize(&expanded).map_err(|e| {
        IspawnError::validation(format!(
            "host path \"{}\" of volume \"{spec}\" cannot be resolved: {e}",
            expanded.display()
        ))
    })?;
    let container = spec.target.container_path(&host)?;
    tracing::debug!(host = %host.display(), container = %container, "resolved volume");
    Ok(VolumeBinding {
        host,
        container: PathBuf::from(container),
        mode: spec.mode,
    })
}
