//! Image build context.
//!
//! The Dockerfile and entrypoint are static; the base image and service
//! list reach them as build arguments.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use ispawn_common::error::{IspawnError, Result};

/// Dockerfile of every ispawn image.
pub const DOCKERFILE: &str = include_str!("../templates/Dockerfile");

/// Entrypoint creating the service user and starting the services.
pub const ENTRYPOINT: &str = include_str!("../templates/entrypoint.sh");

/// A temporary directory holding the build files; removed on drop.
#[derive(Debug)]
pub struct BuildContext {
    dir: tempfile::TempDir,
}

impl BuildContext {
    /// Writes the build files into a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or a file cannot be written.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("ispawn-build-")
            .tempdir()
            .map_err(|e| IspawnError::io(std::env::temp_dir(), e))?;
        write(&dir.path().join("Dockerfile"), DOCKERFILE, 0o644)?;
        write(&dir.path().join("entrypoint.sh"), ENTRYPOINT, 0o755)?;
        tracing::debug!(path = %dir.path().display(), "build context written");
        Ok(Self { dir })
    }

    /// Directory to hand to the image build.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

fn write(path: &Path, contents: &str, mode: u32) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| IspawnError::io(path, e))?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| IspawnError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_holds_executable_entrypoint() {
        let ctx = BuildContext::create().expect("context");
        let entry = ctx.path().join("entrypoint.sh");
        let mode = std::fs::metadata(&entry).expect("meta").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(ctx.path().join("Dockerfile").is_file());
    }

    #[test]
    fn context_is_removed_on_drop() {
        let ctx = BuildContext::create().expect("context");
        let path = ctx.path().to_path_buf();
        drop(ctx);
        assert!(!path.exists());
    }

    #[test]
    fn dockerfile_consumes_build_args() {
        assert!(DOCKERFILE.contains("ARG BASE_IMAGE"));
        assert!(DOCKERFILE.contains("ARG SERVICES"));
    }
}
