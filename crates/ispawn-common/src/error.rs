//! Unified error types for the ispawn workspace.
//!
//! The variants mirror the failure classes an operator can act on:
//! invalid global settings, malformed per-run input, missing certificate
//! material, and failures reported by the container engine.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum IspawnError {
    /// Global settings are invalid or contradict each other.
    #[error("configuration error: {message}")]
    Configuration {
        /// Offending value and the invariant it violates.
        message: String,
    },

    /// Per-run input is malformed: volume spec, path, service, or identity.
    #[error("validation error: {message}")]
    Validation {
        /// Offending value and the invariant it violates.
        message: String,
    },

    /// Certificate material is missing or unusable.
    #[error("certificate error: {message}")]
    Certificate {
        /// Description of the missing or invalid material.
        message: String,
    },

    /// The container engine failed a container operation.
    #[error("container error: {message}")]
    Container {
        /// Message surfaced by the engine adapter.
        message: String,
    },

    /// The container engine failed an image operation.
    #[error("image error: {message}")]
    Image {
        /// Message surfaced by the engine adapter.
        message: String,
    },

    /// The container engine failed a network operation.
    #[error("network error: {message}")]
    Network {
        /// Message surfaced by the engine adapter.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration document could not be encoded or decoded.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl IspawnError {
    /// Shorthand for [`IspawnError::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for [`IspawnError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wraps an [`std::io::Error`] with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, IspawnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_displays_message() {
        let err = IspawnError::config("domain \"x\" must end with \".localhost\"");
        assert_eq!(
            err.to_string(),
            "configuration error: domain \"x\" must end with \".localhost\""
        );
    }

    #[test]
    fn io_error_includes_path() {
        let err = IspawnError::io(
            "/etc/ispawn/config.yaml",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(err.to_string().contains("/etc/ispawn/config.yaml"));
    }
}
