//! Validation of operator-provided certificate material.

use std::path::{Path, PathBuf};

use ispawn_common::constants::{CERT_FILE_NAME, KEY_FILE_NAME};
use ispawn_common::error::{IspawnError, Result};

/// Certificate and private key of a provided wildcard certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificatePair {
    /// PEM certificate chain.
    pub cert: PathBuf,
    /// PEM private key.
    pub key: PathBuf,
}

/// Checks that `dir` holds a PEM certificate and private key.
///
/// # Errors
///
/// Returns a certificate error naming the missing or malformed file.
pub fn validate_provided(dir: &Path) -> Result<CertificatePair> {
    if !dir.is_dir() {
        return Err(IspawnError::Certificate {
            message: format!(
                "certificate directory {} does not exist; place {CERT_FILE_NAME} and \
                 {KEY_FILE_NAME} there",
                dir.display()
            ),
        });
    }
    let cert = dir.join(CERT_FILE_NAME);
    let key = dir.join(KEY_FILE_NAME);
    check_pem(&cert, "CERTIFICATE-----")?;
    check_pem(&key, "PRIVATE KEY-----")?;
    tracing::debug!(dir = %dir.display(), "provided certificates found");
    Ok(CertificatePair { cert, key })
}

fn check_pem(path: &Path, marker: &str) -> Result<()> {
    let text = std::fs::read_to_string(path).map_err(|e| IspawnError::Certificate {
        message: format!("cannot read {}: {e}", path.display()),
    })?;
    if text.contains("-----BEGIN") && text.contains(marker) {
        Ok(())
    } else {
        Err(IspawnError::Certificate {
            message: format!("{} is not a PEM file containing {marker}", path.display()),
        })
    }
}
