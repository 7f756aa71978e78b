//! Domain primitive types used across the ispawn workspace.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IspawnError, Result};

/// Access mode of a bind mount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeMode {
    /// Read-write bind mount.
    #[default]
    #[serde(rename = "rw")]
    ReadWrite,
    /// Read-only bind mount.
    #[serde(rename = "ro")]
    ReadOnly,
}

impl VolumeMode {
    /// Returns the short textual form used in volume specifications.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadWrite => "rw",
            Self::ReadOnly => "ro",
        }
    }

    /// Returns whether the mount is read-only.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::ReadOnly)
    }
}

impl fmt::Display for VolumeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a mount lands inside the container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MountTarget {
    /// Explicit absolute in-container path.
    Path(String),
    /// `{mount_point}/{basename}` of the resolved host path.
    UnderMountPoint(String),
}

impl MountTarget {
    /// In-container path for a mount whose host side resolved to `host`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `host` has no final component or the
    /// resulting path is not a valid container path.
    pub fn container_path(&self, host: &Path) -> Result<String> {
        let path = match self {
            Self::Path(path) => path.clone(),
            Self::UnderMountPoint(mount_point) => {
                let name = host.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                    IspawnError::validation(format!(
                        "host path \"{}\" has no final path component to mount under \
                         \"{mount_point}\"",
                        host.display()
                    ))
                })?;
                format!("{mount_point}/{name}")
            }
        };
        validate_container_path(&path)?;
        Ok(path)
    }
}

/// A syntactically valid volume specification.
///
/// The host side is kept as written (it may be relative or start with
/// `~`); resolving it against the filesystem is the volume resolver's job.
/// A bare path only learns its container path once the host side is
/// resolved, so `~` and `.` mount under their real directory names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MountSpec {
    /// Host path as written by the operator.
    pub host: String,
    /// In-container destination.
    pub target: MountTarget,
    /// Access mode.
    pub mode: VolumeMode,
}

impl MountSpec {
    /// Parses `path` or `hostPath:containerPath[:mode]`.
    ///
    /// A bare path is mounted read-write at `{mount_point}/{basename}`,
    /// the basename being taken from the resolved host path.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the spec has more than three
    /// colon-delimited fields, an empty field, a mode other than `ro` or
    /// `rw`, or an invalid container path or mount point.
    pub fn parse(raw: &str, mount_point: &str) -> Result<Self> {
        let fields: Vec<&str> = raw.split(':').collect();
        if fields.len() > 3 {
            return Err(IspawnError::validation(format!(
                "volume spec \"{raw}\" has {} colon-delimited fields, expected at most 3 \
                 (hostPath:containerPath:mode)",
                fields.len()
            )));
        }
        if fields.iter().any(|f| f.is_empty()) {
            return Err(IspawnError::validation(format!(
                "volume spec \"{raw}\" contains an empty field"
            )));
        }

        let (host, target, mode) = match fields.as_slice() {
            [host] => {
                let mount_point = mount_point.trim_end_matches('/');
                validate_container_path(mount_point)?;
                (
                    *host,
                    MountTarget::UnderMountPoint(mount_point.to_owned()),
                    VolumeMode::ReadWrite,
                )
            }
            [host, container] => (*host, explicit(container)?, VolumeMode::ReadWrite),
            [host, container, mode] => (*host, explicit(container)?, parse_mode(raw, mode)?),
            _ => {
                return Err(IspawnError::validation(format!(
                    "volume spec \"{raw}\" is empty"
                )));
            }
        };

        Ok(Self {
            host: host.to_owned(),
            target,
            mode,
        })
    }
}

impl fmt::Display for MountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            MountTarget::Path(container) => write!(f, "{}:{container}:{}", self.host, self.mode),
            MountTarget::UnderMountPoint(_) => f.write_str(&self.host),
        }
    }
}

fn explicit(container: &str) -> Result<MountTarget> {
    validate_container_path(container)?;
    Ok(MountTarget::Path(container.to_owned()))
}

fn parse_mode(raw: &str, mode: &str) -> Result<VolumeMode> {
    match mode {
        "rw" => Ok(VolumeMode::ReadWrite),
        "ro" => Ok(VolumeMode::ReadOnly),
        other => Err(IspawnError::validation(format!(
            "mode \"{other}\" in volume spec \"{raw}\" must be one of: ro, rw"
        ))),
    }
}

/// Validates an in-container mount target.
///
/// The path must be absolute, must not be `/`, and every segment must be
/// non-empty, not `.` or `..`, and made of ASCII alphanumerics or one of
/// `._-+@`.
///
/// # Errors
///
/// Returns a validation error naming the offending path.
pub fn validate_container_path(path: &str) -> Result<()> {
    let Some(rest) = path.strip_prefix('/') else {
        return Err(IspawnError::validation(format!(
            "container path \"{path}\" must be absolute"
        )));
    };
    if rest.is_empty() {
        return Err(IspawnError::validation(
            "container path \"/\" would shadow the container root",
        ));
    }
    for segment in rest.split('/') {
        if segment.is_empty() {
            return Err(IspawnError::validation(format!(
                "container path \"{path}\" contains an empty segment"
            )));
        }
        if segment == "." || segment == ".." {
            return Err(IspawnError::validation(format!(
                "container path \"{path}\" contains a relative segment \"{segment}\""
            )));
        }
        if let Some(bad) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+' | '@')))
        {
            return Err(IspawnError::validation(format!(
                "container path \"{path}\" contains disallowed character {bad:?}"
            )));
        }
    }
    Ok(())
}

/// Returns whether `value` is a usable DNS label.
///
/// Namespace and run names end up inside domain names, so they share
/// this rule: 1 to 63 ASCII alphanumerics or hyphens, starting and ending
/// with an alphanumeric.
#[must_use]
pub fn is_dns_label(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 63
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !value.starts_with('-')
        && !value.ends_with('-')
}

/// Password handed to the in-container services.
///
/// The value is never shown by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Length of generated passwords.
    pub const GENERATED_LEN: usize = 16;

    /// Wraps an operator-supplied password.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a random alphanumeric password.
    #[must_use]
    pub fn generate() -> Self {
        let mut value = uuid::Uuid::new_v4().simple().to_string();
        value.truncate(Self::GENERATED_LEN);
        Self(value)
    }

    /// Returns the clear-text value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_path_uses_mount_point_and_basename() {
        let spec = MountSpec::parse("/data", "/mnt").expect("bare path");
        assert_eq!(spec.host, "/data");
        assert_eq!(spec.target, MountTarget::UnderMountPoint("/mnt".into()));
        assert_eq!(spec.mode, VolumeMode::ReadWrite);
        assert_eq!(
            spec.target.container_path(Path::new("/data")).expect("path"),
            "/mnt/data"
        );
    }

    #[test]
    fn parse_bare_path_ignores_trailing_slash_on_mount_point() {
        let spec = MountSpec::parse("/home/u/work", "/mnt/host/").expect("bare path");
        let path = spec.target.container_path(Path::new("/home/u/work")).expect("path");
        assert_eq!(path, "/mnt/host/work");
    }

    #[test]
    fn parse_host_and_container_defaults_to_read_write() {
        let spec = MountSpec::parse("/srv/data:/data", "/mnt").expect("two fields");
        assert_eq!(spec.target, MountTarget::Path("/data".into()));
        assert_eq!(spec.mode, VolumeMode::ReadWrite);
    }

    #[test]
    fn parse_read_only_mode() {
        let spec = MountSpec::parse("/srv/data:/data:ro", "/mnt").expect("three fields");
        assert!(spec.mode.is_read_only());
    }

    #[test]
    fn parse_rejects_four_fields() {
        let err = MountSpec::parse("/a:/b:ro:extra", "/mnt").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("4 colon-delimited fields"), "got: {msg}");
    }

    #[test]
    fn parse_rejects_unknown_mode() {
        let err = MountSpec::parse("/a:/b:rx", "/mnt").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"rx\""), "got: {msg}");
        assert!(matches!(err, IspawnError::Validation { .. }));
    }

    #[test]
    fn parse_rejects_empty_field() {
        assert!(MountSpec::parse("/a::ro", "/mnt").is_err());
        assert!(MountSpec::parse("", "/mnt").is_err());
    }

    #[test]
    fn parse_rejects_relative_container_path() {
        let err = MountSpec::parse("/a:data", "/mnt").unwrap_err();
        assert!(err.to_string().contains("must be absolute"));
    }

    #[test]
    fn bare_spec_accepts_home_and_dot() {
        for raw in ["~", "~/", "."] {
            let spec = MountSpec::parse(raw, "/mnt/host").expect(raw);
            assert_eq!(spec.target, MountTarget::UnderMountPoint("/mnt/host".into()));
        }
    }

    #[test]
    fn bare_spec_of_root_has_no_container_path() {
        let spec = MountSpec::parse("/", "/mnt").expect("parse");
        assert!(spec.target.container_path(Path::new("/")).is_err());
    }

    #[test]
    fn bare_spec_rejects_invalid_mount_point() {
        assert!(MountSpec::parse("/data", "mnt").is_err());
    }

    #[test]
    fn display_is_reparseable() {
        let spec = MountSpec::parse("~/notes", "/mnt/host").expect("bare path");
        let again = MountSpec::parse(&spec.to_string(), "/mnt/host").expect("reparse");
        assert_eq!(spec, again);
        let explicit = MountSpec::parse("~/notes:/notes:ro", "/mnt/host").expect("explicit");
        let again = MountSpec::parse(&explicit.to_string(), "/elsewhere").expect("reparse");
        assert_eq!(explicit, again);
    }

    #[test]
    fn container_path_rejects_empty_and_relative_segments() {
        assert!(validate_container_path("/a//b").is_err());
        assert!(validate_container_path("/a/b/").is_err());
        assert!(validate_container_path("/a/../b").is_err());
        assert!(validate_container_path("/a b").is_err());
        assert!(validate_container_path("/").is_err());
        assert!(validate_container_path("/home/u/.local/share/jupyter").is_ok());
    }

    #[test]
    fn dns_label_rules() {
        assert!(is_dns_label("a"));
        assert!(is_dns_label("team-42"));
        assert!(!is_dns_label(""));
        assert!(!is_dns_label("-a"));
        assert!(!is_dns_label("a_b"));
        assert!(!is_dns_label(&"x".repeat(64)));
    }

    #[test]
    fn generated_passwords_differ_and_are_redacted() {
        let a = Password::generate();
        let b = Password::generate();
        assert_eq!(a.expose().len(), Password::GENERATED_LEN);
        assert_ne!(a, b);
        assert_eq!(format!("{a:?}"), "Password(***)");
    }
}
