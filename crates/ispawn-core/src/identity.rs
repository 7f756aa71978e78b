//! Effective-identity resolution.
//!
//! The planner never scans the system user or group databases directly.
//! It asks an [`IdentityResolver`] for a user's numeric ids, home, and
//! supplementary groups, so permission checks stay pure functions over
//! the returned [`Identity`].

use std::path::PathBuf;

use ispawn_common::error::{IspawnError, Result};

/// A resolved user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Login name.
    pub name: String,
    /// Numeric user id.
    pub uid: u32,
    /// Numeric primary group id.
    pub gid: u32,
    /// Host home directory.
    pub home: PathBuf,
    /// Supplementary group ids.
    pub groups: Vec<u32>,
}

impl Identity {
    /// Returns whether this is the superuser.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.uid == 0
    }

    /// Returns whether the user belongs to `gid`, as primary or supplementary group.
    #[must_use]
    pub fn in_group(&self, gid: u32) -> bool {
        self.gid == gid || self.groups.contains(&gid)
    }
}

/// Source of user identities.
pub trait IdentityResolver: Send + Sync {
    /// Returns the identity of the invoking process.
    ///
    /// # Errors
    ///
    /// Returns an error if the process user has no account record.
    fn current(&self) -> Result<Identity>;

    /// Looks up a user by login name.
    ///
    /// # Errors
    ///
    /// Returns an error if the account database cannot be queried.
    fn lookup(&self, name: &str) -> Result<Option<Identity>>;

    /// Returns the named user, or the invoking user when `name` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the named user does not exist.
    fn resolve(&self, name: Option<&str>) -> Result<Identity> {
        match name {
            None => self.current(),
            Some(name) => self
                .lookup(name)?
                .ok_or_else(|| IspawnError::validation(format!("unknown user \"{name}\""))),
        }
    }
}

/// Resolver backed by the host account database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentityResolver;

#[cfg(target_os = "linux")]
impl SystemIdentityResolver {
    fn from_user(user: nix::unistd::User) -> Result<Identity> {
        use std::ffi::CString;

        let cname = CString::new(user.name.as_str()).map_err(|_| {
            IspawnError::validation(format!("user name \"{}\" contains a NUL byte", user.name))
        })?;
        let groups = nix::unistd::getgrouplist(&cname, user.gid).map_err(|e| {
            IspawnError::validation(format!("cannot list groups of \"{}\": {e}", user.name))
        })?;
        Ok(Identity {
            uid: user.uid.as_raw(),
            gid: user.gid.as_raw(),
            home: user.dir,
            groups: groups.into_iter().map(nix::unistd::Gid::as_raw).collect(),
            name: user.name,
        })
    }
}

#[cfg(target_os = "linux")]
impl IdentityResolver for SystemIdentityResolver {
    fn current(&self) -> Result<Identity> {
        let uid = nix::unistd::Uid::current();
        match nix::unistd::User::from_uid(uid) {
            Ok(Some(user)) => Self::from_user(user),
            Ok(None) => Err(IspawnError::validation(format!(
                "uid {uid} has no account record"
            ))),
            Err(e) => Err(IspawnError::validation(format!(
                "cannot look up uid {uid}: {e}"
            ))),
        }
    }

    fn lookup(&self, name: &str) -> Result<Option<Identity>> {
        let user = nix::unistd::User::from_name(name).map_err(|e| {
            IspawnError::validation(format!("cannot look up user \"{name}\": {e}"))
        })?;
        tracing::debug!(user = %name, found = user.is_some(), "looked up user");
        user.map(Self::from_user).transpose()
    }
}

/// Stub for non-Linux platforms.
#[cfg(not(target_os = "linux"))]
impl IdentityResolver for SystemIdentityResolver {
    fn current(&self) -> Result<Identity> {
        Err(IspawnError::validation(
            "identity resolution requires a Linux host",
        ))
    }

    fn lookup(&self, _name: &str) -> Result<Option<Identity>> {
        Err(IspawnError::validation(
            "identity resolution requires a Linux host",
        ))
    }
}

/// Returns whether the process runs with root privileges.
#[must_use]
pub fn running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Resolver over a fixed set of identities.
#[derive(Debug, Clone)]
pub struct FixedIdentityResolver {
    current: Identity,
    others: Vec<Identity>,
}

impl FixedIdentityResolver {
    /// Resolver whose invoking user is `current`.
    #[must_use]
    pub const fn new(current: Identity) -> Self {
        Self {
            current,
            others: Vec::new(),
        }
    }

    /// Adds a user reachable through [`IdentityResolver::lookup`].
    #[must_use]
    pub fn with_user(mut self, identity: Identity) -> Self {
        self.others.push(identity);
        self
    }
}

impl IdentityResolver for FixedIdentityResolver {
    fn current(&self) -> Result<Identity> {
        Ok(self.current.clone())
    }

    fn lookup(&self, name: &str) -> Result<Option<Identity>> {
        Ok(std::iter::once(&self.current)
            .chain(&self.others)
            .find(|i| i.name == name)
            .cloned())
    }
}
