//! # ispawn-core
//!
//! Host-side primitives for the ispawn deployment compiler.
//!
//! This crate provides:
//! - **Identity**: resolution of the effective user (uid, gid, home,
//!   supplementary groups) behind an injectable trait, with a `nix`-backed
//!   system implementation.
//! - **Volumes**: resolution of operator-supplied mounts against the host
//!   filesystem, provisioning of service-owned and log directories, and the
//!   fixed ordering of the final bind-mount list.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod identity;
pub mod volume;
