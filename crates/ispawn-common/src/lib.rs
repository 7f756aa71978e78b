//! # ispawn-common
//!
//! Shared types, error definitions, the static service catalog, the
//! validated global configuration and its persisted form, and constants
//! used across the entire ispawn workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod layout;
pub mod store;
pub mod types;
