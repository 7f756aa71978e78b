//! Container engine integration for ispawn.
//!
//! Turns deployment plans and lifecycle requests into engine calls
//! through a [`backend::ContainerBackend`], and orchestrates `setup`.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod backend;
pub mod build;
pub mod certs;
pub mod engine;
pub mod logs;
pub mod setup;
