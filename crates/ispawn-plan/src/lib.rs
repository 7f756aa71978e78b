//! # ispawn-plan
//!
//! Compiles a validated configuration and a per-run request into a
//! deployment plan.
//!
//! Handles:
//! - **Image**: base image plus service set, and the derived image tag.
//! - **Request**: the per-run input (name, mounts, identity override).
//! - **Naming**: deterministic container, network, domain, and router names.
//! - **Labels**: the flat reverse-proxy and metadata label set.
//! - **Planner**: composition of all of the above into a [`plan::DeploymentPlan`].

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod image;
pub mod labels;
pub mod naming;
pub mod plan;
pub mod planner;
pub mod request;
