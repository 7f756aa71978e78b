//! Container engine abstraction.
//!
//! The planner never talks to an engine. It produces a
//! [`DeploymentPlan`]; a [`ContainerBackend`] turns that plan and the
//! other lifecycle requests into engine calls.

pub mod docker;
pub mod memory;

use std::collections::BTreeMap;
use std::path::Path;

use ispawn_common::error::Result;
use ispawn_plan::plan::DeploymentPlan;
use serde::Serialize;

/// A container as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSummary {
    /// Container name.
    pub name: String,
    /// Image reference the container was created from.
    pub image: String,
    /// Engine state, e.g. `running` or `exited`.
    pub state: String,
    /// Labels.
    pub labels: BTreeMap<String, String>,
}

impl ContainerSummary {
    /// Returns whether the container is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

/// An image as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSummary {
    /// `repository:tag` reference.
    pub reference: String,
    /// Engine image id.
    pub id: String,
    /// Human-readable size.
    pub size: String,
}

/// Operations ispawn needs from a container engine.
///
/// Implementors surface engine failures verbatim as container, image, or
/// network errors.
pub trait ContainerBackend: Send + Sync {
    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Returns whether a network exists.
    ///
    /// # Errors
    ///
    /// Returns a network error if the engine cannot be queried.
    fn network_exists(&self, name: &str) -> Result<bool>;

    /// Creates a bridge network with the given subnet.
    ///
    /// # Errors
    ///
    /// Returns a network error if creation fails.
    fn create_network(&self, name: &str, subnet: &str) -> Result<()>;

    /// Looks up a container by name.
    ///
    /// # Errors
    ///
    /// Returns a container error if the engine cannot be queried.
    fn get_container(&self, name: &str) -> Result<Option<ContainerSummary>>;

    /// Creates and starts a container from a plan.
    ///
    /// # Errors
    ///
    /// Returns a container error if the engine rejects the plan.
    fn run_container(&self, plan: &DeploymentPlan) -> Result<()>;

    /// Stops a running container.
    ///
    /// # Errors
    ///
    /// Returns a container error if the container cannot be stopped.
    fn stop_container(&self, name: &str) -> Result<()>;

    /// Removes a container, killing it first when `force` is set.
    ///
    /// # Errors
    ///
    /// Returns a container error if the container cannot be removed.
    fn remove_container(&self, name: &str, force: bool) -> Result<()>;

    /// Lists containers whose name starts with `prefix`, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns a container error if the engine cannot be queried.
    fn list_containers(&self, prefix: &str) -> Result<Vec<ContainerSummary>>;

    /// Builds an image from a context directory.
    ///
    /// # Errors
    ///
    /// Returns an image error if the build fails.
    fn build_image(&self, context: &Path, tag: &str, args: &BTreeMap<String, String>)
    -> Result<()>;

    /// Returns whether an image exists.
    ///
    /// # Errors
    ///
    /// Returns an image error if the engine cannot be queried.
    fn image_exists(&self, reference: &str) -> Result<bool>;

    /// Lists images whose repository starts with `prefix`, sorted by reference.
    ///
    /// # Errors
    ///
    /// Returns an image error if the engine cannot be queried.
    fn list_images(&self, prefix: &str) -> Result<Vec<ImageSummary>>;

    /// Removes an image.
    ///
    /// # Errors
    ///
    /// Returns an image error if the image cannot be removed.
    fn remove_image(&self, reference: &str, force: bool) -> Result<()>;

    /// Returns the engine log of a container.
    ///
    /// # Errors
    ///
    /// Returns a container error if logs cannot be retrieved.
    fn logs(&self, name: &str) -> Result<String>;
}

/// Locates the Docker CLI and returns a backend over it.
///
/// # Errors
///
/// Returns a container error if no `docker` binary is on `PATH`.
pub fn detect_backend() -> Result<Box<dyn ContainerBackend>> {
    Ok(Box::new(docker::DockerCli::detect()?))
}
