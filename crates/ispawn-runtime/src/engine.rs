//! Lifecycle operations over a container backend.
//!
//! Resources that may already exist (network, image, container) follow
//! one policy: check first, then reject, or replace when the caller
//! passes `force`.

use ispawn_common::config::Config;
use ispawn_common::error::{IspawnError, Result};
use ispawn_plan::image::ImageSelection;
use ispawn_plan::naming;
use ispawn_plan::plan::DeploymentPlan;

use crate::backend::{self, ContainerBackend, ContainerSummary, ImageSummary};
use crate::build::BuildContext;

/// The engine that coordinates all container operations.
pub struct Engine {
    backend: Box<dyn ContainerBackend>,
}

impl Engine {
    /// Creates an engine over an explicit backend.
    #[must_use]
    pub fn new(backend: Box<dyn ContainerBackend>) -> Self {
        Self { backend }
    }

    /// Creates an engine over the detected Docker CLI.
    ///
    /// # Errors
    ///
    /// Returns a container error if no engine client is available.
    pub fn detect() -> Result<Self> {
        Ok(Self::new(backend::detect_backend()?))
    }

    /// Underlying backend.
    #[must_use]
    pub fn backend(&self) -> &dyn ContainerBackend {
        self.backend.as_ref()
    }

    /// Creates the internal network unless it exists.
    ///
    /// Returns whether the network was created.
    ///
    /// # Errors
    ///
    /// Returns a network error if the engine fails.
    pub fn ensure_network(&self, name: &str, subnet: &str) -> Result<bool> {
        if self.backend.network_exists(name)? {
            tracing::debug!(network = %name, "network already exists");
            return Ok(false);
        }
        self.backend.create_network(name, subnet)?;
        Ok(true)
    }

    /// Returns whether an image exists.
    ///
    /// # Errors
    ///
    /// Returns an image error if the engine fails.
    pub fn image_exists(&self, reference: &str) -> Result<bool> {
        self.backend.image_exists(reference)
    }

    /// Builds the image of a selection and returns its tag.
    ///
    /// # Errors
    ///
    /// Returns an image error if the tag exists and `force` is not set, or
    /// if the build fails.
    pub fn build(&self, config: &Config, selection: &ImageSelection, force: bool) -> Result<String> {
        let tag = naming::image_tag(config, selection);
        if self.backend.image_exists(&tag)? {
            if !force {
                return Err(IspawnError::Image {
                    message: format!("image {tag} already exists; use --force to rebuild it"),
                });
            }
            tracing::info!(image = %tag, "replacing existing image");
            self.backend.remove_image(&tag, true)?;
        }
        let context = BuildContext::create()?;
        self.backend
            .build_image(context.path(), &tag, &selection.build_args())?;
        tracing::info!(image = %tag, "image built");
        Ok(tag)
    }

    /// Launches a planned container.
    ///
    /// # Errors
    ///
    /// Returns a network error if the internal network is missing, and a
    /// container error if the name is taken and `force` is not set, or if
    /// the engine rejects the plan.
    pub fn launch(&self, plan: &DeploymentPlan, force: bool) -> Result<()> {
        if !self.backend.network_exists(&plan.network)? {
            return Err(IspawnError::Network {
                message: format!(
                    "network {} does not exist; run `ispawn setup` first",
                    plan.network
                ),
            });
        }
        if self.backend.get_container(&plan.container_name)?.is_some() {
            if !force {
                return Err(IspawnError::Container {
                    message: format!(
                        "container {} already exists; use --force to replace it",
                        plan.container_name
                    ),
                });
            }
            tracing::info!(container = %plan.container_name, "replacing existing container");
            self.backend.remove_container(&plan.container_name, true)?;
        }
        self.backend.run_container(plan)
    }

    /// Containers whose name starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns a container error if the engine fails.
    pub fn list(&self, prefix: &str) -> Result<Vec<ContainerSummary>> {
        self.backend.list_containers(prefix)
    }

    /// Looks up one container.
    ///
    /// # Errors
    ///
    /// Returns a container error if the container does not exist.
    pub fn status(&self, name: &str) -> Result<ContainerSummary> {
        self.backend
            .get_container(name)?
            .ok_or_else(|| IspawnError::Container {
                message: format!("no container named {name}"),
            })
    }

    /// Stops a container; stopping a stopped container is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a container error if the container does not exist or
    /// cannot be stopped.
    pub fn stop(&self, name: &str) -> Result<()> {
        if !self.status(name)?.is_running() {
            tracing::info!(container = %name, "container already stopped");
            return Ok(());
        }
        self.backend.stop_container(name)?;
        tracing::info!(container = %name, "container stopped");
        Ok(())
    }

    /// Removes a container.
    ///
    /// # Errors
    ///
    /// Returns a container error if the container does not exist, is
    /// running without `force`, or cannot be removed.
    pub fn remove(&self, name: &str, force: bool) -> Result<()> {
        let container = self.status(name)?;
        if container.is_running() && !force {
            return Err(IspawnError::Container {
                message: format!("container {name} is running; stop it first or use --force"),
            });
        }
        self.backend.remove_container(name, force)?;
        tracing::info!(container = %name, "container removed");
        Ok(())
    }

    /// Images whose repository starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an image error if the engine fails.
    pub fn images(&self, prefix: &str) -> Result<Vec<ImageSummary>> {
        self.backend.list_images(prefix)
    }

    /// Removes one image, or every image under `prefix` when `reference`
    /// is `None`, and returns the removed references.
    ///
    /// # Errors
    ///
    /// Returns an image error if `reference` lies outside `prefix` or a
    /// removal fails.
    pub fn remove_images(
        &self,
        prefix: &str,
        reference: Option<&str>,
        force: bool,
    ) -> Result<Vec<String>> {
        let targets = match reference {
            Some(r) if !r.starts_with(prefix) => {
                return Err(IspawnError::Image {
                    message: format!("{r} is not an image of this namespace ({prefix}*)"),
                });
            }
            Some(r) => vec![r.to_owned()],
            None => self
                .images(prefix)?
                .into_iter()
                .map(|i| i.reference)
                .collect(),
        };
        for target in &targets {
            self.backend.remove_image(target, force)?;
        }
        Ok(targets)
    }

    /// Engine log of a container.
    ///
    /// # Errors
    ///
    /// Returns a container error if the engine fails.
    pub fn logs(&self, name: &str) -> Result<String> {
        self.backend.logs(name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use ispawn_common::config::{AccessModeKind, InstallScope, RawConfig};

    use super::*;
    use crate::backend::memory::InMemoryBackend;

    fn config() -> Config {
        let raw = RawConfig::new(InstallScope::User, AccessModeKind::Local, "demo.localhost");
        Config::try_from(raw).expect("config")
    }

    fn plan(image: &str) -> DeploymentPlan {
        DeploymentPlan {
            run: "a".into(),
            container_name: "ispawn-a".into(),
            image: image.into(),
            network: "ispawn_internal".into(),
            env: BTreeMap::new(),
            labels: BTreeMap::new(),
            volumes: Vec::new(),
            dns: Vec::new(),
            endpoints: Vec::new(),
            log_dir: PathBuf::from("/tmp/a.1"),
            warnings: Vec::new(),
        }
    }

    fn engine() -> Engine {
        Engine::new(Box::new(InMemoryBackend::new()))
    }

    #[test]
    fn ensure_network_is_idempotent() {
        let engine = engine();
        assert!(engine.ensure_network("n", "10.0.0.0/24").expect("create"));
        assert!(!engine.ensure_network("n", "10.0.0.0/24").expect("exists"));
    }

    #[test]
    fn build_rejects_existing_tag_without_force() {
        let engine = engine();
        let selection = ImageSelection::new("ubuntu", &["jupyter"]).expect("selection");
        let tag = engine.build(&config(), &selection, false).expect("build");
        assert_eq!(tag, "ispawn-ubuntu:latest-jupyter");

        let err = engine.build(&config(), &selection, false).unwrap_err();
        assert!(matches!(err, IspawnError::Image { .. }));
        assert_eq!(engine.build(&config(), &selection, true).expect("rebuild"), tag);
    }

    #[test]
    fn launch_requires_network() {
        let engine = engine();
        let err = engine.launch(&plan("img"), false).unwrap_err();
        assert!(matches!(err, IspawnError::Network { .. }));
    }

    #[test]
    fn launch_rejects_or_replaces_existing_container() {
        let engine = engine();
        let selection = ImageSelection::new("ubuntu", &["jupyter"]).expect("selection");
        let tag = engine.build(&config(), &selection, false).expect("build");
        let _ = engine.ensure_network("ispawn_internal", "10.0.0.0/24").expect("net");

        engine.launch(&plan(&tag), false).expect("first launch");
        let err = engine.launch(&plan(&tag), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        engine.launch(&plan(&tag), true).expect("forced launch");
        assert!(engine.status("ispawn-a").expect("status").is_running());
    }

    #[test]
    fn stop_then_remove() {
        let engine = engine();
        let selection = ImageSelection::new("ubuntu", &["vscode"]).expect("selection");
        let tag = engine.build(&config(), &selection, false).expect("build");
        let _ = engine.ensure_network("ispawn_internal", "10.0.0.0/24").expect("net");
        engine.launch(&plan(&tag), false).expect("launch");

        assert!(engine.remove("ispawn-a", false).is_err());
        engine.stop("ispawn-a").expect("stop");
        engine.stop("ispawn-a").expect("stop again");
        engine.remove("ispawn-a", false).expect("remove");
        assert!(engine.status("ispawn-a").is_err());
    }

    #[test]
    fn remove_images_stays_in_namespace() {
        let engine = engine();
        let selection = ImageSelection::new("ubuntu", &["rstudio"]).expect("selection");
        let _ = engine.build(&config(), &selection, false).expect("build");
        assert!(engine.remove_images("ispawn-", Some("ubuntu:latest"), false).is_err());
        let removed = engine.remove_images("ispawn-", None, false).expect("remove all");
        assert_eq!(removed, vec!["ispawn-ubuntu:latest-rstudio".to_owned()]);
        assert!(engine.images("ispawn-").expect("images").is_empty());
    }
}
