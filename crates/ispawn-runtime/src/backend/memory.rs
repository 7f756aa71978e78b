//! In-process backend keeping engine state in memory.
//!
//! Records every call so callers can assert which engine operations a
//! command performed, or that none were attempted.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use ispawn_common::error::{IspawnError, Result};
use ispawn_plan::plan::DeploymentPlan;

use super::{ContainerBackend, ContainerSummary, ImageSummary};

#[derive(Debug, Default)]
struct State {
    networks: BTreeMap<String, String>,
    containers: BTreeMap<String, ContainerSummary>,
    images: BTreeMap<String, BTreeMap<String, String>>,
    calls: Vec<String>,
}

/// Backend holding networks, containers, and images in memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| IspawnError::Container {
            message: "in-memory backend lock poisoned".into(),
        })
    }

    fn record(&self, call: String) -> Result<MutexGuard<'_, State>> {
        let mut state = self.lock()?;
        state.calls.push(call);
        Ok(state)
    }

    /// Calls received so far, as `operation target` strings.
    ///
    /// # Errors
    ///
    /// Returns a container error if the state lock is poisoned.
    pub fn calls(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.calls.clone())
    }

    /// Subnet of a created network.
    ///
    /// # Errors
    ///
    /// Returns a container error if the state lock is poisoned.
    pub fn network_subnet(&self, name: &str) -> Result<Option<String>> {
        Ok(self.lock()?.networks.get(name).cloned())
    }

    /// Build arguments an image was built with.
    ///
    /// # Errors
    ///
    /// Returns a container error if the state lock is poisoned.
    pub fn image_build_args(&self, reference: &str) -> Result<Option<BTreeMap<String, String>>> {
        Ok(self.lock()?.images.get(reference).cloned())
    }
}

impl ContainerBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn network_exists(&self, name: &str) -> Result<bool> {
        Ok(self.record(format!("network_exists {name}"))?.networks.contains_key(name))
    }

    fn create_network(&self, name: &str, subnet: &str) -> Result<()> {
        let mut state = self.record(format!("create_network {name}"))?;
        if state.networks.contains_key(name) {
            return Err(IspawnError::Network {
                message: format!("network with name {name} already exists"),
            });
        }
        let _ = state.networks.insert(name.to_owned(), subnet.to_owned());
        Ok(())
    }

    fn get_container(&self, name: &str) -> Result<Option<ContainerSummary>> {
        Ok(self
            .record(format!("get_container {name}"))?
            .containers
            .get(name)
            .cloned())
    }

    fn run_container(&self, plan: &DeploymentPlan) -> Result<()> {
        let mut state = self.record(format!("run_container {}", plan.container_name))?;
        if !state.networks.contains_key(&plan.network) {
            return Err(IspawnError::Container {
                message: format!("network {} not found", plan.network),
            });
        }
        if !state.images.contains_key(&plan.image) {
            return Err(IspawnError::Container {
                message: format!("image {} not found", plan.image),
            });
        }
        if state.containers.contains_key(&plan.container_name) {
            return Err(IspawnError::Container {
                message: format!("container name {} is already in use", plan.container_name),
            });
        }
        let summary = ContainerSummary {
            name: plan.container_name.clone(),
            image: plan.image.clone(),
            state: "running".into(),
            labels: plan.labels.clone(),
        };
        let _ = state.containers.insert(plan.container_name.clone(), summary);
        Ok(())
    }

    fn stop_container(&self, name: &str) -> Result<()> {
        let mut state = self.record(format!("stop_container {name}"))?;
        let container = state.containers.get_mut(name).ok_or_else(|| IspawnError::Container {
            message: format!("no such container: {name}"),
        })?;
        "exited".clone_into(&mut container.state);
        Ok(())
    }

    fn remove_container(&self, name: &str, force: bool) -> Result<()> {
        let mut state = self.record(format!("remove_container {name}"))?;
        match state.containers.get(name) {
            None => Err(IspawnError::Container {
                message: format!("no such container: {name}"),
            }),
            Some(c) if c.is_running() && !force => Err(IspawnError::Container {
                message: format!("cannot remove running container {name}; stop it or force"),
            }),
            Some(_) => {
                let _ = state.containers.remove(name);
                Ok(())
            }
        }
    }

    fn list_containers(&self, prefix: &str) -> Result<Vec<ContainerSummary>> {
        Ok(self
            .record(format!("list_containers {prefix}"))?
            .containers
            .values()
            .filter(|c| c.name.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn build_image(
        &self,
        context: &Path,
        tag: &str,
        args: &BTreeMap<String, String>,
    ) -> Result<()> {
        if !context.join("Dockerfile").is_file() {
            return Err(IspawnError::Image {
                message: format!("no Dockerfile in build context {}", context.display()),
            });
        }
        let mut state = self.record(format!("build_image {tag}"))?;
        let _ = state.images.insert(tag.to_owned(), args.clone());
        Ok(())
    }

    fn image_exists(&self, reference: &str) -> Result<bool> {
        Ok(self
            .record(format!("image_exists {reference}"))?
            .images
            .contains_key(reference))
    }

    fn list_images(&self, prefix: &str) -> Result<Vec<ImageSummary>> {
        Ok(self
            .record(format!("list_images {prefix}"))?
            .images
            .keys()
            .filter(|r| r.starts_with(prefix))
            .map(|r| ImageSummary {
                reference: r.clone(),
                id: format!("{:012x}", r.len()),
                size: "0B".into(),
            })
            .collect())
    }

    fn remove_image(&self, reference: &str, force: bool) -> Result<()> {
        let mut state = self.record(format!("remove_image {reference}"))?;
        if !state.images.contains_key(reference) {
            return Err(IspawnError::Image {
                message: format!("no such image: {reference}"),
            });
        }
        if !force && state.containers.values().any(|c| c.image == reference) {
            return Err(IspawnError::Image {
                message: format!("image {reference} is used by a container"),
            });
        }
        let _ = state.images.remove(reference);
        Ok(())
    }

    fn logs(&self, name: &str) -> Result<String> {
        let state = self.record(format!("logs {name}"))?;
        state
            .containers
            .get(name)
            .map(|c| format!("{} {}\n", c.name, c.state))
            .ok_or_else(|| IspawnError::Container {
                message: format!("no such container: {name}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_network_twice_fails() {
        let backend = InMemoryBackend::new();
        backend.create_network("n", "10.0.0.0/24").expect("first");
        assert!(matches!(
            backend.create_network("n", "10.0.0.0/24"),
            Err(IspawnError::Network { .. })
        ));
        assert_eq!(backend.network_subnet("n").expect("lock").as_deref(), Some("10.0.0.0/24"));
    }

    #[test]
    fn build_requires_dockerfile() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let backend = InMemoryBackend::new();
        assert!(backend.build_image(tmp.path(), "t", &BTreeMap::new()).is_err());
        std::fs::write(tmp.path().join("Dockerfile"), "FROM scratch\n").expect("write");
        backend.build_image(tmp.path(), "t", &BTreeMap::new()).expect("build");
        assert!(backend.image_exists("t").expect("exists"));
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let backend = InMemoryBackend::new();
        let _ = backend.network_exists("n").expect("exists");
        let _ = backend.get_container("c").expect("get");
        assert_eq!(
            backend.calls().expect("calls"),
            vec!["network_exists n".to_owned(), "get_container c".to_owned()]
        );
    }
}
