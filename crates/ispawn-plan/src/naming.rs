//! Deterministic names derived from the configuration and a run.
//!
//! Every function here is pure: identical inputs always give identical
//! names.

use ispawn_common::config::Config;

use crate::image::ImageSelection;

/// Prefix shared by every image built in the namespace.
#[must_use]
pub fn image_prefix(config: &Config) -> String {
    format!("{}-", config.name())
}

/// Image tag of a selection in the namespace.
#[must_use]
pub fn image_tag(config: &Config, selection: &ImageSelection) -> String {
    selection.target_tag(&image_prefix(config))
}

/// Prefix shared by every container of `user` in the namespace.
#[must_use]
pub fn container_prefix(config: &Config, user: &str) -> String {
    if config.user_in_namespace() {
        format!("{}-{user}-", config.name())
    } else {
        format!("{}-", config.name())
    }
}

/// Container name, `{namespace}[-{user}]-{run}`.
#[must_use]
pub fn container_name(config: &Config, user: &str, run: &str) -> String {
    format!("{}{run}", container_prefix(config, user))
}

/// Recovers the run name from a container name of `user`.
///
/// With user names in the namespace the prefix also matches users whose
/// name extends `user` with a hyphen; `labels::owned_run` resolves that.
#[must_use]
pub fn run_name<'a>(config: &Config, user: &str, container: &'a str) -> Option<&'a str> {
    container
        .strip_prefix(&container_prefix(config, user))
        .filter(|run| !run.is_empty())
}

/// Domain of one service, `[{user}-]{service}-{run}.{domain}`.
#[must_use]
pub fn service_domain(config: &Config, user: &str, service: &str, run: &str) -> String {
    if config.user_in_namespace() {
        format!("{user}-{service}-{run}.{}", config.domain())
    } else {
        format!("{service}-{run}.{}", config.domain())
    }
}

/// Router identifier, unique per container and service.
#[must_use]
pub fn router_id(container: &str, service: &str) -> String {
    format!("{container}-{service}")
}

/// Names of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunNames {
    /// Image tag.
    pub image: String,
    /// Container name.
    pub container: String,
    /// Internal network name.
    pub network: String,
    /// Service identifier and domain, in service order.
    pub domains: Vec<(&'static str, String)>,
}

impl RunNames {
    /// Derives every name of a run.
    #[must_use]
    pub fn derive(config: &Config, selection: &ImageSelection, user: &str, run: &str) -> Self {
        Self {
            image: image_tag(config, selection),
            container: container_name(config, user, run),
            network: config.network_name(),
            domains: selection
                .service_ids()
                .into_iter()
                .map(|id| (id, service_domain(config, user, id, run)))
                .collect(),
        }
    }

    /// Domain of `service`, if selected.
    #[must_use]
    pub fn domain_of(&self, service: &str) -> Option<&str> {
        self.domains
            .iter()
            .find(|(id, _)| *id == service)
            .map(|(_, d)| d.as_str())
    }
}

#[cfg(test)]
mod tests {
    use ispawn_common::config::{AccessModeKind, InstallScope, RawConfig};

    use super::*;

    fn config(user_in_namespace: bool) -> Config {
        let mut raw = RawConfig::new(InstallScope::User, AccessModeKind::Local, "demo.localhost");
        raw.user_in_namespace = user_in_namespace;
        Config::try_from(raw).expect("config")
    }

    #[test]
    fn container_name_without_user() {
        assert_eq!(container_name(&config(false), "u", "a"), "ispawn-a");
    }

    #[test]
    fn container_name_with_user() {
        assert_eq!(container_name(&config(true), "u", "a"), "ispawn-u-a");
    }

    #[test]
    fn service_domain_with_and_without_user() {
        assert_eq!(
            service_domain(&config(false), "u", "jupyter", "a"),
            "jupyter-a.demo.localhost"
        );
        assert_eq!(
            service_domain(&config(true), "u", "jupyter", "a"),
            "u-jupyter-a.demo.localhost"
        );
    }

    #[test]
    fn run_name_inverts_container_name() {
        let c = config(true);
        let name = container_name(&c, "u", "lab-1");
        assert_eq!(run_name(&c, "u", &name), Some("lab-1"));
        assert_eq!(run_name(&c, "v", &name), None);
        assert_eq!(run_name(&c, "u", "ispawn-u-"), None);
    }

    #[test]
    fn derive_is_deterministic() {
        let c = config(false);
        let a = ImageSelection::new("ubuntu", &["vscode", "jupyter"]).expect("a");
        let b = ImageSelection::new("ubuntu", &["jupyter", "vscode"]).expect("b");
        let names = RunNames::derive(&c, &a, "u", "a");
        assert_eq!(names, RunNames::derive(&c, &b, "u", "a"));
        assert_eq!(names.image, "ispawn-ubuntu:latest-jupyter-vscode");
        assert_eq!(names.network, "ispawn_internal");
        assert_eq!(names.domain_of("vscode"), Some("vscode-a.demo.localhost"));
    }

    #[test]
    fn router_ids_differ_per_service() {
        assert_ne!(router_id("ispawn-a", "jupyter"), router_id("ispawn-a", "jupyterlab"));
    }
}
