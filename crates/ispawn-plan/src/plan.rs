//! The fully resolved launch arguments of one container.

use std::collections::BTreeMap;
use std::path::PathBuf;

use ispawn_common::constants::env;
use ispawn_core::volume::VolumeBinding;
use serde::Serialize;

/// One routed service of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEndpoint {
    /// Service identifier.
    pub service: &'static str,
    /// Routed domain.
    pub domain: String,
    /// In-container port.
    pub port: u16,
    /// Whether the URL carries the password as a token.
    pub token_auth: bool,
}

/// Everything the engine needs to launch one container.
///
/// Built and consumed within a single invocation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentPlan {
    /// Run name.
    pub run: String,
    /// Container name.
    pub container_name: String,
    /// Image tag.
    pub image: String,
    /// Internal network.
    pub network: String,
    /// Environment variables.
    pub env: BTreeMap<String, String>,
    /// Labels.
    pub labels: BTreeMap<String, String>,
    /// Bind mounts, in override order.
    pub volumes: Vec<VolumeBinding>,
    /// DNS servers.
    pub dns: Vec<String>,
    /// Routed services.
    pub endpoints: Vec<ServiceEndpoint>,
    /// Host log directory of this run.
    pub log_dir: PathBuf,
    /// Non-fatal provisioning problems.
    pub warnings: Vec<String>,
}

impl DeploymentPlan {
    /// Access URL of each routed service.
    ///
    /// Token-authenticated services carry the password as `?token=`.
    #[must_use]
    pub fn service_urls(&self) -> Vec<(&'static str, String)> {
        let password = self.env.get(env::PASSWORD);
        self.endpoints
            .iter()
            .map(|e| {
                let url = match password {
                    Some(token) if e.token_auth => format!("https://{}/?token={token}", e.domain),
                    _ => format!("https://{}", e.domain),
                };
                (e.service, url)
            })
            .collect()
    }

    /// Copy with the password masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut plan = self.clone();
        if let Some(value) = plan.env.get_mut(env::PASSWORD) {
            "***".clone_into(value);
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> DeploymentPlan {
        DeploymentPlan {
            run: "a".into(),
            container_name: "ispawn-a".into(),
            image: "ispawn-ubuntu:latest-jupyter-vscode".into(),
            network: "ispawn_internal".into(),
            env: BTreeMap::from([(env::PASSWORD.to_owned(), "s3cret".to_owned())]),
            labels: BTreeMap::new(),
            volumes: Vec::new(),
            dns: Vec::new(),
            endpoints: vec![
                ServiceEndpoint {
                    service: "jupyter",
                    domain: "jupyter-a.demo.localhost".into(),
                    port: 8888,
                    token_auth: true,
                },
                ServiceEndpoint {
                    service: "vscode",
                    domain: "vscode-a.demo.localhost".into(),
                    port: 8042,
                    token_auth: false,
                },
            ],
            log_dir: PathBuf::from("/tmp/logs/a.1"),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn urls_carry_token_only_for_token_services() {
        let urls = plan().service_urls();
        assert_eq!(urls[0].1, "https://jupyter-a.demo.localhost/?token=s3cret");
        assert_eq!(urls[1].1, "https://vscode-a.demo.localhost");
    }

    #[test]
    fn redacted_masks_password_in_json() {
        let json = serde_json::to_string(&plan().redacted()).expect("json");
        assert!(!json.contains("s3cret"));
        assert!(json.contains("***"));
    }
}
