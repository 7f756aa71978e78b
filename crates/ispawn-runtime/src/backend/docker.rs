//! Backend driving the Docker command-line client.
//!
//! Every operation is one `docker` invocation. Structured answers are read
//! from `inspect` and `--format '{{json .}}'` output with `serde_json`.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use ispawn_common::error::{IspawnError, Result};
use ispawn_plan::plan::DeploymentPlan;

use super::{ContainerBackend, ContainerSummary, ImageSummary};

/// Which error class a failed invocation maps to.
#[derive(Debug, Clone, Copy)]
enum Surface {
    Container,
    Image,
    Network,
}

impl Surface {
    fn error(self, message: String) -> IspawnError {
        match self {
            Self::Container => IspawnError::Container { message },
            Self::Image => IspawnError::Image { message },
            Self::Network => IspawnError::Network { message },
        }
    }
}

/// Docker CLI backend.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

impl DockerCli {
    /// Finds `docker` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns a container error if the binary is missing.
    pub fn detect() -> Result<Self> {
        let binary = which::which("docker").map_err(|_| IspawnError::Container {
            message: "docker binary not found on PATH (install Docker to run containers)".into(),
        })?;
        tracing::debug!(binary = %binary.display(), "using docker CLI");
        Ok(Self { binary })
    }

    /// Uses an explicit client binary.
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.binary);
        let _ = cmd.args(args);
        cmd
    }

    fn exec(&self, surface: Surface, cmd: &mut Command, what: &str) -> Result<String> {
        tracing::debug!(command = ?cmd, "invoking docker");
        let output = cmd.output().map_err(|e| {
            surface.error(format!("cannot run {}: {e}", self.binary.display()))
        })?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(surface.error(format!(
                "docker {what} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    fn succeeds<I, S>(&self, surface: Surface, args: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.command(args).output().map_err(|e| {
            surface.error(format!("cannot run {}: {e}", self.binary.display()))
        })?;
        Ok(output.status.success())
    }
}

/// Arguments of `docker run` for a plan.
///
/// Environment values are not part of the arguments: each variable is
/// passed by name and inherited from the client's environment, so secrets
/// never appear in the process list.
#[must_use]
pub fn run_args(plan: &DeploymentPlan) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "run".into(),
        "--detach".into(),
        "--name".into(),
        plan.container_name.clone(),
        "--hostname".into(),
        plan.run.clone(),
        "--network".into(),
        plan.network.clone(),
    ];
    for server in &plan.dns {
        args.extend(["--dns".into(), server.clone()]);
    }
    for key in plan.env.keys() {
        args.extend(["--env".into(), key.clone()]);
    }
    for (key, value) in &plan.labels {
        args.extend(["--label".into(), format!("{key}={value}")]);
    }
    for volume in &plan.volumes {
        args.extend(["--volume".into(), volume.to_string()]);
    }
    args.push(plan.image.clone());
    args
}

/// Parses `docker container inspect` output.
///
/// # Errors
///
/// Returns a container error if the output is not inspect JSON.
pub fn parse_inspect(json: &str) -> Result<Option<ContainerSummary>> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| IspawnError::Container {
        message: format!("unreadable docker inspect output: {e}"),
    })?;
    let Some(entry) = value.as_array().and_then(|a| a.first()) else {
        return Ok(None);
    };
    let text = |pointer: &str| {
        entry
            .pointer(pointer)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned()
    };
    let labels = entry
        .pointer("/Config/Labels")
        .and_then(serde_json::Value::as_object)
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_owned())))
                .collect()
        })
        .unwrap_or_default();
    Ok(Some(ContainerSummary {
        name: text("/Name").trim_start_matches('/').to_owned(),
        image: text("/Config/Image"),
        state: text("/State/Status"),
        labels,
    }))
}

/// Parses `docker images --format '{{json .}}'` output, keeping
/// repositories that start with `prefix`.
#[must_use]
pub fn parse_images(output: &str, prefix: &str) -> Vec<ImageSummary> {
    let mut images: Vec<ImageSummary> = output
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter_map(|v| {
            let field = |k: &str| v.get(k).and_then(serde_json::Value::as_str).map(str::to_owned);
            let repo = field("Repository")?;
            let tag = field("Tag")?;
            if !repo.starts_with(prefix) || tag == "<none>" {
                return None;
            }
            Some(ImageSummary {
                reference: format!("{repo}:{tag}"),
                id: field("ID").unwrap_or_default(),
                size: field("Size").unwrap_or_default(),
            })
        })
        .collect();
    images.sort_by(|a, b| a.reference.cmp(&b.reference));
    images
}

impl ContainerBackend for DockerCli {
    fn name(&self) -> &'static str {
        "docker"
    }

    fn network_exists(&self, name: &str) -> Result<bool> {
        self.succeeds(Surface::Network, ["network", "inspect", name])
    }

    fn create_network(&self, name: &str, subnet: &str) -> Result<()> {
        let mut cmd = self.command([
            "network", "create", "--driver", "bridge", "--subnet", subnet, name,
        ]);
        let _ = self.exec(Surface::Network, &mut cmd, "network create")?;
        tracing::info!(network = %name, subnet = %subnet, "network created");
        Ok(())
    }

    fn get_container(&self, name: &str) -> Result<Option<ContainerSummary>> {
        let output = self
            .command(["container", "inspect", name])
            .output()
            .map_err(|e| IspawnError::Container {
                message: format!("cannot run {}: {e}", self.binary.display()),
            })?;
        if output.status.success() {
            return parse_inspect(&String::from_utf8_lossy(&output.stdout));
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("No such") {
            Ok(None)
        } else {
            Err(IspawnError::Container {
                message: format!("docker container inspect failed: {}", stderr.trim()),
            })
        }
    }

    fn run_container(&self, plan: &DeploymentPlan) -> Result<()> {
        let mut cmd = self.command(run_args(plan));
        let _ = cmd.envs(&plan.env);
        let _ = self.exec(Surface::Container, &mut cmd, "run")?;
        tracing::info!(container = %plan.container_name, image = %plan.image, "container started");
        Ok(())
    }

    fn stop_container(&self, name: &str) -> Result<()> {
        let _ = self.exec(Surface::Container, &mut self.command(["stop", name]), "stop")?;
        Ok(())
    }

    fn remove_container(&self, name: &str, force: bool) -> Result<()> {
        let mut args = vec!["rm"];
        if force {
            args.push("--force");
        }
        args.push(name);
        let _ = self.exec(Surface::Container, &mut self.command(args), "rm")?;
        Ok(())
    }

    fn list_containers(&self, prefix: &str) -> Result<Vec<ContainerSummary>> {
        let filter = format!("name=^{prefix}");
        let mut cmd = self.command(["ps", "--all", "--filter", &filter, "--format", "{{.Names}}"]);
        let names = self.exec(Surface::Container, &mut cmd, "ps")?;
        let mut containers = Vec::new();
        for name in names.lines().map(str::trim).filter(|n| n.starts_with(prefix)) {
            if let Some(summary) = self.get_container(name)? {
                containers.push(summary);
            }
        }
        containers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(containers)
    }

    fn build_image(
        &self,
        context: &Path,
        tag: &str,
        args: &BTreeMap<String, String>,
    ) -> Result<()> {
        let mut cmd = self.command(["build", "--tag", tag]);
        for (key, value) in args {
            let _ = cmd.arg("--build-arg").arg(format!("{key}={value}"));
        }
        let _ = cmd.arg(context);
        tracing::info!(tag = %tag, context = %context.display(), "building image");
        let status = cmd.status().map_err(|e| IspawnError::Image {
            message: format!("cannot run {}: {e}", self.binary.display()),
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(IspawnError::Image {
                message: format!("docker build of {tag} exited with {status}"),
            })
        }
    }

    fn image_exists(&self, reference: &str) -> Result<bool> {
        self.succeeds(Surface::Image, ["image", "inspect", reference])
    }

    fn list_images(&self, prefix: &str) -> Result<Vec<ImageSummary>> {
        let mut cmd = self.command(["images", "--format", "{{json .}}"]);
        let output = self.exec(Surface::Image, &mut cmd, "images")?;
        Ok(parse_images(&output, prefix))
    }

    fn remove_image(&self, reference: &str, force: bool) -> Result<()> {
        let mut args = vec!["rmi"];
        if force {
            args.push("--force");
        }
        args.push(reference);
        let _ = self.exec(Surface::Image, &mut self.command(args), "rmi")?;
        tracing::info!(image = %reference, "image removed");
        Ok(())
    }

    fn logs(&self, name: &str) -> Result<String> {
        let output = self
            .command(["logs", name])
            .output()
            .map_err(|e| IspawnError::Container {
                message: format!("cannot run {}: {e}", self.binary.display()),
            })?;
        if !output.status.success() {
            return Err(IspawnError::Container {
                message: format!(
                    "docker logs failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ispawn_common::constants::env;
    use ispawn_core::volume::VolumeBinding;

    use super::*;

    fn plan() -> DeploymentPlan {
        DeploymentPlan {
            run: "a".into(),
            container_name: "ispawn-a".into(),
            image: "ispawn-ubuntu:latest-jupyter".into(),
            network: "ispawn_internal".into(),
            env: BTreeMap::from([
                (env::PASSWORD.to_owned(), "s3cret".to_owned()),
                (env::USERNAME.to_owned(), "u".to_owned()),
            ]),
            labels: BTreeMap::from([("traefik.enable".to_owned(), "true".to_owned())]),
            volumes: vec![VolumeBinding::read_write("/srv/work", "/mnt/host/work")],
            dns: vec!["8.8.8.8".into()],
            endpoints: Vec::new(),
            log_dir: PathBuf::from("/tmp/a.1"),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn run_args_pass_env_by_name_only() {
        let args = run_args(&plan());
        assert!(args.iter().all(|a| !a.contains("s3cret")));
        let joined = args.join(" ");
        assert!(joined.contains("--env PASSWORD"));
        assert!(joined.contains("--label traefik.enable=true"));
        assert!(joined.contains("--volume /srv/work:/mnt/host/work:rw"));
        assert!(joined.contains("--dns 8.8.8.8"));
        assert!(joined.contains("--network ispawn_internal"));
        assert_eq!(args.last().map(String::as_str), Some("ispawn-ubuntu:latest-jupyter"));
    }

    #[test]
    fn parse_inspect_reads_name_state_and_labels() {
        let json = r#"[{
            "Name": "/ispawn-a",
            "State": {"Status": "running"},
            "Config": {
                "Image": "ispawn-ubuntu:latest-jupyter",
                "Labels": {"ispawn.container": "a"}
            }
        }]"#;
        let c = parse_inspect(json).expect("parse").expect("some");
        assert_eq!(c.name, "ispawn-a");
        assert!(c.is_running());
        assert_eq!(c.labels["ispawn.container"], "a");
    }

    #[test]
    fn parse_inspect_tolerates_null_labels() {
        let json = r#"[{"Name": "/x", "State": {"Status": "exited"}, "Config": {"Image": "i", "Labels": null}}]"#;
        let c = parse_inspect(json).expect("parse").expect("some");
        assert!(c.labels.is_empty());
    }

    #[test]
    fn parse_inspect_empty_array_is_none() {
        assert_eq!(parse_inspect("[]").expect("parse"), None);
        assert!(parse_inspect("not json").is_err());
    }

    #[test]
    fn parse_images_filters_prefix_and_dangling() {
        let out = concat!(
            r#"{"Repository":"ispawn-ubuntu","Tag":"latest-vscode","ID":"b2","Size":"1GB"}"#,
            "\n",
            r#"{"Repository":"ubuntu","Tag":"latest","ID":"c3","Size":"80MB"}"#,
            "\n",
            r#"{"Repository":"ispawn-ubuntu","Tag":"<none>","ID":"d4","Size":"1GB"}"#,
            "\n",
            r#"{"Repository":"ispawn-ubuntu","Tag":"latest-jupyter","ID":"a1","Size":"1GB"}"#,
        );
        let images = parse_images(out, "ispawn-");
        let refs: Vec<_> = images.iter().map(|i| i.reference.as_str()).collect();
        assert_eq!(refs, vec!["ispawn-ubuntu:latest-jupyter", "ispawn-ubuntu:latest-vscode"]);
    }

    #[test]
    fn missing_binary_is_container_error() {
        let cli = DockerCli::with_binary("/nonexistent/docker");
        let err = cli.network_exists("x").unwrap_err();
        assert!(matches!(err, IspawnError::Network { .. }));
        let err = cli.get_container("x").unwrap_err();
        assert!(matches!(err, IspawnError::Container { .. }));
    }
}
