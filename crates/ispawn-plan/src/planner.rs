//! Composition of a run request into a deployment plan.
//!
//! Every check that can reject the request runs before the first
//! directory is created, so an invalid request leaves the host untouched.

use std::collections::BTreeMap;

use ispawn_common::config::Config;
use ispawn_common::constants::{CONTAINER_LOG_DIR, env};
use ispawn_common::error::{IspawnError, Result};
use ispawn_common::layout::DataLayout;
use ispawn_common::types::{MountSpec, Password, is_dns_label};
use ispawn_core::identity::{Identity, IdentityResolver, running_as_root};
use ispawn_core::volume::{Provisioner, assemble, resolve_strict};

use crate::labels;
use crate::naming::RunNames;
use crate::plan::{DeploymentPlan, ServiceEndpoint};
use crate::request::RunRequest;

/// Turns run requests into deployment plans under one configuration.
pub struct Planner<'a> {
    config: &'a Config,
    identities: &'a dyn IdentityResolver,
    layout: DataLayout,
    privileged: bool,
}

impl<'a> Planner<'a> {
    /// Planner provisioning under the namespace's default data root.
    #[must_use]
    pub fn new(config: &'a Config, identities: &'a dyn IdentityResolver) -> Self {
        Self {
            config,
            identities,
            layout: DataLayout::for_namespace(config.name()),
            privileged: running_as_root(),
        }
    }

    /// Uses another data root.
    #[must_use]
    pub fn with_layout(mut self, layout: DataLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Overrides whether directory ownership may be changed.
    #[must_use]
    pub const fn with_privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Data layout the planner provisions under.
    #[must_use]
    pub const fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Validates `request`, provisions its directories, and builds the plan.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed run name, an unknown
    /// user, or an unusable volume specification, and an I/O error if the
    /// log directory cannot be created.
    pub fn plan(&self, request: &RunRequest) -> Result<DeploymentPlan> {
        if !is_dns_label(&request.name) {
            return Err(IspawnError::validation(format!(
                "run name \"{}\" must be 1-63 ASCII letters, digits, or inner hyphens",
                request.name
            )));
        }
        let identity = self.identities.resolve(request.identity.user.as_deref())?;
        if self.config.user_in_namespace() && !is_dns_label(&identity.name) {
            return Err(IspawnError::validation(format!(
                "user name \"{}\" cannot appear in container names or domains",
                identity.name
            )));
        }
        if let Some(group) = &request.identity.required_group {
            if group.trim().is_empty() {
                return Err(IspawnError::validation("required group must not be empty"));
            }
        }

        let defaults = self
            .config
            .default_mounts()
            .iter()
            .map(|spec| resolve_strict(spec, &identity.home))
            .collect::<Result<Vec<_>>>()?;
        let run_mounts = request
            .volumes
            .iter()
            .map(|raw| {
                MountSpec::parse(raw, self.config.mount_point())
                    .and_then(|spec| resolve_strict(&spec, &identity.home))
            })
            .collect::<Result<Vec<_>>>()?;

        let provisioner = Provisioner::new(&self.layout, self.privileged);
        let (log, log_warning) = provisioner.log_dir(&request.name, &identity)?;
        let container_home = format!("{}/{}", self.config.home_prefix(), identity.name);
        let services = request.selection.services();
        let provisioned =
            provisioner.service_volumes(&request.name, services, &identity, &container_home);

        let log_dir = log.host.clone();
        let volumes = assemble(defaults, run_mounts, log, provisioned.bindings);
        let names = RunNames::derive(
            self.config,
            &request.selection,
            &identity.name,
            &request.name,
        );
        let labels = labels::synthesize(self.config, &request.name, &names, services);
        let password = request.password.clone().unwrap_or_else(Password::generate);
        let env = self.environment(request, &identity, &password, &container_home);
        let endpoints = services
            .iter()
            .filter_map(|s| {
                names.domain_of(s.id).map(|domain| ServiceEndpoint {
                    service: s.id,
                    domain: domain.to_owned(),
                    port: s.port,
                    token_auth: s.token_auth,
                })
            })
            .collect();
        let warnings: Vec<String> = log_warning.into_iter().chain(provisioned.warnings).collect();

        tracing::info!(
            container = %names.container,
            image = %names.image,
            volumes = volumes.len(),
            warnings = warnings.len(),
            "deployment planned"
        );
        Ok(DeploymentPlan {
            run: request.name.clone(),
            container_name: names.container,
            image: names.image,
            network: names.network,
            env,
            labels,
            volumes,
            dns: self.config.dns().to_vec(),
            endpoints,
            log_dir,
            warnings,
        })
    }

    fn environment(
        &self,
        request: &RunRequest,
        identity: &Identity,
        password: &Password,
        container_home: &str,
    ) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::from([
            (env::USERNAME.to_owned(), identity.name.clone()),
            (env::PASSWORD.to_owned(), password.expose().to_owned()),
            (env::UID.to_owned(), identity.uid.to_string()),
            (env::GID.to_owned(), identity.gid.to_string()),
            (
                env::SERVICES.to_owned(),
                request.selection.service_ids().join(","),
            ),
            (env::HOME_DIR.to_owned(), container_home.to_owned()),
            (env::LOG_DIR.to_owned(), CONTAINER_LOG_DIR.to_owned()),
            (env::TIMEZONE.to_owned(), self.config.timezone().to_owned()),
        ]);
        if let Some(group) = &request.identity.required_group {
            let _ = vars.insert(env::REQUIRED_GROUP.to_owned(), group.clone());
        }
        if request.identity.sudo {
            let _ = vars.insert(env::SUDO.to_owned(), "true".to_owned());
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use ispawn_common::config::{AccessModeKind, CertStrategyKind, InstallScope, RawConfig};
    use ispawn_core::identity::FixedIdentityResolver;
    use ispawn_core::volume::DirAccess;

    use super::*;
    use crate::image::ImageSelection;
    use crate::request::IdentityOverride;

    struct Fixture {
        _tmp: tempfile::TempDir,
        data: PathBuf,
        work: PathBuf,
        resolver: FixedIdentityResolver,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().expect("tempdir");
        let data = tmp.path().join("data");
        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).expect("mkdir");
        let access = DirAccess::of(tmp.path()).expect("stat");
        let resolver = FixedIdentityResolver::new(Identity {
            name: "u".into(),
            uid: access.uid,
            gid: access.gid,
            home: tmp.path().to_path_buf(),
            groups: Vec::new(),
        });
        Fixture {
            _tmp: tmp,
            data,
            work,
            resolver,
        }
    }

    fn local() -> Config {
        let mut raw = RawConfig::new(InstallScope::User, AccessModeKind::Local, "demo.localhost");
        raw.mount_point = "/mnt".into();
        Config::try_from(raw).expect("local")
    }

    fn acme() -> Config {
        let mut raw = RawConfig::new(InstallScope::User, AccessModeKind::Remote, "example.com");
        raw.cert_strategy = Some(CertStrategyKind::Acme);
        raw.email = Some("ops@example.com".into());
        Config::try_from(raw).expect("acme")
    }

    fn request(f: &Fixture) -> RunRequest {
        let selection = ImageSelection::new("ubuntu", &["jupyter"]).expect("selection");
        RunRequest::new("a", selection).with_volumes([f.work.display().to_string()])
    }

    fn plan_with(config: &Config, f: &Fixture, req: &RunRequest) -> Result<DeploymentPlan> {
        Planner::new(config, &f.resolver)
            .with_layout(DataLayout::at(&f.data))
            .with_privileged(false)
            .plan(req)
    }

    #[test]
    fn local_plan_matches_expected_names() {
        let f = fixture();
        let plan = plan_with(&local(), &f, &request(&f)).expect("plan");

        assert_eq!(plan.image, "ispawn-ubuntu:latest-jupyter");
        assert_eq!(plan.container_name, "ispawn-a");
        assert_eq!(plan.endpoints[0].domain, "jupyter-a.demo.localhost");
        let routers: Vec<_> = plan.labels.keys().filter(|k| k.ends_with(".rule")).collect();
        assert_eq!(routers.len(), 1);
        assert_eq!(plan.labels["traefik.http.routers.ispawn-a-jupyter.tls"], "true");
        assert!(!plan.labels.keys().any(|k| k.ends_with(".certresolver")));
        assert!(plan.warnings.is_empty(), "{:?}", plan.warnings);
    }

    #[test]
    fn acme_plan_references_resolver() {
        let f = fixture();
        let plan = plan_with(&acme(), &f, &request(&f)).expect("plan");
        assert_eq!(
            plan.labels["traefik.http.routers.ispawn-a-jupyter.tls.certresolver"],
            "letsencrypt"
        );
    }

    #[test]
    fn volumes_follow_category_order() {
        let f = fixture();
        let mut raw = RawConfig::from(&local());
        raw.volumes = vec![format!("{}:/shared:ro", f.work.display())];
        let config = Config::try_from(raw).expect("config");
        let plan = plan_with(&config, &f, &request(&f)).expect("plan");

        let containers: Vec<&Path> = plan.volumes.iter().map(|v| v.container.as_path()).collect();
        assert_eq!(
            containers,
            vec![
                Path::new("/shared"),
                Path::new("/mnt/work"),
                Path::new(CONTAINER_LOG_DIR),
                Path::new("/home/u/.jupyter"),
                Path::new("/home/u/.ipython"),
                Path::new("/home/u/.local/share/jupyter"),
            ]
        );
        assert_eq!(plan.volumes[2].host, plan.log_dir);
    }

    #[test]
    fn environment_carries_identity_and_toggles() {
        let f = fixture();
        let req = request(&f)
            .with_identity(IdentityOverride {
                user: Some("u".into()),
                required_group: Some("research".into()),
                sudo: true,
            })
            .with_password(Password::new("pw"));
        let plan = plan_with(&local(), &f, &req).expect("plan");

        assert_eq!(plan.env[env::USERNAME], "u");
        assert_eq!(plan.env[env::PASSWORD], "pw");
        assert_eq!(plan.env[env::SERVICES], "jupyter");
        assert_eq!(plan.env[env::LOG_DIR], CONTAINER_LOG_DIR);
        assert_eq!(plan.env[env::HOME_DIR], "/home/u");
        assert_eq!(plan.env[env::TIMEZONE], "Europe/Paris");
        assert_eq!(plan.env[env::REQUIRED_GROUP], "research");
        assert_eq!(plan.env[env::SUDO], "true");
        assert_eq!(
            plan.service_urls()[0].1,
            "https://jupyter-a.demo.localhost/?token=pw"
        );
    }

    #[test]
    fn generated_password_when_absent() {
        let f = fixture();
        let plan = plan_with(&local(), &f, &request(&f)).expect("plan");
        assert_eq!(plan.env[env::PASSWORD].len(), Password::GENERATED_LEN);
        assert!(!plan.env.contains_key(env::SUDO));
    }

    #[test]
    fn unknown_user_is_validation_error() {
        let f = fixture();
        let req = request(&f).with_identity(IdentityOverride {
            user: Some("ghost".into()),
            ..IdentityOverride::default()
        });
        let err = plan_with(&local(), &f, &req).unwrap_err();
        assert!(matches!(err, IspawnError::Validation { .. }));
    }

    #[test]
    fn missing_host_path_fails_before_provisioning() {
        let f = fixture();
        let req = request(&f).with_volumes(["/definitely/not/here"]);
        assert!(plan_with(&local(), &f, &req).is_err());
        assert!(!f.data.exists());
    }

    #[test]
    fn bad_volume_spec_fails_before_provisioning() {
        let f = fixture();
        let req = request(&f).with_volumes(["/a:/b:ro:x"]);
        let err = plan_with(&local(), &f, &req).unwrap_err();
        assert!(err.to_string().contains("4 colon-delimited fields"));
        assert!(!f.data.exists());
    }

    #[test]
    fn invalid_run_name_is_rejected() {
        let f = fixture();
        let selection = ImageSelection::new("ubuntu", &["jupyter"]).expect("selection");
        let req = RunRequest::new("bad_name", selection);
        assert!(plan_with(&local(), &f, &req).is_err());
    }

    #[test]
    fn user_in_namespace_prefixes_names() {
        let f = fixture();
        let mut raw = RawConfig::from(&local());
        raw.user_in_namespace = true;
        let config = Config::try_from(raw).expect("config");
        let plan = plan_with(&config, &f, &request(&f)).expect("plan");
        assert_eq!(plan.container_name, "ispawn-u-a");
        assert_eq!(plan.endpoints[0].domain, "u-jupyter-a.demo.localhost");
    }

    #[test]
    fn second_run_gets_next_log_dir() {
        let f = fixture();
        let first = plan_with(&local(), &f, &request(&f)).expect("first");
        let second = plan_with(&local(), &f, &request(&f)).expect("second");
        assert_ne!(first.log_dir, second.log_dir);
        assert!(second.log_dir.ends_with("a.2"));
    }
}
