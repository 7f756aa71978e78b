//! Reverse-proxy and metadata labels.
//!
//! The proxy discovers routes from flat, dot-segmented label keys, so the
//! label set is a flat map. Router and load-balancer keys embed the
//! router identifier, which includes both container name and service
//! identifier.

use std::collections::BTreeMap;

use ispawn_common::catalog::ServiceDescriptor;
use ispawn_common::config::Config;
use ispawn_common::constants::{
    METADATA_LABEL_NAMESPACE as META, PROXY_LABEL_NAMESPACE as PROXY, REDIRECT_MIDDLEWARE,
    SECURE_ENTRYPOINT,
};

use crate::naming::{self, RunNames, router_id};

/// Label key holding the run name.
pub const RUN_LABEL: &str = "ispawn.container";

/// Label key holding the base domain.
pub const DOMAIN_LABEL: &str = "ispawn.domain";

/// Builds the complete label set of a container.
#[must_use]
pub fn synthesize(
    config: &Config,
    run: &str,
    names: &RunNames,
    services: &[&ServiceDescriptor],
) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    let mut put = |key: String, value: String| {
        let _ = labels.insert(key, value);
    };

    put(format!("{PROXY}.enable"), "true".into());
    put(format!("{PROXY}.docker.network"), names.network.clone());
    let middleware = format!("{PROXY}.http.middlewares.{REDIRECT_MIDDLEWARE}.redirectscheme");
    put(format!("{middleware}.scheme"), "https".into());
    put(format!("{middleware}.permanent"), "true".into());
    put(RUN_LABEL.into(), run.into());
    put(DOMAIN_LABEL.into(), config.domain().into());

    for service in services {
        let Some(domain) = names.domain_of(service.id) else {
            continue;
        };
        let rid = router_id(&names.container, service.id);
        let router = format!("{PROXY}.http.routers.{rid}");
        put(format!("{router}.rule"), format!("Host(`{domain}`)"));
        put(format!("{router}.entrypoints"), SECURE_ENTRYPOINT.into());
        put(format!("{router}.middlewares"), REDIRECT_MIDDLEWARE.into());
        put(format!("{router}.service"), rid.clone());
        match config.cert_resolver() {
            Some(resolver) => put(format!("{router}.tls.certresolver"), resolver.into()),
            None => put(format!("{router}.tls"), "true".into()),
        }
        put(
            format!("{PROXY}.http.services.{rid}.loadbalancer.server.port"),
            service.port.to_string(),
        );
        put(format!("{META}.service.{}", service.id), "true".into());
        put(format!("{META}.port.{}", service.id), service.port.to_string());
    }
    labels
}

/// Recovers routed domains from a container's labels, sorted.
pub fn routed_domains<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let routers = format!("{PROXY}.http.routers.");
    let mut domains: Vec<String> = labels
        .into_iter()
        .filter(|(k, _)| k.starts_with(&routers) && k.ends_with(".rule"))
        .filter_map(|(_, v)| {
            v.strip_prefix("Host(`")
                .and_then(|rest| rest.strip_suffix("`)"))
                .map(str::to_owned)
        })
        .collect();
    domains.sort_unstable();
    domains
}

/// Recovers the selected service identifiers from a container's labels, sorted.
pub fn labelled_services<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    let prefix = format!("{META}.service.");
    let mut services: Vec<String> = labels
        .into_iter()
        .filter(|(_, v)| v.as_str() == "true")
        .filter_map(|(k, _)| k.strip_prefix(&prefix).map(str::to_owned))
        .collect();
    services.sort_unstable();
    services
}

/// Run name of a container owned by `user`, read from its run label.
///
/// The container-name prefix alone is ambiguous when user names carry
/// hyphens (`ispawn-u-` also prefixes user `u-x`), so the container is
/// claimed only if its labelled run maps back to its exact name.
#[must_use]
pub fn owned_run<'a>(
    config: &Config,
    user: &str,
    container: &str,
    labels: &'a BTreeMap<String, String>,
) -> Option<&'a str> {
    let run = labels.get(RUN_LABEL)?;
    (naming::container_name(config, user, run) == container).then_some(run.as_str())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use ispawn_common::catalog;
    use ispawn_common::config::{AccessModeKind, CertStrategyKind, InstallScope, RawConfig};

    use super::*;
    use crate::image::ImageSelection;

    fn local() -> Config {
        let raw = RawConfig::new(InstallScope::User, AccessModeKind::Local, "demo.localhost");
        Config::try_from(raw).expect("local")
    }

    fn acme() -> Config {
        let mut raw = RawConfig::new(InstallScope::User, AccessModeKind::Remote, "example.com");
        raw.cert_strategy = Some(CertStrategyKind::Acme);
        raw.email = Some("ops@example.com".into());
        Config::try_from(raw).expect("acme")
    }

    fn labels_for(config: &Config, services: &[&str]) -> BTreeMap<String, String> {
        let selection = ImageSelection::new("ubuntu", services).expect("selection");
        let names = RunNames::derive(config, &selection, "u", "a");
        synthesize(config, "a", &names, selection.services())
    }

    #[test]
    fn local_router_has_tls_without_resolver() {
        let labels = labels_for(&local(), &["jupyter"]);
        let r = "traefik.http.routers.ispawn-a-jupyter";
        assert_eq!(labels[&format!("{r}.rule")], "Host(`jupyter-a.demo.localhost`)");
        assert_eq!(labels[&format!("{r}.entrypoints")], "websecure");
        assert_eq!(labels[&format!("{r}.middlewares")], "redirect-to-https");
        assert_eq!(labels[&format!("{r}.tls")], "true");
        assert!(!labels.contains_key(&format!("{r}.tls.certresolver")));
        assert_eq!(
            labels["traefik.http.services.ispawn-a-jupyter.loadbalancer.server.port"],
            "8888"
        );
        assert_eq!(labels["traefik.docker.network"], "ispawn_internal");
        assert_eq!(labels[RUN_LABEL], "a");
    }

    #[test]
    fn acme_router_references_resolver() {
        let labels = labels_for(&acme(), &["rstudio"]);
        assert_eq!(
            labels["traefik.http.routers.ispawn-a-rstudio.tls.certresolver"],
            "letsencrypt"
        );
        assert!(!labels.contains_key("traefik.http.routers.ispawn-a-rstudio.tls"));
    }

    #[test]
    fn distinct_services_get_distinct_routers() {
        let labels = labels_for(&local(), &["jupyter", "jupyterlab", "vscode"]);
        let routers: Vec<&str> = labels
            .keys()
            .filter_map(|k| k.strip_prefix("traefik.http.routers."))
            .filter_map(|k| k.strip_suffix(".rule"))
            .collect();
        assert_eq!(routers.len(), 3);
        assert_eq!(routers.iter().collect::<HashSet<_>>().len(), 3);
    }

    #[test]
    fn every_key_is_flat_and_dotted() {
        let labels = labels_for(&acme(), &["jupyter", "vscode"]);
        assert!(labels.keys().all(|k| k.split('.').all(|seg| !seg.is_empty())));
    }

    #[test]
    fn domains_and_services_are_recoverable() {
        let labels = labels_for(&local(), &["vscode", "jupyter"]);
        assert_eq!(
            routed_domains(&labels),
            vec!["jupyter-a.demo.localhost", "vscode-a.demo.localhost"]
        );
        assert_eq!(labelled_services(&labels), vec!["jupyter", "vscode"]);
    }

    #[test]
    fn metadata_port_matches_catalog() {
        let labels = labels_for(&local(), &["vscode"]);
        let port = catalog::lookup("vscode").expect("vscode").port;
        assert_eq!(labels["ispawn.port.vscode"], port.to_string());
    }

    #[test]
    fn owned_run_disambiguates_hyphenated_users() {
        let mut raw = RawConfig::from(&local());
        raw.user_in_namespace = true;
        let config = Config::try_from(raw).expect("config");
        let labels = BTreeMap::from([(RUN_LABEL.to_owned(), "run".to_owned())]);

        assert_eq!(owned_run(&config, "u-x", "ispawn-u-x-run", &labels), Some("run"));
        assert_eq!(owned_run(&config, "u", "ispawn-u-x-run", &labels), None);
        assert_eq!(owned_run(&config, "u", "ispawn-u-run", &BTreeMap::new()), None);
    }
}
