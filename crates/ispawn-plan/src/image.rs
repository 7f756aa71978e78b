//! Base image and service set of a run.

use std::collections::BTreeMap;

use ispawn_common::catalog::{self, ServiceDescriptor};
use ispawn_common::error::{IspawnError, Result};

/// Build argument naming the base image.
pub const BASE_IMAGE_ARG: &str = "BASE_IMAGE";

/// Build argument listing the services to install.
pub const SERVICES_ARG: &str = "SERVICES";

/// A base image reference and the services layered on top of it.
///
/// Services are kept sorted by identifier and free of duplicates, so the
/// order in which they were requested never shows in derived names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSelection {
    base: String,
    services: Vec<&'static ServiceDescriptor>,
}

impl ImageSelection {
    /// Creates a selection from a base image and service identifiers.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the base is empty, no service is
    /// given, or a service is unknown.
    pub fn new<S: AsRef<str>>(base: impl Into<String>, services: &[S]) -> Result<Self> {
        let base = base.into();
        if base.trim().is_empty() || base.contains(char::is_whitespace) {
            return Err(IspawnError::validation(format!(
                "base image \"{base}\" must be a non-empty reference without whitespace"
            )));
        }
        if services.is_empty() {
            return Err(IspawnError::validation(format!(
                "at least one service is required, expected any of: {}",
                catalog::ids().join(", ")
            )));
        }
        let mut resolved = services
            .iter()
            .map(|s| catalog::lookup(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        resolved.sort_unstable_by_key(|s| s.id);
        resolved.dedup_by_key(|s| s.id);
        Ok(Self {
            base,
            services: resolved,
        })
    }

    /// Base image reference as given.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Selected services, sorted by identifier.
    #[must_use]
    pub fn services(&self) -> &[&'static ServiceDescriptor] {
        &self.services
    }

    /// Selected service identifiers, sorted.
    #[must_use]
    pub fn service_ids(&self) -> Vec<&'static str> {
        self.services.iter().map(|s| s.id).collect()
    }

    /// Base image name without registry, repository path, tag, or digest.
    #[must_use]
    pub fn base_name(&self) -> &str {
        let (name, _) = split_reference(&self.base);
        name
    }

    /// Base image tag, `latest` when absent.
    #[must_use]
    pub fn base_tag(&self) -> &str {
        let (_, tag) = split_reference(&self.base);
        tag.unwrap_or("latest")
    }

    /// Derives the image tag, `{prefix}{base name}:{base tag}-{service ids}`.
    #[must_use]
    pub fn target_tag(&self, prefix: &str) -> String {
        format!(
            "{prefix}{}:{}-{}",
            self.base_name(),
            self.base_tag(),
            self.service_ids().join("-")
        )
    }

    /// Build arguments handed to the image build.
    #[must_use]
    pub fn build_args(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (BASE_IMAGE_ARG.to_owned(), self.base.clone()),
            (SERVICES_ARG.to_owned(), self.service_ids().join(",")),
        ])
    }
}

/// Splits the last path segment of a reference into name and tag.
fn split_reference(reference: &str) -> (&str, Option<&str>) {
    let without_digest = reference.split('@').next().unwrap_or(reference);
    let last = without_digest.rsplit('/').next().unwrap_or(without_digest);
    match last.split_once(':') {
        Some((name, tag)) if !tag.is_empty() => (name, Some(tag)),
        Some((name, _)) => (name, None),
        None => (last, None),
    }
}
