//! Route definitions loaded from YAML or JSON files.

use crate::request::endpoint;
use crate::service::Service;
use crate::transport::Transport;
use anyhow::Context;
use hyper::Uri;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// A routes document: the services a [`Transport`] answers for.
///
/// Custom capabilities (predicates, assertions, responders) cannot be
/// expressed in a file; attach them to the loaded services in code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesConfig {
    #[serde(default)]
    pub services: Vec<Service>,
}

impl RoutesConfig {
    /// Load and validate a routes file. `.json` files are parsed as JSON,
    /// anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read routes file {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: RoutesConfig = if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse {} as JSON", path.display()))?
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("failed to parse {} as YAML", path.display()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, anyhow::Error> {
        let config: RoutesConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for service in &self.services {
            let uri: Uri = service
                .endpoint
                .parse()
                .with_context(|| format!("invalid service endpoint '{}'", service.endpoint))?;
            if endpoint(&uri).as_deref() != Some(service.endpoint.as_str()) {
                anyhow::bail!(
                    "Service endpoint '{}' must have the form scheme://host[:port] \
                     without path, query or trailing slash",
                    service.endpoint
                );
            }

            let mut names = HashSet::new();
            for route in &service.routes {
                if !names.insert(route.name.as_str()) {
                    anyhow::bail!(
                        "Duplicate route name '{}' in service '{}'",
                        route.name,
                        service.endpoint
                    );
                }
                if route.response.body_string.is_some() && route.response.body_json.is_some() {
                    anyhow::bail!(
                        "Route '{}' in service '{}' sets both bodyString and bodyJson",
                        route.name,
                        service.endpoint
                    );
                }
                let body_fields = [
                    ("matcher", route.matcher.as_ref().map(|m| &m.expect)),
                    ("tester", route.tester.as_ref().map(|t| &t.expect)),
                ];
                for (kind, expect) in body_fields {
                    if expect.is_some_and(|e| e.body_field_count() > 1) {
                        warn!(
                            service = %service.endpoint,
                            route = %route.name,
                            "{kind} sets more than one body field; all of them must hold"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    pub fn into_transport(self) -> Transport {
        Transport::new(self.services)
    }
}
