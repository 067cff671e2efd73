//! Services and their routes.

use crate::error::Result;
use crate::matcher::Matcher;
use crate::response::ResponseTemplate;
use crate::tester::Tester;
use bytes::Bytes;
use hyper::Request;
use serde::Deserialize;

/// Routes served for one `scheme://host[:port]` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Service {
    pub endpoint: String,

    /// Evaluated in order; the first route that matches answers.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl Service {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            routes: Vec::new(),
        }
    }

    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }
}

/// A named matcher, tester and response binding.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Route {
    pub name: String,

    /// `None` matches every request sent to the service.
    #[serde(default)]
    pub matcher: Option<Matcher>,

    #[serde(default)]
    pub tester: Option<Tester>,

    #[serde(default)]
    pub response: ResponseTemplate,
}

impl Route {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn tester(mut self, tester: Tester) -> Self {
        self.tester = Some(tester);
        self
    }

    pub fn response(mut self, response: ResponseTemplate) -> Self {
        self.response = response;
        self
    }

    pub fn matches(&self, req: &Request<Bytes>) -> Result<bool> {
        match &self.matcher {
            Some(matcher) => matcher.matches(req),
            None => Ok(true),
        }
    }
}
