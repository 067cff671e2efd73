//! Route matching.
//!
//! A [`Matcher`] combines the configured predicates into one decision. Checks
//! run in a fixed order and stop at the first one that rejects the request or
//! fails: method, path, body literal, body JSON value, body JSON string,
//! partial headers, full headers, partial query, full query, custom predicate.

use crate::error::Result;
use crate::expect::{expectation_builders, Expectations};
use crate::predicate::{
    match_body_json, match_body_json_string, match_body_string, match_custom, match_headers,
    match_method, match_part_of_headers, match_part_of_query, match_path, match_query,
    MatchRequest,
};
use bytes::Bytes;
use hyper::Request;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Conditions a request must meet for a route to apply.
///
/// A matcher with nothing configured matches every request.
#[derive(Clone, Default, Deserialize)]
#[serde(from = "Expectations")]
pub struct Matcher {
    pub expect: Expectations,

    /// Custom predicate, evaluated after every declarative check.
    pub custom: Option<Arc<dyn MatchRequest>>,
}

expectation_builders!(Matcher);

impl From<Expectations> for Matcher {
    fn from(expect: Expectations) -> Self {
        Self {
            expect,
            custom: None,
        }
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom predicate.
    pub fn custom(mut self, custom: impl MatchRequest + 'static) -> Self {
        self.custom = Some(Arc::new(custom));
        self
    }

    /// Decide whether `req` matches.
    ///
    /// Returns the result of the first check that rejects the request or
    /// fails; later checks are not evaluated.
    pub fn matches(&self, req: &Request<Bytes>) -> Result<bool> {
        let e = &self.expect;
        let checks: [(&str, &dyn Fn() -> Result<bool>); 10] = [
            ("method", &|| match_method(req, e.method.as_deref())),
            ("path", &|| match_path(req, e.path.as_deref())),
            ("bodyString", &|| {
                match_body_string(req, e.body_string.as_deref())
            }),
            ("bodyJson", &|| match_body_json(req, e.body_json.as_ref())),
            ("bodyJsonString", &|| {
                match_body_json_string(req, e.body_json_string.as_deref())
            }),
            ("partOfHeaders", &|| {
                match_part_of_headers(req, e.part_of_headers.as_ref())
            }),
            ("headers", &|| match_headers(req, e.headers.as_ref())),
            ("partOfQuery", &|| {
                match_part_of_query(req, e.part_of_query.as_ref())
            }),
            ("query", &|| match_query(req, e.query.as_ref())),
            ("custom", &|| match_custom(req, self.custom.as_deref())),
        ];

        for (name, check) in checks {
            match check() {
                Ok(true) => {}
                other => {
                    trace!(check = name, "predicate rejected the request");
                    return other;
                }
            }
        }
        Ok(true)
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("expect", &self.expect)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
