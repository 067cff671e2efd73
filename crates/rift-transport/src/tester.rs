//! Assertions on requests that already matched a route.
//!
//! Unlike matching, every configured check runs: a failing check is reported
//! to the [`FailureSink`] and the next one still executes. The outcome never
//! changes which response is returned.

use crate::expect::{expectation_builders, Expectations};
use crate::predicate::{
    json_equal, lowercase_keys, parse_json, partial_mismatches, FieldMismatch,
};
use crate::request::{body_text, header_fields, header_to_title_case, query_fields, FieldSet};
use crate::sink::FailureSink;
use bytes::Bytes;
use hyper::Request;
use serde::Deserialize;
use serde_json::Value;
use similar::TextDiff;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

/// Where an assertion runs: the sink plus the service and route it concerns.
#[derive(Clone)]
pub struct TestContext {
    sink: Arc<dyn FailureSink>,
    endpoint: String,
    route: String,
}

impl TestContext {
    pub fn new(
        sink: Arc<dyn FailureSink>,
        endpoint: impl Into<String>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            endpoint: endpoint.into(),
            route: route.into(),
        }
    }

    /// Endpoint of the service that matched.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Name of the route that matched.
    pub fn route_name(&self) -> &str {
        &self.route
    }

    /// Report a failure, labelled with the service endpoint and route name.
    pub fn fail(&self, message: impl Display) {
        self.sink.fail(&format!(
            "{message}\nservice: {}\nrequest name: {}",
            self.endpoint, self.route
        ));
    }

    /// Log a warning through the sink.
    pub fn warn(&self, message: impl Display) {
        self.sink.warn(&message.to_string());
    }

    /// Report a failure unless `expected == actual`. Returns whether they were equal.
    pub fn assert_eq<T: PartialEq + Debug + ?Sized>(
        &self,
        message: impl Display,
        expected: &T,
        actual: &T,
    ) -> bool {
        if expected == actual {
            return true;
        }
        self.fail(format_args!(
            "{message}\nexpected: {expected:?}\nactual:   {actual:?}"
        ));
        false
    }
}

/// A custom assertion run after the declarative checks of a [`Tester`].
///
/// Implemented for any `Fn(&TestContext, &Request<Bytes>)` closure.
pub trait TestRequest: Send + Sync {
    fn test(&self, ctx: &TestContext, req: &Request<Bytes>);
}

impl<F> TestRequest for F
where
    F: Fn(&TestContext, &Request<Bytes>) + Send + Sync,
{
    fn test(&self, ctx: &TestContext, req: &Request<Bytes>) {
        self(ctx, req)
    }
}

/// Assertions on a matched request.
#[derive(Clone, Default, Deserialize)]
#[serde(from = "Expectations")]
pub struct Tester {
    pub expect: Expectations,

    /// Custom assertion, always run last.
    pub custom: Option<Arc<dyn TestRequest>>,
}

expectation_builders!(Tester);

impl From<Expectations> for Tester {
    fn from(expect: Expectations) -> Self {
        Self {
            expect,
            custom: None,
        }
    }
}

impl Tester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom assertion.
    pub fn custom(mut self, custom: impl TestRequest + 'static) -> Self {
        self.custom = Some(Arc::new(custom));
        self
    }

    /// Run every configured assertion against `req`.
    pub fn run(&self, ctx: &TestContext, req: &Request<Bytes>) {
        let e = &self.expect;

        if let Some(path) = &e.path {
            ctx.assert_eq(
                "request path should match",
                path.as_str(),
                req.uri().path(),
            );
        }
        if let Some(method) = &e.method {
            ctx.assert_eq(
                "request method should match",
                method.to_uppercase().as_str(),
                req.method().as_str().to_uppercase().as_str(),
            );
        }
        if let Some(expected) = &e.body_string {
            let actual = body_text(req).unwrap_or_default();
            ctx.assert_eq("request body should match", expected.as_str(), &*actual);
        }
        if let Some(expected) = &e.body_json {
            test_body_json(ctx, req, expected);
        }
        if let Some(expected) = &e.body_json_string {
            match parse_json(expected, "the expected body") {
                Ok(expected) => test_body_json(ctx, req, &expected),
                Err(err) => ctx.fail(format_args!("tester.bodyJsonString is invalid: {err}")),
            }
        }
        if let Some(expected) = &e.part_of_headers {
            test_part_of_fields(
                ctx,
                "header",
                &lowercase_keys(expected),
                &header_fields(req.headers()),
            );
        }
        if let Some(expected) = &e.headers {
            ctx.assert_eq(
                "request header should match",
                &*lowercase_keys(expected),
                &header_fields(req.headers()),
            );
        }
        if let Some(expected) = &e.part_of_query {
            test_part_of_fields(ctx, "query", expected, &query_fields(req.uri().query()));
        }
        if let Some(expected) = &e.query {
            ctx.assert_eq(
                "request query parameter should match",
                expected,
                &query_fields(req.uri().query()),
            );
        }
        if let Some(custom) = &self.custom {
            custom.test(ctx, req);
        }
    }
}

impl fmt::Debug for Tester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tester")
            .field("expect", &self.expect)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

fn test_body_json(ctx: &TestContext, req: &Request<Bytes>, expected: &Value) {
    let Some(body) = body_text(req) else {
        ctx.fail(format_args!(
            "request body should match\nexpected: {expected}\nactual:   <empty body>"
        ));
        return;
    };
    let actual = match parse_json(&body, "the request body") {
        Ok(actual) => actual,
        Err(err) => {
            ctx.fail(err);
            return;
        }
    };
    if json_equal(&actual, expected) {
        return;
    }
    let expected_text = serde_json::to_string_pretty(expected).unwrap_or_default();
    let actual_text = serde_json::to_string_pretty(&actual).unwrap_or_default();
    let diff = TextDiff::from_lines(&expected_text, &actual_text);
    ctx.fail(format_args!(
        "request body should match\n{}",
        diff.unified_diff().header("expected", "actual")
    ));
}

fn test_part_of_fields(ctx: &TestContext, kind: &str, expected: &FieldSet, actual: &FieldSet) {
    let display_key = |key: &str| {
        if kind == "header" {
            header_to_title_case(key)
        } else {
            key.to_string()
        }
    };
    for mismatch in partial_mismatches(expected, actual) {
        match mismatch {
            FieldMismatch::Missing(key) => ctx.fail(format_args!(
                "the following request {kind} is required: {}",
                display_key(key)
            )),
            FieldMismatch::Differs {
                key,
                expected,
                actual,
            } => {
                ctx.assert_eq(
                    format_args!(r#"the request {kind} "{}" should match"#, display_key(key)),
                    expected,
                    actual,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::TestReporter;
    use serde_json::json;

    fn create_user(body: &'static str, authorization: Option<&str>) -> Request<Bytes> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("http://example.com/users?print=true");
        if let Some(token) = authorization {
            builder = builder.header("Authorization", token);
        }
        builder.body(Bytes::from_static(body.as_bytes())).unwrap()
    }

    fn run(tester: &Tester, req: &Request<Bytes>) -> Vec<String> {
        let reporter = Arc::new(TestReporter::new());
        tester.run(
            &TestContext::new(reporter.clone(), "http://example.com", "create a user"),
            req,
        );
        reporter.take_failures()
    }

    #[test]
    fn test_passing_assertions_report_nothing() {
        let tester = Tester::new()
            .method("post")
            .path("/users")
            .body_json_string(r#"{"email": "foo@example.com", "name": "foo"}"#)
            .header("Authorization", ["token XXXXX"])
            .part_of_query("print", ["true"])
            .query("print", ["true"]);
        let req = create_user(
            r#"{"name": "foo", "email": "foo@example.com"}"#,
            Some("token XXXXX"),
        );
        assert!(run(&tester, &req).is_empty());
    }

    #[test]
    fn test_failure_message_has_context() {
        let tester = Tester::new().path("/groups");
        let failures = run(&tester, &create_user("", None));
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0],
            "request path should match\n\
             expected: \"/groups\"\n\
             actual:   \"/users\"\n\
             service: http://example.com\n\
             request name: create a user"
        );
    }

    #[test]
    fn test_every_check_runs() {
        let tester = Tester::new()
            .path("/groups")
            .method("GET")
            .body_string("hello")
            .has_header("Authorization")
            .part_of_query("id", ["10"]);
        let failures = run(&tester, &create_user("bye", None));
        assert_eq!(failures.len(), 5);
        assert!(failures[3].starts_with("the following request header is required: Authorization"));
        assert!(failures[4].starts_with("the following request query is required: id"));
    }

    #[test]
    fn test_partial_header_value_mismatch() {
        let tester = Tester::new().part_of_header("authorization", ["token XXXXX"]);
        let failures = run(&tester, &create_user("", Some("token YYYYY")));
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with(r#"the request header "Authorization" should match"#));
    }

    #[test]
    fn test_body_json_diff() {
        let tester = Tester::new().body_json(json!({"name": "foo", "email": "foo@example.com"}));
        let failures = run(
            &tester,
            &create_user(r#"{"name": "bar", "email": "foo@example.com"}"#, None),
        );
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("-  \"name\": \"foo\""));
        assert!(failures[0].contains("+  \"name\": \"bar\""));
    }

    #[test]
    fn test_body_json_against_empty_or_invalid_body() {
        let tester = Tester::new().body_json(json!({"name": "foo"}));
        let failures = run(&tester, &create_user("", None));
        assert!(failures[0].contains("<empty body>"));

        let failures = run(&tester, &create_user("nope", None));
        assert!(failures[0].starts_with("failed to parse the request body as JSON"));
    }

    #[test]
    fn test_custom_assertion_runs_last_even_after_failures() {
        let tester = Tester::new()
            .path("/groups")
            .custom(|ctx: &TestContext, req: &Request<Bytes>| {
                assert_eq!(ctx.route_name(), "create a user");
                assert_eq!(ctx.endpoint(), "http://example.com");
                if req.headers().get("x-trace-id").is_none() {
                    ctx.fail("x-trace-id should be set");
                }
            });
        let failures = run(&tester, &create_user("", None));
        assert_eq!(failures.len(), 2);
        assert!(failures[1].starts_with("x-trace-id should be set\nservice: http://example.com"));
    }

    #[test]
    fn test_full_query_mismatch() {
        let tester = Tester::new().query("id", ["10"]);
        let failures = run(&tester, &create_user("", None));
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("request query parameter should match"));
    }
}
