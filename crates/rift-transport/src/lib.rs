//! In-process HTTP test double.
//!
//! A [`Transport`] answers requests from declared [`Service`]s and their
//! [`Route`]s instead of the network. Each route pairs an optional
//! [`Matcher`] deciding whether it applies, an optional [`Tester`] asserting
//! on the request it matched, and a [`ResponseTemplate`] describing the answer.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use hyper::Request;
//! use rift_transport::{Matcher, ResponseTemplate, Route, Service, TestReporter, Transport};
//! use serde_json::json;
//!
//! let reporter = Arc::new(TestReporter::named("get_user"));
//! let transport = Transport::new([Service::new("http://example.com").route(
//!     Route::new("get a user")
//!         .matcher(Matcher::new().method("GET").path("/users").query("id", ["10"]))
//!         .response(ResponseTemplate::new(201).body_json(json!({"id": 10, "name": "foo"}))),
//! )])
//! .with_sink(reporter.clone());
//!
//! let req = Request::builder()
//!     .uri("http://example.com/users?id=10")
//!     .body(Bytes::new())?;
//! let response = transport.dispatch(req)?;
//! assert_eq!(response.status(), 201);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod expect;
pub mod matcher;
pub mod predicate;
pub mod request;
pub mod response;
pub mod service;
pub mod sink;
pub mod tester;
pub mod transport;

pub use config::RoutesConfig;
pub use error::{BoxError, Error, Result};
pub use expect::Expectations;
pub use matcher::Matcher;
pub use predicate::MatchRequest;
pub use request::{FieldSet, RequestSnapshot};
pub use response::{read_body, JsonBody, Respond, ResponseBase, ResponseBuilder, ResponseTemplate};
pub use service::{Route, Service};
pub use sink::{FailureSink, LogSink, TestReporter};
pub use tester::{TestContext, TestRequest, Tester};
pub use transport::{no_match_message, RoundTrip, Transport, NO_ROUTE_BODY};
