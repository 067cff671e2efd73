//! Request dispatch.
//!
//! A [`Transport`] resolves each request against its services and routes,
//! runs the matched route's tester and synthesizes its response. Requests no
//! route answers go to the fallback transport, or get a 404 diagnostic.

mod no_match;
mod tower_service;

pub use no_match::{no_match_message, NO_ROUTE_BODY};

use crate::error::{Error, Result};
use crate::request::endpoint;
use crate::service::{Route, Service};
use crate::sink::FailureSink;
use crate::tester::TestContext;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, Response};
use no_match::no_match_response;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Sends a request and returns its response.
///
/// Implemented by [`Transport`] and by any
/// `Fn(Request<Bytes>) -> Result<Response<Full<Bytes>>>` closure, which makes
/// closures usable as fallbacks.
pub trait RoundTrip: Send + Sync {
    fn round_trip(&self, req: Request<Bytes>) -> Result<Response<Full<Bytes>>>;
}

impl<F> RoundTrip for F
where
    F: Fn(Request<Bytes>) -> Result<Response<Full<Bytes>>> + Send + Sync,
{
    fn round_trip(&self, req: Request<Bytes>) -> Result<Response<Full<Bytes>>> {
        self(req)
    }
}

/// In-process HTTP transport answering from declared routes.
///
/// Configuration is immutable and shared, so clones are cheap and a single
/// transport can serve any number of threads.
#[derive(Clone)]
pub struct Transport {
    services: Arc<[Service]>,
    sink: Option<Arc<dyn FailureSink>>,
    fallback: Option<Arc<dyn RoundTrip>>,
}

impl Transport {
    pub fn new(services: impl IntoIterator<Item = Service>) -> Self {
        Self {
            services: services.into_iter().collect(),
            sink: None,
            fallback: None,
        }
    }

    /// Report tester failures and unmatched requests to `sink`.
    ///
    /// Without a sink, testers are skipped and unmatched requests only get
    /// the 404 response.
    pub fn with_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Forward requests no route matches.
    pub fn with_fallback(mut self, fallback: impl RoundTrip + 'static) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Resolve `req` and produce its response.
    pub fn dispatch(&self, req: Request<Bytes>) -> Result<Response<Full<Bytes>>> {
        if let Some(service) = self.find_service(&req) {
            for route in &service.routes {
                match route.matches(&req) {
                    Ok(true) => {
                        debug!(
                            service = %service.endpoint,
                            route = %route.name,
                            method = %req.method(),
                            path = req.uri().path(),
                            "route matched"
                        );
                        self.run_tester(service, route, &req);
                        return route.response.synthesize(&req);
                    }
                    Ok(false) => {}
                    Err(err) => self.report_match_error(service, route, &err),
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            debug!(uri = %req.uri(), "no route matched, using the fallback transport");
            return fallback.round_trip(req);
        }
        Ok(no_match_response(&req, self.sink.as_deref()))
    }

    fn find_service(&self, req: &Request<Bytes>) -> Option<&Service> {
        let endpoint = endpoint(req.uri())?;
        self.services.iter().find(|s| s.endpoint == endpoint)
    }

    fn run_tester(&self, service: &Service, route: &Route, req: &Request<Bytes>) {
        if let (Some(tester), Some(sink)) = (&route.tester, &self.sink) {
            let ctx = TestContext::new(sink.clone(), &service.endpoint, &route.name);
            tester.run(&ctx, req);
        }
    }

    fn report_match_error(&self, service: &Service, route: &Route, err: &Error) {
        match &self.sink {
            Some(sink) => sink.warn(&format!(
                "failed to check whether the route matches with the request: {err}\nservice: {}\nrequest name: {}",
                service.endpoint, route.name
            )),
            None => warn!(
                service = %service.endpoint,
                route = %route.name,
                error = %err,
                "failed to check whether the route matches with the request"
            ),
        }
    }
}

impl RoundTrip for Transport {
    fn round_trip(&self, req: Request<Bytes>) -> Result<Response<Full<Bytes>>> {
        self.dispatch(req)
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("services", &self.services)
            .field("sink", &self.sink.is_some())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
