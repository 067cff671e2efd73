use crate::request::FieldSet;
use bytes::Bytes;
use http_body_util::Full;
use hyper::http::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Response, StatusCode};
use std::str::FromStr;
use tracing::warn;

/// Assembles a `Response<Full<Bytes>>`. Invalid header names or values are
/// logged and skipped instead of failing the whole response.
pub struct ResponseBuilder {
    status: StatusCode,
    body: Bytes,
    headers: HeaderMap,
    extensions: hyper::http::Extensions,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        ResponseBuilder {
            status,
            body: Bytes::new(),
            headers: HeaderMap::new(),
            extensions: Default::default(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Append a header value, keeping earlier values for the same name.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::from_str(name), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => warn!(header = name, "skipping invalid response header"),
        }
        self
    }

    /// Append every value of a field set.
    pub fn fields(self, fields: &FieldSet) -> Self {
        fields.iter().fold(self, |builder, (name, values)| {
            values
                .iter()
                .fold(builder, |builder, value| builder.header(name, value))
        })
    }

    /// Set `name` only when no value was set for it yet.
    pub fn default_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers
            .entry(name)
            .or_insert_with(|| HeaderValue::from_static(value));
        self
    }

    pub fn extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    pub fn build(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        *response.extensions_mut() = self.extensions;
        response
    }
}
