//! Views over an intercepted request.
//!
//! The engine dispatches `hyper::Request<Bytes>`: the body is buffered once, so
//! every predicate and assertion observes the same content no matter how many
//! of them read it.

use bytes::Bytes;
use hyper::{HeaderMap, Method, Request, Uri};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Multi-valued field map used for headers and query parameters.
///
/// Keys map to their values in arrival order. For partial expectations an
/// empty value list means "the key must be present".
pub type FieldSet = BTreeMap<String, Vec<String>>;

/// `scheme://host[:port]` of the request, compared against service endpoints.
pub fn endpoint(uri: &Uri) -> Option<String> {
    let scheme = uri.scheme_str()?;
    let host = uri.host()?;
    Some(match uri.port_u16() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    })
}

/// Collect request headers into a [`FieldSet`] keyed by lowercase name.
pub fn header_fields(headers: &HeaderMap) -> FieldSet {
    let mut fields = FieldSet::new();
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        fields.insert(name.as_str().to_string(), values);
    }
    fields
}

/// Parse a raw query string into a [`FieldSet`], URL-decoding keys and values.
///
/// `+` decodes to a space and a bare key (`?flag`) yields one empty value.
pub fn query_fields(query: Option<&str>) -> FieldSet {
    let mut fields = FieldSet::new();
    let Some(query) = query else {
        return fields;
    };
    for pair in query.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        fields
            .entry(decode_component(key))
            .or_default()
            .push(decode_component(value));
    }
    fields
}

fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_decoded,
    }
}

/// Request body as text, or `None` when the request carries no body.
pub fn body_text(req: &Request<Bytes>) -> Option<Cow<'_, str>> {
    let body = req.body();
    if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(body))
    }
}

/// Convert hyper's lowercase header name to title case (`content-type` -> `Content-Type`).
pub fn header_to_title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

/// Copy of the request that produced a response.
///
/// Inserted into the extensions of every response the engine synthesizes, so
/// callers can inspect which request a response answers.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RequestSnapshot {
    pub fn from_request(req: &Request<Bytes>) -> Self {
        Self {
            method: req.method().clone(),
            uri: req.uri().clone(),
            headers: req.headers().clone(),
            body: req.body().clone(),
        }
    }
}
