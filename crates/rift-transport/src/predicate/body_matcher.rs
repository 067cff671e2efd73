//! Body predicates: literal text and structural JSON.
//!
//! An absent (empty) request body never matches a configured body predicate.
//! JSON predicates treat a parse failure on either side as an error rather
//! than a plain non-match.

use super::deep_equals::json_equal;
use crate::error::{Error, Result};
use crate::request::body_text;
use bytes::Bytes;
use hyper::Request;
use serde_json::Value;

/// Parse `text` as JSON, naming `what` in the error.
pub fn parse_json(text: &str, what: &'static str) -> Result<Value> {
    serde_json::from_str(text).map_err(|source| Error::InvalidJson { what, source })
}

/// Exact equality between the request body and `expected`.
pub fn match_body_string(req: &Request<Bytes>, expected: Option<&str>) -> Result<bool> {
    let Some(expected) = expected else {
        return Ok(true);
    };
    Ok(body_text(req).is_some_and(|body| body == expected))
}

/// Structural JSON equality between the request body and a JSON value.
pub fn match_body_json(req: &Request<Bytes>, expected: Option<&Value>) -> Result<bool> {
    let Some(expected) = expected else {
        return Ok(true);
    };
    let Some(body) = body_text(req) else {
        return Ok(false);
    };
    let actual = parse_json(&body, "the request body")?;
    Ok(json_equal(&actual, expected))
}

/// Structural JSON equality between the request body and a JSON document.
pub fn match_body_json_string(req: &Request<Bytes>, expected: Option<&str>) -> Result<bool> {
    let Some(expected) = expected else {
        return Ok(true);
    };
    let Some(body) = body_text(req) else {
        return Ok(false);
    };
    let actual = parse_json(&body, "the request body")?;
    let expected = parse_json(expected, "the expected body")?;
    Ok(json_equal(&actual, &expected))
}
