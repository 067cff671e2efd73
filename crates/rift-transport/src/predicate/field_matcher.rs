//! Header and query parameter predicates.
//!
//! Both come in a full flavor (deep equality of the whole multi-map) and a
//! partial flavor (only the expected keys are constrained). Header names are
//! matched case-insensitively; query keys are case-sensitive.

use super::deep_equals::{fields_deep_equal, fields_partially_equal, lowercase_keys};
use crate::error::Result;
use crate::request::{header_fields, query_fields, FieldSet};
use bytes::Bytes;
use hyper::Request;

/// The whole header map must deep-equal the expectation.
pub fn match_headers(req: &Request<Bytes>, expected: Option<&FieldSet>) -> Result<bool> {
    let Some(expected) = expected else {
        return Ok(true);
    };
    Ok(fields_deep_equal(
        &lowercase_keys(expected),
        &header_fields(req.headers()),
    ))
}

/// Every expected header must be present, with equal values when any are given.
pub fn match_part_of_headers(req: &Request<Bytes>, expected: Option<&FieldSet>) -> Result<bool> {
    let Some(expected) = expected else {
        return Ok(true);
    };
    Ok(fields_partially_equal(
        &lowercase_keys(expected),
        &header_fields(req.headers()),
    ))
}

/// The parsed query multi-map must deep-equal the expectation.
pub fn match_query(req: &Request<Bytes>, expected: Option<&FieldSet>) -> Result<bool> {
    let Some(expected) = expected else {
        return Ok(true);
    };
    Ok(fields_deep_equal(expected, &query_fields(req.uri().query())))
}

/// Every expected query key must be present, with equal values when any are given.
pub fn match_part_of_query(req: &Request<Bytes>, expected: Option<&FieldSet>) -> Result<bool> {
    let Some(expected) = expected else {
        return Ok(true);
    };
    Ok(fields_partially_equal(
        expected,
        &query_fields(req.uri().query()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, headers: &[(&str, &str)]) -> Request<Bytes> {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Bytes::new()).unwrap()
    }

    fn fields(pairs: &[(&str, Vec<&str>)]) -> FieldSet {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_full_headers_require_exact_set() {
        let req = request("http://example.com/", &[("Authorization", "token XXXXX")]);
        assert!(match_headers(&req, Some(&fields(&[("Authorization", vec!["token XXXXX"])]))).unwrap());
        assert!(!match_headers(&req, Some(&fields(&[("Authorization", vec!["token YYYYY"])]))).unwrap());

        let extra = request(
            "http://example.com/",
            &[("Authorization", "token XXXXX"), ("Accept", "*/*")],
        );
        assert!(!match_headers(&extra, Some(&fields(&[("Authorization", vec!["token XXXXX"])]))).unwrap());
        assert!(match_headers(&extra, None).unwrap());
    }

    #[test]
    fn test_partial_headers() {
        let req = request(
            "http://example.com/",
            &[("Authorization", "token XXXXX"), ("Accept", "*/*")],
        );
        // presence only
        assert!(match_part_of_headers(&req, Some(&fields(&[("Authorization", vec![])]))).unwrap());
        // value must match when given
        assert!(match_part_of_headers(&req, Some(&fields(&[("authorization", vec!["token XXXXX"])]))).unwrap());
        assert!(!match_part_of_headers(&req, Some(&fields(&[("Authorization", vec!["token YYYYY"])]))).unwrap());
        // missing key never matches
        assert!(!match_part_of_headers(&req, Some(&fields(&[("X-Api-Key", vec![])]))).unwrap());
    }

    #[test]
    fn test_full_query() {
        let req = request("http://example.com/users?id=10", &[]);
        assert!(match_query(&req, Some(&fields(&[("id", vec!["10"])]))).unwrap());
        assert!(!match_query(&req, Some(&fields(&[("id", vec!["11"])]))).unwrap());

        let extra = request("http://example.com/users?id=10&print=true", &[]);
        assert!(!match_query(&extra, Some(&fields(&[("id", vec!["10"])]))).unwrap());
    }

    #[test]
    fn test_partial_query() {
        let req = request("http://example.com/users?id=10&print=true", &[]);
        assert!(match_part_of_query(&req, Some(&fields(&[("id", vec!["10"])]))).unwrap());
        assert!(match_part_of_query(&req, Some(&fields(&[("print", vec![])]))).unwrap());
        assert!(!match_part_of_query(&req, Some(&fields(&[("id", vec!["11"])]))).unwrap());
        assert!(!match_part_of_query(&req, Some(&fields(&[("name", vec![])]))).unwrap());
        // query keys are case-sensitive
        assert!(!match_part_of_query(&req, Some(&fields(&[("ID", vec![])]))).unwrap());
    }
}
