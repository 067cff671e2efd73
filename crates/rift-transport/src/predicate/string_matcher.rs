//! Method and path predicates.

use crate::error::Result;
use bytes::Bytes;
use hyper::Request;

/// Case-insensitive method equality. An unset expectation always matches.
pub fn match_method(req: &Request<Bytes>, expected: Option<&str>) -> Result<bool> {
    Ok(expected.is_none_or(|method| method.eq_ignore_ascii_case(req.method().as_str())))
}

/// Exact path equality: no normalization, no trailing-slash tolerance.
pub fn match_path(req: &Request<Bytes>, expected: Option<&str>) -> Result<bool> {
    Ok(expected.is_none_or(|path| path == req.uri().path()))
}
