//! Caller-supplied match capability.

use crate::error::Result;
use bytes::Bytes;
use hyper::Request;

/// A custom predicate deciding whether a request matches a route.
///
/// Implemented for any `Fn(&Request<Bytes>) -> Result<bool>` closure.
pub trait MatchRequest: Send + Sync {
    fn matches(&self, req: &Request<Bytes>) -> Result<bool>;
}

impl<F> MatchRequest for F
where
    F: Fn(&Request<Bytes>) -> Result<bool> + Send + Sync,
{
    fn matches(&self, req: &Request<Bytes>) -> Result<bool> {
        self(req)
    }
}

/// Run the custom predicate, if any. Its error propagates unchanged.
pub fn match_custom(req: &Request<Bytes>, custom: Option<&dyn MatchRequest>) -> Result<bool> {
    match custom {
        Some(custom) => custom.matches(req),
        None => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_custom_predicate_result_is_verbatim() {
        let req = Request::new(Bytes::from_static(b"ping"));
        let is_ping = |req: &Request<Bytes>| -> Result<bool> { Ok(req.body().as_ref() == b"ping") };
        assert!(match_custom(&req, Some(&is_ping)).unwrap());

        let failing = |_: &Request<Bytes>| -> Result<bool> { Err(Error::custom("failed to match")) };
        let err = match_custom(&req, Some(&failing)).unwrap_err();
        assert_eq!(err.to_string(), "failed to match");

        assert!(match_custom(&req, None).unwrap());
    }
}
