//! Error type shared by predicates, response synthesis and dispatch.

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;

/// Boxed error used by caller-supplied capabilities.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced while dispatching a request.
///
/// Assertion failures are never represented here: they go to the
/// [`FailureSink`](crate::FailureSink) and do not change control flow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The streamed request body could not be collected.
    #[error("failed to read the request body: {0}")]
    ReadBody(#[source] BoxError),

    /// One side of a JSON body comparison is not valid JSON.
    #[error("failed to parse {what} as JSON: {source}")]
    InvalidJson {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Raised by a custom matcher, responder or fallback transport.
    #[error("{0}")]
    Custom(#[source] BoxError),

    /// The JSON response body could not be encoded.
    ///
    /// Carries the synthetic 500 response produced in its place.
    #[error("failed to encode the response body as JSON: {source}")]
    EncodeBody {
        #[source]
        source: serde_json::Error,
        response: Box<Response<Full<Bytes>>>,
    },

    #[error("invalid response status code: {0}")]
    InvalidStatus(u16),
}

impl Error {
    /// Wrap an arbitrary error raised by a caller-supplied capability.
    pub fn custom(err: impl Into<BoxError>) -> Self {
        Error::Custom(err.into())
    }

    /// The response that accompanies this error, if any.
    pub fn into_response(self) -> Option<Response<Full<Bytes>>> {
        match self {
            Error::EncodeBody { response, .. } => Some(*response),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
