//! What happens when no route answers and there is no fallback.

use crate::request::{
    body_text, header_fields, header_to_title_case, query_fields, FieldSet, RequestSnapshot,
};
use crate::response::ResponseBuilder;
use crate::sink::FailureSink;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, Response, StatusCode};

/// Body of the 404 returned for an unmatched request.
pub const NO_ROUTE_BODY: &str = r#"{"message": "no route matches the request"}"#;

/// Report the unmatched request to the sink, if any, and answer with a 404.
pub(crate) fn no_match_response(
    req: &Request<Bytes>,
    sink: Option<&dyn FailureSink>,
) -> Response<Full<Bytes>> {
    if let Some(sink) = sink {
        sink.fail(&no_match_message(req));
    }
    ResponseBuilder::new(StatusCode::NOT_FOUND)
        .body(NO_ROUTE_BODY)
        .extension(RequestSnapshot::from_request(req))
        .build()
}

/// Describe an unmatched request. Query and header lines are listed in key order.
pub fn no_match_message(req: &Request<Bytes>) -> String {
    let query = field_lines(&query_fields(req.uri().query()), |key| key.to_string());
    let header = field_lines(&header_fields(req.headers()), header_to_title_case);
    format!(
        "no route matches the request.\nurl: {}\nmethod: {}\nquery:\n{query}\nheader:\n{header}\nbody:\n{}",
        req.uri(),
        req.method(),
        body_text(req).unwrap_or_default(),
    )
}

fn field_lines(fields: &FieldSet, display_key: impl Fn(&str) -> String) -> String {
    fields
        .iter()
        .map(|(key, values)| format!("  {}: {}", display_key(key), values.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}
