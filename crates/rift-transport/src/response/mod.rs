//! Response synthesis.
//!
//! A [`ResponseTemplate`] either delegates to a [`Respond`] capability or
//! builds the response from its declarative parts. The body of every response
//! the engine returns is a `Full<Bytes>`, so it can always be read.

mod builder;

pub use builder::ResponseBuilder;

use crate::error::{Error, Result};
use crate::expect::deserialize_field_map;
use crate::request::{FieldSet, RequestSnapshot};
use bytes::Bytes;
use futures::executor::block_on;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Produces the whole response for a matched request.
///
/// Implemented for any `Fn(&Request<Bytes>) -> Result<Response<Full<Bytes>>>` closure.
pub trait Respond: Send + Sync {
    fn respond(&self, req: &Request<Bytes>) -> Result<Response<Full<Bytes>>>;
}

impl<F> Respond for F
where
    F: Fn(&Request<Bytes>) -> Result<Response<Full<Bytes>>> + Send + Sync,
{
    fn respond(&self, req: &Request<Bytes>) -> Result<Response<Full<Bytes>>> {
        self(req)
    }
}

/// A value encoded to JSON each time a response is synthesized.
#[derive(Clone)]
pub struct JsonBody(Arc<dyn Fn() -> serde_json::Result<Vec<u8>> + Send + Sync>);

impl JsonBody {
    pub fn new<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        JsonBody(Arc::new(move || serde_json::to_vec(&value)))
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        (self.0)()
    }
}

impl fmt::Debug for JsonBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonBody(..)")
    }
}

impl<'de> Deserialize<'de> for JsonBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(JsonBody::new)
    }
}

/// Status and headers every synthesized response starts from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResponseBase {
    pub status: u16,

    #[serde(deserialize_with = "deserialize_field_map")]
    pub headers: FieldSet,
}

impl Default for ResponseBase {
    fn default() -> Self {
        Self {
            status: 200,
            headers: FieldSet::new(),
        }
    }
}

/// How a route answers.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ResponseTemplate {
    pub base: ResponseBase,

    /// Replaces `base.headers` wholesale when non-empty.
    #[serde(deserialize_with = "deserialize_field_map")]
    pub headers: FieldSet,

    /// Literal body. Takes precedence over `body_json`.
    pub body_string: Option<String>,

    pub body_json: Option<JsonBody>,

    /// Overrides everything else when set.
    #[serde(skip)]
    pub respond: Option<Arc<dyn Respond>>,
}

impl ResponseTemplate {
    pub fn new(status: u16) -> Self {
        Self {
            base: ResponseBase {
                status,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn base_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.base
            .headers
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn body_string(mut self, body: impl Into<String>) -> Self {
        self.body_string = Some(body.into());
        self
    }

    pub fn body_json<T: Serialize + Send + Sync + 'static>(mut self, body: T) -> Self {
        self.body_json = Some(JsonBody::new(body));
        self
    }

    pub fn respond(mut self, respond: impl Respond + 'static) -> Self {
        self.respond = Some(Arc::new(respond));
        self
    }

    /// Build the response for `req`.
    ///
    /// A JSON body that fails to encode yields [`Error::EncodeBody`] carrying
    /// a 500 response, even when a literal body would have replaced it.
    pub fn synthesize(&self, req: &Request<Bytes>) -> Result<Response<Full<Bytes>>> {
        if let Some(respond) = &self.respond {
            return respond.respond(req);
        }

        let snapshot = RequestSnapshot::from_request(req);
        let json = match self.body_json.as_ref().map(JsonBody::encode).transpose() {
            Ok(json) => json,
            Err(source) => {
                let response = ResponseBuilder::new(StatusCode::INTERNAL_SERVER_ERROR)
                    .extension(snapshot)
                    .build();
                return Err(Error::EncodeBody {
                    source,
                    response: Box::new(response),
                });
            }
        };

        let status = StatusCode::from_u16(self.base.status)
            .map_err(|_| Error::InvalidStatus(self.base.status))?;
        let headers = if self.headers.is_empty() {
            &self.base.headers
        } else {
            &self.headers
        };
        let builder = ResponseBuilder::new(status)
            .fields(headers)
            .extension(snapshot);

        let builder = match (&self.body_string, json) {
            (Some(text), _) => builder.body(text.clone()),
            (None, Some(json)) => builder
                .default_header(CONTENT_TYPE, "application/json")
                .body(json),
            (None, None) => builder,
        };
        Ok(builder.build())
    }
}

impl fmt::Debug for ResponseTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseTemplate")
            .field("base", &self.base)
            .field("headers", &self.headers)
            .field("body_string", &self.body_string)
            .field("body_json", &self.body_json)
            .field("respond", &self.respond.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Read the whole body of a response produced by the engine.
pub fn read_body(response: Response<Full<Bytes>>) -> Bytes {
    match block_on(response.into_body().collect()) {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn get_users() -> Request<Bytes> {
        Request::builder()
            .uri("http://example.com/users?id=10")
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn test_default_response_is_empty_ok() {
        let response = ResponseTemplate::default().synthesize(&get_users()).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().is_empty());

        let snapshot = response.extensions().get::<RequestSnapshot>().unwrap();
        assert_eq!(snapshot.uri.path(), "/users");
        assert!(read_body(response).is_empty());
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let response = ResponseTemplate::new(201)
            .body_json(json!({"id": 10, "name": "foo"}))
            .synthesize(&get_users())
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(read_body(response), r#"{"id":10,"name":"foo"}"#);
    }

    #[test]
    fn test_explicit_content_type_is_kept() {
        let response = ResponseTemplate::new(200)
            .base_header("Content-Type", "application/vnd.api+json")
            .body_json(json!([]))
            .synthesize(&get_users())
            .unwrap();
        assert_eq!(response.headers()[CONTENT_TYPE], "application/vnd.api+json");
    }

    #[test]
    fn test_body_string_wins_over_json() {
        let response = ResponseTemplate::new(200)
            .body_json(json!({"ignored": true}))
            .body_string("plain")
            .synthesize(&get_users())
            .unwrap();
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(read_body(response), "plain");
    }

    #[test]
    fn test_header_override_replaces_base_headers() {
        let template = ResponseTemplate::new(200)
            .base_header("X-Base", "1")
            .base_header("X-Shared", "base");
        let response = template.synthesize(&get_users()).unwrap();
        assert_eq!(response.headers()["x-base"], "1");

        let response = template
            .header("X-Shared", "override")
            .synthesize(&get_users())
            .unwrap();
        assert!(response.headers().get("x-base").is_none());
        assert_eq!(response.headers()["x-shared"], "override");
    }

    #[test]
    fn test_unencodable_json_gives_500_with_error() {
        let mut body = HashMap::new();
        body.insert((1, 2), 3);
        let err = ResponseTemplate::new(200)
            .body_json(body)
            .body_string("never used")
            .synthesize(&get_users())
            .unwrap_err();
        assert!(matches!(err, Error::EncodeBody { .. }));

        let response = err.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<RequestSnapshot>().is_some());
        assert!(read_body(response).is_empty());
    }

    #[test]
    fn test_invalid_status() {
        let err = ResponseTemplate::new(1000)
            .synthesize(&get_users())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(1000)));
    }

    #[test]
    fn test_respond_capability_is_verbatim() {
        let template = ResponseTemplate::new(200)
            .body_string("ignored")
            .respond(|req: &Request<Bytes>| -> Result<Response<Full<Bytes>>> {
                Ok(ResponseBuilder::new(StatusCode::ACCEPTED)
                    .body(req.uri().path().to_string())
                    .build())
            });
        let response = template.synthesize(&get_users()).unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(response.extensions().get::<RequestSnapshot>().is_none());
        assert_eq!(read_body(response), "/users");

        let failing = ResponseTemplate::default().respond(
            |_: &Request<Bytes>| -> Result<Response<Full<Bytes>>> {
                Err(Error::custom("no response today"))
            },
        );
        let err = failing.synthesize(&get_users()).unwrap_err();
        assert_eq!(err.to_string(), "no response today");
    }

    #[test]
    fn test_template_from_yaml() {
        let yaml = r#"
base:
  status: 201
  headers:
    X-Request-Id: abc
bodyJson:
  id: 10
  name: foo
"#;
        let template: ResponseTemplate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(template.base.status, 201);
        assert!(template.headers.is_empty());

        let response = template.synthesize(&get_users()).unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc");
        let body: Value = serde_json::from_slice(&read_body(response)).unwrap();
        assert_eq!(body, json!({"id": 10, "name": "foo"}));
    }

    #[test]
    fn test_missing_base_defaults_to_200() {
        let template: ResponseTemplate = serde_yaml::from_str("bodyString: ok").unwrap();
        assert_eq!(template.base.status, 200);
    }

    #[test]
    fn test_status_belongs_under_base() {
        assert!(serde_yaml::from_str::<ResponseTemplate>("status: 201").is_err());
        assert!(serde_yaml::from_str::<ResponseTemplate>("base: {code: 201}").is_err());
    }
}
