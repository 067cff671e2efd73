//! Declarative request expectations shared by matchers and testers.

use crate::request::FieldSet;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// The declarative half of a [`Matcher`](crate::Matcher) or
/// [`Tester`](crate::Tester). Every field is optional; `None` means "do not
/// check this aspect".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Expectations {
    /// HTTP method, compared case-insensitively.
    #[serde(default)]
    pub method: Option<String>,

    /// Exact URI path.
    #[serde(default)]
    pub path: Option<String>,

    /// The complete header set. Extra request headers fail the check.
    #[serde(default, deserialize_with = "deserialize_field_set")]
    pub headers: Option<FieldSet>,

    /// Headers that must be present. An empty value list checks presence only.
    #[serde(default, deserialize_with = "deserialize_field_set")]
    pub part_of_headers: Option<FieldSet>,

    /// The complete query parameter set.
    #[serde(default, deserialize_with = "deserialize_field_set")]
    pub query: Option<FieldSet>,

    /// Query parameters that must be present. An empty value list checks presence only.
    #[serde(default, deserialize_with = "deserialize_field_set")]
    pub part_of_query: Option<FieldSet>,

    /// Literal request body.
    #[serde(default)]
    pub body_string: Option<String>,

    /// JSON value compared structurally to the request body.
    #[serde(default)]
    pub body_json: Option<Value>,

    /// JSON document compared structurally to the request body.
    #[serde(default)]
    pub body_json_string: Option<String>,
}

impl Expectations {
    /// Number of body fields configured.
    pub fn body_field_count(&self) -> usize {
        [
            self.body_string.is_some(),
            self.body_json.is_some(),
            self.body_json_string.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

/// Field set values in config files accept a list, a single scalar, or null
/// (presence only).
#[derive(Deserialize)]
#[serde(untagged)]
enum FieldValues {
    Many(Vec<Scalar>),
    One(Scalar),
    Presence(()),
}

/// Unquoted YAML numbers and booleans are kept in their text form.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Str(value) => value,
            Scalar::Bool(value) => value.to_string(),
            Scalar::Int(value) => value.to_string(),
            Scalar::Uint(value) => value.to_string(),
            Scalar::Float(value) => value.to_string(),
        }
    }
}

fn deserialize_field_set<'de, D>(deserializer: D) -> Result<Option<FieldSet>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, FieldValues>> = Option::deserialize(deserializer)?;
    Ok(raw.map(into_field_set))
}

/// Same as the optional variant, for fields that default to an empty set.
pub(crate) fn deserialize_field_map<'de, D>(deserializer: D) -> Result<FieldSet, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, FieldValues>> = Option::deserialize(deserializer)?;
    Ok(raw.map(into_field_set).unwrap_or_default())
}

fn into_field_set(raw: BTreeMap<String, FieldValues>) -> FieldSet {
    raw.into_iter()
        .map(|(key, values)| {
            let values = match values {
                FieldValues::Many(values) => values.into_iter().map(String::from).collect(),
                FieldValues::One(value) => vec![value.into()],
                FieldValues::Presence(()) => Vec::new(),
            };
            (key, values)
        })
        .collect()
}

/// Builder methods for types that wrap [`Expectations`] in a field named `expect`.
macro_rules! expectation_builders {
    ($ty:ty) => {
        impl $ty {
            /// Expect this HTTP method (case-insensitive).
            pub fn method(mut self, method: impl Into<String>) -> Self {
                self.expect.method = Some(method.into());
                self
            }

            /// Expect this exact path.
            pub fn path(mut self, path: impl Into<String>) -> Self {
                self.expect.path = Some(path.into());
                self
            }

            /// Add a header to the complete expected header set.
            pub fn header(
                mut self,
                name: impl Into<String>,
                values: impl IntoIterator<Item = impl Into<String>>,
            ) -> Self {
                self.expect
                    .headers
                    .get_or_insert_with(Default::default)
                    .insert(name.into(), values.into_iter().map(Into::into).collect());
                self
            }

            /// Require a header with exactly these values; other headers are ignored.
            pub fn part_of_header(
                mut self,
                name: impl Into<String>,
                values: impl IntoIterator<Item = impl Into<String>>,
            ) -> Self {
                self.expect
                    .part_of_headers
                    .get_or_insert_with(Default::default)
                    .insert(name.into(), values.into_iter().map(Into::into).collect());
                self
            }

            /// Require a header to be present, whatever its value.
            pub fn has_header(mut self, name: impl Into<String>) -> Self {
                self.expect
                    .part_of_headers
                    .get_or_insert_with(Default::default)
                    .insert(name.into(), Vec::new());
                self
            }

            /// Add a parameter to the complete expected query set.
            pub fn query(
                mut self,
                key: impl Into<String>,
                values: impl IntoIterator<Item = impl Into<String>>,
            ) -> Self {
                self.expect
                    .query
                    .get_or_insert_with(Default::default)
                    .insert(key.into(), values.into_iter().map(Into::into).collect());
                self
            }

            /// Require a query parameter with exactly these values; other parameters are ignored.
            pub fn part_of_query(
                mut self,
                key: impl Into<String>,
                values: impl IntoIterator<Item = impl Into<String>>,
            ) -> Self {
                self.expect
                    .part_of_query
                    .get_or_insert_with(Default::default)
                    .insert(key.into(), values.into_iter().map(Into::into).collect());
                self
            }

            /// Require a query parameter to be present, whatever its value.
            pub fn has_query(mut self, key: impl Into<String>) -> Self {
                self.expect
                    .part_of_query
                    .get_or_insert_with(Default::default)
                    .insert(key.into(), Vec::new());
                self
            }

            /// Expect this literal body.
            pub fn body_string(mut self, body: impl Into<String>) -> Self {
                self.expect.body_string = Some(body.into());
                self
            }

            /// Expect a body structurally equal to this JSON value.
            pub fn body_json(mut self, body: serde_json::Value) -> Self {
                self.expect.body_json = Some(body);
                self
            }

            /// Expect a body structurally equal to this JSON document.
            pub fn body_json_string(mut self, body: impl Into<String>) -> Self {
                self.expect.body_json_string = Some(body.into());
                self
            }
        }
    };
}

pub(crate) use expectation_builders;
