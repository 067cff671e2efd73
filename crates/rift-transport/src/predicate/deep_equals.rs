//! Deep equality for field sets (headers, query params) and JSON documents.
//!
//! `deepEquals` on a field set requires an EXACT match: same keys, same value
//! lists in the same order. Partial equality only constrains the keys the
//! expectation names.

use crate::request::FieldSet;
use serde_json::Value;
use std::borrow::Cow;

/// One way an actual field set fails a partial expectation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMismatch<'a> {
    /// The expected key is absent from the request.
    Missing(&'a str),
    /// The key is present but its value list differs.
    Differs {
        key: &'a str,
        expected: &'a [String],
        actual: &'a [String],
    },
}

/// Strict deep equality: key sets and value lists must be identical.
pub fn fields_deep_equal(expected: &FieldSet, actual: &FieldSet) -> bool {
    expected == actual
}

/// Every way `actual` violates the partial expectation, in key order.
///
/// An empty expected value list only requires the key to be present.
/// Keys the expectation does not name are ignored.
pub fn partial_mismatches<'a>(
    expected: &'a FieldSet,
    actual: &'a FieldSet,
) -> impl Iterator<Item = FieldMismatch<'a>> + 'a {
    expected.iter().filter_map(move |(key, expected_values)| {
        match actual.get(key) {
            None => Some(FieldMismatch::Missing(key.as_str())),
            Some(actual_values)
                if !expected_values.is_empty() && expected_values != actual_values =>
            {
                Some(FieldMismatch::Differs {
                    key: key.as_str(),
                    expected: expected_values.as_slice(),
                    actual: actual_values.as_slice(),
                })
            }
            Some(_) => None,
        }
    })
}

/// Partial equality: true when no expected key is violated.
pub fn fields_partially_equal(expected: &FieldSet, actual: &FieldSet) -> bool {
    partial_mismatches(expected, actual).next().is_none()
}

/// Lowercase the keys of a header expectation so they line up with hyper's
/// normalized header names.
pub fn lowercase_keys(fields: &FieldSet) -> Cow<'_, FieldSet> {
    if fields
        .keys()
        .all(|k| !k.chars().any(|c| c.is_ascii_uppercase()))
    {
        return Cow::Borrowed(fields);
    }
    let mut lowered = FieldSet::new();
    for (key, values) in fields {
        lowered
            .entry(key.to_ascii_lowercase())
            .or_insert_with(Vec::new)
            .extend(values.iter().cloned());
    }
    Cow::Owned(lowered)
}

/// Structural JSON equality.
///
/// Object key order is irrelevant, arrays compare element-wise in order and
/// numbers compare by value (`1` equals `1.0`). Values of different JSON
/// types are never equal, so `1` differs from `"1"`.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y || matches!((x.as_f64(), y.as_f64()), (Some(p), Some(q)) if p == q)
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| json_equal(p, q))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, p)| y.get(key).is_some_and(|q| json_equal(p, q)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Vec<&str>)]) -> FieldSet {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_deep_equals_strict() {
        let expected = fields(&[("page", vec!["1"]), ("sort", vec!["desc"])]);

        assert!(fields_deep_equal(
            &expected,
            &fields(&[("page", vec!["1"]), ("sort", vec!["desc"])])
        ));
        // Missing param
        assert!(!fields_deep_equal(&expected, &fields(&[("page", vec!["1"])])));
        // Extra param
        assert!(!fields_deep_equal(
            &expected,
            &fields(&[("page", vec!["1"]), ("sort", vec!["desc"]), ("filter", vec!["x"])])
        ));
        // Value order matters
        assert!(!fields_deep_equal(
            &fields(&[("tag", vec!["a", "b"])]),
            &fields(&[("tag", vec!["b", "a"])])
        ));
    }

    #[test]
    fn test_partial_allows_extra_keys() {
        let expected = fields(&[("page", vec!["1"])]);
        assert!(fields_partially_equal(
            &expected,
            &fields(&[("page", vec!["1"]), ("sort", vec!["desc"])])
        ));
    }

    #[test]
    fn test_partial_presence_only() {
        let expected = fields(&[("authorization", vec![])]);
        assert!(fields_partially_equal(
            &expected,
            &fields(&[("authorization", vec!["token XXXXX"])])
        ));
        assert!(!fields_partially_equal(&expected, &FieldSet::new()));
    }

    #[test]
    fn test_partial_mismatches_reports_every_key() {
        let expected = fields(&[("a", vec!["1"]), ("b", vec![]), ("c", vec!["3"])]);
        let actual = fields(&[("a", vec!["2"]), ("c", vec!["3"])]);

        let mismatches: Vec<_> = partial_mismatches(&expected, &actual).collect();
        assert_eq!(mismatches.len(), 2);
        assert_eq!(
            mismatches[0],
            FieldMismatch::Differs {
                key: "a",
                expected: &["1".to_string()],
                actual: &["2".to_string()],
            }
        );
        assert_eq!(mismatches[1], FieldMismatch::Missing("b"));
    }

    #[test]
    fn test_lowercase_keys() {
        let expected = fields(&[("Authorization", vec!["token"])]);
        let lowered = lowercase_keys(&expected);
        assert!(matches!(lowered, Cow::Owned(_)));
        assert_eq!(lowered["authorization"], vec!["token"]);

        let already = fields(&[("content-type", vec![])]);
        assert!(matches!(lowercase_keys(&already), Cow::Borrowed(_)));
    }

    #[test]
    fn test_json_equal_ignores_key_order() {
        assert!(json_equal(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1})));
        assert!(json_equal(
            &json!({"user": {"name": "foo", "tags": [1, 2]}}),
            &json!({"user": {"tags": [1, 2], "name": "foo"}})
        ));
    }

    #[test]
    fn test_json_equal_is_type_strict() {
        assert!(!json_equal(&json!({"a": 1}), &json!({"a": "1"})));
        assert!(!json_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!json_equal(&json!({"a": 1}), &json!({"a": 1, "b": null})));
    }

    #[test]
    fn test_json_equal_numbers_by_value() {
        assert!(json_equal(&json!(1), &json!(1.0)));
        assert!(!json_equal(&json!(1), &json!(1.5)));
    }
}
