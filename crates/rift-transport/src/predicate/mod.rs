//! Request predicates.
//!
//! Each predicate checks one aspect of a request against an optional
//! expectation and returns `Result<bool>`. An unset expectation always
//! matches. Errors (malformed JSON, a failing custom predicate) are distinct
//! from a plain non-match.
//!
//! # Module Structure
//!
//! - `string_matcher` - Method and path equality
//! - `field_matcher` - Header and query predicates, full and partial
//! - `body_matcher` - Literal and structural JSON body predicates
//! - `deep_equals` - Field set and JSON deep equality
//! - `custom` - Caller-supplied predicate capability

mod body_matcher;
mod custom;
mod deep_equals;
mod field_matcher;
mod string_matcher;

pub use body_matcher::{match_body_json, match_body_json_string, match_body_string, parse_json};
pub use custom::{match_custom, MatchRequest};
pub use deep_equals::{
    fields_deep_equal, fields_partially_equal, json_equal, lowercase_keys, partial_mismatches,
    FieldMismatch,
};
pub use field_matcher::{match_headers, match_part_of_headers, match_part_of_query, match_query};
pub use string_matcher::{match_method, match_path};
