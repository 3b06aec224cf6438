//! Shared proptest strategies for unit tests.

use proptest::prelude::*;
use serde_json::{json, Value};

use crate::params::ParameterSet;

/// Auth codes as generated by the issuing side: url-safe, non-empty.
pub(crate) fn arb_token_string() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9_-]{1,40}").unwrap()
}

/// Scalar form values.
pub(crate) fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z0-9 @.]{0,20}".prop_map(Value::String),
    ]
}

/// Small parameter sets with short lowercase keys so that collisions happen.
pub(crate) fn arb_parameter_set() -> impl Strategy<Value = ParameterSet> {
    prop::collection::vec(("[a-e]{1,2}", arb_scalar()), 0..8)
        .prop_map(|pairs| pairs.into_iter().collect())
}
