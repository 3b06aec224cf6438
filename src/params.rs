//! The in-flight form parameter set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::token::Token;

/// Parameter key holding the submitted auth code.
pub const AUTH_CODE_KEY: &str = "authCode";

/// Parameter key the step fills with the auth code record (or its resolved
/// record data) after a successful page-access validation.
pub const AUTH_CODE_RECORD_KEY: &str = "authCodeRecord";

/// Ordered mapping of form parameter names to values.
///
/// Insertion order is preserved so that templates rendering the parameters see
/// them in submission order, with keys added by processing steps at the end.
///
/// # Examples
///
/// ```
/// use authcode_step::ParameterSet;
/// use serde_json::json;
///
/// let mut params = ParameterSet::new();
/// params.insert("email", json!("jane@example.com"));
/// params.insert("authCode", json!("c0ffee"));
///
/// assert_eq!(params.submitted_token().unwrap().expose(), "c0ffee");
/// assert_eq!(params.keys().collect::<Vec<_>>(), ["email", "authCode"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: Map<String, Value>,
}

impl ParameterSet {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Sets `key` to `value`, returning the previous value.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    /// Merges `other` into this set. Values from `other` win on collision.
    pub fn merge(&mut self, other: ParameterSet) {
        for (key, value) in other.values {
            self.values.insert(key, value);
        }
    }

    /// Reads the submitted auth code from [`AUTH_CODE_KEY`].
    ///
    /// Numeric values are accepted as their decimal text. Blank strings and
    /// any other value type count as "no code submitted".
    pub fn submitted_token(&self) -> Option<Token> {
        match self.values.get(AUTH_CODE_KEY)? {
            Value::String(raw) => Token::from_submitted(raw),
            Value::Number(n) => Token::from_submitted(&n.to_string()),
            _ => None,
        }
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over parameter names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Converts the set into a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

impl From<Map<String, Value>> for ParameterSet {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
