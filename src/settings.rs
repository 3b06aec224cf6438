//! Step settings and their validation.
//!
//! Hosts hand over settings as a loosely typed option mapping using the
//! camelCase option names below. Flags follow the host's integer semantics:
//! `true`, non-zero numbers and strings starting with a non-zero integer are
//! on; everything else is off.
//!
//! | Option | Field |
//! |---|---|
//! | `authCodeIsOptional` | [`Settings::auth_code_is_optional`] |
//! | `doNotInvalidateAuthCode` | [`Settings::do_not_invalidate_auth_code`] |
//! | `mergeRecordDataToGP` | [`Settings::merge_record_data`] |
//! | `mergeIndependentIdentifierToGP` | [`Settings::merge_independent_identifier_to`] |
//! | `redirectPage` | [`Settings::redirect_page`] |
//! | `errorRedirectPage` | [`Settings::error_redirect_page`] |
//! | `correctRedirectUrl` | [`Settings::correct_redirect_url`] |
//! | `additionalParams` | [`Settings::additional_params`] |

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SettingsError;

/// Validated settings for one run of the auth code step.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Settings {
    /// A missing auth code is a silent no-op instead of an error.
    pub auth_code_is_optional: bool,
    /// Explicit invalidation policy. `None` means the option was not set,
    /// which keeps the legacy behaviour for page-access codes.
    pub do_not_invalidate_auth_code: Option<bool>,
    /// Merge resolved record fields into the parameter set.
    pub merge_record_data: bool,
    /// Parameter name that receives an independent code's identifier.
    pub merge_independent_identifier_to: Option<String>,
    /// Page to redirect to after a successful validation.
    pub redirect_page: Option<String>,
    /// Page to redirect to when validation fails.
    pub error_redirect_page: Option<String>,
    /// Passed through to the redirect unchanged.
    pub correct_redirect_url: bool,
    /// Extra query parameters for redirects, passed through unchanged.
    pub additional_params: Map<String, Value>,
}

impl Settings {
    /// Validates a host option mapping.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Malformed`] if `value` is not an object and
    /// [`SettingsError::InvalidValue`] if an option has an unusable shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use authcode_step::Settings;
    /// use serde_json::json;
    ///
    /// let settings = Settings::from_value(json!({
    ///     "authCodeIsOptional": "1",
    ///     "redirectPage": 42,
    /// }))
    /// .unwrap();
    ///
    /// assert!(settings.auth_code_is_optional);
    /// assert_eq!(settings.redirect_page.as_deref(), Some("42"));
    /// assert_eq!(settings.do_not_invalidate_auth_code, None);
    /// ```
    pub fn from_value(value: Value) -> Result<Self, SettingsError> {
        let options: Map<String, Value> = serde_json::from_value(value)?;
        Self::try_from(options)
    }

    /// Parses and validates a JSON settings document.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let options: Map<String, Value> = serde_json::from_str(json)?;
        Self::try_from(options)
    }
}

impl TryFrom<Map<String, Value>> for Settings {
    type Error = SettingsError;

    fn try_from(options: Map<String, Value>) -> Result<Self, Self::Error> {
        let flag = |option: &'static str| match options.get(option) {
            Some(value) => parse_flag(option, value),
            None => Ok(false),
        };

        let do_not_invalidate_auth_code = match options.get("doNotInvalidateAuthCode") {
            Some(value) => Some(parse_flag("doNotInvalidateAuthCode", value)?),
            None => None,
        };

        Ok(Self {
            auth_code_is_optional: flag("authCodeIsOptional")?,
            do_not_invalidate_auth_code,
            merge_record_data: flag("mergeRecordDataToGP")?,
            merge_independent_identifier_to: parse_text(
                "mergeIndependentIdentifierToGP",
                options.get("mergeIndependentIdentifierToGP"),
            )?
            .filter(|key| key != "0"),
            redirect_page: parse_page("redirectPage", options.get("redirectPage"))?,
            error_redirect_page: parse_page("errorRedirectPage", options.get("errorRedirectPage"))?,
            correct_redirect_url: flag("correctRedirectUrl")?,
            additional_params: parse_additional_params(options.get("additionalParams"))?,
        })
    }
}

/// Interprets a flag the way the host's `intval()` check does.
fn parse_flag(option: &'static str, value: &Value) -> Result<bool, SettingsError> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f.trunc() != 0.0)),
        Value::String(s) => Ok(leading_integer(s) != 0),
        Value::Array(_) | Value::Object(_) => Err(SettingsError::InvalidValue {
            option,
            reason: "expected a boolean, number or string".to_string(),
        }),
    }
}

/// Parses the optional sign and digits at the start of `s`; anything else is 0.
/// Out-of-range values saturate like the host's integer conversion does.
fn leading_integer(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude = match &digits[..end] {
        "" => 0,
        run => run.parse::<i64>().unwrap_or(i64::MAX),
    };
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn parse_text(option: &'static str, value: Option<&Value>) -> Result<Option<String>, SettingsError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(SettingsError::InvalidValue {
            option,
            reason: "expected a string".to_string(),
        }),
    }
}

/// Page targets are page ids or URLs; `0` and blank mean "not configured".
fn parse_page(option: &'static str, value: Option<&Value>) -> Result<Option<String>, SettingsError> {
    match value {
        Some(Value::Bool(_)) => Err(SettingsError::InvalidValue {
            option,
            reason: "expected a page id or URL".to_string(),
        }),
        other => Ok(parse_text(option, other)?.filter(|page| page != "0")),
    }
}

fn parse_additional_params(value: Option<&Value>) -> Result<Map<String, Value>, SettingsError> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        // Nested values are kept as-is; the host encodes them as bracketed query keys.
        Some(Value::Object(params)) => Ok(params.clone()),
        Some(_) => Err(SettingsError::InvalidValue {
            option: "additionalParams",
            reason: "expected an object of query parameters".to_string(),
        }),
    }
}
