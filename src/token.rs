use std::fmt;

use serde::{Deserialize, Serialize};

/// A submitted auth code.
///
/// Auth codes are single-use credentials, so `Token` never shows its value in
/// `Debug` or `Display` output. The raw string is only reachable through
/// [`expose`](Self::expose).
///
/// # Examples
///
/// ```
/// use authcode_step::Token;
///
/// let token = Token::new("f3a9c1d07be2");
///
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(token.to_string(), "[REDACTED]");
/// assert_eq!(token.expose(), "f3a9c1d07be2");
/// ```
// Do NOT derive Debug: the derived impl would print the code.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token {
    inner: String,
}

impl Token {
    /// Wraps a raw auth code string.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Builds a token from a submitted form value.
    ///
    /// Surrounding whitespace is trimmed; blank input yields `None`.
    pub fn from_submitted(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::new(trimmed))
        }
    }

    /// Returns the raw auth code.
    ///
    /// Only call this when handing the code to a store or writing it back into
    /// the form. Never log the result.
    pub fn expose(&self) -> &str {
        &self.inner
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
