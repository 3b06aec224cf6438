use std::error::Error as StdError;

use thiserror::Error;

/// Boxed error type returned by collaborator implementations.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised by the auth code validation step.
///
/// The `Display` output of the two step-specific kinds is the stable message
/// key the host uses to look up a translated error text.
#[derive(Debug, Error)]
pub enum Error {
    /// No auth code was submitted and the code is not optional.
    #[error("validateauthcode_insufficient_params")]
    InsufficientParameters,

    /// The submitted auth code does not exist or was rejected by the validator.
    ///
    /// Both cases share this variant so callers cannot tell which codes exist.
    #[error("validateauthcode_no_record_found")]
    RecordNotFound,

    /// A collaborator failed while the step was running.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// The step settings could not be interpreted.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// An auth code record could not be written into the parameter set.
    #[error("failed to encode auth code record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl Error {
    /// Returns the translation key the host should display for this error.
    ///
    /// Errors without a dedicated key map to `validateauthcode_failed`.
    pub fn message_key(&self) -> &'static str {
        match self {
            Error::InsufficientParameters => "validateauthcode_insufficient_params",
            Error::RecordNotFound => "validateauthcode_no_record_found",
            Error::Collaborator(_) | Error::Settings(_) | Error::Encode(_) => {
                "validateauthcode_failed"
            }
        }
    }
}

/// A failure reported by one of the step's collaborators.
#[derive(Debug, Error)]
#[error("{collaborator} failed: {source}")]
pub struct CollaboratorError {
    /// Name of the collaborator that failed (for example `"session_store"`).
    pub collaborator: &'static str,
    /// The underlying error.
    #[source]
    pub source: BoxError,
}

impl CollaboratorError {
    /// Wraps an arbitrary error raised by the named collaborator.
    pub fn new(collaborator: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            collaborator,
            source: source.into(),
        }
    }
}

/// Outcome of a failed call to [`AuthCodeValidator::validate_and_execute_action`].
///
/// [`AuthCodeValidator::validate_and_execute_action`]: crate::AuthCodeValidator::validate_and_execute_action
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The auth code is unknown, expired or already used.
    #[error("invalid auth code")]
    InvalidAuthCode,

    /// The code was valid but executing its action failed.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidAuthCode => Error::RecordNotFound,
            ValidationError::Collaborator(inner) => Error::Collaborator(inner),
        }
    }
}

/// A step failure surfaced by a [`FormPipeline`](crate::FormPipeline).
#[derive(Debug, Error)]
#[error("step `{step}` failed: {source}")]
pub struct PipelineError {
    /// Name of the step that failed.
    pub step: &'static str,
    /// The step's error.
    #[source]
    pub source: Error,
}

/// A settings value that could not be interpreted.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings document as a whole is malformed.
    #[error("invalid step settings: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A single option carries a value of the wrong shape.
    #[error("invalid value for setting `{option}`: {reason}")]
    InvalidValue {
        /// The option name as it appears in the host configuration.
        option: &'static str,
        /// What was wrong with the value.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_errors_display_their_message_key() {
        assert_eq!(
            Error::InsufficientParameters.to_string(),
            Error::InsufficientParameters.message_key()
        );
        assert_eq!(
            Error::RecordNotFound.to_string(),
            "validateauthcode_no_record_found"
        );
    }

    #[test]
    fn invalid_auth_code_becomes_record_not_found() {
        let err: Error = ValidationError::InvalidAuthCode.into();
        assert!(matches!(err, Error::RecordNotFound));
    }

    #[test]
    fn collaborator_failure_keeps_its_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err: Error = ValidationError::from(CollaboratorError::new("record_repository", io)).into();

        assert_eq!(err.message_key(), "validateauthcode_failed");
        assert_eq!(err.to_string(), "record_repository failed: connection reset");
        assert!(StdError::source(&err).is_some());
    }
}
