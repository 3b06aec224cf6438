use std::fmt;

/// Structured logger scoped to one form processing step.
///
/// Every event carries a `step` field naming the step that emitted it, so
/// hosts running several steps per request can tell their output apart.
///
/// Auth codes are [`Token`](crate::Token)s and print as `[REDACTED]`, so
/// passing one to a log call never leaks the code.
#[derive(Debug, Clone, Copy)]
pub struct StepLog<'a> {
    step: &'a str,
}

impl<'a> StepLog<'a> {
    /// Creates a logger for the named step.
    pub fn new(step: &'a str) -> Self {
        Self { step }
    }

    /// Returns the step name attached to every event.
    pub fn step(&self) -> &str {
        self.step
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(step = %self.step, "{}", args);
    }

    /// Logs an info-level message.
    ///
    /// ```no_run
    /// # use authcode_step::{StepLog, Token};
    /// let log = StepLog::new("validate_auth_code");
    /// let token = Token::new("c0ffee");
    /// log.info(format_args!("validated {}", token)); // "validated [REDACTED]"
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(step = %self.step, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(step = %self.step, "{}", args);
    }

    /// Logs a deprecation notice.
    ///
    /// Emitted at warn level under the `deprecation` target so hosts can route
    /// deprecations to their own log.
    pub fn deprecation(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(target: "deprecation", step = %self.step, "{}", args);
    }
}
