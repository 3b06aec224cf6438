use serde_json::Value;

use crate::collaborator::{AuthCodeStore, AuthCodeValidator, RecordRepository, SessionStore};
use crate::error::{Error, ValidationError};
use crate::logging::StepLog;
use crate::params::{ParameterSet, AUTH_CODE_KEY, AUTH_CODE_RECORD_KEY};
use crate::pipeline::{FormProcessingStep, Redirect, StepOutcome};
use crate::record::{AuthCodeRecord, AuthCodeType};
use crate::settings::Settings;
use crate::token::Token;

const STEP_NAME: &str = "validate_auth_code";

/// Where the auth code being validated came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenSource {
    Form,
    Session,
}

/// Validates a submitted auth code and executes its configured action.
///
/// `enableRecord` codes un-hide their record through the validator.
/// `accessPage` codes additionally expose the code and its record data to the
/// rest of the form and keep the code in the session.
///
/// Any failure is handled in one place: a looked-up code is invalidated, then
/// the step either redirects to `errorRedirectPage` or returns the error.
///
/// # Examples
///
/// ```
/// use authcode_step::memory::{
///     InMemoryAuthCodeStore, InMemoryAuthCodeValidator, InMemoryRecordRepository,
///     InMemorySessionStore,
/// };
/// use authcode_step::{
///     AuthCodeAction, AuthCodeRecord, AuthCodeValidationStep, ParameterSet, Settings, Token,
/// };
/// use serde_json::json;
///
/// let store = InMemoryAuthCodeStore::new();
/// let records = InMemoryRecordRepository::new();
/// let session = InMemorySessionStore::new();
/// let validator = InMemoryAuthCodeValidator::new(&store, &records);
///
/// store.insert(AuthCodeRecord::independent(
///     Token::new("c0ffee"),
///     AuthCodeAction::AccessPage,
///     "spring-campaign",
/// ));
///
/// let step = AuthCodeValidationStep::new(&store, &validator, &records, &session);
/// let settings = Settings::from_value(json!({
///     "doNotInvalidateAuthCode": 1,
///     "mergeIndependentIdentifierToGP": "campaign",
/// }))
/// .unwrap();
///
/// let params: ParameterSet = [("authCode", json!("c0ffee"))].into_iter().collect();
/// let params = step.process(params, &settings).unwrap().into_parameters().unwrap();
///
/// assert_eq!(params.get("campaign"), Some(&json!("spring-campaign")));
/// assert_eq!(session.stored(), Some(Token::new("c0ffee")));
/// ```
pub struct AuthCodeValidationStep<'a> {
    store: &'a dyn AuthCodeStore,
    validator: &'a dyn AuthCodeValidator,
    records: &'a dyn RecordRepository,
    session: &'a dyn SessionStore,
}

impl<'a> AuthCodeValidationStep<'a> {
    /// Creates the step over its collaborators.
    pub fn new(
        store: &'a dyn AuthCodeStore,
        validator: &'a dyn AuthCodeValidator,
        records: &'a dyn RecordRepository,
        session: &'a dyn SessionStore,
    ) -> Self {
        Self {
            store,
            validator,
            records,
            session,
        }
    }

    /// Checks the submitted auth code, executes its action and optionally
    /// redirects to the configured success page.
    ///
    /// # Errors
    ///
    /// - [`Error::InsufficientParameters`] if no code was submitted and the
    ///   code is not optional. A session code that no longer validates is
    ///   cleared and counts as not submitted.
    /// - [`Error::RecordNotFound`] if the code is unknown or invalid
    /// - any collaborator error
    ///
    /// No error is returned when `errorRedirectPage` is configured; the step
    /// redirects there instead.
    pub fn process(&self, params: ParameterSet, settings: &Settings) -> Result<StepOutcome, Error> {
        let log = StepLog::new(STEP_NAME);
        let mut looked_up = None;

        match self.validate(params, settings, &mut looked_up, &log) {
            Ok(outcome) => Ok(outcome),
            Err(err) => self.recover(err, looked_up.as_ref(), settings, &log),
        }
    }

    fn validate(
        &self,
        mut params: ParameterSet,
        settings: &Settings,
        looked_up: &mut Option<AuthCodeRecord>,
        log: &StepLog<'_>,
    ) -> Result<StepOutcome, Error> {
        let (token, source) = match self.submitted_token(&params)? {
            Some(found) => found,
            None => return self.without_code(params, settings, log),
        };

        let record = match self.store.lookup(&token)? {
            Some(record) => record,
            None if source == TokenSource::Session => {
                self.forget_session_code(log)?;
                return self.without_code(params, settings, log);
            }
            None => return Err(Error::RecordNotFound),
        };
        let record = looked_up.insert(record);
        let is_access_page = record.is_access_page();

        self.apply_invalidation_policy(settings, is_access_page, log);

        let record = match self.validator.validate_and_execute_action(record) {
            Ok(record) => record,
            Err(ValidationError::InvalidAuthCode) if source == TokenSource::Session => {
                if let Some(stale) = looked_up.take() {
                    self.discard(&stale, log);
                }
                self.forget_session_code(log)?;
                return self.without_code(params, settings, log);
            }
            Err(err) => return Err(err.into()),
        };
        *looked_up = Some(record.clone());
        log.info(format_args!(
            "validated {} auth code with action {}",
            record.code_type(),
            record.action()
        ));

        if is_access_page {
            self.grant_access(&mut params, &token, &record, settings, log)?;
        }

        if let Some(page) = &settings.redirect_page {
            log.debug(format_args!("redirecting to success page {}", page));
            return Ok(StepOutcome::Redirect(Redirect::to(page.as_str(), settings)));
        }

        Ok(StepOutcome::Continue(params))
    }

    /// The code from the form, or the one kept in the session by an earlier request.
    fn submitted_token(&self, params: &ParameterSet) -> Result<Option<(Token, TokenSource)>, Error> {
        if let Some(token) = params.submitted_token() {
            return Ok(Some((token, TokenSource::Form)));
        }
        Ok(self.session.load()?.map(|token| (token, TokenSource::Session)))
    }

    fn without_code(
        &self,
        params: ParameterSet,
        settings: &Settings,
        log: &StepLog<'_>,
    ) -> Result<StepOutcome, Error> {
        if settings.auth_code_is_optional {
            log.debug(format_args!("no auth code submitted, code is optional"));
            Ok(StepOutcome::Continue(params))
        } else {
            Err(Error::InsufficientParameters)
        }
    }

    /// Drops a session code that no longer validates so it stops shadowing
    /// "no code submitted" on later requests.
    fn forget_session_code(&self, log: &StepLog<'_>) -> Result<(), Error> {
        log.debug(format_args!("session auth code is no longer valid, clearing it"));
        self.session.clear()?;
        Ok(())
    }

    /// Best-effort invalidation; a failure is logged, never raised.
    fn discard(&self, record: &AuthCodeRecord, log: &StepLog<'_>) {
        if let Err(cleanup) = self.validator.invalidate_auth_code(record) {
            log.warn(format_args!("could not invalidate auth code: {}", cleanup));
        }
    }

    fn apply_invalidation_policy(&self, settings: &Settings, is_access_page: bool, log: &StepLog<'_>) {
        match settings.do_not_invalidate_auth_code {
            Some(true) => self.validator.set_invalidate_after_access(false),
            None if is_access_page => {
                log.deprecation(format_args!(
                    "auth code action \"accessPage\" (formerly \"accessForm\") will stop implying \
                     \"doNotInvalidateAuthCode\" in a future version; set it explicitly"
                ));
                self.validator.set_invalidate_after_access(false);
            }
            _ => self.validator.set_invalidate_after_access(true),
        }
    }

    fn grant_access(
        &self,
        params: &mut ParameterSet,
        token: &Token,
        record: &AuthCodeRecord,
        settings: &Settings,
        log: &StepLog<'_>,
    ) -> Result<(), Error> {
        // Lets the form resubmit the code as a hidden field.
        params.insert(AUTH_CODE_KEY, Value::String(token.expose().to_string()));
        params.insert(AUTH_CODE_RECORD_KEY, serde_json::to_value(record)?);

        match record.code_type() {
            AuthCodeType::Record => {
                let data = self.records.resolve(record)?;
                params.insert(AUTH_CODE_RECORD_KEY, data.clone().into_value());
                if settings.merge_record_data {
                    log.debug(format_args!("merging {} record fields", data.len()));
                    params.merge(data);
                }
            }
            AuthCodeType::Independent => {
                if let Some(key) = &settings.merge_independent_identifier_to {
                    let identifier = record.identifier().map_or(Value::Null, Value::from);
                    params.insert(key.as_str(), identifier);
                }
            }
        }

        self.session.store(record.auth_code())?;
        Ok(())
    }

    fn recover(
        &self,
        err: Error,
        looked_up: Option<&AuthCodeRecord>,
        settings: &Settings,
        log: &StepLog<'_>,
    ) -> Result<StepOutcome, Error> {
        if let Some(record) = looked_up {
            self.discard(record, log);
        }

        match &settings.error_redirect_page {
            Some(page) => {
                log.info(format_args!(
                    "auth code validation failed ({}), redirecting to {}",
                    err.message_key(),
                    page
                ));
                Ok(StepOutcome::Redirect(Redirect::to(page.as_str(), settings)))
            }
            None => Err(err),
        }
    }
}

impl FormProcessingStep for AuthCodeValidationStep<'_> {
    fn name(&self) -> &'static str {
        STEP_NAME
    }

    fn process(&self, params: ParameterSet, settings: &Settings) -> Result<StepOutcome, Error> {
        AuthCodeValidationStep::process(self, params, settings)
    }
}
