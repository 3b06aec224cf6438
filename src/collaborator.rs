//! Interfaces to the services the auth code step depends on.
//!
//! The step never constructs its collaborators. Hosts pass implementations to
//! [`AuthCodeValidationStep::new`](crate::AuthCodeValidationStep::new); the
//! [`memory`](crate::memory) module provides in-process implementations.
//!
//! All methods take `&self`. Implementations that keep mutable state use
//! interior mutability, since one request is processed at a time.

use crate::error::{CollaboratorError, ValidationError};
use crate::params::ParameterSet;
use crate::record::AuthCodeRecord;
use crate::token::Token;

/// Looks up stored auth codes.
pub trait AuthCodeStore {
    /// Returns the record for `token`, or `None` if no such code exists.
    fn lookup(&self, token: &Token) -> Result<Option<AuthCodeRecord>, CollaboratorError>;
}

/// Validates auth codes and executes their actions.
///
/// Lookup, validation and invalidation must appear atomic to callers: once a
/// code has been invalidated it must never validate again.
pub trait AuthCodeValidator {
    /// Controls whether a successfully validated code is invalidated right
    /// away. Defaults to `true`.
    fn set_invalidate_after_access(&self, invalidate: bool);

    /// Validates `record` and executes its action.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidAuthCode`] if the code is not (or no longer)
    /// valid; [`ValidationError::Collaborator`] if executing the action failed.
    fn validate_and_execute_action(
        &self,
        record: &AuthCodeRecord,
    ) -> Result<AuthCodeRecord, ValidationError>;

    /// Invalidates `record` so that it can no longer be used.
    fn invalidate_auth_code(&self, record: &AuthCodeRecord) -> Result<(), CollaboratorError>;
}

/// Resolves the content record a record-bound auth code points at.
pub trait RecordRepository {
    /// Returns the fields of the record referenced by `record`.
    fn resolve(&self, record: &AuthCodeRecord) -> Result<ParameterSet, CollaboratorError>;
}

/// Keeps a validated auth code for the rest of the user's session.
pub trait SessionStore {
    /// Persists `token` in the session.
    fn store(&self, token: &Token) -> Result<(), CollaboratorError>;

    /// Returns the token persisted earlier in this session, if any.
    fn load(&self) -> Result<Option<Token>, CollaboratorError>;

    /// Forgets the persisted token. Clearing an empty session is not an error.
    fn clear(&self) -> Result<(), CollaboratorError>;
}
