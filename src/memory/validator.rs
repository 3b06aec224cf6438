use std::cell::Cell;

use super::{InMemoryAuthCodeStore, InMemoryRecordRepository, MemoryError};
use crate::collaborator::AuthCodeValidator;
use crate::error::{CollaboratorError, ValidationError};
use crate::record::{AuthCodeAction, AuthCodeRecord};

/// Validator backed by an [`InMemoryAuthCodeStore`].
///
/// A code is valid while it is present in the store. Invalidating a code
/// removes it. `enableRecord` codes un-hide their row in the
/// [`InMemoryRecordRepository`].
#[derive(Debug)]
pub struct InMemoryAuthCodeValidator<'a> {
    store: &'a InMemoryAuthCodeStore,
    records: &'a InMemoryRecordRepository,
    invalidate_after_access: Cell<bool>,
    invalidation_requests: Cell<usize>,
}

impl<'a> InMemoryAuthCodeValidator<'a> {
    /// Creates a validator over `store` and `records`.
    pub fn new(store: &'a InMemoryAuthCodeStore, records: &'a InMemoryRecordRepository) -> Self {
        Self {
            store,
            records,
            invalidate_after_access: Cell::new(true),
            invalidation_requests: Cell::new(0),
        }
    }

    /// Whether validated codes are currently invalidated after access.
    pub fn invalidates_after_access(&self) -> bool {
        self.invalidate_after_access.get()
    }

    /// Number of explicit [`AuthCodeValidator::invalidate_auth_code`] calls.
    pub fn invalidation_requests(&self) -> usize {
        self.invalidation_requests.get()
    }
}

impl AuthCodeValidator for InMemoryAuthCodeValidator<'_> {
    fn set_invalidate_after_access(&self, invalidate: bool) {
        self.invalidate_after_access.set(invalidate);
    }

    fn validate_and_execute_action(
        &self,
        record: &AuthCodeRecord,
    ) -> Result<AuthCodeRecord, ValidationError> {
        let stored = self
            .store
            .get(record.auth_code())
            .ok_or(ValidationError::InvalidAuthCode)?;

        if stored.action() == AuthCodeAction::EnableRecord {
            let reference = stored.reference().ok_or_else(|| {
                CollaboratorError::new("auth_code_validator", MemoryError::NotRecordBound)
            })?;
            self.records
                .enable(reference)
                .map_err(|err| CollaboratorError::new("auth_code_validator", err))?;
            tracing::debug!(record = %reference, "enabled record");
        }

        if self.invalidate_after_access.get() {
            self.store.remove(stored.auth_code());
        }

        Ok(stored)
    }

    fn invalidate_auth_code(&self, record: &AuthCodeRecord) -> Result<(), CollaboratorError> {
        self.invalidation_requests
            .set(self.invalidation_requests.get() + 1);
        self.store.remove(record.auth_code());
        Ok(())
    }
}
