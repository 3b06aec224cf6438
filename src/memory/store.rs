use std::cell::RefCell;
use std::collections::HashMap;

use crate::collaborator::AuthCodeStore;
use crate::error::CollaboratorError;
use crate::record::AuthCodeRecord;
use crate::token::Token;

/// In-memory auth code store.
///
/// # Example
///
/// ```
/// use authcode_step::memory::InMemoryAuthCodeStore;
/// use authcode_step::{AuthCodeAction, AuthCodeRecord, AuthCodeStore, Token};
///
/// let store = InMemoryAuthCodeStore::new();
/// store.insert(AuthCodeRecord::independent(
///     Token::new("abc"),
///     AuthCodeAction::AccessPage,
///     "campaign-7",
/// ));
///
/// let found = store.lookup(&Token::new("abc")).unwrap();
/// assert_eq!(found.unwrap().identifier(), Some("campaign-7"));
/// assert!(store.lookup(&Token::new("nope")).unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryAuthCodeStore {
    records: RefCell<HashMap<Token, AuthCodeRecord>>,
}

impl InMemoryAuthCodeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record` under its auth code, replacing any previous record.
    pub fn insert(&self, record: AuthCodeRecord) {
        self.records
            .borrow_mut()
            .insert(record.auth_code().clone(), record);
    }

    /// Returns a copy of the record stored under `token`.
    pub fn get(&self, token: &Token) -> Option<AuthCodeRecord> {
        self.records.borrow().get(token).cloned()
    }

    /// Removes the record stored under `token`.
    pub fn remove(&self, token: &Token) -> Option<AuthCodeRecord> {
        self.records.borrow_mut().remove(token)
    }

    /// Returns `true` if a record is stored under `token`.
    pub fn contains(&self, token: &Token) -> bool {
        self.records.borrow().contains_key(token)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl AuthCodeStore for InMemoryAuthCodeStore {
    fn lookup(&self, token: &Token) -> Result<Option<AuthCodeRecord>, CollaboratorError> {
        Ok(self.get(token))
    }
}
