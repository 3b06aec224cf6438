use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{json, Value};

use super::MemoryError;
use crate::collaborator::RecordRepository;
use crate::error::CollaboratorError;
use crate::params::ParameterSet;
use crate::record::{AuthCodeRecord, RecordReference};

const COLLABORATOR: &str = "record_repository";

#[derive(Debug, Clone)]
struct Row {
    hidden: bool,
    fields: ParameterSet,
}

/// In-memory content records addressed by table and uid.
///
/// Resolved rows contain `uid`, the stored fields and `hidden` (`0` or `1`),
/// the same shape a database row would have.
#[derive(Debug, Default)]
pub struct InMemoryRecordRepository {
    rows: RefCell<HashMap<RecordReference, Row>>,
}

impl InMemoryRecordRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a row, replacing any existing row at `reference`.
    pub fn insert(&self, reference: RecordReference, fields: ParameterSet, hidden: bool) {
        self.rows
            .borrow_mut()
            .insert(reference, Row { hidden, fields });
    }

    /// Clears the `hidden` flag of the referenced row.
    pub fn enable(&self, reference: &RecordReference) -> Result<(), MemoryError> {
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .get_mut(reference)
            .ok_or_else(|| MemoryError::UnknownRecord(reference.clone()))?;
        row.hidden = false;
        Ok(())
    }

    /// Returns the `hidden` flag of the referenced row, if it exists.
    pub fn is_hidden(&self, reference: &RecordReference) -> Option<bool> {
        self.rows.borrow().get(reference).map(|row| row.hidden)
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn resolve(&self, record: &AuthCodeRecord) -> Result<ParameterSet, CollaboratorError> {
        let reference = record
            .reference()
            .ok_or_else(|| CollaboratorError::new(COLLABORATOR, MemoryError::NotRecordBound))?;

        let rows = self.rows.borrow();
        let row = rows.get(reference).ok_or_else(|| {
            CollaboratorError::new(COLLABORATOR, MemoryError::UnknownRecord(reference.clone()))
        })?;

        let mut resolved = ParameterSet::new();
        resolved.insert("uid", Value::from(reference.uid));
        resolved.merge(row.fields.clone());
        resolved.insert("hidden", json!(u8::from(row.hidden)));
        Ok(resolved)
    }
}
