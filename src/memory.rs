//! In-process implementations of the step's collaborators.
//!
//! These back the demo and the test suite, and are usable by hosts that keep
//! auth codes in memory (single process, no persistence):
//! - [`InMemoryAuthCodeStore`]: token to record map
//! - [`InMemoryRecordRepository`]: content rows with a `hidden` flag
//! - [`InMemoryAuthCodeValidator`]: validation backed by the two above
//! - [`InMemorySessionStore`]: a single session slot

mod repository;
mod session;
mod store;
mod validator;

pub use repository::InMemoryRecordRepository;
pub use session::InMemorySessionStore;
pub use store::InMemoryAuthCodeStore;
pub use validator::InMemoryAuthCodeValidator;

use thiserror::Error;

use crate::record::RecordReference;

/// Failures raised by the in-memory collaborators.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The referenced content record does not exist.
    #[error("no record {0}")]
    UnknownRecord(RecordReference),
    /// A record operation was requested for an independent auth code.
    #[error("auth code is not bound to a record")]
    NotRecordBound,
}
