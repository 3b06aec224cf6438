//! Auth code validation for form processing pipelines.
//!
//! A subscription form typically mails the user a link carrying a one-time
//! auth code. When the link is opened, [`AuthCodeValidationStep`] checks the
//! code and executes the action it was issued for:
//! - **enableRecord**: un-hide the referenced record (confirm a subscription)
//! - **accessPage**: grant access to a page or edit form, exposing the code and
//!   its record data to the rest of the form
//!
//! # Core Types
//!
//! - [`Token`]: A submitted auth code, redacted in all formatted output
//! - [`AuthCodeRecord`]: A stored code with its action and target
//! - [`ParameterSet`]: Ordered form parameters passed between steps
//! - [`Settings`]: Validated step options
//! - [`FormProcessingStep`] / [`FormPipeline`]: The host-side step contract
//!
//! The step delegates storage, validation and session handling to the
//! collaborator traits [`AuthCodeStore`], [`AuthCodeValidator`],
//! [`RecordRepository`] and [`SessionStore`]. The [`memory`] module contains
//! in-process implementations.
//!
//! # Examples
//!
//! ```
//! use authcode_step::memory::{
//!     InMemoryAuthCodeStore, InMemoryAuthCodeValidator, InMemoryRecordRepository,
//!     InMemorySessionStore,
//! };
//! use authcode_step::{
//!     AuthCodeAction, AuthCodeRecord, AuthCodeValidationStep, Error, FormPipeline,
//!     ParameterSet, RecordReference, Settings, Token,
//! };
//! use serde_json::json;
//!
//! let store = InMemoryAuthCodeStore::new();
//! let records = InMemoryRecordRepository::new();
//! let session = InMemorySessionStore::new();
//! let validator = InMemoryAuthCodeValidator::new(&store, &records);
//!
//! let subscriber = RecordReference::new("tt_address", 12);
//! records.insert(subscriber.clone(), ParameterSet::new(), true);
//! store.insert(AuthCodeRecord::for_record(
//!     Token::new("3f9a"),
//!     AuthCodeAction::EnableRecord,
//!     subscriber.clone(),
//! ));
//!
//! let step = AuthCodeValidationStep::new(&store, &validator, &records, &session);
//! let pipeline = FormPipeline::new().register(step, Settings::default());
//!
//! let params: ParameterSet = [("authCode", json!("3f9a"))].into_iter().collect();
//! pipeline.run(params.clone()).expect("code is valid");
//! assert_eq!(records.is_hidden(&subscriber), Some(false));
//!
//! // The code was consumed.
//! let err = pipeline.run(params).unwrap_err();
//! assert!(matches!(err.source, Error::RecordNotFound));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collaborator;
mod error;
mod logging;
pub mod memory;
mod params;
mod pipeline;
mod record;
mod settings;
mod step;
mod token;

#[cfg(test)]
mod test_utils;

pub use collaborator::{AuthCodeStore, AuthCodeValidator, RecordRepository, SessionStore};
pub use error::{BoxError, CollaboratorError, Error, PipelineError, SettingsError, ValidationError};
pub use logging::StepLog;
pub use params::{ParameterSet, AUTH_CODE_KEY, AUTH_CODE_RECORD_KEY};
pub use pipeline::{FormPipeline, FormProcessingStep, Redirect, StepOutcome};
pub use record::{AuthCodeAction, AuthCodeRecord, AuthCodeType, RecordReference};
pub use settings::Settings;
pub use step::AuthCodeValidationStep;
pub use token::Token;
