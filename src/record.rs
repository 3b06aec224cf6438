//! Auth code records as stored by an [`AuthCodeStore`](crate::AuthCodeStore).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::token::Token;

/// The effect a valid auth code has when it is redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthCodeAction {
    /// Un-hide the referenced content record (for example a newsletter
    /// subscription awaiting confirmation).
    EnableRecord,
    /// Grant access to the page or form the code was issued for.
    ///
    /// Older configurations call this action `accessForm`.
    #[serde(alias = "accessForm")]
    AccessPage,
}

impl fmt::Display for AuthCodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthCodeAction::EnableRecord => write!(f, "enableRecord"),
            AuthCodeAction::AccessPage => write!(f, "accessPage"),
        }
    }
}

/// What an auth code is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthCodeType {
    /// The code targets a specific content record.
    Record,
    /// The code carries a free-form identifier instead of a record.
    Independent,
}

impl fmt::Display for AuthCodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthCodeType::Record => write!(f, "record"),
            AuthCodeType::Independent => write!(f, "independent"),
        }
    }
}

/// Location of the content record an auth code refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordReference {
    /// Table holding the record
    pub table: String,
    /// Primary key of the record
    pub uid: u64,
}

impl RecordReference {
    /// Creates a reference to `uid` in `table`.
    pub fn new(table: impl Into<String>, uid: u64) -> Self {
        Self {
            table: table.into(),
            uid,
        }
    }
}

impl fmt::Display for RecordReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table, self.uid)
    }
}

/// A stored auth code and the action it grants.
///
/// Construct with [`AuthCodeRecord::for_record`] or
/// [`AuthCodeRecord::independent`] so that the `type` always matches the
/// populated target field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCodeRecord {
    auth_code: Token,
    action: AuthCodeAction,
    #[serde(rename = "type")]
    code_type: AuthCodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference: Option<RecordReference>,
}

impl AuthCodeRecord {
    /// Creates a record-bound auth code.
    pub fn for_record(auth_code: Token, action: AuthCodeAction, reference: RecordReference) -> Self {
        Self {
            auth_code,
            action,
            code_type: AuthCodeType::Record,
            identifier: None,
            reference: Some(reference),
        }
    }

    /// Creates an independent auth code carrying `identifier`.
    pub fn independent(
        auth_code: Token,
        action: AuthCodeAction,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            auth_code,
            action,
            code_type: AuthCodeType::Independent,
            identifier: Some(identifier.into()),
            reference: None,
        }
    }

    /// The code itself.
    pub fn auth_code(&self) -> &Token {
        &self.auth_code
    }

    /// The configured action.
    pub fn action(&self) -> AuthCodeAction {
        self.action
    }

    /// Whether the code is bound to a record or independent.
    pub fn code_type(&self) -> AuthCodeType {
        self.code_type
    }

    /// Identifier of an independent code.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Referenced record of a record-bound code.
    pub fn reference(&self) -> Option<&RecordReference> {
        self.reference.as_ref()
    }

    /// Returns `true` if redeeming this code grants page access.
    pub fn is_access_page(&self) -> bool {
        self.action == AuthCodeAction::AccessPage
    }
}
