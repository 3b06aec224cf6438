//! End-to-end behaviour of the auth code step against the in-memory collaborators.

use authcode_step::memory::{
    InMemoryAuthCodeStore, InMemoryAuthCodeValidator, InMemoryRecordRepository,
    InMemorySessionStore,
};
use authcode_step::{
    AuthCodeAction, AuthCodeRecord, AuthCodeValidationStep, Error, ParameterSet, RecordReference,
    Settings, StepOutcome, Token,
};
use serde_json::json;

struct Backend {
    store: InMemoryAuthCodeStore,
    records: InMemoryRecordRepository,
    session: InMemorySessionStore,
}

impl Backend {
    fn new() -> Self {
        Self {
            store: InMemoryAuthCodeStore::new(),
            records: InMemoryRecordRepository::new(),
            session: InMemorySessionStore::new(),
        }
    }

    /// Stores a subscriber row and an access code pointing at it.
    fn with_subscriber(self, code: &str) -> Self {
        let reference = RecordReference::new("tt_address", 42);
        let fields = [
            ("email", json!("jane@example.com")),
            ("first_name", json!("Jane")),
        ]
        .into_iter()
        .collect();
        self.records.insert(reference.clone(), fields, false);
        self.store.insert(AuthCodeRecord::for_record(
            Token::new(code),
            AuthCodeAction::AccessPage,
            reference,
        ));
        self
    }
}

fn form(code: &str) -> ParameterSet {
    [("email", json!("typed@example.com")), ("authCode", json!(code))]
        .into_iter()
        .collect()
}

fn settings(options: serde_json::Value) -> Settings {
    Settings::from_value(options).expect("valid settings")
}

#[test]
fn empty_code_fails_when_not_optional() {
    let backend = Backend::new();
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let err = step.process(form(""), &settings(json!({}))).unwrap_err();

    assert!(matches!(err, Error::InsufficientParameters));
    assert_eq!(err.to_string(), "validateauthcode_insufficient_params");
}

#[test]
fn empty_code_is_a_no_op_when_optional() {
    let backend = Backend::new();
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let outcome = step
        .process(form(""), &settings(json!({ "authCodeIsOptional": 1 })))
        .unwrap();

    assert_eq!(outcome, StepOutcome::Continue(form("")));
}

#[test]
fn unknown_code_is_record_not_found_without_session_write() {
    let backend = Backend::new().with_subscriber("real-code");
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let err = step.process(form("guessed-code"), &settings(json!({}))).unwrap_err();

    assert!(matches!(err, Error::RecordNotFound));
    assert_eq!(backend.session.write_count(), 0);
    assert_eq!(validator.invalidation_requests(), 0);
    assert!(backend.store.contains(&Token::new("real-code")));
}

#[test]
fn record_access_code_exposes_and_merges_record_data() {
    let backend = Backend::new().with_subscriber("edit-42");
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let params = step
        .process(form("edit-42"), &settings(json!({ "mergeRecordDataToGP": "1" })))
        .unwrap()
        .into_parameters()
        .expect("no redirect configured");

    assert_eq!(params.get("authCode"), Some(&json!("edit-42")));
    assert_eq!(
        params.get("authCodeRecord"),
        Some(&json!({
            "uid": 42,
            "email": "jane@example.com",
            "first_name": "Jane",
            "hidden": 0,
        }))
    );
    // Stored data wins over what the user typed.
    assert_eq!(params.get("email"), Some(&json!("jane@example.com")));
    assert_eq!(params.get("first_name"), Some(&json!("Jane")));
    assert_eq!(params.get("uid"), Some(&json!(42)));
    assert_eq!(backend.session.stored(), Some(Token::new("edit-42")));
}

#[test]
fn record_data_is_not_merged_unless_configured() {
    let backend = Backend::new().with_subscriber("edit-42");
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let params = step
        .process(form("edit-42"), &settings(json!({})))
        .unwrap()
        .into_parameters()
        .unwrap();

    assert_eq!(params.get("email"), Some(&json!("typed@example.com")));
    assert!(!params.contains_key("first_name"));
    assert!(params.contains_key("authCodeRecord"));
}

#[test]
fn independent_code_maps_identifier_to_configured_key() {
    let backend = Backend::new();
    backend.store.insert(AuthCodeRecord::independent(
        Token::new("promo"),
        AuthCodeAction::AccessPage,
        "summer-sale",
    ));
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let params = step
        .process(
            form("promo"),
            &settings(json!({ "mergeIndependentIdentifierToGP": "slug" })),
        )
        .unwrap()
        .into_parameters()
        .unwrap();

    assert_eq!(params.get("slug"), Some(&json!("summer-sale")));
    assert_eq!(
        params.get("authCodeRecord"),
        Some(&json!({
            "authCode": "promo",
            "action": "accessPage",
            "type": "independent",
            "identifier": "summer-sale",
        }))
    );
}

#[test]
fn rejected_code_is_record_not_found_and_cleaned_up_once() {
    let backend = Backend::new().with_subscriber("expired");
    // The validator's own view no longer holds the code, as after expiry.
    let validator_view = InMemoryAuthCodeStore::new();
    let validator = InMemoryAuthCodeValidator::new(&validator_view, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let err = step.process(form("expired"), &settings(json!({}))).unwrap_err();

    assert!(matches!(err, Error::RecordNotFound));
    assert_eq!(validator.invalidation_requests(), 1);
    assert_eq!(backend.session.write_count(), 0);
}

#[test]
fn rejected_code_with_error_page_is_cleaned_up_before_redirecting() {
    let backend = Backend::new().with_subscriber("expired");
    let validator_view = InMemoryAuthCodeStore::new();
    let validator = InMemoryAuthCodeValidator::new(&validator_view, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let outcome = step
        .process(
            form("expired"),
            &settings(json!({
                "errorRedirectPage": 13,
                "additionalParams": { "tx_subscription": { "error": "expired" } },
            })),
        )
        .expect("error redirect configured");

    let redirect = outcome.redirect().expect("redirect issued");
    assert_eq!(redirect.page, "13");
    assert_eq!(
        redirect.additional_params.get("tx_subscription"),
        Some(&json!({ "error": "expired" }))
    );
    assert_eq!(validator.invalidation_requests(), 1);
    assert_eq!(backend.session.write_count(), 0);
}

#[test]
fn failed_action_with_error_page_removes_the_code() {
    let backend = Backend::new();
    backend.store.insert(AuthCodeRecord::for_record(
        Token::new("orphan"),
        AuthCodeAction::EnableRecord,
        RecordReference::new("tt_address", 404),
    ));
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);
    let options = settings(json!({ "errorRedirectPage": "https://example.com/broken-link" }));

    let outcome = step.process(form("orphan"), &options).unwrap();

    assert_eq!(
        outcome.redirect().map(|r| r.page.as_str()),
        Some("https://example.com/broken-link")
    );
    assert_eq!(validator.invalidation_requests(), 1);
    assert!(!backend.store.contains(&Token::new("orphan")));
}

#[test]
fn failed_action_invalidates_the_code() {
    let backend = Backend::new();
    // The code exists but points at a missing row, so the action fails...
    backend.store.insert(AuthCodeRecord::for_record(
        Token::new("orphan"),
        AuthCodeAction::EnableRecord,
        RecordReference::new("tt_address", 404),
    ));
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let err = step.process(form("orphan"), &settings(json!({}))).unwrap_err();
    assert!(matches!(err, Error::Collaborator(_)));
    assert_eq!(validator.invalidation_requests(), 1);

    // ...and the cleanup removed it, so a retry looks like an unknown code.
    let err = step.process(form("orphan"), &settings(json!({}))).unwrap_err();
    assert!(matches!(err, Error::RecordNotFound));
    assert_eq!(validator.invalidation_requests(), 1);
}

#[test]
fn used_code_fails_like_an_unknown_one() {
    let backend = Backend::new();
    let reference = RecordReference::new("tt_address", 1);
    backend.records.insert(reference.clone(), ParameterSet::new(), true);
    backend.store.insert(AuthCodeRecord::for_record(
        Token::new("confirm"),
        AuthCodeAction::EnableRecord,
        reference,
    ));
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    step.process(form("confirm"), &settings(json!({}))).unwrap();
    let second = step.process(form("confirm"), &settings(json!({}))).unwrap_err();
    let unknown = step.process(form("never-issued"), &settings(json!({}))).unwrap_err();

    assert_eq!(second.to_string(), unknown.to_string());
}

#[test]
fn error_redirect_swallows_the_error() {
    let backend = Backend::new();
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let outcome = step
        .process(
            form("nope"),
            &settings(json!({
                "errorRedirectPage": "https://example.com/invalid-link",
                "additionalParams": { "reason": "expired" },
            })),
        )
        .expect("error redirect configured");

    let redirect = outcome.redirect().expect("redirect issued");
    assert_eq!(redirect.page, "https://example.com/invalid-link");
    assert_eq!(redirect.additional_params.get("reason"), Some(&json!("expired")));
}

#[test]
fn success_redirect_is_not_used_for_errors() {
    let backend = Backend::new();
    let validator = InMemoryAuthCodeValidator::new(&backend.store, &backend.records);
    let step = AuthCodeValidationStep::new(&backend.store, &validator, &backend.records, &backend.session);

    let err = step
        .process(form("nope"), &settings(json!({ "redirectPage": 7 })))
        .unwrap_err();

    assert!(matches!(err, Error::RecordNotFound));
}
