//! Newsletter subscription flow demonstration.
//!
//! This example walks through the two auth code actions:
//! 1. A new subscriber confirms their subscription (`enableRecord`)
//! 2. The subscriber opens an "edit your subscription" link (`accessPage`)
//! 3. A stale link is redirected to an error page
//!
//! Run with: `cargo run --example subscription_flow`

use authcode_step::memory::{
    InMemoryAuthCodeStore, InMemoryAuthCodeValidator, InMemoryRecordRepository,
    InMemorySessionStore,
};
use authcode_step::{
    AuthCodeAction, AuthCodeRecord, AuthCodeValidationStep, FormPipeline, ParameterSet,
    RecordReference, StepOutcome, Token,
};
use serde_json::json;

fn link(code: &str) -> ParameterSet {
    [("authCode", json!(code))].into_iter().collect()
}

fn describe(outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Continue(params) => {
            println!("   Continue with parameters:");
            for (key, value) in params.iter() {
                println!("     {key} = {value}");
            }
        }
        StepOutcome::Redirect(redirect) => {
            println!("   Redirect to {} ({:?})", redirect.page, redirect.additional_params);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Subscription Flow Example ===\n");

    let store = InMemoryAuthCodeStore::new();
    let records = InMemoryRecordRepository::new();
    let session = InMemorySessionStore::new();
    let validator = InMemoryAuthCodeValidator::new(&store, &records);

    // A subscribe form created a hidden address row and mailed a confirmation code.
    let subscriber = RecordReference::new("tt_address", 42);
    let row = [
        ("email", json!("jane@example.com")),
        ("first_name", json!("Jane")),
    ]
    .into_iter()
    .collect();
    records.insert(subscriber.clone(), row, true);
    store.insert(AuthCodeRecord::for_record(
        Token::new("confirm-5d1e"),
        AuthCodeAction::EnableRecord,
        subscriber.clone(),
    ));

    println!("--- Step 1: Confirm subscription ---");
    let confirm = FormPipeline::new().configure(
        AuthCodeValidationStep::new(&store, &validator, &records, &session),
        json!({ "redirectPage": "/subscription/confirmed" }),
    )?;
    describe(&confirm.run(link("confirm-5d1e"))?);
    println!("   Row hidden afterwards: {:?}\n", records.is_hidden(&subscriber));

    println!("--- Step 2: Open the edit link ---");
    store.insert(AuthCodeRecord::for_record(
        Token::new("edit-77aa"),
        AuthCodeAction::AccessPage,
        subscriber,
    ));
    let edit = FormPipeline::new().configure(
        AuthCodeValidationStep::new(&store, &validator, &records, &session),
        json!({ "mergeRecordDataToGP": 1, "doNotInvalidateAuthCode": 1 }),
    )?;
    describe(&edit.run(link("edit-77aa"))?);
    println!("   Session now holds a code: {}\n", session.stored().is_some());

    println!("--- Step 3: Reuse the confirmation link ---");
    let stale = FormPipeline::new().configure(
        AuthCodeValidationStep::new(&store, &validator, &records, &session),
        json!({
            "errorRedirectPage": "/subscription/invalid-link",
            "additionalParams": { "reason": "used" },
        }),
    )?;
    describe(&stale.run(link("confirm-5d1e"))?);

    println!("\n=== Example Complete ===");
    Ok(())
}
