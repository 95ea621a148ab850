//! AuthService checks: account creation with default profile, data
//! retrieval, and email existence lookups.

use mockstore::{FilterOp, MockStore, StoreResult, Value};

use crate::fixtures;
use crate::recorder::CheckRecorder;

const NEW_USER_ID: &str = "new_test_user";
const NEW_USER_EMAIL: &str = "newuser@safetalk.com";

pub fn run(store: &MockStore, rec: &mut CheckRecorder) {
    log::info!("=== AuthService checks ===");

    rec.guard("User Creation", |rec| user_creation(store, rec));
    rec.guard("User Data Retrieval", |rec| user_data_retrieval(store, rec));
    rec.guard("Email Existence Check", |rec| {
        email_existence_check(store, rec)
    });
}

/// A new account gets the full default profile plus a zeroed credit
/// ledger.
fn user_creation(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    store
        .collection("users")
        .doc(NEW_USER_ID)
        .set(fixtures::new_user_profile(
            NEW_USER_ID,
            NEW_USER_EMAIL,
            "NewTestUser",
        ))?;
    store
        .collection("credits")
        .doc(NEW_USER_ID)
        .set(fixtures::fresh_credits(NEW_USER_ID))?;

    let user = store.collection("users").doc(NEW_USER_ID).get()?;
    let credits = store.collection("credits").doc(NEW_USER_ID).get()?;

    let success = user.exists()
        && credits.exists()
        && user.field("isPremium") == Value::Bool(false)
        && user.field("dailyTimeUsed") == Value::I64(0);

    rec.record(
        "User Creation",
        success,
        if success {
            "New user created with default values"
        } else {
            "User creation failed"
        },
    );
    Ok(())
}

/// Reading a seeded user yields the expected identity fields.
fn user_data_retrieval(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    let snapshot = store.collection("users").doc(fixtures::FREE_USER_ID).get()?;

    if !snapshot.exists() {
        rec.record("User Data Retrieval", false, "User not found");
        return Ok(());
    }

    let Some(data) = snapshot.data() else {
        rec.record("User Data Retrieval", false, "User not found");
        return Ok(());
    };
    let success = data.contains_field("uid")
        && data.contains_field("email")
        && data.contains_field("stats");

    if success {
        rec.record(
            "User Data Retrieval",
            true,
            &format!("User data retrieved: {}", data.get("displayName")),
        );
    } else {
        rec.record("User Data Retrieval", false, "Data retrieval failed");
    }
    Ok(())
}

/// A seeded email resolves to a non-empty result; an unknown email to an
/// empty one.
fn email_existence_check(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    let existing = store
        .collection("users")
        .where_field("email", FilterOp::EqualTo, fixtures::FREE_USER_EMAIL)
        .get()?;

    let missing = store
        .collection("users")
        .where_field("email", FilterOp::EqualTo, "nonexistent@safetalk.com")
        .get()?;

    let success = !existing.is_empty() && missing.is_empty();
    rec.record(
        "Email Existence Check",
        success,
        if success {
            "Email existence check working correctly"
        } else {
            "Email check failed"
        },
    );
    Ok(())
}
