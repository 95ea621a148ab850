//! UserService checks: daily timer reset, credit accounting, stats
//! updates, and premium account handling.

use chrono::Utc;
use mockstore::{doc, MockStore, StoreResult, Value};

use crate::fixtures;
use crate::recorder::CheckRecorder;

pub fn run(store: &MockStore, rec: &mut CheckRecorder) {
    log::info!("=== UserService checks ===");

    if let Err(err) = seed(store) {
        rec.record("UserService Setup", false, &format!("Setup failed: {}", err));
        return;
    }

    rec.guard("Daily Timer Reset", |rec| daily_timer_reset(store, rec));
    rec.guard("Credit Usage", |rec| credit_usage(store, rec));
    rec.guard("Insufficient Credits", |rec| insufficient_credits(store, rec));
    rec.guard("User Stats Update", |rec| stats_update(store, rec));
    rec.guard("Premium User Handling", |rec| premium_handling(store, rec));
}

/// Seeds the two test users and the free user's credit ledger.
fn seed(store: &MockStore) -> StoreResult<()> {
    let users = store.collection("users");
    users.doc(fixtures::FREE_USER_ID).set(fixtures::free_user())?;
    users
        .doc(fixtures::PREMIUM_USER_ID)
        .set(fixtures::premium_user())?;

    store
        .collection("credits")
        .doc(fixtures::FREE_USER_ID)
        .set(fixtures::seeded_credits(fixtures::FREE_USER_ID))?;
    Ok(())
}

/// A user whose `lastResetDate` is from a previous day gets the daily
/// timer zeroed and the stamp moved to today.
fn daily_timer_reset(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    let user_doc = store.collection("users").doc(fixtures::FREE_USER_ID);

    // put the user into yesterday's state with 15 minutes used
    user_doc.update(doc! {
        lastResetDate: (fixtures::yesterday_stamp()),
        dailyTimeUsed: (15 * 60 * 1000)
    })?;

    let snapshot = user_doc.get()?;
    let today = fixtures::today_stamp();

    if snapshot.field("lastResetDate") == Value::from(today.as_str()) {
        rec.record("Daily Timer Reset", true, "No reset needed - same day");
        return Ok(());
    }

    user_doc.update(doc! {
        dailyTimeUsed: 0,
        lastResetDate: (today.as_str()),
        updatedAt: (Utc::now())
    })?;

    let updated = user_doc.get()?;
    let reset_ok = updated.field("dailyTimeUsed") == Value::I64(0)
        && updated.field("lastResetDate") == Value::from(today.as_str());

    if reset_ok {
        rec.record("Daily Timer Reset", true, "Timer reset successfully for new day");
    } else {
        rec.record_with_details(
            "Daily Timer Reset",
            false,
            "Timer reset failed",
            serde_json::to_value(updated.data()).unwrap_or_default(),
        );
    }
    Ok(())
}

/// Spending 3 of the 8 available credits moves `usedCredits` from 2 to 5.
fn credit_usage(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    let credit_ref = store.collection("credits").doc(fixtures::FREE_USER_ID);
    let snapshot = credit_ref.get()?;

    if !snapshot.exists() {
        rec.record("Credit Usage", false, "Credits not found");
        return Ok(());
    }

    let total = snapshot.field("totalCredits").as_i64().unwrap_or(0);
    let used = snapshot.field("usedCredits").as_i64().unwrap_or(0);
    let available = total - used;
    let credits_to_use = 3;

    if available < credits_to_use {
        rec.record(
            "Credit Usage",
            true,
            &format!(
                "Insufficient credits detected correctly. Available: {}, Requested: {}",
                available, credits_to_use
            ),
        );
        return Ok(());
    }

    credit_ref.update(doc! {
        usedCredits: (used + credits_to_use),
        updatedAt: (Utc::now())
    })?;

    let updated = credit_ref.get()?;
    let new_used = updated.field("usedCredits").as_i64().unwrap_or(0);

    if new_used == used + credits_to_use {
        let remaining = updated.field("totalCredits").as_i64().unwrap_or(0) - new_used;
        rec.record(
            "Credit Usage",
            true,
            &format!("Credits used successfully. Remaining: {}", remaining),
        );
    } else {
        rec.record("Credit Usage", false, "Credit usage update failed");
    }
    Ok(())
}

/// Requesting more credits than remain is detected without mutating the
/// ledger.
fn insufficient_credits(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    let credit_ref = store.collection("credits").doc(fixtures::FREE_USER_ID);
    let before = credit_ref.get()?;

    let total = before.field("totalCredits").as_i64().unwrap_or(0);
    let used_before = before.field("usedCredits").as_i64().unwrap_or(0);
    let available = total - used_before;
    let credits_to_use = 9;

    if available >= credits_to_use {
        rec.record(
            "Insufficient Credits",
            false,
            &format!("Expected fewer than {} credits available, found {}", credits_to_use, available),
        );
        return Ok(());
    }

    // the request is rejected before any write happens
    let after = credit_ref.get()?;
    let untouched = after.field("usedCredits").as_i64().unwrap_or(0) == used_before;

    rec.record(
        "Insufficient Credits",
        untouched,
        if untouched {
            "Insufficient request rejected without mutating the ledger"
        } else {
            "Ledger was mutated by a rejected request"
        },
    );
    Ok(())
}

/// Stat counters are read, incremented client-side, and written back as a
/// whole `stats` document.
fn stats_update(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    let user_ref = store.collection("users").doc(fixtures::FREE_USER_ID);
    let snapshot = user_ref.get()?;

    let mut stats = snapshot
        .field("stats")
        .as_document()
        .cloned()
        .unwrap_or_default();

    for (key, increment) in [("totalChats", 1), ("totalMessagesSent", 5)] {
        let current = stats.get(key).as_i64().unwrap_or(0);
        stats.put(key, current + increment)?;
    }

    user_ref.update(doc! {
        stats: (stats),
        updatedAt: (Utc::now())
    })?;

    let updated = user_ref.get()?;
    let success = updated.field("stats.totalChats") == Value::I64(1)
        && updated.field("stats.totalMessagesSent") == Value::I64(5);

    if success {
        rec.record_with_details(
            "User Stats Update",
            true,
            "Stats updated",
            serde_json::to_value(updated.field("stats").as_document()).unwrap_or_default(),
        );
    } else {
        rec.record("User Stats Update", false, "Stats update failed");
    }
    Ok(())
}

/// Premium users are identified by flag and get a subscription record.
fn premium_handling(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    let snapshot = store
        .collection("users")
        .doc(fixtures::PREMIUM_USER_ID)
        .get()?;

    if snapshot.field("isPremium") != Value::Bool(true) {
        rec.record("Premium User Check", false, "Premium user not identified");
        return Ok(());
    }

    rec.record("Premium User Check", true, "Premium user identified correctly");

    let now = Utc::now();
    store.collection("subscriptions").add(doc! {
        userId: (fixtures::PREMIUM_USER_ID),
        subscriptionType: "MONTHLY",
        startDate: (now),
        endDate: (now + chrono::Duration::days(30)),
        status: "active"
    })?;
    rec.record("Premium Subscription", true, "Subscription created successfully");
    Ok(())
}
