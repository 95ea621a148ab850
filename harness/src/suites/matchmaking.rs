//! MatchmakingService checks: queue management, partner selection, and
//! exclusion of recent or blocked partners.

use chrono::{Duration, Utc};
use mockstore::{doc, FilterOp, MockStore, StoreResult, Value};

use crate::fixtures;
use crate::recorder::CheckRecorder;

pub fn run(store: &MockStore, rec: &mut CheckRecorder) {
    log::info!("=== MatchmakingService checks ===");

    rec.guard("Matchmaking Queue", |rec| matchmaking_queue(store, rec));
    rec.guard("Partner Finding", |rec| partner_finding(store, rec));
    rec.guard("Recent Partner Avoidance", |rec| {
        recent_partner_avoidance(store, rec)
    });
    rec.guard("Blocked User Exclusion", |rec| {
        blocked_user_exclusion(store, rec)
    });
}

/// Joining the queue writes a waiting entry keyed by user id.
fn matchmaking_queue(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    store.collection("matchmaking").doc(fixtures::FREE_USER_ID).set(doc! {
        userId: (fixtures::FREE_USER_ID),
        status: "waiting",
        joinedAt: (Utc::now()),
        excludeUsers: ["blocked_user_1"]
    })?;

    let entry = store
        .collection("matchmaking")
        .doc(fixtures::FREE_USER_ID)
        .get()?;

    if !entry.exists() {
        rec.record("Matchmaking Queue", false, "User not found in queue");
        return Ok(());
    }

    let success = entry.field("status") == Value::from("waiting")
        && entry.field("userId") == Value::from(fixtures::FREE_USER_ID);
    rec.record(
        "Matchmaking Queue",
        success,
        if success {
            "User added to queue successfully"
        } else {
            "Queue addition failed"
        },
    );
    Ok(())
}

/// Scans waiting queue entries for the first user who is neither the
/// searcher nor on the exclusion list.
fn partner_finding(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    store.collection("matchmaking").doc(fixtures::PREMIUM_USER_ID).set(doc! {
        userId: (fixtures::PREMIUM_USER_ID),
        status: "waiting",
        joinedAt: (Utc::now()),
        excludeUsers: []
    })?;

    let exclude_users = ["blocked_user_1", fixtures::FREE_USER_ID];
    let waiting = store
        .collection("matchmaking")
        .where_field("status", FilterOp::EqualTo, "waiting")
        .get()?;

    let mut partner_found: Option<String> = None;
    for snapshot in &waiting {
        if let Some(user_id) = snapshot.field("userId").as_str() {
            if user_id != fixtures::FREE_USER_ID && !exclude_users.contains(&user_id) {
                partner_found = Some(user_id.to_string());
                break;
            }
        }
    }

    match partner_found {
        Some(ref partner) if partner == fixtures::PREMIUM_USER_ID => {
            rec.record(
                "Partner Finding",
                true,
                &format!("Partner found: {}", partner),
            );
        }
        _ => rec.record("Partner Finding", false, "No partner found"),
    }
    Ok(())
}

/// Chats the searcher took part in recently identify partners to avoid
/// rematching.
fn recent_partner_avoidance(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    let one_hour_ago = Utc::now() - Duration::hours(1);
    store.collection("chats").add(doc! {
        participants: [(fixtures::FREE_USER_ID), (fixtures::PREMIUM_USER_ID)],
        createdAt: (one_hour_ago),
        isActive: false
    })?;

    let recent_chats = store
        .collection("chats")
        .where_field("participants", FilterOp::ArrayContains, fixtures::FREE_USER_ID)
        .get()?;

    let mut recent_partners: Vec<String> = Vec::new();
    for snapshot in &recent_chats {
        let participants = snapshot.field("participants");
        let partner = participants.as_array().and_then(|list| {
            list.iter()
                .filter_map(|p| p.as_str())
                .find(|p| *p != fixtures::FREE_USER_ID)
                .map(str::to_string)
        });
        if let Some(partner) = partner {
            if !recent_partners.contains(&partner) {
                recent_partners.push(partner);
            }
        }
    }

    let success = recent_partners.contains(&fixtures::PREMIUM_USER_ID.to_string());
    if success {
        rec.record(
            "Recent Partner Avoidance",
            true,
            &format!("Recent partners identified: {:?}", recent_partners),
        );
    } else {
        rec.record(
            "Recent Partner Avoidance",
            false,
            "Recent partner detection failed",
        );
    }
    Ok(())
}

/// The exclusion list for a match search is the user's block list plus
/// the user themselves.
fn blocked_user_exclusion(store: &MockStore, rec: &mut CheckRecorder) -> StoreResult<()> {
    let snapshot = store.collection("users").doc(fixtures::FREE_USER_ID).get()?;
    let blocked: Vec<String> = snapshot
        .field("blockedUsers")
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let mut exclude_users = blocked;
    exclude_users.push(fixtures::FREE_USER_ID.to_string());

    // at minimum the list holds the user plus whoever the chat suite blocked
    let success = exclude_users.len() > 1;
    if success {
        rec.record(
            "Blocked User Exclusion",
            true,
            &format!("Exclusion list created: {:?}", exclude_users),
        );
    } else {
        rec.record("Blocked User Exclusion", false, "Exclusion logic failed");
    }
    Ok(())
}
