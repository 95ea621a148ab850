//! Scenario suites exercising the application's backend rules against a
//! [mockstore::MockStore].
//!
//! Suites run in a fixed order because later checks build on earlier
//! state (the chat suite blocks a user that the matchmaking suite then
//! expects on the block list), matching the behavior of the backend they
//! audit.

use mockstore::MockStore;

use crate::recorder::CheckRecorder;

pub mod auth;
pub mod chat;
pub mod matchmaking;
pub mod user;

/// Runs every scenario suite against the given store.
pub fn run_all(store: &MockStore, rec: &mut CheckRecorder) {
    user::run(store, rec);
    chat::run(store, rec);
    matchmaking::run(store, rec);
    auth::run(store, rec);
}
