use mockstore::{FilterOp, MockStore, Value};
use safetalk_harness::recorder::CheckRecorder;
use safetalk_harness::report::Report;
use safetalk_harness::{fixtures, suites};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_full_scenario_run_passes() {
    let store = MockStore::new();
    let mut rec = CheckRecorder::new();

    suites::run_all(&store, &mut rec);

    let failures: Vec<String> = rec
        .records()
        .iter()
        .filter(|record| !record.passed)
        .map(|record| format!("{}: {}", record.name, record.message))
        .collect();
    assert!(failures.is_empty(), "failed checks: {:?}", failures);

    let summary = rec.summary();
    assert_eq!(summary.pass_rate, 100.0);
    for (system, working) in &summary.subsystems {
        assert!(*working, "subsystem reported broken: {}", system);
    }
}

#[test]
fn test_scenario_state_after_run() {
    let store = MockStore::new();
    let mut rec = CheckRecorder::new();

    suites::run_all(&store, &mut rec);

    // daily timer reset landed on today's stamp
    let free_user = store
        .collection("users")
        .doc(fixtures::FREE_USER_ID)
        .get()
        .unwrap();
    assert_eq!(free_user.field("dailyTimeUsed"), Value::I64(0));
    assert_eq!(
        free_user.field("lastResetDate"),
        Value::from(fixtures::today_stamp().as_str())
    );

    // 3 credits spent on top of the seeded 2
    let credits = store
        .collection("credits")
        .doc(fixtures::FREE_USER_ID)
        .get()
        .unwrap();
    assert_eq!(credits.field("usedCredits"), Value::I64(5));
    assert_eq!(credits.field("totalCredits"), Value::I64(10));

    // chat suite left exactly one rated chat with one message
    let chats = store
        .collection("chats")
        .where_field("ratingSubmitted", FilterOp::EqualTo, true)
        .get()
        .unwrap();
    assert_eq!(chats.size(), 1);
    let chat = &chats.docs()[0];
    assert_eq!(chat.field("messageCount"), Value::I64(1));

    // the premium user ended up on the free user's block list
    let blocked = free_user.field("blockedUsers");
    assert!(blocked
        .as_array()
        .unwrap()
        .contains(&Value::from(fixtures::PREMIUM_USER_ID)));

    // auth suite created the new account with a fresh ledger
    let new_user = store.collection("users").doc("new_test_user").get().unwrap();
    assert!(new_user.exists());
    assert_eq!(new_user.field("isPremium"), Value::Bool(false));
    let new_credits = store
        .collection("credits")
        .doc("new_test_user")
        .get()
        .unwrap();
    assert_eq!(new_credits.field("totalCredits"), Value::I64(0));
}

#[test]
fn test_runs_are_isolated_per_store() {
    let first = MockStore::new();
    let mut rec = CheckRecorder::new();
    suites::run_all(&first, &mut rec);

    // a fresh store starts empty regardless of earlier runs
    let second = MockStore::new();
    assert!(second.collection_names().is_empty());
    let ghost = second
        .collection("users")
        .doc(fixtures::FREE_USER_ID)
        .get()
        .unwrap();
    assert!(!ghost.exists());
}

#[test]
fn test_report_from_scenario_run() {
    let store = MockStore::new();
    let mut rec = CheckRecorder::new();
    suites::run_all(&store, &mut rec);

    let report = Report::new(&rec);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.write(&path).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        written["summary"]["total"].as_u64().unwrap() as usize,
        rec.records().len()
    );
    assert_eq!(written["summary"]["subsystems"]["Chat System"], true);
    assert!(written["checks"]
        .as_array()
        .unwrap()
        .iter()
        .any(|check| check["name"] == "Partner Finding"));
}
