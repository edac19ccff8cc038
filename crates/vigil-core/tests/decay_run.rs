//! End-to-end decay runs against the in-memory store fake: analysis,
//! dry-run safety, real cleanup, and partial-failure tolerance.

use chrono::{Duration, Utc};
use serde_json::json;
use vigil_core::decay::policy::{analyze, cleanup};
use vigil_core::decay::retention::DecayParams;
use vigil_store::{MemoryRecord, MemoryStore, MemoryStoreFake};

fn seeded_store() -> MemoryStoreFake {
    let store = MemoryStoreFake::new();
    let now = Utc::now();
    let rec = |id: &str, memory: &str, days_ago: Option<i64>| MemoryRecord {
        id: id.to_string(),
        user_id: "agent".to_string(),
        memory: memory.to_string(),
        created_at: days_ago.map(|d| (now - Duration::days(d)).to_rfc3339()),
        updated_at: None,
        metadata: json!({}),
    };
    store.insert_raw(rec("fresh", "written this week", Some(2)));
    store.insert_raw(rec("aging", "two months old, still above threshold", Some(60)));
    store.insert_raw(rec("stale-1", "long forgotten", Some(100)));
    store.insert_raw(rec("stale-2", "even older", Some(200)));
    store.insert_raw(rec("undated", "no timestamp at all", None));
    store
}

#[tokio::test]
async fn dry_run_reports_candidates_without_deleting() {
    let store = seeded_store();
    let records = store.list_all("agent").await.unwrap();
    let analysis = analyze(&records, &DecayParams::default(), Utc::now());

    assert_eq!(analysis.total, 5);
    assert_eq!(analysis.decay_candidates.len(), 2);
    assert_eq!(analysis.keep.len(), 2);
    assert_eq!(analysis.no_timestamp.len(), 1);

    let outcome = cleanup(&store, &analysis, true).await;
    assert_eq!(outcome.removed, 0);
    assert_eq!(outcome.failed, 0);
    assert!(outcome.dry_run);
    assert_eq!(store.len(), 5);
}

#[tokio::test]
async fn cleanup_removes_only_decay_candidates() {
    let store = seeded_store();
    let records = store.list_all("agent").await.unwrap();
    let analysis = analyze(&records, &DecayParams::default(), Utc::now());

    let outcome = cleanup(&store, &analysis, false).await;
    assert_eq!(outcome.removed, 2);
    assert_eq!(outcome.failed, 0);
    assert_eq!(store.len(), 3);
    assert!(store.contains("fresh"));
    assert!(store.contains("aging"));
    assert!(store.contains("undated"));
    assert!(!store.contains("stale-1"));
    assert!(!store.contains("stale-2"));
}

#[tokio::test]
async fn failed_delete_does_not_abort_the_batch() {
    let store = seeded_store();
    store.fail_delete_of("stale-1");
    let records = store.list_all("agent").await.unwrap();
    let analysis = analyze(&records, &DecayParams::default(), Utc::now());

    let outcome = cleanup(&store, &analysis, false).await;
    assert_eq!(outcome.removed, 1);
    assert_eq!(outcome.failed, 1);
    assert!(store.contains("stale-1"));
    assert!(!store.contains("stale-2"));
}

#[tokio::test]
async fn undated_records_survive_any_threshold() {
    let store = seeded_store();
    let records = store.list_all("agent").await.unwrap();
    // Threshold just under the sentinel; everything dated decays.
    let params = DecayParams {
        half_life_days: 30.0,
        threshold: 0.999_999,
    };
    let analysis = analyze(&records, &params, Utc::now());
    cleanup(&store, &analysis, false).await;

    assert!(store.contains("undated"));
}

#[tokio::test]
async fn listing_failure_is_fatal_before_any_analysis() {
    let store = seeded_store();
    store.fail_listing();
    assert!(store.list_all("agent").await.is_err());
    assert_eq!(store.len(), 5);
}
