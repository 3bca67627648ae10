//! Integration tests for roster
//!
//! Exercises the store end to end through the public API, plus the record
//! management screen scenarios, against a temporary directory.

use chrono::Utc;
use roster::view::{render, RosterScreen};
use roster::{Condition, Error, Fields, Literal, Operator, Store, Value};
use std::time::Duration;
use tempfile::TempDir;

/// Helper to create a test store
async fn setup_test_store() -> (TempDir, Store) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let store = Store::open(tmp.path()).await.expect("Failed to open store");
    (tmp, store)
}

fn student_fields(student_id: &str, name: &str, year_level: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert("studentId".into(), Value::from(student_id));
    fields.insert("name".into(), Value::from(name));
    fields.insert("course".into(), Value::from("BS Computer Science"));
    fields.insert("yearLevel".into(), Value::from(year_level));
    fields.insert("email".into(), Value::from("juan@g.msuiit.edu.ph"));
    fields
}

// =============================================================================
// CRUD Tests
// =============================================================================

#[tokio::test]
async fn test_add_then_get_roundtrip() {
    let (_tmp, store) = setup_test_store().await;

    let before = Utc::now();
    let id = store
        .add("students", student_fields("2021-12345", "Juan Dela Cruz", "2nd Year"))
        .await
        .unwrap();
    assert!(!id.is_empty());

    let record = store.get("students", &id).await.unwrap().unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.get("name").unwrap().as_str(), Some("Juan Dela Cruz"));
    assert_eq!(record.get("yearLevel").unwrap().as_str(), Some("2nd Year"));
    assert!(record.created_at >= before);
    assert!(record.updated_at >= before);
}

#[tokio::test]
async fn test_get_missing_is_none_not_error() {
    let (_tmp, store) = setup_test_store().await;

    let result = store.get("students", "ghost").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_set_uses_caller_id() {
    let (_tmp, store) = setup_test_store().await;

    store
        .set(
            "students",
            "2021-12345",
            student_fields("2021-12345", "Juan Dela Cruz", "2nd Year"),
        )
        .await
        .unwrap();

    let record = store.get("students", "2021-12345").await.unwrap().unwrap();
    assert_eq!(record.id, "2021-12345");
}

#[tokio::test]
async fn test_set_replaces_and_restamps_creation_time() {
    let (_tmp, store) = setup_test_store().await;

    store
        .set(
            "students",
            "s-1",
            student_fields("2021-12345", "Juan Dela Cruz", "2nd Year"),
        )
        .await
        .unwrap();
    let first = store.get("students", "s-1").await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;

    // A second set fully replaces the record and stamps both timestamps again
    store
        .set("students", "s-1", student_fields("2021-12345", "Juan D. Cruz", "3rd Year"))
        .await
        .unwrap();
    let second = store.get("students", "s-1").await.unwrap().unwrap();

    assert_eq!(second.get("name").unwrap().as_str(), Some("Juan D. Cruz"));
    assert!(second.created_at > first.created_at);
    assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn test_update_merges_and_bumps_updated_at_only() {
    let (_tmp, store) = setup_test_store().await;

    let id = store
        .add("students", student_fields("2021-12345", "Juan Dela Cruz", "2nd Year"))
        .await
        .unwrap();
    let original = store.get("students", &id).await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;

    let mut patch = Fields::new();
    patch.insert("email".into(), Value::from("juan.delacruz@g.msuiit.edu.ph"));
    store.update("students", &id, patch).await.unwrap();

    let updated = store.get("students", &id).await.unwrap().unwrap();
    // The mentioned field changed
    assert_eq!(
        updated.get("email").unwrap().as_str(),
        Some("juan.delacruz@g.msuiit.edu.ph")
    );
    // Unmentioned fields kept their prior values
    assert_eq!(updated.get("name").unwrap().as_str(), Some("Juan Dela Cruz"));
    assert_eq!(updated.get("yearLevel").unwrap().as_str(), Some("2nd Year"));
    // created_at untouched, updated_at strictly later
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at > original.updated_at);
}

#[tokio::test]
async fn test_update_missing_record_fails() {
    let (_tmp, store) = setup_test_store().await;

    let mut patch = Fields::new();
    patch.insert("email".into(), Value::from("x@y.z"));
    let result = store.update("students", "ghost", patch).await;

    assert!(matches!(result, Err(Error::RecordNotFound { .. })));
}

#[tokio::test]
async fn test_delete_then_get_is_none() {
    let (_tmp, store) = setup_test_store().await;

    let id = store
        .add("students", student_fields("2021-12345", "Juan Dela Cruz", "2nd Year"))
        .await
        .unwrap();
    store.delete("students", &id).await.unwrap();

    assert!(store.get("students", &id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_missing_is_a_noop() {
    let (_tmp, store) = setup_test_store().await;

    assert!(store.delete("students", "ghost").await.is_ok());
}

#[tokio::test]
async fn test_invalid_identifiers_rejected() {
    let (_tmp, store) = setup_test_store().await;

    let result = store.list_all("../evil").await;
    assert!(matches!(result, Err(Error::InvalidIdentifier { .. })));

    let result = store
        .set("students", "../escape", Fields::new())
        .await;
    assert!(result.is_err());
}

// =============================================================================
// Query Tests
// =============================================================================

async fn seed_three(store: &Store) {
    store
        .set("students", "a", student_fields("2021-00001", "Ana Reyes", "1st Year"))
        .await
        .unwrap();
    store
        .set("students", "b", student_fields("2021-00002", "Ben Santos", "2nd Year"))
        .await
        .unwrap();
    store
        .set("students", "c", student_fields("2021-00003", "Carla Cruz", "2nd Year"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_query_no_conditions_equals_list_all() {
    let (_tmp, store) = setup_test_store().await;
    seed_three(&store).await;

    let all = store.list_all("students").await.unwrap();
    let queried = store.query("students", &[], None, None).await.unwrap();

    let mut all_ids: Vec<_> = all.iter().map(|r| r.id.clone()).collect();
    let mut queried_ids: Vec<_> = queried.iter().map(|r| r.id.clone()).collect();
    all_ids.sort();
    queried_ids.sort();
    assert_eq!(all_ids, queried_ids);
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_query_equality_condition() {
    let (_tmp, store) = setup_test_store().await;
    seed_three(&store).await;

    let conds = vec![Condition::new(
        "yearLevel",
        Operator::Eq,
        Literal::from("2nd Year"),
    )];
    let result = store.query("students", &conds, None, None).await.unwrap();
    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|r| r.get("yearLevel").unwrap().as_str() == Some("2nd Year")));
}

#[tokio::test]
async fn test_query_order_and_limit() {
    let (_tmp, store) = setup_test_store().await;
    seed_three(&store).await;

    let result = store
        .query("students", &[], Some("name"), Some(2))
        .await
        .unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].get("name").unwrap().as_str(), Some("Ana Reyes"));
    assert_eq!(result[1].get("name").unwrap().as_str(), Some("Ben Santos"));
}

#[tokio::test]
async fn test_query_by_pseudo_field_id() {
    let (_tmp, store) = setup_test_store().await;
    seed_three(&store).await;

    let conds = vec![Condition::new("id", Operator::Eq, Literal::from("b"))];
    let result = store.query("students", &conds, None, None).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, "b");
}

#[tokio::test]
async fn test_query_missing_collection_is_empty() {
    let (_tmp, store) = setup_test_store().await;

    let result = store.query("nonexistent", &[], None, None).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_query_with_parsed_filter() {
    let (_tmp, store) = setup_test_store().await;
    seed_three(&store).await;

    let conds = rosterq::parse("yearLevel == \"2nd Year\" and name like \"Ben%\"").unwrap();
    let result = store.query("students", &conds, None, None).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, "b");
}

// =============================================================================
// Subscription Tests
// =============================================================================

#[tokio::test]
async fn test_subscription_initial_then_incremental() {
    let (_tmp, store) = setup_test_store().await;

    let mut sub = store.subscribe("students", Vec::new()).await.unwrap();

    // Initial snapshot arrives immediately
    let initial = sub.next().await.unwrap().unwrap();
    assert!(initial.is_empty());

    // Each mutation pushes a fresh snapshot, in mutation order
    store
        .set("students", "a", student_fields("2021-00001", "Ana Reyes", "1st Year"))
        .await
        .unwrap();
    store
        .set("students", "b", student_fields("2021-00002", "Ben Santos", "2nd Year"))
        .await
        .unwrap();

    let first = sub.next().await.unwrap().unwrap();
    assert_eq!(first.len(), 1);
    let second = sub.next().await.unwrap().unwrap();
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn test_subscription_with_conditions_filters_snapshots() {
    let (_tmp, store) = setup_test_store().await;

    let conds = vec![Condition::new(
        "yearLevel",
        Operator::Eq,
        Literal::from("2nd Year"),
    )];
    let mut sub = store.subscribe("students", conds).await.unwrap();
    let _ = sub.next().await;

    store
        .set("students", "a", student_fields("2021-00001", "Ana Reyes", "1st Year"))
        .await
        .unwrap();
    store
        .set("students", "b", student_fields("2021-00002", "Ben Santos", "2nd Year"))
        .await
        .unwrap();

    let after_a = sub.next().await.unwrap().unwrap();
    assert!(after_a.is_empty());
    let after_b = sub.next().await.unwrap().unwrap();
    assert_eq!(after_b.len(), 1);
    assert_eq!(after_b[0].id, "b");
}

#[tokio::test]
async fn test_unsubscribe_is_idempotent_and_stops_delivery() {
    let (_tmp, store) = setup_test_store().await;

    let mut sub = store.subscribe("students", Vec::new()).await.unwrap();
    let _ = sub.next().await;

    sub.unsubscribe();
    sub.unsubscribe(); // second call: no effect, no panic

    store
        .set("students", "a", student_fields("2021-00001", "Ana Reyes", "1st Year"))
        .await
        .unwrap();

    // The channel is closed; no further snapshots arrive
    assert!(sub.next().await.is_none());
}

#[tokio::test]
async fn test_record_subscription_sees_updates_and_deletion() {
    let (_tmp, store) = setup_test_store().await;
    store
        .set("students", "a", student_fields("2021-00001", "Ana Reyes", "1st Year"))
        .await
        .unwrap();

    let mut sub = store.subscribe_record("students", "a").await.unwrap();
    let initial = sub.next().await.unwrap().unwrap();
    assert_eq!(
        initial.unwrap().get("name").unwrap().as_str(),
        Some("Ana Reyes")
    );

    let mut patch = Fields::new();
    patch.insert("yearLevel".into(), Value::from("2nd Year"));
    store.update("students", "a", patch).await.unwrap();

    let after_update = sub.next().await.unwrap().unwrap().unwrap();
    assert_eq!(after_update.get("yearLevel").unwrap().as_str(), Some("2nd Year"));

    store.delete("students", "a").await.unwrap();
    let after_delete = sub.next().await.unwrap().unwrap();
    assert!(after_delete.is_none());
}

// =============================================================================
// Record Management Scenarios
// =============================================================================

#[tokio::test]
async fn test_scenario_add_student_then_table_shows_one_row() {
    let (_tmp, store) = setup_test_store().await;
    let mut screen = RosterScreen::new(store);

    screen.open_create();
    screen.form.student_id = "2021-12345".into();
    screen.form.name = "Juan Dela Cruz".into();
    screen.form.course = "BS Computer Science".into();
    screen.form.year_level = "2nd Year".into();
    screen.form.email = "juan@g.msuiit.edu.ph".into();
    assert!(screen.submit().await);

    assert_eq!(screen.records.len(), 1);
    let table = render::render_table(&screen.records);
    assert!(table.contains("2021-12345"));
    assert!(table.contains("Juan Dela Cruz"));
    assert!(table.contains("BS Computer Science"));
    assert!(table.contains("2nd Year"));
    assert!(table.contains("juan@g.msuiit.edu.ph"));
    assert!(table.contains("Total Students: 1"));
}

#[tokio::test]
async fn test_scenario_empty_store_renders_empty_state() {
    let (_tmp, store) = setup_test_store().await;
    let mut screen = RosterScreen::new(store);
    screen.reload().await;

    let table = render::render_table(&screen.records);
    assert!(table.contains("No students found."));
    assert!(table.contains("Total Students: 0"));
    assert!(!table.contains("Student ID"));
}

#[tokio::test]
async fn test_scenario_edit_only_email_preserves_other_fields() {
    let (_tmp, store) = setup_test_store().await;
    let mut screen = RosterScreen::new(store);

    screen.open_create();
    screen.form.student_id = "2021-12345".into();
    screen.form.name = "Juan Dela Cruz".into();
    screen.form.course = "BS Computer Science".into();
    screen.form.year_level = "2nd Year".into();
    screen.form.email = "juan@g.msuiit.edu.ph".into();
    screen.submit().await;

    let id = screen.records[0].id.clone();
    assert!(screen.open_edit(&id));
    screen.form.email = "juan.delacruz@g.msuiit.edu.ph".into();
    assert!(screen.submit().await);

    let record = &screen.records[0];
    assert_eq!(
        record.get("email").unwrap().as_str(),
        Some("juan.delacruz@g.msuiit.edu.ph")
    );
    assert_eq!(record.get("name").unwrap().as_str(), Some("Juan Dela Cruz"));
    assert_eq!(
        record.get("course").unwrap().as_str(),
        Some("BS Computer Science")
    );
    assert_eq!(record.get("yearLevel").unwrap().as_str(), Some("2nd Year"));
    assert_eq!(record.get("studentId").unwrap().as_str(), Some("2021-12345"));
}

#[tokio::test]
async fn test_scenario_cancelled_delete_keeps_row() {
    let (_tmp, store) = setup_test_store().await;
    let mut screen = RosterScreen::new(store);

    screen.open_create();
    screen.form.student_id = "2021-12345".into();
    screen.form.name = "Juan Dela Cruz".into();
    screen.form.course = "BS Computer Science".into();
    screen.form.year_level = "2nd Year".into();
    screen.form.email = "juan@g.msuiit.edu.ph".into();
    screen.submit().await;
    let id = screen.records[0].id.clone();

    // Confirmation declined: no delete call is issued
    assert!(!screen.delete(&id, false).await);

    screen.reload().await;
    assert_eq!(screen.records.len(), 1);
    assert_eq!(screen.records[0].id, id);
}
