use crate::error::{classify, Constraint, StorageError};
use crate::store::AdminStore;
use crate::RuleStore;
use chrono::{Duration, Utc};
use sea_orm::DbErr;
use tempfile::TempDir;
use vigilo_common::types::{NewRule, RuleLevel};

async fn setup() -> (TempDir, AdminStore) {
    let dir = TempDir::new().unwrap();
    let store = AdminStore::open(dir.path()).await.unwrap();
    (dir, store)
}

fn new_rule(project_id: i64, pattern: &str) -> NewRule {
    NewRule {
        project_id,
        pattern: pattern.to_string(),
        trend_up: true,
        trend_down: false,
        threshold_max: 0.0,
        threshold_min: 0.0,
        comment: format!("rule for {pattern}"),
        level: RuleLevel::Low,
        disabled: false,
        disabled_for: 0,
        disabled_at: Utc::now(),
        track_idle: false,
        never_fill_zero: false,
    }
}

#[tokio::test]
async fn create_and_find_rule() {
    let (_dir, store) = setup().await;
    let project = store.create_project("api").await.unwrap();

    let created = store
        .create_rule(&new_rule(project.id, "svc.*.latency"))
        .await
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.project_id, project.id);

    let found = store.find_rule(created.id).await.unwrap();
    assert_eq!(found, created);
}

#[tokio::test]
async fn duplicate_pattern_is_unique_violation() {
    let (_dir, store) = setup().await;
    let project = store.create_project("api").await.unwrap();
    store
        .create_rule(&new_rule(project.id, "svc.*.latency"))
        .await
        .unwrap();

    let err = store
        .create_rule(&new_rule(project.id, "svc.*.latency"))
        .await
        .unwrap_err();
    assert_eq!(err.constraint(), Some(Constraint::Unique));
    assert_eq!(store.list_rules().await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_project_name_is_unique_violation() {
    let (_dir, store) = setup().await;
    store.create_project("api").await.unwrap();
    let err = store.create_project("api").await.unwrap_err();
    assert_eq!(err.constraint(), Some(Constraint::Unique));
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let (_dir, store) = setup().await;
    assert!(store.find_rule(42).await.unwrap_err().is_not_found());
    assert!(store.find_project(42).await.unwrap_err().is_not_found());
    assert!(store.delete_rule(42).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn update_writes_every_field() {
    let (_dir, store) = setup().await;
    let project = store.create_project("api").await.unwrap();
    let mut rule = store
        .create_rule(&new_rule(project.id, "svc.*.latency"))
        .await
        .unwrap();

    let later = Utc::now() + Duration::minutes(5);
    rule.comment = "edited".to_string();
    rule.level = RuleLevel::High;
    rule.threshold_max = 250.0;
    rule.disabled = true;
    rule.disabled_for = 30;
    rule.disabled_at = later;

    let updated = store.update_rule(&rule).await.unwrap();
    assert_eq!(updated.comment, "edited");
    assert_eq!(updated.level, RuleLevel::High);
    assert_eq!(updated.threshold_max, 250.0);
    assert!(updated.disabled);
    assert_eq!(updated.disabled_for, 30);
    assert_eq!(updated.disabled_at.timestamp(), later.timestamp());
    assert_eq!(store.find_rule(rule.id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_of_deleted_rule_is_not_found() {
    let (_dir, store) = setup().await;
    let project = store.create_project("api").await.unwrap();
    let rule = store
        .create_rule(&new_rule(project.id, "svc.*.latency"))
        .await
        .unwrap();
    store.delete_rule(rule.id).await.unwrap();

    let err = store.update_rule(&rule).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_to_taken_pattern_fails() {
    let (_dir, store) = setup().await;
    let project = store.create_project("api").await.unwrap();
    store
        .create_rule(&new_rule(project.id, "svc.*.latency"))
        .await
        .unwrap();
    let mut other = store
        .create_rule(&new_rule(project.id, "svc.*.errors"))
        .await
        .unwrap();

    other.pattern = "svc.*.latency".to_string();
    let err = store.update_rule(&other).await.unwrap_err();
    assert!(matches!(err, StorageError::UpdateFailed(_)));
}

#[tokio::test]
async fn list_rules_by_project() {
    let (_dir, store) = setup().await;
    let api = store.create_project("api").await.unwrap();
    let db = store.create_project("db").await.unwrap();
    store.create_rule(&new_rule(api.id, "svc.api.a")).await.unwrap();
    store.create_rule(&new_rule(db.id, "svc.db.a")).await.unwrap();
    store.create_rule(&new_rule(api.id, "svc.api.b")).await.unwrap();

    let rules = store.list_project_rules(api.id).await.unwrap();
    let patterns: Vec<_> = rules.iter().map(|r| r.pattern.as_str()).collect();
    assert_eq!(patterns, vec!["svc.api.a", "svc.api.b"]);
    assert_eq!(store.list_rules().await.unwrap().len(), 3);
}

#[test]
fn classify_sqlite_constraint_codes() {
    let not_null = DbErr::Custom("(code: 1299) NOT NULL constraint failed: rules.comment".into());
    let primary = DbErr::Custom("(code: 1555) UNIQUE constraint failed: rules.id".into());
    let unique = DbErr::Custom("(code: 2067) UNIQUE constraint failed: rules.pattern".into());
    assert_eq!(classify(&not_null), Some(Constraint::NotNull));
    assert_eq!(classify(&primary), Some(Constraint::PrimaryKey));
    assert_eq!(classify(&unique), Some(Constraint::Unique));
    assert_eq!(classify(&DbErr::RecordNotFound("rule".into())), None);
}

#[test]
fn from_insert_keeps_unclassified_errors() {
    let err = StorageError::from_insert(DbErr::Custom("database is locked".into()));
    assert!(matches!(err, StorageError::Database(_)));
    assert_eq!(err.constraint(), None);
}
