//! Integration tests for the audit event repository implementation
//! using in-memory SurrealDB.

use lockbox_core::models::audit::{ActorType, AuditAction, CreateAuditEvent};
use lockbox_core::repository::AuditEventRepository;
use lockbox_db::repository::SurrealAuditEventRepository;
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lockbox_db::run_migrations(&db).await.unwrap();
    db
}

fn sample_event(action: AuditAction, key_id: Option<Uuid>) -> CreateAuditEvent {
    CreateAuditEvent {
        key_id,
        action,
        actor_type: ActorType::AdminKey,
        actor_id: "admin-key".into(),
        source_address: Some("127.0.0.1".into()),
        metadata: json!({ "reason": "integration test" }),
    }
}

#[tokio::test]
async fn append_and_read_back() {
    let db = setup().await;
    let repo = SurrealAuditEventRepository::new(db);

    let key_id = Uuid::new_v4();
    let event = repo
        .append(sample_event(AuditAction::Reveal, Some(key_id)))
        .await
        .unwrap();

    assert_eq!(event.action, AuditAction::Reveal);
    assert_eq!(event.actor_type, ActorType::AdminKey);
    assert_eq!(event.key_id, Some(key_id));
    assert_eq!(event.metadata["reason"], "integration test");

    let listed = repo.list_recent(10).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, event.id);
}

#[tokio::test]
async fn append_without_key_id() {
    let db = setup().await;
    let repo = SurrealAuditEventRepository::new(db);

    let event = repo
        .append(CreateAuditEvent {
            key_id: None,
            action: AuditAction::Create,
            actor_type: ActorType::User,
            actor_id: "alice".into(),
            source_address: None,
            metadata: json!({}),
        })
        .await
        .unwrap();

    assert!(event.key_id.is_none());
    assert!(event.source_address.is_none());
}

#[tokio::test]
async fn list_recent_is_newest_first_and_honors_limit() {
    let db = setup().await;
    let repo = SurrealAuditEventRepository::new(db);

    for action in [
        AuditAction::Create,
        AuditAction::Reveal,
        AuditAction::Rotate,
        AuditAction::UpdateMetadata,
        AuditAction::Delete,
    ] {
        repo.append(sample_event(action, Some(Uuid::new_v4())))
            .await
            .unwrap();
    }

    let all = repo.list_recent(100).await.unwrap();
    assert_eq!(all.len(), 5);
    for window in all.windows(2) {
        assert!(
            window[0].created_at >= window[1].created_at,
            "events must be newest-first"
        );
    }

    let limited = repo.list_recent(2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, all[0].id);
}

#[tokio::test]
async fn every_action_label_roundtrips() {
    let db = setup().await;
    let repo = SurrealAuditEventRepository::new(db);

    for action in [
        AuditAction::Create,
        AuditAction::Reveal,
        AuditAction::Rotate,
        AuditAction::UpdateMetadata,
        AuditAction::Delete,
    ] {
        let event = repo.append(sample_event(action, None)).await.unwrap();
        assert_eq!(event.action, action);
    }
}
