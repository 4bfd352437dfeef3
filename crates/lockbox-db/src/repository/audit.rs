//! SurrealDB implementation of [`AuditEventRepository`].
//!
//! Append-only: the schema denies UPDATE and DELETE on the
//! `audit_event` table, and this repository exposes no mutating
//! operation beyond `append`.

use chrono::{DateTime, Utc};
use lockbox_core::error::VaultResult;
use lockbox_core::models::audit::{ActorType, AuditAction, AuditEvent, CreateAuditEvent};
use lockbox_core::repository::AuditEventRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AuditRow {
    key_id: Option<String>,
    action: String,
    actor_type: String,
    actor_id: String,
    source_address: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AuditRowWithId {
    record_id: String,
    key_id: Option<String>,
    action: String,
    actor_type: String,
    actor_id: String,
    source_address: Option<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

fn parse_key_id(key_id: Option<String>) -> Result<Option<Uuid>, DbError> {
    key_id
        .map(|raw| {
            Uuid::parse_str(&raw).map_err(|e| DbError::Corrupt(format!("invalid key UUID: {e}")))
        })
        .transpose()
}

fn parse_action(s: &str) -> Result<AuditAction, DbError> {
    AuditAction::parse(s).ok_or_else(|| DbError::Corrupt(format!("unknown audit action: {s}")))
}

fn parse_actor_type(s: &str) -> Result<ActorType, DbError> {
    ActorType::parse(s).ok_or_else(|| DbError::Corrupt(format!("unknown actor type: {s}")))
}

impl AuditRow {
    fn into_event(self, id: Uuid) -> Result<AuditEvent, DbError> {
        Ok(AuditEvent {
            id,
            key_id: parse_key_id(self.key_id)?,
            action: parse_action(&self.action)?,
            actor_type: parse_actor_type(&self.actor_type)?,
            actor_id: self.actor_id,
            source_address: self.source_address,
            metadata: self.metadata,
            created_at: self.created_at,
        })
    }
}

impl AuditRowWithId {
    fn try_into_event(self) -> Result<AuditEvent, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        Ok(AuditEvent {
            id,
            key_id: parse_key_id(self.key_id)?,
            action: parse_action(&self.action)?,
            actor_type: parse_actor_type(&self.actor_type)?,
            actor_id: self.actor_id,
            source_address: self.source_address,
            metadata: self.metadata,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the audit event repository.
#[derive(Clone)]
pub struct SurrealAuditEventRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditEventRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditEventRepository for SurrealAuditEventRepository<C> {
    async fn append(&self, input: CreateAuditEvent) -> VaultResult<AuditEvent> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('audit_event', $id) SET \
                 key_id = $key_id, \
                 action = $action, \
                 actor_type = $actor_type, \
                 actor_id = $actor_id, \
                 source_address = $source_address, \
                 metadata = $metadata",
            )
            .bind(("id", id_str.clone()))
            .bind(("key_id", input.key_id.map(|k| k.to_string())))
            .bind(("action", input.action.as_str()))
            .bind(("actor_type", input.actor_type.as_str()))
            .bind(("actor_id", input.actor_id))
            .bind(("source_address", input.source_address))
            .bind(("metadata", input.metadata))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AuditRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "audit_event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn list_recent(&self, limit: u64) -> VaultResult<Vec<AuditEvent>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM audit_event \
                 ORDER BY created_at DESC, id DESC \
                 LIMIT $limit",
            )
            .bind(("limit", limit))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuditRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_event())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
