//! Audit log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ActorType {
    Anonymous,
    User,
    AdminKey,
}

impl ActorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::Anonymous => "anonymous",
            ActorType::User => "user",
            ActorType::AdminKey => "admin-key",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "anonymous" => Some(ActorType::Anonymous),
            "user" => Some(ActorType::User),
            "admin-key" => Some(ActorType::AdminKey),
            _ => None,
        }
    }
}

/// The privileged actions that leave an audit trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuditAction {
    Create,
    Reveal,
    Rotate,
    UpdateMetadata,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Reveal => "reveal",
            AuditAction::Rotate => "rotate",
            AuditAction::UpdateMetadata => "update-metadata",
            AuditAction::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(AuditAction::Create),
            "reveal" => Some(AuditAction::Reveal),
            "rotate" => Some(AuditAction::Rotate),
            "update-metadata" => Some(AuditAction::UpdateMetadata),
            "delete" => Some(AuditAction::Delete),
            _ => None,
        }
    }
}

/// One append-only audit entry. No update or delete operation exists
/// on this entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    /// The secret record this event concerns, when there is one.
    pub key_id: Option<Uuid>,
    pub action: AuditAction,
    pub actor_type: ActorType,
    pub actor_id: String,
    pub source_address: Option<String>,
    /// Structured context, opaque to the core.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEvent {
    pub key_id: Option<Uuid>,
    pub action: AuditAction,
    pub actor_type: ActorType,
    pub actor_id: String,
    pub source_address: Option<String>,
    pub metadata: serde_json::Value,
}

/// Listing view: an audit event augmented with the current name of
/// the referenced record, when it still resolves (tombstoned records
/// included).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAuditEvent {
    #[serde(flatten)]
    pub event: AuditEvent,
    pub key_name: Option<String>,
}
