//! Secret record domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated-encryption envelope for one stored secret value.
///
/// The three fields are produced together by a single seal operation
/// and are only meaningful as a triple; the tag must verify before any
/// plaintext derived from `ciphertext` can be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub ciphertext: Vec<u8>,
    /// 96-bit nonce, unique per seal under a given key.
    pub nonce: Vec<u8>,
    /// 128-bit GCM authentication tag.
    pub tag: Vec<u8>,
}

/// A stored secret: metadata plus (optionally) its sealed value.
///
/// `envelope` is `None` only for legacy rows that predate encrypted
/// storage — a record created through the vault always carries one.
/// A non-null `deleted_at` marks the record as tombstoned; tombstoned
/// records are excluded from every listing and lookup except audit-log
/// name resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: Uuid,
    pub name: String,
    pub service: String,
    /// Deployment environment label (e.g. `dev`, `staging`, `prod`).
    pub environment: String,
    pub description: Option<String>,
    /// Subject claim of the user that created the record.
    pub owner_id: String,
    pub envelope: Option<Envelope>,
    pub created_at: DateTime<Utc>,
    /// Null until the first metadata update or rotation.
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SecretRecord {
    /// Projection without any envelope material.
    pub fn metadata(&self) -> SecretMetadata {
        SecretMetadata {
            id: self.id,
            name: self.name.clone(),
            service: self.service.clone(),
            environment: self.environment.clone(),
            description: self.description.clone(),
            owner_id: self.owner_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The client-visible view of a secret record. Never contains
/// ciphertext, nonce, or tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretMetadata {
    pub id: Uuid,
    pub name: String,
    pub service: String,
    pub environment: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecret {
    pub name: String,
    pub service: String,
    pub environment: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub envelope: Envelope,
}

/// Partial metadata update. Only the provided fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSecretMetadata {
    pub name: Option<String>,
    pub service: Option<String>,
    pub environment: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub description: Option<Option<String>>,
}

impl UpdateSecretMetadata {
    /// True when no field is provided at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.service.is_none()
            && self.environment.is_none()
            && self.description.is_none()
    }
}
