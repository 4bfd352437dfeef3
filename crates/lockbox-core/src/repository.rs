//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations rely on the
//! backing store's single-statement atomicity: the conditional writes
//! (`replace_envelope`, `tombstone`) must be expressed as one
//! guarded update whose affected-row count is the only signal
//! distinguishing "applied" from "already gone".

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::VaultResult;
use crate::models::{
    audit::{AuditEvent, CreateAuditEvent},
    secret::{CreateSecret, Envelope, SecretMetadata, SecretRecord, UpdateSecretMetadata},
};

pub trait SecretRepository: Send + Sync {
    fn create(&self, input: CreateSecret) -> impl Future<Output = VaultResult<SecretRecord>> + Send;

    /// Fetch a record by id, excluding tombstoned rows.
    fn get_active(&self, id: Uuid) -> impl Future<Output = VaultResult<SecretRecord>> + Send;

    /// All non-tombstoned records, most recently created first.
    /// The projection never includes envelope material.
    fn list_active(&self) -> impl Future<Output = VaultResult<Vec<SecretMetadata>>> + Send;

    /// Non-tombstoned records owned by the given principal,
    /// most recently created first.
    fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = VaultResult<Vec<SecretMetadata>>> + Send;

    /// Write the provided metadata subset. Fails NotFound when the
    /// record is absent or tombstoned.
    fn update_metadata(
        &self,
        id: Uuid,
        input: UpdateSecretMetadata,
    ) -> impl Future<Output = VaultResult<SecretRecord>> + Send;

    /// Atomically overwrite ciphertext/nonce/tag and bump
    /// `updated_at`. Fails NotFound when the record is absent or
    /// tombstoned.
    fn replace_envelope(
        &self,
        id: Uuid,
        envelope: Envelope,
    ) -> impl Future<Output = VaultResult<()>> + Send;

    /// Conditionally set `deleted_at` on a not-yet-tombstoned record.
    /// Fails NotFound when the record is absent or already tombstoned,
    /// so a second delete is observable as an error.
    fn tombstone(&self, id: Uuid) -> impl Future<Output = VaultResult<()>> + Send;

    /// Resolve record ids to their current names, tombstoned records
    /// included. Unknown ids are simply absent from the result.
    fn resolve_names(
        &self,
        ids: Vec<Uuid>,
    ) -> impl Future<Output = VaultResult<HashMap<Uuid, String>>> + Send;
}

pub trait AuditEventRepository: Send + Sync {
    /// Append a new audit event. No update or delete operations exist.
    fn append(
        &self,
        input: CreateAuditEvent,
    ) -> impl Future<Output = VaultResult<AuditEvent>> + Send;

    /// The most recent events, newest first, ties broken by record id.
    fn list_recent(&self, limit: u64) -> impl Future<Output = VaultResult<Vec<AuditEvent>>> + Send;
}
