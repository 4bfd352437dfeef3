//! Secret record store — the guarded operations over stored secrets.

use std::collections::HashSet;

use lockbox_auth::authorize::{SecretAction, authorize};
use lockbox_auth::error::AuthError;
use lockbox_core::error::{VaultError, VaultResult};
use lockbox_core::models::audit::{AuditAction, CreateAuditEvent, ResolvedAuditEvent};
use lockbox_core::models::principal::Principal;
use lockbox_core::models::secret::{CreateSecret, SecretMetadata, UpdateSecretMetadata};
use lockbox_core::repository::{AuditEventRepository, SecretRepository};
use lockbox_crypto::EnvelopeManager;
use serde_json::json;
use uuid::Uuid;

use crate::audit::AuditLog;

/// How many audit events a listing returns by default.
pub const DEFAULT_AUDIT_LIMIT: u64 = 100;

/// Per-request context: the resolved principal plus the request's
/// source address for the audit trail.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub principal: Principal,
    pub source_address: Option<String>,
}

impl RequestContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            source_address: None,
        }
    }

    pub fn with_source(principal: Principal, source_address: impl Into<String>) -> Self {
        Self {
            principal,
            source_address: Some(source_address.into()),
        }
    }
}

/// Input for creating a secret record.
#[derive(Debug, Clone)]
pub struct CreateSecretInput {
    pub name: String,
    pub service: String,
    pub environment: String,
    pub description: Option<String>,
    /// The plaintext secret value. Sealed before it reaches storage.
    pub secret: String,
}

/// Result of a reveal: metadata plus the disclosed plaintext.
///
/// Returned to the caller exactly once; nothing is cached
/// server-side.
#[derive(Debug)]
pub struct RevealedSecret {
    pub metadata: SecretMetadata,
    pub secret: String,
}

/// The secret record store.
///
/// Generic over repository implementations so that the service layer
/// has no dependency on the database crate.
pub struct VaultService<S: SecretRepository, A: AuditEventRepository> {
    secrets: S,
    audit: AuditLog<A>,
    envelope: EnvelopeManager,
}

impl<S: SecretRepository, A: AuditEventRepository> VaultService<S, A> {
    pub fn new(secrets: S, audit: A, envelope: EnvelopeManager) -> Self {
        Self {
            secrets,
            audit: AuditLog::new(audit),
            envelope,
        }
    }

    /// Encrypt and store a new secret owned by the caller.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateSecretInput,
    ) -> VaultResult<SecretMetadata> {
        // 1. Validate required fields before any storage access.
        require_non_empty("name", &input.name)?;
        require_non_empty("service", &input.service)?;
        require_non_empty("environment", &input.environment)?;
        require_non_empty("secret", &input.secret)?;

        // 2. Permission gate.
        authorize(&ctx.principal, SecretAction::Create, None)?;

        // 3. Seal the plaintext; only the envelope reaches storage.
        let envelope = self.envelope.seal(input.secret.as_bytes())?;

        let record = self
            .secrets
            .create(CreateSecret {
                name: input.name.clone(),
                service: input.service.clone(),
                environment: input.environment.clone(),
                description: input.description.clone(),
                owner_id: ctx.principal.actor_id().to_string(),
                envelope,
            })
            .await?;

        // 4. Best-effort audit; never fails the creation.
        self.audit
            .record(self.event(
                ctx,
                AuditAction::Create,
                Some(record.id),
                json!({
                    "name": input.name,
                    "service": input.service,
                    "environment": input.environment,
                    "description": input.description,
                }),
            ))
            .await;

        Ok(record.metadata())
    }

    /// All non-tombstoned records, newest first. Metadata only.
    pub async fn list(&self, ctx: &RequestContext) -> VaultResult<Vec<SecretMetadata>> {
        authorize(&ctx.principal, SecretAction::ListMetadata, None)?;
        self.secrets.list_active().await
    }

    /// The caller's own records, newest first.
    ///
    /// Only meaningful for user principals: the admin capability
    /// carries no user identity and anonymous callers have none.
    pub async fn list_owned(&self, ctx: &RequestContext) -> VaultResult<Vec<SecretMetadata>> {
        match &ctx.principal {
            Principal::User { id, .. } => self.secrets.list_by_owner(id).await,
            Principal::Anonymous => Err(AuthError::MissingCredentials.into()),
            Principal::AdminKey => Err(AuthError::Forbidden {
                action: "list-owned",
            }
            .into()),
        }
    }

    /// Metadata lookup. Fails NotFound for absent or tombstoned ids.
    pub async fn get_metadata(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> VaultResult<SecretMetadata> {
        authorize(&ctx.principal, SecretAction::ReadMetadata, None)?;
        Ok(self.secrets.get_active(id).await?.metadata())
    }

    /// Decrypt and disclose a secret's plaintext.
    pub async fn reveal(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        reason: Option<String>,
    ) -> VaultResult<RevealedSecret> {
        // 1. Permission gate — disclosure requires the capability.
        authorize(&ctx.principal, SecretAction::Reveal, None)?;

        // 2. Tombstoned records are indistinguishable from absent ones.
        let record = self.secrets.get_active(id).await?;

        let Some(envelope) = &record.envelope else {
            return Err(VaultError::Internal("secret material missing".into()));
        };

        // 3. A tag failure here means storage corruption or tampering,
        //    surfaced as a server fault rather than a client error.
        let plaintext = self.envelope.open(envelope)?;
        let secret = String::from_utf8(plaintext)
            .map_err(|_| VaultError::Internal("stored secret is not valid UTF-8".into()))?;

        // 4. Audit only after successful decryption.
        self.audit
            .record(self.event(
                ctx,
                AuditAction::Reveal,
                Some(id),
                json!({ "reason": reason }),
            ))
            .await;

        Ok(RevealedSecret {
            metadata: record.metadata(),
            secret,
        })
    }

    /// Replace a secret's value, re-encrypting under a fresh nonce.
    ///
    /// The envelope always changes, even when the new plaintext equals
    /// the old one. The prior ciphertext is not retained.
    pub async fn rotate(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        new_secret: String,
        reason: Option<String>,
    ) -> VaultResult<()> {
        authorize(&ctx.principal, SecretAction::Rotate, None)?;
        require_non_empty("secret", &new_secret)?;

        let envelope = self.envelope.seal(new_secret.as_bytes())?;
        self.secrets.replace_envelope(id, envelope).await?;

        self.audit
            .record(self.event(
                ctx,
                AuditAction::Rotate,
                Some(id),
                json!({ "reason": reason }),
            ))
            .await;

        Ok(())
    }

    /// Update the provided subset of metadata fields.
    pub async fn update_metadata(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        fields: UpdateSecretMetadata,
    ) -> VaultResult<()> {
        // 1. An empty subset is a request to do nothing.
        if fields.is_empty() {
            return Err(VaultError::Validation {
                message: "nothing to update".into(),
            });
        }

        // 2. Ownership is resolved against the stored record.
        let record = self.secrets.get_active(id).await?;
        authorize(
            &ctx.principal,
            SecretAction::UpdateMetadata,
            Some(&record.owner_id),
        )?;

        let audit_meta = serde_json::to_value(&fields).unwrap_or_default();
        self.secrets.update_metadata(id, fields).await?;

        self.audit
            .record(self.event(ctx, AuditAction::UpdateMetadata, Some(id), audit_meta))
            .await;

        Ok(())
    }

    /// Tombstone a record. The second delete of the same id observes
    /// NotFound and produces no further audit event.
    pub async fn soft_delete(&self, ctx: &RequestContext, id: Uuid) -> VaultResult<()> {
        authorize(&ctx.principal, SecretAction::Delete, None)?;

        self.secrets.tombstone(id).await?;

        self.audit
            .record(self.event(ctx, AuditAction::Delete, Some(id), json!({})))
            .await;

        Ok(())
    }

    /// The most recent audit events, each augmented with the current
    /// name of the referenced record (tombstoned records included).
    pub async fn audit_log(
        &self,
        ctx: &RequestContext,
        limit: Option<u64>,
    ) -> VaultResult<Vec<ResolvedAuditEvent>> {
        authorize(&ctx.principal, SecretAction::ReadAuditLog, None)?;

        let events = self
            .audit
            .list_recent(limit.unwrap_or(DEFAULT_AUDIT_LIMIT))
            .await?;

        let ids: HashSet<Uuid> = events.iter().filter_map(|e| e.key_id).collect();
        let names = self
            .secrets
            .resolve_names(ids.into_iter().collect())
            .await?;

        Ok(events
            .into_iter()
            .map(|event| ResolvedAuditEvent {
                key_name: event.key_id.and_then(|k| names.get(&k).cloned()),
                event,
            })
            .collect())
    }

    fn event(
        &self,
        ctx: &RequestContext,
        action: AuditAction,
        key_id: Option<Uuid>,
        metadata: serde_json::Value,
    ) -> CreateAuditEvent {
        CreateAuditEvent {
            key_id,
            action,
            actor_type: ctx.principal.actor_type(),
            actor_id: ctx.principal.actor_id().to_string(),
            source_address: ctx.source_address.clone(),
            metadata,
        }
    }
}

fn require_non_empty(field: &'static str, value: &str) -> VaultResult<()> {
    if value.trim().is_empty() {
        return Err(VaultError::Validation {
            message: format!("missing required field: {field}"),
        });
    }
    Ok(())
}
