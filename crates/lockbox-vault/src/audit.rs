//! Best-effort audit log.

use lockbox_core::error::VaultResult;
use lockbox_core::models::audit::{AuditEvent, CreateAuditEvent};
use lockbox_core::repository::AuditEventRepository;
use tracing::warn;

/// Append-oriented facade over the audit event repository.
///
/// Appends are fire-and-forget: availability of the triggering
/// mutation is preferred over audit durability, so a persistence
/// failure is logged and swallowed.
pub struct AuditLog<A: AuditEventRepository> {
    repo: A,
}

impl<A: AuditEventRepository> AuditLog<A> {
    pub fn new(repo: A) -> Self {
        Self { repo }
    }

    /// Append an event, logging (never propagating) failures.
    pub async fn record(&self, input: CreateAuditEvent) {
        let action = input.action;
        if let Err(err) = self.repo.append(input).await {
            warn!(
                error = %err,
                action = action.as_str(),
                "failed to append audit event"
            );
        }
    }

    /// The most recent events, newest first.
    pub async fn list_recent(&self, limit: u64) -> VaultResult<Vec<AuditEvent>> {
        self.repo.list_recent(limit).await
    }
}
