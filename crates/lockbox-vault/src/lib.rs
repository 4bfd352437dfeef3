//! LOCKBOX Vault — the secret record store and the audit log.
//!
//! [`VaultService`] executes every operation behind a synchronous
//! permission check, seals and opens secret values through the
//! envelope manager, and reports privileged actions to the
//! [`AuditLog`] on a best-effort basis: a failed audit append never
//! fails the mutation that triggered it.

pub mod audit;
pub mod service;

pub use audit::AuditLog;
pub use service::{
    CreateSecretInput, DEFAULT_AUDIT_LIMIT, RequestContext, RevealedSecret, VaultService,
};
