//! SurrealDB repository implementations.

mod audit;
mod secret;

pub use audit::SurrealAuditEventRepository;
pub use secret::SurrealSecretRepository;
