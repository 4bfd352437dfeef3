//! Error types for the LOCKBOX system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Integrity check failed: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VaultResult<T> = Result<T, VaultError>;
