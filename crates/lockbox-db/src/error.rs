//! Database-specific error types and conversions.

use lockbox_core::error::VaultError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Malformed row: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for VaultError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => VaultError::NotFound { entity, id },
            other => VaultError::Database(other.to_string()),
        }
    }
}
