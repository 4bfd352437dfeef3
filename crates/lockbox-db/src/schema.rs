//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Envelope material (ciphertext,
//! nonce, tag) is stored as base64 strings; the three columns are
//! written together or not at all.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Secret records
-- =======================================================================
DEFINE TABLE secret SCHEMAFULL;
DEFINE FIELD name ON TABLE secret TYPE string;
DEFINE FIELD service ON TABLE secret TYPE string;
DEFINE FIELD environment ON TABLE secret TYPE string;
DEFINE FIELD description ON TABLE secret TYPE option<string>;
DEFINE FIELD owner_id ON TABLE secret TYPE string;
DEFINE FIELD ciphertext ON TABLE secret TYPE option<string>;
DEFINE FIELD nonce ON TABLE secret TYPE option<string>;
DEFINE FIELD auth_tag ON TABLE secret TYPE option<string>;
DEFINE FIELD created_at ON TABLE secret TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE secret TYPE option<datetime>;
DEFINE FIELD deleted_at ON TABLE secret TYPE option<datetime>;
DEFINE INDEX idx_secret_owner ON TABLE secret COLUMNS owner_id;
DEFINE INDEX idx_secret_created ON TABLE secret COLUMNS created_at;

-- =======================================================================
-- Audit events (append-only)
-- =======================================================================
DEFINE TABLE audit_event SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD key_id ON TABLE audit_event TYPE option<string>;
DEFINE FIELD action ON TABLE audit_event TYPE string \
    ASSERT $value IN ['create', 'reveal', 'rotate', 'update-metadata', \
    'delete'];
DEFINE FIELD actor_type ON TABLE audit_event TYPE string \
    ASSERT $value IN ['anonymous', 'user', 'admin-key'];
DEFINE FIELD actor_id ON TABLE audit_event TYPE string;
DEFINE FIELD source_address ON TABLE audit_event TYPE option<string>;
DEFINE FIELD metadata ON TABLE audit_event TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE audit_event TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audit_created ON TABLE audit_event COLUMNS created_at;
DEFINE INDEX idx_audit_key ON TABLE audit_event COLUMNS key_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
