//! SurrealDB implementation of [`SecretRepository`].
//!
//! Envelope material crosses the storage boundary as three base64
//! string columns. The conditional writes (`replace_envelope`,
//! `tombstone`) are single guarded UPDATE statements; the returned
//! row set is the only signal distinguishing "applied" from "absent
//! or already tombstoned".

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use lockbox_core::error::VaultResult;
use lockbox_core::models::secret::{
    CreateSecret, Envelope, SecretMetadata, SecretRecord, UpdateSecretMetadata,
};
use lockbox_core::repository::SecretRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct SecretRow {
    name: String,
    service: String,
    environment: String,
    description: Option<String>,
    owner_id: String,
    ciphertext: Option<String>,
    nonce: Option<String>,
    auth_tag: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

/// Metadata projection row including the record ID via `meta::id(id)`.
/// Never selects the envelope columns.
#[derive(Debug, SurrealValue)]
struct MetadataRow {
    record_id: String,
    name: String,
    service: String,
    environment: String,
    description: Option<String>,
    owner_id: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

/// Row struct for audit-log name resolution.
#[derive(Debug, SurrealValue)]
struct NameRow {
    record_id: String,
    name: String,
}

fn encode_envelope(envelope: &Envelope) -> (String, String, String) {
    (
        STANDARD.encode(&envelope.ciphertext),
        STANDARD.encode(&envelope.nonce),
        STANDARD.encode(&envelope.tag),
    )
}

/// The three columns are stored together or not at all; anything else
/// is a corrupted row.
fn decode_envelope(
    ciphertext: Option<String>,
    nonce: Option<String>,
    tag: Option<String>,
) -> Result<Option<Envelope>, DbError> {
    match (ciphertext, nonce, tag) {
        (Some(c), Some(n), Some(t)) => {
            let decode = |field: &str, value: &str| {
                STANDARD
                    .decode(value)
                    .map_err(|e| DbError::Corrupt(format!("invalid base64 in {field}: {e}")))
            };
            Ok(Some(Envelope {
                ciphertext: decode("ciphertext", &c)?,
                nonce: decode("nonce", &n)?,
                tag: decode("auth_tag", &t)?,
            }))
        }
        (None, None, None) => Ok(None),
        _ => Err(DbError::Corrupt(
            "envelope columns partially populated".into(),
        )),
    }
}

impl SecretRow {
    fn into_record(self, id: Uuid) -> Result<SecretRecord, DbError> {
        let envelope = decode_envelope(self.ciphertext, self.nonce, self.auth_tag)?;
        Ok(SecretRecord {
            id,
            name: self.name,
            service: self.service,
            environment: self.environment,
            description: self.description,
            owner_id: self.owner_id,
            envelope,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

impl MetadataRow {
    fn try_into_metadata(self) -> Result<SecretMetadata, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        Ok(SecretMetadata {
            id,
            name: self.name,
            service: self.service,
            environment: self.environment,
            description: self.description,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the secret record repository.
#[derive(Clone)]
pub struct SurrealSecretRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSecretRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SecretRepository for SurrealSecretRepository<C> {
    async fn create(&self, input: CreateSecret) -> VaultResult<SecretRecord> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let (ciphertext, nonce, tag) = encode_envelope(&input.envelope);

        let result = self
            .db
            .query(
                "CREATE type::record('secret', $id) SET \
                 name = $name, \
                 service = $service, \
                 environment = $environment, \
                 description = $description, \
                 owner_id = $owner_id, \
                 ciphertext = $ciphertext, \
                 nonce = $nonce, \
                 auth_tag = $auth_tag, \
                 updated_at = NONE, \
                 deleted_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("service", input.service))
            .bind(("environment", input.environment))
            .bind(("description", input.description))
            .bind(("owner_id", input.owner_id))
            .bind(("ciphertext", ciphertext))
            .bind(("nonce", nonce))
            .bind(("auth_tag", tag))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<SecretRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "secret".into(),
            id: id_str,
        })?;

        Ok(row.into_record(id)?)
    }

    async fn get_active(&self, id: Uuid) -> VaultResult<SecretRecord> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('secret', $id) \
                 WHERE deleted_at IS NONE",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SecretRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "secret".into(),
            id: id_str,
        })?;

        Ok(row.into_record(id)?)
    }

    async fn list_active(&self) -> VaultResult<Vec<SecretMetadata>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, name, service, \
                 environment, description, owner_id, created_at, \
                 updated_at FROM secret \
                 WHERE deleted_at IS NONE \
                 ORDER BY created_at DESC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MetadataRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_metadata())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn list_by_owner(&self, owner_id: &str) -> VaultResult<Vec<SecretMetadata>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, name, service, \
                 environment, description, owner_id, created_at, \
                 updated_at FROM secret \
                 WHERE deleted_at IS NONE AND owner_id = $owner_id \
                 ORDER BY created_at DESC",
            )
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MetadataRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_metadata())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn update_metadata(
        &self,
        id: Uuid,
        input: UpdateSecretMetadata,
    ) -> VaultResult<SecretRecord> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.service.is_some() {
            sets.push("service = $service");
        }
        if input.environment.is_some() {
            sets.push("environment = $environment");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('secret', $id) SET {} \
             WHERE deleted_at IS NONE",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(service) = input.service {
            builder = builder.bind(("service", service));
        }
        if let Some(environment) = input.environment {
            builder = builder.bind(("environment", environment));
        }
        if let Some(description) = input.description {
            // description is Option<Option<String>>:
            // Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("description", description));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<SecretRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "secret".into(),
            id: id_str,
        })?;

        Ok(row.into_record(id)?)
    }

    async fn replace_envelope(&self, id: Uuid, envelope: Envelope) -> VaultResult<()> {
        let id_str = id.to_string();
        let (ciphertext, nonce, tag) = encode_envelope(&envelope);

        let result = self
            .db
            .query(
                "UPDATE type::record('secret', $id) SET \
                 ciphertext = $ciphertext, \
                 nonce = $nonce, \
                 auth_tag = $auth_tag, \
                 updated_at = time::now() \
                 WHERE deleted_at IS NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("ciphertext", ciphertext))
            .bind(("nonce", nonce))
            .bind(("auth_tag", tag))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<SecretRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "secret".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn tombstone(&self, id: Uuid) -> VaultResult<()> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('secret', $id) SET \
                 deleted_at = time::now() \
                 WHERE deleted_at IS NONE",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<SecretRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            // Absent or already tombstoned; either way there is
            // nothing left to delete.
            return Err(DbError::NotFound {
                entity: "secret".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn resolve_names(&self, ids: Vec<Uuid>) -> VaultResult<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let id_strings: Vec<String> = ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, name FROM secret \
                 WHERE meta::id(id) IN $ids",
            )
            .bind(("ids", id_strings))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NameRow> = result.take(0).map_err(DbError::from)?;

        let mut names = HashMap::with_capacity(rows.len());
        for row in rows {
            let id = Uuid::parse_str(&row.record_id)
                .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
            names.insert(id, row.name);
        }

        Ok(names)
    }
}
