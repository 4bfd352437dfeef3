//! LOCKBOX Server — application entry point.

mod config;

use config::ServerConfig;
use lockbox_core::models::principal::Principal;
use lockbox_crypto::EnvelopeManager;
use lockbox_db::DbManager;
use lockbox_db::repository::{SurrealAuditEventRepository, SurrealSecretRepository};
use lockbox_vault::{RequestContext, VaultService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("lockbox=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting LOCKBOX server...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Invalid configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(issuer = %config.auth.jwt_issuer, "Token issuance configured");

    let db = match DbManager::connect(&config.db).await {
        Ok(db) => db,
        Err(err) => {
            tracing::error!(error = %err, "Failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(err) = lockbox_db::run_migrations(db.client()).await {
        tracing::error!(error = %err, "Failed to run migrations");
        std::process::exit(1);
    }

    let secrets = SurrealSecretRepository::new(db.client().clone());
    let audit = SurrealAuditEventRepository::new(db.client().clone());
    let vault = VaultService::new(secrets, audit, EnvelopeManager::new(config.envelope_key));

    match vault.list(&RequestContext::new(Principal::Anonymous)).await {
        Ok(records) => tracing::info!(secrets = records.len(), "Vault ready"),
        Err(err) => {
            tracing::error!(error = %err, "Vault self-check failed");
            std::process::exit(1);
        }
    }

    // TODO: mount the HTTP transport over the vault and login services
    // once the API crate lands.
    tracing::info!("LOCKBOX core initialized; press Ctrl-C to stop");
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }

    tracing::info!("LOCKBOX server stopped.");
}
