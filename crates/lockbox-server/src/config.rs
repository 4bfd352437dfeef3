//! Server configuration, read once from the environment at startup.
//!
//! Every required variable is validated before any service is
//! constructed; a missing or malformed value is a fatal startup
//! condition. The process must never serve requests with a
//! misconfigured encryption key.

use lockbox_auth::AuthConfig;
use lockbox_crypto::EnvelopeKey;
use lockbox_db::DbConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process-wide configuration, immutable after startup.
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub envelope_key: EnvelopeKey,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let envelope_key = EnvelopeKey::from_base64(&required("ENCRYPTION_KEY_BASE64")?)
            .map_err(|e| ConfigError::Invalid {
                name: "ENCRYPTION_KEY_BASE64",
                reason: e.to_string(),
            })?;

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            jwt_secret: required("JWT_SECRET")?,
            jwt_issuer: optional("JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            token_lifetime_secs: match optional("JWT_EXPIRES_IN_SECS") {
                Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "JWT_EXPIRES_IN_SECS",
                    reason: format!("not a number of seconds: {raw}"),
                })?,
                None => defaults.token_lifetime_secs,
            },
            admin_api_key: required("ADMIN_KEY")?,
            admin_username: required("ADMIN_USER")?,
            admin_password: required("ADMIN_PASS")?,
        };

        let defaults = DbConfig::default();
        let db = DbConfig {
            url: optional("DB_URL").unwrap_or(defaults.url),
            namespace: optional("DB_NAMESPACE").unwrap_or(defaults.namespace),
            database: optional("DB_DATABASE").unwrap_or(defaults.database),
            username: optional("DB_USER").unwrap_or(defaults.username),
            password: optional("DB_PASS").unwrap_or(defaults.password),
        };

        Ok(Self {
            db,
            auth,
            envelope_key,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
