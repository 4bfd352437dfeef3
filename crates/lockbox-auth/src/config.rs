//! Authorization configuration.

/// Configuration for principal resolution and token issuance.
///
/// Loaded once at startup and immutable afterwards; injected into the
/// resolver and the login service as a constructor argument.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HMAC secret for JWT signing and verification (HS256).
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Access token lifetime in seconds (default: 3600 = 1 hour).
    pub token_lifetime_secs: u64,
    /// Static admin capability value. Possession grants the
    /// `AdminKey` principal regardless of user identity.
    pub admin_api_key: String,
    /// Operator account username accepted by the login flow.
    pub admin_username: String,
    /// Operator account password accepted by the login flow.
    pub admin_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "lockbox".into(),
            token_lifetime_secs: 3600,
            admin_api_key: String::new(),
            admin_username: String::new(),
            admin_password: String::new(),
        }
    }
}
