//! Authorization error types.

use lockbox_core::error::VaultError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no credentials presented")]
    MissingCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("permission denied for {action}")]
    Forbidden { action: &'static str },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for VaultError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::MissingCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => VaultError::Unauthorized {
                reason: err.to_string(),
            },
            AuthError::Forbidden { .. } => VaultError::Forbidden {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => VaultError::Crypto(msg),
        }
    }
}
