//! Principal resolution.
//!
//! Maps the credentials presented on a request onto a tagged
//! [`Principal`] in a fixed order: static admin capability first, then
//! bearer token, then anonymous. An invalid bearer token is an error
//! for the caller to surface, never a silent downgrade to Anonymous.

use lockbox_core::models::principal::Principal;
use sha2::{Digest, Sha256};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token;

/// Raw credentials extracted from a request by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Value of the `X-ADMIN-KEY` header, if present.
    pub admin_key: Option<String>,
    /// Token from the `Authorization: Bearer` header, if present.
    pub bearer_token: Option<String>,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn admin_key(value: impl Into<String>) -> Self {
        Self {
            admin_key: Some(value.into()),
            bearer_token: None,
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            admin_key: None,
            bearer_token: Some(token.into()),
        }
    }
}

/// Resolve presented credentials to a principal.
///
/// Resolution order:
/// 1. a presented admin key equal to the configured capability value
///    (constant-time comparison) yields [`Principal::AdminKey`];
/// 2. a presented bearer token is verified for signature, expiry, and
///    issuer — success yields [`Principal::User`], failure is returned
///    as an error;
/// 3. otherwise [`Principal::Anonymous`].
pub fn resolve_principal(
    credentials: &Credentials,
    config: &AuthConfig,
) -> Result<Principal, AuthError> {
    if let Some(presented) = &credentials.admin_key {
        if !config.admin_api_key.is_empty()
            && constant_time_eq(presented.as_bytes(), config.admin_api_key.as_bytes())
        {
            return Ok(Principal::AdminKey);
        }
    }

    if let Some(bearer) = &credentials.bearer_token {
        let claims = token::decode_access_token(bearer, config)?;
        return Ok(Principal::User {
            id: claims.sub,
            roles: claims.roles,
        });
    }

    Ok(Principal::Anonymous)
}

/// Constant-time equality over values of secret-dependent content.
///
/// Both sides are hashed to fixed-length digests first, so neither the
/// length nor the bytes of the configured secret influence timing.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let da = Sha256::digest(a);
    let db = Sha256::digest(b);
    da.iter()
        .zip(db.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
