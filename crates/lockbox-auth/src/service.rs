//! Authentication service — operator login.
//!
//! The vault has no user table: bearer tokens originate from a single
//! operator account configured in the environment. Login validates
//! those credentials and issues a signed access token.

use lockbox_core::error::{VaultError, VaultResult};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::resolver::constant_time_eq;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Authenticate the operator account and issue an access token.
    pub fn login(&self, input: LoginInput) -> VaultResult<LoginOutput> {
        // 1. Reject missing input before touching any secret value.
        if input.username.is_empty() || input.password.is_empty() {
            return Err(VaultError::Validation {
                message: "missing credentials".into(),
            });
        }

        // 2. Refuse to authenticate against an unconfigured account.
        if self.config.admin_username.is_empty() || self.config.admin_password.is_empty() {
            return Err(VaultError::Internal("auth not configured".into()));
        }

        // 3. Compare both values constant-time; a username mismatch
        //    must cost the same as a password mismatch.
        let username_ok = constant_time_eq(
            input.username.as_bytes(),
            self.config.admin_username.as_bytes(),
        );
        let password_ok = constant_time_eq(
            input.password.as_bytes(),
            self.config.admin_password.as_bytes(),
        );
        if !(username_ok && password_ok) {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 4. Issue the token with the operator role set.
        let token = token::issue_access_token(&input.username, vec!["admin".into()], &self.config)?;

        Ok(LoginOutput {
            token,
            expires_in: self.config.token_lifetime_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "login-test-secret".into(),
            jwt_issuer: "lockbox-test".into(),
            token_lifetime_secs: 3600,
            admin_api_key: "capability".into(),
            admin_username: "operator".into(),
            admin_password: "correct-horse-battery".into(),
        }
    }

    #[test]
    fn login_happy_path() {
        let config = test_config();
        let svc = AuthService::new(config.clone());

        let out = svc
            .login(LoginInput {
                username: "operator".into(),
                password: "correct-horse-battery".into(),
            })
            .unwrap();

        assert!(!out.token.is_empty());
        assert_eq!(out.expires_in, 3600);

        let claims = token::decode_access_token(&out.token, &config).unwrap();
        assert_eq!(claims.sub, "operator");
        assert_eq!(claims.roles, vec!["admin".to_string()]);
    }

    #[test]
    fn login_wrong_password() {
        let svc = AuthService::new(test_config());
        let err = svc
            .login(LoginInput {
                username: "operator".into(),
                password: "wrong".into(),
            })
            .unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));
    }

    #[test]
    fn login_wrong_username() {
        let svc = AuthService::new(test_config());
        let err = svc
            .login(LoginInput {
                username: "intruder".into(),
                password: "correct-horse-battery".into(),
            })
            .unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));
    }

    #[test]
    fn login_missing_input_is_validation() {
        let svc = AuthService::new(test_config());
        let err = svc
            .login(LoginInput {
                username: String::new(),
                password: "whatever".into(),
            })
            .unwrap_err();
        assert!(matches!(err, VaultError::Validation { .. }));
    }

    #[test]
    fn login_unconfigured_account_is_internal() {
        let config = AuthConfig {
            admin_username: String::new(),
            admin_password: String::new(),
            ..test_config()
        };
        let svc = AuthService::new(config);
        let err = svc
            .login(LoginInput {
                username: "operator".into(),
                password: "anything".into(),
            })
            .unwrap_err();
        assert!(matches!(err, VaultError::Internal(_)));
    }
}
