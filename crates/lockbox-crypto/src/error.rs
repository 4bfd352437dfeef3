//! Cryptography error types.

use lockbox_core::error::VaultError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption key must decode to exactly 32 bytes (256 bits)")]
    InvalidKeyLength,

    #[error("encryption key is not valid base64: {0}")]
    KeyDecode(String),

    #[error("AES-GCM encrypt: {0}")]
    Encrypt(String),

    /// Tag verification failed: the ciphertext, nonce, or tag was
    /// corrupted or tampered with, or the key is wrong. No plaintext
    /// is ever returned in this case.
    #[error("integrity check failed: envelope rejected")]
    Integrity,
}

impl From<CryptoError> for VaultError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Integrity => VaultError::Integrity(err.to_string()),
            other => VaultError::Crypto(other.to_string()),
        }
    }
}
