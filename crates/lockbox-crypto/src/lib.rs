//! LOCKBOX Crypto — the envelope manager.
//!
//! Seals and opens opaque byte strings under a single process-wide
//! AES-256-GCM key. This crate knows nothing about secret identity;
//! binding a ciphertext to a record is the store's responsibility.

pub mod envelope;
pub mod error;

pub use envelope::{EnvelopeKey, EnvelopeManager, NONCE_LEN, TAG_LEN};
pub use error::CryptoError;
