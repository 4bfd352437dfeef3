//! LOCKBOX Core — domain models, error taxonomy, and repository
//! trait definitions shared across all crates.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{VaultError, VaultResult};
