//! Domain models for LOCKBOX.
//!
//! These are the core types shared across all crates.

pub mod audit;
pub mod principal;
pub mod secret;
