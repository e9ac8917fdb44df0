//! Core type definitions for the amoCRM client.
//!
//! This crate defines the small value types shared by the mapping engine and
//! the HTTP client:
//! - Remote record identifiers (numeric, server-assigned)
//! - Epoch-second timestamps as they appear on the wire
//! - The strictly increasing `last_modified` stamp used on save
//!
//! Entity definitions, field descriptors and transport plumbing live in
//! `amocrm-model` and `amocrm-client`.

mod ids;
mod timestamp;

pub use ids::EntityId;
pub use timestamp::EpochSeconds;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while interpreting wire values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid entity id: {0}")]
    InvalidId(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
