//! Error types for the client crate.

use amocrm_model::{ModelError, TransportError};
use thiserror::Error;

/// Result type for client setup and entity helpers.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or malformed configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// No access token is available.
    #[error("no access token: {0}")]
    Token(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
