//! Access token source.
//!
//! OAuth flows and token refresh belong to the application. The client only
//! asks for the current bearer token before each request.

use std::fmt;

use crate::error::{ClientError, ClientResult};

pub trait TokenProvider: Send + Sync {
    /// The bearer token to send with the next request.
    fn access_token(&self) -> ClientResult<String>;
}

/// A fixed long-lived token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> ClientResult<String> {
        if self.0.is_empty() {
            return Err(ClientError::Token("empty static token".into()));
        }
        Ok(self.0.clone())
    }
}

impl<F> TokenProvider for F
where
    F: Fn() -> ClientResult<String> + Send + Sync,
{
    fn access_token(&self) -> ClientResult<String> {
        self()
    }
}
