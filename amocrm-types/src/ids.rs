//! Identifier of a remote CRM record.
//!
//! Ids are assigned by the server on create and are never generated locally.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Numeric identifier of a record in a remote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wraps a raw numeric id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying number.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Reads an id from its wire form.
    ///
    /// The API sends ids as JSON numbers, but older endpoints and hand-built
    /// payloads carry them as digit-only strings; both are accepted.
    /// `null`, negative numbers and anything else yield `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self),
            Value::String(s) => s.parse().ok(),
            Value::Object(map) => map.get("id").and_then(Self::from_json),
            _ => None,
        }
    }

    /// Wire form of the id.
    #[must_use]
    pub fn to_json(self) -> Value {
        Value::from(self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidId(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| Error::InvalidId(format!("{s}: {e}")))
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<EntityId> for u64 {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for EntityId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| Error::InvalidId(value.to_string()))
    }
}
