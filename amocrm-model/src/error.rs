//! Error types for the mapping layer.

use amocrm_types::EntityId;
use serde_json::Value;
use thiserror::Error;

/// Result type for entity and field operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Failures reported by a [`Transport`](crate::Transport) implementation.
///
/// The mapping layer never retries and never inspects these beyond
/// propagating them.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection-level failure (DNS, TLS, socket, client construction).
    #[error("network error: {0}")]
    Network(String),

    /// The access token was rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The token is valid but lacks rights for this call.
    #[error("permission denied")]
    PermissionDenied,

    /// The account's plan does not include this feature.
    #[error("payment required")]
    PaymentRequired,

    /// The server rejected the payload. Carries the server's error body.
    #[error("validation rejected by server: {0}")]
    Validation(Value),

    /// Any other unexpected status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be interpreted.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors raised by fields, entities and managers.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A non-blank field has no value in the wire data.
    #[error("{entity}.{field}: no data")]
    NoData { entity: &'static str, field: String },

    /// Assignment to a server-assigned or derived field.
    #[error("{entity}.{field} is read-only")]
    ReadOnlyField { entity: &'static str, field: String },

    /// The entity type declares no field with that name.
    #[error("{entity} has no field named {field}")]
    UnknownField { entity: &'static str, field: String },

    /// The account's custom-field schema has no matching entry.
    #[error("custom field {field} is not in the account schema")]
    FieldNotInSchema { field: String },

    /// A choice or sub-kind value has no enum entry in the account schema.
    #[error("custom field {field} has no enum value {value}")]
    MissingEnum { field: String, value: String },

    /// A required field is unset at save time.
    #[error("{entity}.{field} is required")]
    RequiredField { entity: &'static str, field: String },

    /// No remote record with this id.
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: EntityId },

    /// The operation needs a server-assigned id and the entity has none.
    #[error("{entity} must be saved first")]
    NotPersisted { entity: &'static str },

    /// The operation is structurally unavailable for this entity type.
    #[error("{operation} is not supported for {entity}")]
    Unsupported {
        operation: &'static str,
        entity: &'static str,
    },

    /// A value of the wrong shape for the field.
    #[error("{field}: expected {expected}, got {got}")]
    InvalidValue {
        field: String,
        expected: &'static str,
        got: String,
    },

    /// The entity was deleted and can no longer be used.
    #[error("{entity} was deleted")]
    Deleted { entity: &'static str },

    /// Failure raised by the transport collaborator.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ModelError {
    /// True when the remote record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for "this entity type cannot do that", as opposed to a failure
    /// that might succeed on another attempt.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    pub(crate) fn invalid(field: &str, expected: &'static str, got: impl std::fmt::Debug) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            expected,
            got: format!("{got:?}"),
        }
    }
}
