//! Error and outcome types for engine operations
//!
//! Every service method returns `ContentResult<Outcome<T>>`. Idempotent
//! no-ops are successes ([`Outcome::NotModified`]); everything the caller
//! must not treat as success is a [`ContentError`].

use quire_model::ModelError;
use quire_rbac::{AccessDenied, Permission};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::actor::Actor;

/// Failures reported by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend could not be reached or failed mid-operation
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    /// A record with the same identifier already exists
    #[error("Duplicate {entity} {id}")]
    Duplicate {
        /// Record family
        entity: &'static str,
        /// Conflicting identifier
        id: Uuid,
    },
}

/// Result type for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the engine services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// Record is absent or soft-deleted
    #[error("{entity} {id} not found")]
    NotFound {
        /// Record family ("post", "reaction", "user")
        entity: &'static str,
        /// Requested identifier
        id: Uuid,
    },

    /// Authorization check failed
    #[error("Forbidden: {}", .permission.map(|p| format!("requires {p}")).unwrap_or_else(|| "owner only".to_string()))]
    Forbidden {
        /// Permission that would have allowed the operation, `None` when only
        /// the owner may act
        permission: Option<Permission>,
    },

    /// Operation does not apply to this kind of record
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Operation would leave the platform without a keeper
    #[error("Sole keeper")]
    SoleKeeper,

    /// Input failed shape validation
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Persistence collaborator failure
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Result type for engine operations.
pub type ContentResult<T> = Result<T, ContentError>;

impl ContentError {
    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        ContentError::NotFound { entity, id }
    }

    /// Check if this error should be logged at error level.
    ///
    /// Denials and missing records are expected traffic; only storage
    /// failures indicate something wrong with the service.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ContentError::Storage(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ContentError::NotFound { .. } => 404,
            ContentError::Forbidden { .. } => 403,
            ContentError::MethodNotAllowed(_) => 405,
            ContentError::SoleKeeper => 304,
            ContentError::InvalidPayload(_) => 400,
            ContentError::Storage(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ContentError::NotFound { .. } => "NOT_FOUND",
            ContentError::Forbidden { .. } => "FORBIDDEN",
            ContentError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ContentError::SoleKeeper => "SOLE_KEEPER",
            ContentError::InvalidPayload(_) => "INVALID_PAYLOAD",
            ContentError::Storage(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<AccessDenied> for ContentError {
    fn from(denied: AccessDenied) -> Self {
        ContentError::Forbidden {
            permission: Some(denied.required),
        }
    }
}

impl From<ModelError> for ContentError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::TextNotEditable(_) => ContentError::MethodNotAllowed(err.to_string()),
            ModelError::InvalidPayload(_) | ModelError::KindMismatch { .. } => {
                ContentError::InvalidPayload(err.to_string())
            }
        }
    }
}

/// Log a denial and convert it.
pub(crate) fn denied(actor: &Actor, operation: &'static str, err: AccessDenied) -> ContentError {
    warn!(
        actor = %actor.user_id,
        role = %actor.role,
        operation,
        required = %err.required,
        "Access denied"
    );
    err.into()
}

/// Successful result of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// A new record was stored
    Created(T),
    /// An existing record was served
    Found(T),
    /// A mutation was committed
    Accepted(T),
    /// The record was already in the requested state; nothing was written
    NotModified(T),
}

impl<T> Outcome<T> {
    /// Get HTTP status code for this outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::Created(_) => 201,
            Outcome::Found(_) => 200,
            Outcome::Accepted(_) => 202,
            Outcome::NotModified(_) => 304,
        }
    }

    /// Whether the operation wrote anything.
    pub fn is_modified(&self) -> bool {
        matches!(self, Outcome::Created(_) | Outcome::Accepted(_))
    }

    /// Borrow the carried value.
    pub fn value(&self) -> &T {
        match self {
            Outcome::Created(v)
            | Outcome::Found(v)
            | Outcome::Accepted(v)
            | Outcome::NotModified(v) => v,
        }
    }

    /// Take the carried value.
    pub fn into_inner(self) -> T {
        match self {
            Outcome::Created(v)
            | Outcome::Found(v)
            | Outcome::Accepted(v)
            | Outcome::NotModified(v) => v,
        }
    }

    /// Transform the carried value, keeping the outcome.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Created(v) => Outcome::Created(f(v)),
            Outcome::Found(v) => Outcome::Found(f(v)),
            Outcome::Accepted(v) => Outcome::Accepted(f(v)),
            Outcome::NotModified(v) => Outcome::NotModified(f(v)),
        }
    }
}
