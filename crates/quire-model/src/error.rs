//! Error types for model-level validation

use thiserror::Error;

use crate::post::PostKind;
use crate::reaction::ReactionKind;

/// Validation failures raised by the pure model operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Payload or metadata violates a shape rule
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// An update carried a payload of a different variant than the post
    #[error("Payload kind mismatch: post is {expected}, update is {found}")]
    KindMismatch {
        /// Variant of the stored post
        expected: PostKind,
        /// Variant of the submitted payload
        found: PostKind,
    },

    /// Only comments carry editable text
    #[error("{0} reactions carry no text")]
    TextNotEditable(ReactionKind),
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
