//! Domain error type shared across crates.
//!
//! The HTTP layer maps each variant onto a status code; nothing in this crate
//! knows about HTTP.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Missing or malformed input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Duplicate username or email.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No identity, or an identity that could not be verified.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A verified identity acting on something it does not own.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        CoreError::NotFound { entity, id }
    }
}
