//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// One taxonomy for every operation in the system; the HTTP layer maps each
/// variant to a status code exactly once. Messages must stay stable and
/// non-leaking: an invalid token never says *why* it is invalid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested resource was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Bad credentials, an invalid/expired/foreign token, or a missing session.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but with an insufficient role.
    #[error("{0}")]
    Forbidden(String),

    /// State conflict: already a member, already verified, duplicate
    /// in-flight token, email already registered.
    #[error("{0}")]
    Conflict(String),

    /// A required external collaborator failed (e.g. email dispatch).
    #[error("dependency failure: {0}")]
    Dependency(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn dependency(msg: impl Into<String>) -> Self {
        Self::Dependency(msg.into())
    }
}
