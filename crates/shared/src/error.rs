//! Application-wide error types.
//!
//! Every failure is scoped to one request (or one reconciliation candidate);
//! none of these variants is fatal to the process.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// No resolvable caller. The client should log in again.
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// The caller is known but the authorization guard denied the operation.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Entity absent, or present in another organization.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input with the offending field.
    #[error("Validation error on `{field}`: {reason}")]
    Validation {
        /// Name of the field that failed validation.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Business rule violation.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Conflict (e.g., duplicate slug).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure.
    #[error("Store failure: {0}")]
    Store(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a field-level validation error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation { .. } => 400,
            Self::BusinessRule(_) => 422,
            Self::Conflict(_) => 409,
            Self::Store(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::Store(_) => "STORE_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True for infrastructure failures whose detail must not reach clients.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Internal(_))
    }
}
