//! Error types and retry classification.
//!
//! Tideline surfaces one crate-wide error enum. Store implementations map
//! their transport failures onto it so the resilience policy can decide,
//! per variant, whether another attempt can ever succeed.

use thiserror::Error;

/// Convenience alias for results carrying a [`TidelineError`].
pub type TidelineResult<T> = Result<T, TidelineError>;

/// Common Tideline error conditions.
#[derive(Debug, Error)]
pub enum TidelineError {
    /// Construction-time misuse: blank application, zero interval, bad
    /// retry policy. Rejected before any background task starts.
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },

    /// Transient store failure (network, unavailable backend). Safe to retry.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// A store operation exceeded its time budget, all retries included.
    #[error("{operation} exceeded its {budget_ms}ms time budget")]
    Timeout {
        operation: &'static str,
        budget_ms: u64,
    },

    /// Uniqueness violation: `(application, name)` already exists. Another
    /// attempt can never succeed, so this is never retried.
    #[error("entry '{name}' already exists in application '{application}'")]
    DuplicateName { application: String, name: String },

    /// Cooperative cancellation was observed mid-operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Strict lookup miss: the key is absent or its value cannot be
    /// converted to the requested type.
    #[error("configuration key '{name}' not found or not convertible")]
    KeyNotFound { name: String },

    /// Strict conversion failure for a raw value.
    #[error("cannot convert '{value}' to {kind}")]
    NotConvertible {
        value: String,
        kind: crate::core::entry::ValueKind,
    },

    /// A store implementation broke an invariant it is supposed to uphold.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl TidelineError {
    /// Create an InvalidOptions error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    /// Create an Unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a Timeout error for the named operation.
    pub fn timeout(operation: &'static str, budget: std::time::Duration) -> Self {
        Self::Timeout {
            operation,
            budget_ms: budget.as_millis() as u64,
        }
    }

    /// Create a DuplicateName error.
    pub fn duplicate_name(application: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            application: application.into(),
            name: name.into(),
        }
    }

    /// Create a KeyNotFound error.
    pub fn key_not_found(name: impl Into<String>) -> Self {
        Self::KeyNotFound { name: name.into() }
    }

    /// Create an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if another attempt at the failed operation could succeed.
    ///
    /// Cancellation and uniqueness violations are deliberate exclusions:
    /// retrying either can never succeed and would only mask the real error.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}
