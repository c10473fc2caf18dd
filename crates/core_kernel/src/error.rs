//! Core error types used across the system

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::temporal::TemporalError;

/// The coarse error categories callers one layer up map to responses.
///
/// Every domain error exposes its kind so transport code never has to
/// match on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Referenced entity is absent
    NotFound,
    /// Malformed or out-of-range input
    Validation,
    /// Duplicate or already-used resource
    Conflict,
    /// Illegal state transition or status precondition
    InvalidState,
    /// Caller is not authenticated (boundary only)
    Unauthorized,
    /// Caller may not perform the operation (boundary only)
    Forbidden,
    /// A dependency timed out or is unreachable; retrying may succeed
    Unavailable,
    /// Anything else
    Internal,
}

impl ErrorKind {
    /// Returns the snake_case name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        }
    }

    /// Returns true if the failure is worth retrying on a later tick
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Unavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while assembling the workflow, before any request runs
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }

    /// Returns the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Temporal(_) | CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::Configuration(_) => ErrorKind::Internal,
        }
    }
}
