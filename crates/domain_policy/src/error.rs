//! Workflow domain errors
//!
//! This module defines all error types that can occur within the
//! quote-to-policy workflow. Every variant maps onto one
//! [`ErrorKind`] so the layer above can translate errors without
//! knowing the individual variants.

use thiserror::Error;

use core_kernel::{ErrorKind, PortError, TemporalError};

/// Errors that can occur in the workflow domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input is malformed or out of range
    #[error("Validation error: {0}")]
    Validation(String),

    /// The resource has already been used or created
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid state transition attempted
    #[error("Invalid {entity} transition from {from} to {to}")]
    InvalidStateTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// An operation's status precondition does not hold
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Offer was accepted after its expiry
    #[error("Offer has expired")]
    OfferExpired,

    /// Date arithmetic failed
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// Storage failure that is not a missing or duplicate record
    #[error("Storage error: {0}")]
    Storage(PortError),
}

impl PolicyError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PolicyError::Validation(message.into())
    }

    /// Creates a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        PolicyError::NotFound(message.into())
    }

    /// Creates a status precondition error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        PolicyError::InvalidState(message.into())
    }

    /// Creates a transition error for the given entity
    pub fn transition(
        entity: &'static str,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        PolicyError::InvalidStateTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Returns the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            PolicyError::NotFound(_) => ErrorKind::NotFound,
            PolicyError::Validation(_) => ErrorKind::Validation,
            PolicyError::Conflict(_) => ErrorKind::Conflict,
            PolicyError::InvalidStateTransition { .. }
            | PolicyError::InvalidState(_)
            | PolicyError::OfferExpired => ErrorKind::InvalidState,
            PolicyError::Temporal(_) => ErrorKind::Internal,
            PolicyError::Storage(err) => err.kind(),
        }
    }
}

impl From<PortError> for PolicyError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => {
                PolicyError::NotFound(format!("{} {}", entity_type, id))
            }
            PortError::AlreadyExists { entity_type, key } => {
                PolicyError::Conflict(format!("{} with {} already exists", entity_type, key))
            }
            other => PolicyError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_errors_keep_their_kind() {
        let missing: PolicyError = PortError::not_found("Offer", "OFR-1").into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let duplicate: PolicyError = PortError::already_exists("Offer", "application_id APP-1").into();
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);

        let timeout: PolicyError = PortError::timeout("offers.update", 500).into();
        assert_eq!(timeout.kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn test_transition_error_message() {
        let err = PolicyError::transition("application", "draft", "approved");
        assert_eq!(err.to_string(), "Invalid application transition from draft to approved");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
}
