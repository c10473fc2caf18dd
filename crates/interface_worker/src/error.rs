//! Worker error handling

use thiserror::Error;

use core_kernel::{CoreError, ErrorKind};
use domain_policy::PolicyError;
use infra_db::DatabaseError;

/// Failures while bringing the worker up
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] PolicyError),

    #[error("Backend {adapter} is unhealthy: {message}")]
    Unhealthy { adapter: String, message: String },
}

impl WorkerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerError::Config(_) => ErrorKind::Validation,
            WorkerError::Invalid(err) => err.kind(),
            WorkerError::Database(err) if err.is_connection_error() => ErrorKind::Unavailable,
            WorkerError::Database(_) => ErrorKind::Internal,
            WorkerError::Workflow(err) => err.kind(),
            WorkerError::Unhealthy { .. } => ErrorKind::Unavailable,
        }
    }
}
