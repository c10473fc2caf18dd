//! Job error types

use thiserror::Error;

use core_kernel::ErrorKind;
use domain_policy::PolicyError;

/// A tick that could not run at all
///
/// Failures of individual items are counted in the
/// [`BatchReport`](crate::BatchReport), not raised.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("{job}: could not load work: {source}")]
    Fetch {
        job: &'static str,
        #[source]
        source: PolicyError,
    },
}

impl JobError {
    pub fn fetch(job: &'static str, source: impl Into<PolicyError>) -> Self {
        JobError::Fetch { job, source: source.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::Fetch { source, .. } => source.kind(),
        }
    }
}
