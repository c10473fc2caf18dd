//! Pipeline drivers
//!
//! Each driver loads one bounded batch of waiting work per tick and hands
//! every item to the owning service. Items run one after another; a failing
//! item is logged and counted and the batch carries on. Whatever is still
//! waiting is simply found again on the next tick.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use domain_policy::{
    ApplicationRepository, ApplicationStatus, OfferRepository, PolicyService, Repositories,
    UnderwritingService, WorkflowServices,
};

use crate::error::JobError;
use crate::scheduler::Job;

/// Items loaded per tick unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Outcome of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub found: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    fn found(found: usize) -> Self {
        Self { found, ..Self::default() }
    }

    fn record<T, E>(&mut self, outcome: &Result<T, E>) {
        match outcome {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// Runs submitted applications through underwriting
pub struct UnderwritingDriver {
    applications: Arc<dyn ApplicationRepository>,
    underwriting: UnderwritingService,
    batch_size: usize,
}

impl UnderwritingDriver {
    pub fn new(repos: &Repositories, services: &WorkflowServices, batch_size: usize) -> Self {
        Self {
            applications: repos.applications.clone(),
            underwriting: services.underwriting.clone(),
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl Job for UnderwritingDriver {
    fn name(&self) -> &'static str {
        "underwriting"
    }

    async fn run_once(&self) -> Result<BatchReport, JobError> {
        let applications = self
            .applications
            .find_by_status(ApplicationStatus::Submitted, self.batch_size)
            .await
            .map_err(|e| JobError::fetch(self.name(), e))?;

        let mut report = BatchReport::found(applications.len());
        if applications.is_empty() {
            return Ok(report);
        }
        info!(count = applications.len(), "found submitted applications");

        for application in applications {
            let outcome = self.underwriting.process_application(application.id).await;
            match &outcome {
                Ok(case) => info!(
                    application_id = %application.id,
                    case_id = %case.id,
                    decision = %case.decision,
                    method = %case.method,
                    "underwriting complete"
                ),
                Err(e) => warn!(
                    application_id = %application.id,
                    error = %e,
                    "failed to process application"
                ),
            }
            report.record(&outcome);
        }

        Ok(report)
    }
}

/// Issues policies for accepted offers
pub struct IssuanceDriver {
    offers: Arc<dyn OfferRepository>,
    policies: PolicyService,
    batch_size: usize,
}

impl IssuanceDriver {
    pub fn new(repos: &Repositories, services: &WorkflowServices, batch_size: usize) -> Self {
        Self {
            offers: repos.offers.clone(),
            policies: services.policies.clone(),
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl Job for IssuanceDriver {
    fn name(&self) -> &'static str {
        "issuance"
    }

    async fn run_once(&self) -> Result<BatchReport, JobError> {
        let offers = self
            .offers
            .find_accepted(self.batch_size)
            .await
            .map_err(|e| JobError::fetch(self.name(), e))?;

        let mut report = BatchReport::found(offers.len());
        if offers.is_empty() {
            return Ok(report);
        }
        info!(count = offers.len(), "found accepted offers");

        for offer in offers {
            let outcome = self.policies.issue_from_offer(offer.id).await;
            match &outcome {
                Ok(policy) => info!(
                    offer_id = %offer.id,
                    policy_id = %policy.id,
                    policy_number = %policy.number,
                    "policy issued"
                ),
                Err(e) => warn!(offer_id = %offer.id, error = %e, "failed to issue policy"),
            }
            report.record(&outcome);
        }

        Ok(report)
    }
}
