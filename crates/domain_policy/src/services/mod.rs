//! Workflow services
//!
//! Each service owns the lifecycle of one entity. Services hold their
//! repository ports and a shared [`Clock`](core_kernel::Clock); none of
//! them reads the wall clock or keeps mutable state of its own, so two
//! copies racing on the same record only ever meet in storage.
//!
//! Creation is idempotent throughout: before creating, a service looks the
//! record up by its natural key, and a create that loses a race
//! (`PortError::AlreadyExists`) is answered by re-reading the winner.

mod applications;
mod catalog;
mod offers;
mod policies;
mod quotes;
mod underwriting;

pub use applications::ApplicationService;
pub use catalog::CatalogService;
pub use offers::OfferService;
pub use policies::PolicyService;
pub use quotes::QuoteService;
pub use underwriting::UnderwritingService;

use core_kernel::{PortError, SharedClock};

use crate::ports::Repositories;
use crate::settings::WorkflowSettings;

/// Every workflow service wired to one backend and clock
#[derive(Debug, Clone)]
pub struct WorkflowServices {
    pub catalog: CatalogService,
    pub quotes: QuoteService,
    pub applications: ApplicationService,
    pub underwriting: UnderwritingService,
    pub offers: OfferService,
    pub policies: PolicyService,
}

impl WorkflowServices {
    /// Wires the services over the given repositories
    pub fn new(repos: &Repositories, clock: SharedClock, settings: WorkflowSettings) -> Self {
        let offers = OfferService::new(repos.offers.clone(), repos.applications.clone(), clock.clone());
        Self {
            catalog: CatalogService::new(repos.products.clone()),
            quotes: QuoteService::new(repos.products.clone(), repos.quotes.clone(), clock.clone()),
            applications: ApplicationService::new(
                repos.applications.clone(),
                repos.quotes.clone(),
                clock.clone(),
            ),
            underwriting: UnderwritingService::new(
                repos.underwriting.clone(),
                repos.applications.clone(),
                offers.clone(),
                clock.clone(),
                settings,
            ),
            policies: PolicyService::new(
                repos.policies.clone(),
                repos.offers.clone(),
                repos.applications.clone(),
                clock,
                settings,
            ),
            offers,
        }
    }
}

/// Turns a lookup miss into `None`, keeping every other failure
pub(crate) fn found<T>(result: Result<T, PortError>) -> Result<Option<T>, PortError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
