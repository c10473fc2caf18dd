use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::{ApplicationId, SharedClock};

use crate::application::{Application, ApplicationInput, ApplicationPatch, ApplicationStatus};
use crate::error::PolicyError;
use crate::ports::{ApplicationRepository, QuoteRepository};

/// Creates, edits and submits applications
#[derive(Clone)]
pub struct ApplicationService {
    applications: Arc<dyn ApplicationRepository>,
    quotes: Arc<dyn QuoteRepository>,
    clock: SharedClock,
}

impl std::fmt::Debug for ApplicationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationService").field("clock", &self.clock).finish_non_exhaustive()
    }
}

impl ApplicationService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        quotes: Arc<dyn QuoteRepository>,
        clock: SharedClock,
    ) -> Self {
        Self { applications, quotes, clock }
    }

    /// Opens a draft application against an unexpired quote
    ///
    /// Each quote backs at most one application. The store enforces this
    /// with a uniqueness constraint on the quote id, because the new
    /// application id is always fresh.
    ///
    /// # Errors
    ///
    /// * `Validation` - incomplete applicant
    /// * `NotFound` - unknown quote
    /// * `InvalidState` - the quote has expired
    /// * `Conflict` - the quote already backs an application
    pub async fn create(&self, input: ApplicationInput) -> Result<Application, PolicyError> {
        input.applicant.validate()?;

        let quote = self.quotes.get(input.quote_id).await?;

        let now = self.clock.now();
        if quote.is_expired(now) {
            return Err(PolicyError::invalid_state("quote has expired"));
        }

        let application = Application::from_quote(&quote, input.applicant, now);
        match self.applications.create(&application).await {
            Ok(()) => {}
            Err(err) if err.is_already_exists() => {
                warn!(quote_id = %quote.id, "quote already used for an application");
                return Err(PolicyError::Conflict(
                    "quote already used for an application".to_string(),
                ));
            }
            Err(err) => return Err(err.into()),
        }

        info!(application_id = %application.id, quote_id = %quote.id, "application created");
        Ok(application)
    }

    pub async fn get(&self, id: ApplicationId) -> Result<Application, PolicyError> {
        Ok(self.applications.get(id).await?)
    }

    /// Applies a partial edit to a draft application
    ///
    /// # Errors
    ///
    /// * `InvalidState` - the application is no longer a draft
    /// * `Validation` - the replacement applicant is incomplete
    pub async fn patch(&self, id: ApplicationId, patch: ApplicationPatch) -> Result<Application, PolicyError> {
        let mut application = self.applications.get(id).await?;

        if !application.is_editable() {
            return Err(PolicyError::invalid_state(
                "can only update applications in draft status",
            ));
        }

        if let Some(applicant) = patch.applicant {
            applicant.validate()?;
            application.applicant = applicant;
        }
        application.updated_at = self.clock.now();

        self.applications.update(&application).await?;
        Ok(application)
    }

    /// Submits a draft for underwriting
    ///
    /// # Errors
    ///
    /// * `InvalidState` - the application is not a draft
    /// * `Validation` - the embedded applicant is incomplete
    pub async fn submit(&self, id: ApplicationId) -> Result<Application, PolicyError> {
        let mut application = self.applications.get(id).await?;

        if !application.status.can_transition_to(ApplicationStatus::Submitted) {
            return Err(PolicyError::invalid_state(format!(
                "cannot submit application in {} status",
                application.status
            )));
        }

        if let Err(err) = application.applicant.validate() {
            return Err(PolicyError::validation(format!("application incomplete - {}", err)));
        }

        application.transition_to(ApplicationStatus::Submitted, self.clock.now())?;
        self.applications.update(&application).await?;

        info!(application_id = %application.id, "application submitted");
        Ok(application)
    }
}
