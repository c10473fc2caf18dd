use std::sync::Arc;

use tracing::{debug, info};

use core_kernel::{ApplicationId, SharedClock, UnderwritingCaseId};

use crate::application::{Application, ApplicationStatus};
use crate::error::PolicyError;
use crate::ports::{ApplicationRepository, UnderwritingRepository};
use crate::services::{found, OfferService};
use crate::settings::WorkflowSettings;
use crate::underwriting::{
    determine_decision, score_risk, DecisionInput, RiskFactors, UnderwritingCase, UwDecision,
};

/// Runs applications through underwriting
///
/// The automatic path is driven by the underwriting job; the manual path
/// is used by reviewers working the referred queue.
#[derive(Clone)]
pub struct UnderwritingService {
    cases: Arc<dyn UnderwritingRepository>,
    applications: Arc<dyn ApplicationRepository>,
    offers: OfferService,
    clock: SharedClock,
    settings: WorkflowSettings,
}

impl std::fmt::Debug for UnderwritingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnderwritingService")
            .field("clock", &self.clock)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl UnderwritingService {
    pub fn new(
        cases: Arc<dyn UnderwritingRepository>,
        applications: Arc<dyn ApplicationRepository>,
        offers: OfferService,
        clock: SharedClock,
        settings: WorkflowSettings,
    ) -> Self {
        Self { cases, applications, offers, clock, settings }
    }

    /// Scores a submitted application and applies the automatic decision
    ///
    /// 1. The application must be `submitted`.
    /// 2. An existing case for it is returned unchanged.
    /// 3. The application moves to `under_review` and a case is opened.
    /// 4. Approved: application approved and an offer generated.
    ///    Declined: application declined. Referred: left for a reviewer.
    ///
    /// A case create that collides with another worker's returns that
    /// worker's case without touching the application again.
    ///
    /// # Errors
    ///
    /// * `NotFound` - unknown application
    /// * `InvalidState` - the application is not submitted
    pub async fn process_application(&self, application_id: ApplicationId) -> Result<UnderwritingCase, PolicyError> {
        let mut application = self.applications.get(application_id).await?;

        if application.status != ApplicationStatus::Submitted {
            return Err(PolicyError::invalid_state("application must be in submitted status"));
        }

        if let Some(existing) = found(self.cases.get_by_application(application_id).await)? {
            debug!(application_id = %application_id, case_id = %existing.id, "case already exists");
            return Ok(existing);
        }

        let now = self.clock.now();
        application.transition_to(ApplicationStatus::UnderReview, now)?;
        self.applications.update(&application).await?;

        let factors = RiskFactors::from_application(&application);
        let score = score_risk(&factors);
        let (decision, method) = determine_decision(&factors, &score);

        let case = UnderwritingCase::automatic(application_id, factors, score, decision, method, now);
        match self.cases.create(&case).await {
            Ok(()) => {}
            Err(err) if err.is_already_exists() => {
                debug!(application_id = %application_id, "lost case create race, re-reading");
                return Ok(self.cases.get_by_application(application_id).await?);
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            application_id = %application_id,
            case_id = %case.id,
            score = case.risk_score.score,
            flags = ?case.risk_score.flags,
            decision = %case.decision,
            "underwriting case opened"
        );

        self.apply_outcome(&mut application, decision).await?;
        Ok(case)
    }

    /// Records a reviewer's decision on a pending or referred case
    ///
    /// `decided_by` is the reviewer's identity; an empty value is stored
    /// as `admin`.
    ///
    /// # Errors
    ///
    /// * `Validation` - decision other than approve or decline, or no reason
    /// * `NotFound` - unknown case or application
    /// * `InvalidState` - the case has already been decided
    pub async fn make_decision(
        &self,
        case_id: UnderwritingCaseId,
        input: DecisionInput,
        decided_by: &str,
    ) -> Result<UnderwritingCase, PolicyError> {
        input.validate()?;

        let mut case = self.cases.get(case_id).await?;
        if !case.decision.can_transition_to(input.decision) {
            return Err(PolicyError::invalid_state(format!(
                "cannot transition from {} to {}",
                case.decision, input.decision
            )));
        }

        let mut application = self.applications.get(case.application_id).await?;
        let target = application_status_for(input.decision);
        if !application.status.can_transition_to(target) {
            return Err(PolicyError::transition("application", application.status, target));
        }

        let now = self.clock.now();
        case.decide_manually(input.decision, &input.reason, decided_by, now)?;
        self.cases.update(&case).await?;

        info!(
            case_id = %case.id,
            application_id = %case.application_id,
            decision = %case.decision,
            decided_by = %case.decided_by,
            "manual underwriting decision"
        );

        self.apply_outcome(&mut application, input.decision).await?;
        Ok(case)
    }

    pub async fn get_case(&self, case_id: UnderwritingCaseId) -> Result<UnderwritingCase, PolicyError> {
        Ok(self.cases.get(case_id).await?)
    }

    pub async fn get_by_application(&self, application_id: ApplicationId) -> Result<UnderwritingCase, PolicyError> {
        Ok(self.cases.get_by_application(application_id).await?)
    }

    /// Cases awaiting a reviewer, oldest first
    ///
    /// A non-positive limit uses the default; larger limits are capped.
    pub async fn list_referred(&self, limit: i64) -> Result<Vec<UnderwritingCase>, PolicyError> {
        let limit = self.settings.referred_limit(limit);
        Ok(self.cases.find_referred(limit).await?)
    }

    /// Moves the application to the decided status and generates the
    /// offer for approvals. Referred decisions leave it under review.
    async fn apply_outcome(&self, application: &mut Application, decision: UwDecision) -> Result<(), PolicyError> {
        if !matches!(decision, UwDecision::Approved | UwDecision::Declined) {
            return Ok(());
        }

        application.transition_to(application_status_for(decision), self.clock.now())?;
        self.applications.update(application).await?;

        if decision == UwDecision::Approved {
            self.offers.generate_for(application).await?;
        }
        Ok(())
    }
}

fn application_status_for(decision: UwDecision) -> ApplicationStatus {
    match decision {
        UwDecision::Approved => ApplicationStatus::Approved,
        _ => ApplicationStatus::Declined,
    }
}
