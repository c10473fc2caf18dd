use std::sync::Arc;

use chrono::Datelike;
use tracing::{debug, info, warn};

use core_kernel::{OfferId, PolicyId, SharedClock};

use crate::error::PolicyError;
use crate::offer::{Offer, OfferStatus};
use crate::policy::{format_policy_number, Policy, PolicyFilter, PolicyPage};
use crate::ports::{ApplicationRepository, OfferRepository, PolicyRepository};
use crate::services::found;
use crate::settings::WorkflowSettings;

/// Issues policies from accepted offers and serves policy lookups
#[derive(Clone)]
pub struct PolicyService {
    policies: Arc<dyn PolicyRepository>,
    offers: Arc<dyn OfferRepository>,
    applications: Arc<dyn ApplicationRepository>,
    clock: SharedClock,
    settings: WorkflowSettings,
}

impl std::fmt::Debug for PolicyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyService")
            .field("clock", &self.clock)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PolicyService {
    pub fn new(
        policies: Arc<dyn PolicyRepository>,
        offers: Arc<dyn OfferRepository>,
        applications: Arc<dyn ApplicationRepository>,
        clock: SharedClock,
        settings: WorkflowSettings,
    ) -> Self {
        Self { policies, offers, applications, clock, settings }
    }

    /// Issues the policy for an accepted offer, once
    ///
    /// Calling this again for the same offer returns the same policy. After
    /// the policy is stored the offer is marked `issued` on a best-effort
    /// basis: the policy record is what proves issuance, so a failed offer
    /// write is logged and left for nobody to retry.
    ///
    /// # Errors
    ///
    /// * `NotFound` - unknown offer or application
    /// * `InvalidState` - the offer is not accepted
    pub async fn issue_from_offer(&self, offer_id: OfferId) -> Result<Policy, PolicyError> {
        let offer = self.offers.get(offer_id).await?;

        if offer.status != OfferStatus::Accepted {
            return Err(PolicyError::invalid_state("offer is not in accepted status"));
        }

        if let Some(existing) = found(self.policies.get_by_offer(offer_id).await)? {
            debug!(offer_id = %offer_id, policy_number = %existing.number, "policy already issued");
            return Ok(existing);
        }

        let application = self.applications.get(offer.application_id).await?;

        let now = self.clock.now();
        let year = now.year();
        let sequence = self.policies.next_policy_sequence(year).await?;
        let policy = Policy::issue(&offer, &application, format_policy_number(year, sequence), now)?;

        match self.policies.create(&policy).await {
            Ok(()) => {}
            Err(err) if err.is_already_exists() => {
                debug!(offer_id = %offer_id, "lost policy create race, re-reading");
                return Ok(self.policies.get_by_offer(offer_id).await?);
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            policy_id = %policy.id,
            policy_number = %policy.number,
            offer_id = %offer_id,
            application_id = %policy.application_id,
            expiry_date = %policy.expiry_date,
            "policy issued"
        );

        self.mark_offer_issued(offer).await;
        Ok(policy)
    }

    async fn mark_offer_issued(&self, mut offer: Offer) {
        if let Err(err) = offer.transition_to(OfferStatus::Issued, self.clock.now()) {
            warn!(offer_id = %offer.id, error = %err, "offer cannot be marked issued");
            return;
        }
        if let Err(err) = self.offers.update(&offer).await {
            warn!(offer_id = %offer.id, error = %err, "failed to mark offer issued");
        }
    }

    pub async fn get(&self, id: PolicyId) -> Result<Policy, PolicyError> {
        Ok(self.policies.get(id).await?)
    }

    pub async fn get_by_number(&self, number: &str) -> Result<Policy, PolicyError> {
        if number.trim().is_empty() {
            return Err(PolicyError::validation("missing policy number"));
        }
        Ok(self.policies.get_by_number(number).await?)
    }

    /// Lists policies newest first
    ///
    /// A non-positive limit uses the default page size, larger limits are
    /// capped and a negative offset counts as zero.
    pub async fn list(&self, filter: &PolicyFilter, limit: i64, offset: i64) -> Result<PolicyPage, PolicyError> {
        let limit = self.settings.policy_limit(limit);
        let offset = usize::try_from(offset.max(0)).unwrap_or(0);
        let (policies, total) = self.policies.list(filter, limit, offset).await?;
        Ok(PolicyPage { policies, total, limit, offset })
    }
}
