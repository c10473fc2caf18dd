use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use core_kernel::{ApplicationId, OfferId, SharedClock};

use crate::application::{Application, ApplicationStatus};
use crate::error::PolicyError;
use crate::offer::{Offer, OfferStatus};
use crate::ports::{ApplicationRepository, OfferRepository};
use crate::services::found;

/// Generates, accepts and declines offers
#[derive(Clone)]
pub struct OfferService {
    offers: Arc<dyn OfferRepository>,
    applications: Arc<dyn ApplicationRepository>,
    clock: SharedClock,
}

impl std::fmt::Debug for OfferService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfferService").field("clock", &self.clock).finish_non_exhaustive()
    }
}

impl OfferService {
    pub fn new(
        offers: Arc<dyn OfferRepository>,
        applications: Arc<dyn ApplicationRepository>,
        clock: SharedClock,
    ) -> Self {
        Self { offers, applications, clock }
    }

    /// Returns the offer for an approved application, creating it once
    ///
    /// # Errors
    ///
    /// * `NotFound` - unknown application
    /// * `InvalidState` - the application is not approved
    pub async fn generate_offer(&self, application_id: ApplicationId) -> Result<Offer, PolicyError> {
        let application = self.applications.get(application_id).await?;
        self.generate_for(&application).await
    }

    /// Same as [`generate_offer`](Self::generate_offer) for an application
    /// the caller already holds
    pub async fn generate_for(&self, application: &Application) -> Result<Offer, PolicyError> {
        if application.status != ApplicationStatus::Approved {
            return Err(PolicyError::invalid_state("application is not approved"));
        }

        if let Some(existing) = found(self.offers.get_by_application(application.id).await)? {
            debug!(offer_id = %existing.id, application_id = %application.id, "offer already exists");
            return Ok(existing);
        }

        let offer = Offer::for_application(application, self.clock.now());
        match self.offers.create(&offer).await {
            Ok(()) => {
                info!(
                    offer_id = %offer.id,
                    application_id = %application.id,
                    premium = %offer.monthly_premium,
                    expires_at = %offer.expires_at,
                    "offer generated"
                );
                Ok(offer)
            }
            Err(err) if err.is_already_exists() => {
                debug!(application_id = %application.id, "lost offer create race, re-reading");
                Ok(self.offers.get_by_application(application.id).await?)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get(&self, id: OfferId) -> Result<Offer, PolicyError> {
        Ok(self.offers.get(id).await?)
    }

    pub async fn get_by_application(&self, application_id: ApplicationId) -> Result<Offer, PolicyError> {
        Ok(self.offers.get_by_application(application_id).await?)
    }

    /// Accepts a pending offer
    ///
    /// An offer found past its expiry is moved to `expired` on the way out.
    /// That write is best-effort: its failure is logged and the caller
    /// still gets `OfferExpired`.
    ///
    /// # Errors
    ///
    /// * `InvalidState` - the offer is not pending
    /// * `OfferExpired` - the offer is past `expires_at`
    pub async fn accept(&self, id: OfferId) -> Result<Offer, PolicyError> {
        let mut offer = self.offers.get(id).await?;

        if offer.status != OfferStatus::Pending {
            return Err(PolicyError::invalid_state("offer is not in pending status"));
        }

        let now = self.clock.now();
        if offer.is_expired(now) {
            offer.transition_to(OfferStatus::Expired, now)?;
            if let Err(err) = self.offers.update(&offer).await {
                warn!(offer_id = %offer.id, error = %err, "failed to persist offer expiry");
            }
            info!(offer_id = %offer.id, "offer expired on accept");
            return Err(PolicyError::OfferExpired);
        }

        offer.transition_to(OfferStatus::Accepted, now)?;
        self.offers.update(&offer).await?;

        info!(offer_id = %offer.id, application_id = %offer.application_id, "offer accepted");
        Ok(offer)
    }

    /// Declines a pending offer
    pub async fn decline(&self, id: OfferId) -> Result<Offer, PolicyError> {
        let mut offer = self.offers.get(id).await?;

        if offer.status != OfferStatus::Pending {
            return Err(PolicyError::invalid_state("offer is not in pending status"));
        }

        offer.transition_to(OfferStatus::Declined, self.clock.now())?;
        self.offers.update(&offer).await?;

        info!(offer_id = %offer.id, "offer declined");
        Ok(offer)
    }

    /// Expires every pending offer whose validity ended before `before`
    pub async fn expire_stale(&self, before: DateTime<Utc>) -> Result<u64, PolicyError> {
        let expired = self.offers.expire_offers(before).await?;
        if expired > 0 {
            info!(count = expired, before = %before, "expired stale offers");
        }
        Ok(expired)
    }
}
