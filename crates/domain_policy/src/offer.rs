//! Offers presented to approved applicants
//!
//! Expiry is lazy: an offer past `expires_at` stays `pending` in storage
//! until someone tries to accept it or a sweep runs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ApplicationId, MonthlyPremium, OfferId};

use crate::application::Application;
use crate::error::PolicyError;
use crate::status::status_enum;

/// How long an offer remains valid
pub const OFFER_VALIDITY_DAYS: i64 = 30;

status_enum! {
    /// Offer lifecycle status
    OfferStatus {
        Pending => "pending",
        Accepted => "accepted",
        Declined => "declined",
        Expired => "expired",
        /// A policy has been issued from the offer
        Issued => "issued",
    }
}

impl OfferStatus {
    /// pending -> {accepted, declined, expired}, accepted -> issued
    pub fn can_transition_to(&self, next: OfferStatus) -> bool {
        use OfferStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Declined) | (Pending, Expired) | (Accepted, Issued)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OfferStatus::Declined | OfferStatus::Expired | OfferStatus::Issued)
    }
}

/// Time-boxed terms for an approved application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub application_id: ApplicationId,
    pub product_slug: String,
    pub coverage_amount: i64,
    pub term_years: u32,
    pub monthly_premium: MonthlyPremium,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
}

impl Offer {
    /// Creates a pending offer from the application's pricing snapshot
    pub fn for_application(application: &Application, now: DateTime<Utc>) -> Self {
        Self {
            id: OfferId::new_v7(),
            application_id: application.id,
            product_slug: application.product_slug.clone(),
            coverage_amount: application.coverage_amount,
            term_years: application.term_years,
            monthly_premium: application.monthly_premium,
            status: OfferStatus::Pending,
            created_at: now,
            expires_at: now + Duration::days(OFFER_VALIDITY_DAYS),
            accepted_at: None,
            declined_at: None,
        }
    }

    /// Returns true once `now` is strictly past the expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Moves the offer to `next`, stamping accepted or declined times
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidStateTransition` if the edge does not exist.
    pub fn transition_to(&mut self, next: OfferStatus, now: DateTime<Utc>) -> Result<(), PolicyError> {
        if !self.status.can_transition_to(next) {
            return Err(PolicyError::transition("offer", self.status, next));
        }
        self.status = next;
        match next {
            OfferStatus::Accepted => self.accepted_at = Some(now),
            OfferStatus::Declined => self.declined_at = Some(now),
            _ => {}
        }
        Ok(())
    }
}
