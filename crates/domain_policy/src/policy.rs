//! Issued policies
//!
//! A policy is created once per accepted offer and is not modified by the
//! workflow afterwards. Lapse, cancellation and expiry are represented in
//! the status but nothing here triggers them.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{add_years, ApplicationId, MonthlyPremium, OfferId, PolicyId};

use crate::application::{Applicant, Application};
use crate::error::PolicyError;
use crate::offer::Offer;
use crate::status::status_enum;

status_enum! {
    /// Policy status
    PolicyStatus {
        Active => "active",
        Lapsed => "lapsed",
        Cancelled => "cancelled",
        Expired => "expired",
    }
}

/// Formats a policy number as `POL-<year>-<sequence>`
///
/// The sequence is zero-padded to six digits.
///
/// ```rust
/// use domain_policy::policy::format_policy_number;
///
/// assert_eq!(format_policy_number(2025, 1), "POL-2025-000001");
/// ```
pub fn format_policy_number(year: i32, sequence: u64) -> String {
    format!("POL-{}-{:06}", year, sequence)
}

/// An issued policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    /// Human-readable number, unique per year
    pub number: String,
    pub application_id: ApplicationId,
    pub offer_id: OfferId,
    pub product_slug: String,
    pub coverage_amount: i64,
    pub term_years: u32,
    pub monthly_premium: MonthlyPremium,
    /// Applicant as it stood at issuance
    pub insured: Applicant,
    pub status: PolicyStatus,
    pub effective_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
}

impl Policy {
    /// Builds an active policy from an accepted offer
    ///
    /// Coverage starts at `now` and runs for the offer's term in calendar
    /// years.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Temporal` if the expiry date cannot be represented.
    pub fn issue(
        offer: &Offer,
        application: &Application,
        number: String,
        now: DateTime<Utc>,
    ) -> Result<Self, PolicyError> {
        let expiry_date = add_years(now, offer.term_years)?;
        Ok(Self {
            id: PolicyId::new_v7(),
            number,
            application_id: offer.application_id,
            offer_id: offer.id,
            product_slug: offer.product_slug.clone(),
            coverage_amount: offer.coverage_amount,
            term_years: offer.term_years,
            monthly_premium: offer.monthly_premium,
            insured: application.applicant.clone(),
            status: PolicyStatus::Active,
            effective_date: now,
            expiry_date,
            issued_at: now,
        })
    }

    /// Calendar year the number was drawn for
    pub fn issue_year(&self) -> i32 {
        self.issued_at.year()
    }
}

/// Optional filters for listing policies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyFilter {
    pub application_id: Option<ApplicationId>,
    pub status: Option<PolicyStatus>,
}

impl PolicyFilter {
    /// Returns true if the policy passes every set filter
    pub fn matches(&self, policy: &Policy) -> bool {
        self.application_id.map_or(true, |id| policy.application_id == id)
            && self.status.map_or(true, |status| policy.status == status)
    }
}

/// One page of a policy listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyPage {
    pub policies: Vec<Policy>,
    /// Matching policies across all pages
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}
