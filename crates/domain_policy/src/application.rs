//! Applications and applicants
//!
//! An application binds a quote to a named applicant. It is editable only
//! while in `draft`; afterwards its status only moves forward through
//! [`ApplicationStatus::can_transition_to`].

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use core_kernel::{ApplicationId, MonthlyPremium, ProductId, QuoteId};

use crate::error::PolicyError;
use crate::quote::Quote;
use crate::status::status_enum;

/// Youngest insurable applicant age
pub const MIN_APPLICANT_AGE: u32 = 18;
/// Oldest insurable applicant age
pub const MAX_APPLICANT_AGE: u32 = 120;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email regex should compile")
});

status_enum! {
    /// Application review status
    ApplicationStatus {
        Draft => "draft",
        Submitted => "submitted",
        UnderReview => "under_review",
        Approved => "approved",
        Declined => "declined",
    }
}

impl ApplicationStatus {
    /// Returns true if the directed edge `self -> next` exists
    ///
    /// ```text
    /// draft -> submitted -> under_review -> approved
    ///                                    -> declined
    /// ```
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, UnderReview)
                | (UnderReview, Approved)
                | (UnderReview, Declined)
        )
    }

    /// Returns true for statuses with no outgoing edge
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Declined)
    }
}

/// Personal details used for underwriting
///
/// Not stored on its own; it lives inside an application and is copied
/// onto the policy as the insured at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub age: u32,
    pub smoker: bool,
    /// US state code
    pub state: String,
}

impl Applicant {
    /// Checks every field is present and plausible
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.first_name.trim().is_empty() {
            return Err(PolicyError::validation("first name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(PolicyError::validation("last name is required"));
        }
        if self.email.is_empty() {
            return Err(PolicyError::validation("email is required"));
        }
        if !EMAIL_PATTERN.is_match(&self.email) {
            return Err(PolicyError::validation("invalid email format"));
        }
        if self.date_of_birth.trim().is_empty() {
            return Err(PolicyError::validation("date of birth is required"));
        }
        if !(MIN_APPLICANT_AGE..=MAX_APPLICANT_AGE).contains(&self.age) {
            return Err(PolicyError::validation(format!(
                "age must be between {} and {}",
                MIN_APPLICANT_AGE, MAX_APPLICANT_AGE
            )));
        }
        if self.state.trim().is_empty() {
            return Err(PolicyError::validation("state is required"));
        }
        Ok(())
    }
}

/// Request to open an application against a quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationInput {
    pub quote_id: QuoteId,
    pub applicant: Applicant,
}

/// Partial edit of a draft application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationPatch {
    pub applicant: Option<Applicant>,
}

/// A quote bound to an applicant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub quote_id: QuoteId,
    pub product_id: ProductId,
    pub product_slug: String,
    pub coverage_amount: i64,
    pub term_years: u32,
    pub monthly_premium: MonthlyPremium,
    pub applicant: Applicant,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Opens a draft application, snapshotting the quote's pricing
    pub fn from_quote(quote: &Quote, applicant: Applicant, now: DateTime<Utc>) -> Self {
        Self {
            id: ApplicationId::new_v7(),
            quote_id: quote.id,
            product_id: quote.product_id,
            product_slug: quote.product_slug.clone(),
            coverage_amount: quote.coverage_amount,
            term_years: quote.term_years,
            monthly_premium: quote.monthly_premium,
            applicant,
            status: ApplicationStatus::Draft,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        }
    }

    /// Moves the application along one edge of the transition table
    ///
    /// Sets `submitted_at` when entering `submitted`.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidStateTransition` if the edge does not
    /// exist; the application is left untouched.
    pub fn transition_to(&mut self, next: ApplicationStatus, now: DateTime<Utc>) -> Result<(), PolicyError> {
        if !self.status.can_transition_to(next) {
            return Err(PolicyError::transition("application", self.status, next));
        }
        self.status = next;
        self.updated_at = now;
        if next == ApplicationStatus::Submitted {
            self.submitted_at = Some(now);
        }
        Ok(())
    }

    /// Returns true while the applicant may still be edited
    pub fn is_editable(&self) -> bool {
        self.status == ApplicationStatus::Draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn applicant() -> Applicant {
        Applicant {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            date_of_birth: "1990-12-10".to_string(),
            age: 35,
            smoker: false,
            state: "CA".to_string(),
        }
    }

    #[test]
    fn test_applicant_validation() {
        assert!(applicant().validate().is_ok());

        let mut bad = applicant();
        bad.email = "ada@example".to_string();
        assert!(matches!(bad.validate(), Err(PolicyError::Validation(m)) if m.contains("email")));

        let mut young = applicant();
        young.age = 17;
        assert!(young.validate().is_err());

        let mut stateless = applicant();
        stateless.state = String::new();
        assert!(stateless.validate().is_err());
    }

    #[test]
    fn test_transition_table() {
        use ApplicationStatus::*;
        let all = [Draft, Submitted, UnderReview, Approved, Declined];
        let allowed = [
            (Draft, Submitted),
            (Submitted, UnderReview),
            (UnderReview, Approved),
            (UnderReview, Declined),
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_submit_sets_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut app = Application {
            id: ApplicationId::new_v7(),
            quote_id: QuoteId::new_v7(),
            product_id: ProductId::new_v7(),
            product_slug: "term-life-10".to_string(),
            coverage_amount: 150_000,
            term_years: 10,
            monthly_premium: MonthlyPremium::default(),
            applicant: applicant(),
            status: ApplicationStatus::Draft,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        };

        app.transition_to(ApplicationStatus::Submitted, now).unwrap();
        assert_eq!(app.submitted_at, Some(now));

        let err = app.transition_to(ApplicationStatus::Approved, now).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidStateTransition { .. }));
        assert_eq!(app.status, ApplicationStatus::Submitted);
    }
}
