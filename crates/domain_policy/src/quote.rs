//! Quotes and the pricing engine
//!
//! [`price`] is the pure half of quoting: given a product, the risk inputs
//! and the current instant it either rejects the input or returns a priced
//! quote. Loading the product and storing the quote is the job of
//! [`crate::services::QuoteService`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{MonthlyPremium, ProductId, QuoteId};

use crate::error::PolicyError;
use crate::premium::monthly_premium;
use crate::product::Product;
use crate::status::status_enum;

/// How long a priced quote can be turned into an application
pub const QUOTE_VALIDITY_HOURS: i64 = 24;

/// Oldest age that can be quoted
pub const MAX_QUOTE_AGE: u32 = 120;

status_enum! {
    /// Quote lifecycle status
    QuoteStatus {
        /// Created but not priced
        New => "new",
        /// Priced and usable until expiry
        Priced => "priced",
        /// Past its validity window
        Expired => "expired",
    }
}

/// Risk inputs for pricing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteInput {
    pub product_slug: String,
    pub coverage_amount: i64,
    pub term_years: u32,
    pub age: u32,
    pub smoker: bool,
}

impl QuoteInput {
    /// Checks the input shape before any product lookup
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Validation` for an empty slug, a non-positive
    /// coverage or term, or an age outside 1..=120.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.product_slug.trim().is_empty() {
            return Err(PolicyError::validation("missing product slug"));
        }
        if self.coverage_amount <= 0 {
            return Err(PolicyError::validation("coverage must be > 0"));
        }
        if self.term_years == 0 {
            return Err(PolicyError::validation("term must be > 0"));
        }
        if self.age == 0 || self.age > MAX_QUOTE_AGE {
            return Err(PolicyError::validation("invalid age"));
        }
        Ok(())
    }
}

/// A priced, time-boxed quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub product_id: ProductId,
    pub product_slug: String,
    pub coverage_amount: i64,
    pub term_years: u32,
    pub monthly_premium: MonthlyPremium,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Quote {
    /// Returns true once `now` is strictly past the expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Prices a quote for the given product
///
/// Validates the input, checks the coverage against the product bounds and
/// requires the term to match the product exactly. The result is a
/// `priced` quote valid for 24 hours from `now`. For a fixed product,
/// input and instant the premium is always the same.
///
/// # Errors
///
/// Returns `PolicyError::Validation` if the input is malformed, the
/// slug does not name this product, or coverage or term do not fit it.
pub fn price(product: &Product, input: &QuoteInput, now: DateTime<Utc>) -> Result<Quote, PolicyError> {
    input.validate()?;

    if input.product_slug != product.slug {
        return Err(PolicyError::validation(format!(
            "product slug {} does not match {}",
            input.product_slug, product.slug
        )));
    }
    if !product.covers(input.coverage_amount) {
        return Err(PolicyError::validation(format!(
            "coverage must be between {} and {}",
            product.min_coverage, product.max_coverage
        )));
    }
    if input.term_years != product.term_years {
        return Err(PolicyError::validation(format!(
            "term must be {} years for product {}",
            product.term_years, product.slug
        )));
    }

    Ok(Quote {
        id: QuoteId::new_v7(),
        product_id: product.id,
        product_slug: product.slug.clone(),
        coverage_amount: input.coverage_amount,
        term_years: input.term_years,
        monthly_premium: monthly_premium(product, input.coverage_amount, input.age, input.smoker),
        status: QuoteStatus::Priced,
        created_at: now,
        expires_at: now + Duration::hours(QUOTE_VALIDITY_HOURS),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::default_catalog;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn input(coverage_amount: i64) -> QuoteInput {
        QuoteInput {
            product_slug: "term-life-10".to_string(),
            coverage_amount,
            term_years: 10,
            age: 35,
            smoker: false,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_price_sets_status_and_expiry() {
        let product = default_catalog().remove(0);
        let quote = price(&product, &input(150_000), now()).unwrap();

        assert_eq!(quote.status, QuoteStatus::Priced);
        assert_eq!(quote.monthly_premium.amount(), dec!(37.50));
        assert_eq!(quote.expires_at - quote.created_at, Duration::hours(24));
        assert_eq!(quote.product_id, product.id);
    }

    #[test]
    fn test_price_rejects_out_of_bounds_coverage() {
        let product = default_catalog().remove(0);
        let err = price(&product, &input(40_000), now()).unwrap_err();
        assert!(matches!(err, PolicyError::Validation(_)));
    }

    #[test]
    fn test_price_rejects_term_mismatch() {
        let product = default_catalog().remove(0);
        let mut bad = input(150_000);
        bad.term_years = 20;
        assert!(matches!(price(&product, &bad, now()), Err(PolicyError::Validation(_))));
    }

    #[test]
    fn test_input_age_bounds() {
        let mut bad = input(150_000);
        bad.age = 0;
        assert!(bad.validate().is_err());
        bad.age = 121;
        assert!(bad.validate().is_err());
        bad.age = 120;
        assert!(bad.validate().is_ok());
    }

    #[test]
    fn test_quote_status_text_form() {
        assert_eq!(QuoteStatus::Priced.as_str(), "priced");
        assert_eq!("expired".parse::<QuoteStatus>().unwrap(), QuoteStatus::Expired);
        assert!("stale".parse::<QuoteStatus>().is_err());
    }
}
