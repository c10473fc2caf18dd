//! Product catalog entries
//!
//! A product fixes the term length, the coverage bounds and the base monthly
//! rate per 1,000 units of coverage that the pricing engine works from.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::ProductId;

use crate::error::PolicyError;

/// A catalog entry that quotes are priced against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Unique human key, e.g. `term-life-10`
    pub slug: String,
    /// Display name
    pub name: String,
    /// Term length in years
    pub term_years: u32,
    /// Smallest coverage amount that can be quoted
    pub min_coverage: i64,
    /// Largest coverage amount that can be quoted
    pub max_coverage: i64,
    /// Base monthly rate per 1,000 units of coverage
    pub base_rate: Decimal,
}

impl Product {
    /// Validates the catalog entry
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Validation` for a missing slug or name, a
    /// non-positive term or rate, or an empty coverage range.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.slug.trim().is_empty() {
            return Err(PolicyError::validation("missing slug"));
        }
        if self.name.trim().is_empty() {
            return Err(PolicyError::validation("missing name"));
        }
        if self.term_years == 0 {
            return Err(PolicyError::validation("term must be > 0"));
        }
        if self.min_coverage <= 0 || self.max_coverage < self.min_coverage {
            return Err(PolicyError::validation("invalid coverage range"));
        }
        if self.base_rate <= Decimal::ZERO {
            return Err(PolicyError::validation("base rate must be > 0"));
        }
        Ok(())
    }

    /// Returns true if the amount lies within the product's coverage bounds
    pub fn covers(&self, coverage_amount: i64) -> bool {
        coverage_amount >= self.min_coverage && coverage_amount <= self.max_coverage
    }
}

/// The default term-life catalog
pub fn default_catalog() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new_v7(),
            slug: "term-life-10".to_string(),
            name: "10-Year Term Life".to_string(),
            term_years: 10,
            min_coverage: 50_000,
            max_coverage: 500_000,
            base_rate: dec!(0.25),
        },
        Product {
            id: ProductId::new_v7(),
            slug: "term-life-20".to_string(),
            name: "20-Year Term Life".to_string(),
            term_years: 20,
            min_coverage: 50_000,
            max_coverage: 1_000_000,
            base_rate: dec!(0.35),
        },
        Product {
            id: ProductId::new_v7(),
            slug: "term-life-30".to_string(),
            name: "30-Year Term Life".to_string(),
            term_years: 30,
            min_coverage: 100_000,
            max_coverage: 2_000_000,
            base_rate: dec!(0.45),
        },
        Product {
            id: ProductId::new_v7(),
            slug: "whole-life".to_string(),
            name: "Whole Life".to_string(),
            term_years: 99,
            min_coverage: 25_000,
            max_coverage: 500_000,
            base_rate: dec!(1.50),
        },
        Product {
            id: ProductId::new_v7(),
            slug: "senior-life".to_string(),
            name: "Senior Term Life (Ages 50-80)".to_string(),
            term_years: 15,
            min_coverage: 10_000,
            max_coverage: 100_000,
            base_rate: dec!(2.00),
        },
    ]
}
