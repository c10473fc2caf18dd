//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use proptest::prelude::*;

use domain_policy::product::default_catalog;
use domain_policy::{Product, QuoteInput, RiskFactors};

/// Ages the pricing engine accepts
pub fn quotable_age_strategy() -> impl Strategy<Value = u32> {
    1u32..=120u32
}

/// Ages an applicant may have
pub fn applicant_age_strategy() -> impl Strategy<Value = u32> {
    18u32..=120u32
}

/// Coverage amounts across every scoring band
pub fn coverage_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![
        10_000i64..=100_000i64,
        100_001i64..=250_000i64,
        250_001i64..=500_000i64,
        500_001i64..=2_000_000i64,
    ]
}

/// Any scoring input
pub fn risk_factors_strategy() -> impl Strategy<Value = RiskFactors> {
    (applicant_age_strategy(), any::<bool>(), coverage_strategy(), 1u32..=99u32).prop_map(
        |(age, smoker, coverage_amount, term_years)| RiskFactors {
            age,
            smoker,
            coverage_amount,
            term_years,
        },
    )
}

/// A product from the default catalog
pub fn catalog_product_strategy() -> impl Strategy<Value = Product> {
    prop::sample::select(default_catalog())
}

/// A product together with a request that fits it
pub fn valid_quote_strategy() -> impl Strategy<Value = (Product, QuoteInput)> {
    catalog_product_strategy().prop_flat_map(|product| {
        let coverage = product.min_coverage..=product.max_coverage;
        (Just(product), coverage, quotable_age_strategy(), any::<bool>()).prop_map(
            |(product, coverage_amount, age, smoker)| {
                let input = QuoteInput {
                    product_slug: product.slug.clone(),
                    coverage_amount,
                    term_years: product.term_years,
                    age,
                    smoker,
                };
                (product, input)
            },
        )
    })
}
