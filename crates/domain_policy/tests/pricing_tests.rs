//! Pricing and Catalog Tests
//!
//! # Test Organization
//!
//! - `pricing_engine` - The pure price function, including property tests
//! - `quote_service` - Product lookup and quote persistence
//! - `catalog` - Product validation and seeding

use rust_decimal_macros::dec;

use core_kernel::ErrorKind;
use domain_policy::quote::price;
use test_utils::*;

mod pricing_engine {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_premium() {
        let quote = price(
            &ProductFixtures::term_life_10(),
            &QuoteFixtures::reference_input(),
            TemporalFixtures::base_time(),
        )
        .unwrap();
        assert_premium_eq(quote.monthly_premium, dec!(37.50));
    }

    #[test]
    fn test_older_smoker_on_thirty_year_product() {
        // 400 units × 0.45 × 2.00 × 1.50
        let input = QuoteInputBuilder::new()
            .product("term-life-30", 30)
            .coverage(400_000)
            .age(65)
            .smoker(true)
            .build();
        let quote = price(&ProductFixtures::by_slug("term-life-30"), &input, TemporalFixtures::base_time()).unwrap();
        assert_premium_eq(quote.monthly_premium, dec!(540.00));
    }

    #[test]
    fn test_half_cent_rounds_up() {
        let product = ProductBuilder::new().base_rate(dec!(0.37495)).build();
        // 100 units × 0.37495 = 37.495
        let input = QuoteInputBuilder::new().coverage(100_000).build();
        let quote = price(&product, &input, TemporalFixtures::base_time()).unwrap();
        assert_premium_eq(quote.monthly_premium, dec!(37.50));
    }

    proptest! {
        #[test]
        fn price_is_deterministic_for_frozen_clock((product, input) in valid_quote_strategy()) {
            let now = TemporalFixtures::base_time();
            let first = price(&product, &input, now).unwrap();
            let second = price(&product, &input, now).unwrap();

            prop_assert_eq!(first.monthly_premium, second.monthly_premium);
            prop_assert_eq!(first.expires_at, second.expires_at);
            prop_assert_ne!(first.id, second.id);
        }

        #[test]
        fn premium_is_rounded_and_positive((product, input) in valid_quote_strategy()) {
            let quote = price(&product, &input, TemporalFixtures::base_time()).unwrap();
            assert_premium_rounded(quote.monthly_premium);
            prop_assert!(quote.monthly_premium.amount() > rust_decimal::Decimal::ZERO);
        }

        #[test]
        fn smoker_never_pays_less((product, input) in valid_quote_strategy()) {
            let now = TemporalFixtures::base_time();
            let mut smoker = input.clone();
            smoker.smoker = true;
            let mut non_smoker = input;
            non_smoker.smoker = false;

            let a = price(&product, &smoker, now).unwrap();
            let b = price(&product, &non_smoker, now).unwrap();
            prop_assert!(a.monthly_premium >= b.monthly_premium);
        }
    }
}

mod quote_service {
    use super::*;

    #[tokio::test]
    async fn test_price_persists_quote() {
        let harness = WorkflowHarness::new();
        harness.seed().await;

        let quote = harness.services.quotes.price(&QuoteFixtures::reference_input()).await.unwrap();
        let stored = harness.services.quotes.get(quote.id).await.unwrap();

        assert_eq!(stored, quote);
        assert_eq!(stored.created_at, TemporalFixtures::base_time());
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let harness = WorkflowHarness::new();
        harness.seed().await;

        let input = QuoteInputBuilder::new().product("pet-insurance", 10).build();
        assert_error_kind(harness.services.quotes.price(&input).await, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_validation_runs_before_lookup() {
        // Nothing seeded: a malformed request must still be a validation error
        let harness = WorkflowHarness::new();
        let input = QuoteInputBuilder::new().coverage(0).build();
        assert_error_kind(harness.services.quotes.price(&input).await, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_out_of_bounds_coverage_is_validation() {
        let harness = WorkflowHarness::new();
        harness.seed().await;

        let input = QuoteInputBuilder::new().coverage(600_000).build();
        assert_error_kind(harness.services.quotes.price(&input).await, ErrorKind::Validation);

        let input = QuoteInputBuilder::new().product("term-life-10", 20).build();
        assert_error_kind(harness.services.quotes.price(&input).await, ErrorKind::Validation);
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_seed_and_list() {
        let harness = WorkflowHarness::new();
        harness.seed().await;

        let products = harness.services.catalog.list().await.unwrap();
        let slugs: Vec<&str> = products.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(
            slugs,
            vec!["senior-life", "term-life-10", "term-life-20", "term-life-30", "whole-life"]
        );
    }

    #[tokio::test]
    async fn test_reseeding_keeps_ids() {
        let harness = WorkflowHarness::new();
        harness.seed().await;
        let before = harness.services.catalog.get("term-life-20").await.unwrap();

        harness.seed().await;
        let after = harness.services.catalog.get("term-life-20").await.unwrap();
        assert_eq!(before.id, after.id);
    }

    #[tokio::test]
    async fn test_invalid_product_rejected() {
        let harness = WorkflowHarness::new();
        let product = ProductBuilder::new().coverage_range(100, 10).build();
        assert_error_kind(harness.services.catalog.upsert(&product).await, ErrorKind::Validation);
        assert!(harness.services.catalog.list().await.unwrap().is_empty());
    }
}
