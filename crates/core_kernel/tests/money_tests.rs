//! Unit tests for premium amounts
//!
//! Tests cover half-up rounding to cents, display, and ordering.

use core_kernel::{round_half_up, MonthlyPremium};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod rounding {
    use super::*;

    #[test]
    fn test_new_rounds_to_cents() {
        let premium = MonthlyPremium::new(dec!(12.375));
        assert_eq!(premium.amount(), dec!(12.38));
    }

    #[test]
    fn test_below_midpoint_rounds_down() {
        assert_eq!(round_half_up(dec!(12.3749)), dec!(12.37));
    }

    #[test]
    fn test_already_rounded_is_unchanged() {
        assert_eq!(round_half_up(dec!(540.00)), dec!(540.00));
        assert_eq!(round_half_up(dec!(37.5)), dec!(37.5));
    }

    #[test]
    fn test_from_decimal_rounds() {
        let premium: MonthlyPremium = dec!(0.005).into();
        assert_eq!(premium.amount(), dec!(0.01));
    }
}

mod display {
    use super::*;

    #[test]
    fn test_always_two_places() {
        assert_eq!(MonthlyPremium::new(dec!(540)).to_string(), "540.00");
        assert_eq!(MonthlyPremium::new(dec!(9.1)).to_string(), "9.10");
    }

    #[test]
    fn test_serializes_as_plain_decimal() {
        let json = serde_json::to_string(&MonthlyPremium::new(dec!(37.50))).unwrap();
        let back: MonthlyPremium = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amount(), dec!(37.50));
    }
}

mod ordering {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        assert!(MonthlyPremium::default().is_zero());
    }

    #[test]
    fn test_compares_by_amount() {
        assert!(MonthlyPremium::new(dec!(37.50)) < MonthlyPremium::new(dec!(56.25)));
    }
}

proptest! {
    #[test]
    fn rounding_never_moves_more_than_half_a_cent(cents in 0i64..10_000_000i64, extra in 0u32..1000u32) {
        let raw = Decimal::new(cents, 2) + Decimal::new(i64::from(extra), 5);
        let rounded = round_half_up(raw);

        prop_assert!(rounded.scale() <= 2);
        prop_assert!((rounded - raw).abs() <= dec!(0.005));
    }

    #[test]
    fn rounding_is_idempotent(cents in 0i64..10_000_000i64, extra in 0u32..1000u32) {
        let raw = Decimal::new(cents, 2) + Decimal::new(i64::from(extra), 5);
        let once = round_half_up(raw);
        prop_assert_eq!(round_half_up(once), once);
    }
}
