//! Premium rating factors
//!
//! The monthly premium is
//! `(coverage / 1000) × base_rate × age_factor × smoker_factor`, rounded to
//! cents half-up. All arithmetic is exact decimal.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::MonthlyPremium;

use crate::product::Product;

/// Coverage is rated per this many currency units
pub const RATE_UNIT: i64 = 1_000;

/// Returns the age loading for an applicant age
///
/// Step function: up to 30 is 0.90, up to 40 is 1.00, up to 50 is 1.20,
/// up to 60 is 1.60, anything older is 2.00.
pub fn age_factor(age: u32) -> Decimal {
    match age {
        0..=30 => dec!(0.90),
        31..=40 => dec!(1.00),
        41..=50 => dec!(1.20),
        51..=60 => dec!(1.60),
        _ => dec!(2.00),
    }
}

/// Returns the smoker loading
pub fn smoker_factor(smoker: bool) -> Decimal {
    if smoker {
        dec!(1.50)
    } else {
        dec!(1.00)
    }
}

/// Computes the monthly premium for a coverage amount on a product
///
/// Bounds are not checked here; callers validate coverage and term
/// against the product first.
pub fn monthly_premium(product: &Product, coverage_amount: i64, age: u32, smoker: bool) -> MonthlyPremium {
    let units = Decimal::from(coverage_amount) / Decimal::from(RATE_UNIT);
    let raw = units * product.base_rate * age_factor(age) * smoker_factor(smoker);
    MonthlyPremium::new(raw)
}
