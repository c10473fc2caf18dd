//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use std::fmt::Debug;

use rust_decimal::Decimal;

use core_kernel::{ErrorKind, MonthlyPremium};
use domain_policy::PolicyError;

/// Asserts that a result failed with the given error kind
///
/// # Panics
///
/// Panics if the result is `Ok` or the error has a different kind
pub fn assert_error_kind<T: Debug>(result: Result<T, PolicyError>, expected: ErrorKind) -> PolicyError {
    match result {
        Ok(value) => panic!("Expected {} error, got Ok({:?})", expected, value),
        Err(err) => {
            assert_eq!(err.kind(), expected, "Expected {} error, got {:?}", expected, err);
            err
        }
    }
}

/// Asserts a premium equals an exact amount
pub fn assert_premium_eq(actual: MonthlyPremium, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Premium mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts a premium carries no more than two decimal places
pub fn assert_premium_rounded(premium: MonthlyPremium) {
    assert!(
        premium.amount().scale() <= 2,
        "Premium {} has more than two decimal places",
        premium.amount()
    );
}

/// Asserts a policy number has the `POL-<year>-<6 digits>` shape
pub fn assert_policy_number(number: &str, year: i32, sequence: u64) {
    let expected = format!("POL-{}-{:06}", year, sequence);
    assert_eq!(number, expected, "Policy number mismatch");
}
