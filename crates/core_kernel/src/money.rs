//! Premium amounts with precise decimal arithmetic
//!
//! Coverage amounts are whole currency units and travel as plain integers.
//! Premiums are the only fractional money in the workflow; they use
//! rust_decimal so that rounding happens on exact values instead of floats.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places a premium is held at
pub const PREMIUM_DECIMAL_PLACES: u32 = 2;

/// Rounds a value to cents, with midpoints rounded up
///
/// Premiums are never negative, so rounding the midpoint away from zero
/// is the same as classic half-up rounding.
///
/// # Example
///
/// ```rust
/// use core_kernel::round_half_up;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_half_up(dec!(37.495)), dec!(37.50));
/// assert_eq!(round_half_up(dec!(37.494)), dec!(37.49));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PREMIUM_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// A monthly premium, always stored rounded to cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlyPremium(Decimal);

impl MonthlyPremium {
    /// Creates a premium from an unrounded amount
    pub fn new(amount: Decimal) -> Self {
        Self(round_half_up(amount))
    }

    /// Returns the rounded amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the premium is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for MonthlyPremium {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl fmt::Display for MonthlyPremium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
