//! Unit tests for clocks and calendar arithmetic

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{add_years, Clock, FixedClock, SystemClock};
use proptest::prelude::*;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_is_frozen() {
        let clock = FixedClock::new(at(2025, 3, 1));
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), at(2025, 3, 1));
    }

    #[test]
    fn test_set_moves_every_handle() {
        let clock = FixedClock::new(at(2025, 3, 1));
        let shared = clock.shared();

        clock.set(at(2030, 1, 1));
        assert_eq!(shared.now(), at(2030, 1, 1));
    }

    #[test]
    fn test_advance_accumulates() {
        let clock = FixedClock::new(at(2025, 3, 1));
        clock.advance(Duration::hours(12));
        clock.advance(Duration::hours(12));
        assert_eq!(clock.now(), at(2025, 3, 2));
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock::shared();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}

mod calendar {
    use super::*;

    #[test]
    fn test_term_expiry_is_same_day_and_time() {
        assert_eq!(add_years(at(2025, 3, 1), 10).unwrap(), at(2035, 3, 1));
        assert_eq!(add_years(at(2025, 3, 1), 99).unwrap(), at(2124, 3, 1));
    }

    #[test]
    fn test_leap_day_to_leap_year_keeps_day() {
        assert_eq!(add_years(at(2024, 2, 29), 4).unwrap(), at(2028, 2, 29));
    }

    #[test]
    fn test_leap_day_to_common_year_rolls_to_march() {
        assert_eq!(add_years(at(2024, 2, 29), 10).unwrap(), at(2034, 3, 1));
        assert_eq!(add_years(at(2024, 2, 29), 100).unwrap(), at(2124, 2, 29));
        assert_eq!(add_years(at(2000, 2, 29), 100).unwrap(), at(2100, 3, 1));
    }

    #[test]
    fn test_zero_years_is_identity() {
        assert_eq!(add_years(at(2025, 7, 4), 0).unwrap(), at(2025, 7, 4));
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(add_years(at(2025, 1, 1), u32::MAX).is_err());
    }
}

proptest! {
    #[test]
    fn add_years_moves_the_year_only(year in 1970i32..2200i32, month in 1u32..=12u32, day in 1u32..=28u32, years in 0u32..100u32) {
        let start = Utc.with_ymd_and_hms(year, month, day, 8, 30, 0).unwrap();
        let end = add_years(start, years).unwrap();
        prop_assert_eq!(end, Utc.with_ymd_and_hms(year + years as i32, month, day, 8, 30, 0).unwrap());
    }
}
