//! Quarter-hour rounding.
//!
//! Payroll hours are reported in quarter-hour increments. The rule is
//! `round(hours * 4) / 4` with midpoints rounded away from zero, so an
//! exact eighth of an hour past a quarter (x.125, x.375, ...) rounds up.
//! `Decimal` keeps those midpoints exact; there is no floating-point drift.

use rust_decimal::{Decimal, RoundingStrategy};

/// The reporting increment: a quarter of an hour.
pub const QUARTER_HOUR: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

const QUARTERS_PER_HOUR: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// Rounds hours to the nearest quarter hour, midpoints up.
///
/// # Examples
///
/// ```
/// use dtr_payroll::calculation::round_to_quarter_hour;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// assert_eq!(round_to_quarter_hour(dec("4.5")), dec("4.5"));
/// assert_eq!(round_to_quarter_hour(dec("7.1")), dec("7"));
/// assert_eq!(round_to_quarter_hour(dec("7.125")), dec("7.25"));
/// ```
pub fn round_to_quarter_hour(hours: Decimal) -> Decimal {
    let quarters =
        (hours * QUARTERS_PER_HOUR).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    (quarters / QUARTERS_PER_HOUR).normalize()
}

/// Returns true if `hours` is a whole number of quarter hours.
pub fn is_quarter_hour_multiple(hours: Decimal) -> bool {
    (hours % QUARTER_HOUR).is_zero()
}
