//! Rounding and comparison helpers shared by the tax and salary calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a currency amount to kuruş (two decimal places), half away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(182.118255)), dec!(182.12));
/// assert_eq!(round_half_up(dec!(197.385)), dec!(197.39));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a rate to four decimal places, half away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::round_rate;
///
/// assert_eq!(round_rate(dec!(0.123449)), dec!(0.1234));
/// assert_eq!(round_rate(dec!(0.12345)), dec!(0.1235));
/// ```
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two amounts.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Restricts `value` to the inclusive range `[lower, upper]`.
///
/// `lower` wins if the bounds are inverted.
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::clamp;
///
/// assert_eq!(clamp(dec!(5), dec!(10), dec!(20)), dec!(10));
/// assert_eq!(clamp(dec!(15), dec!(10), dec!(20)), dec!(15));
/// assert_eq!(clamp(dec!(25), dec!(10), dec!(20)), dec!(20));
/// ```
pub fn clamp(
    value: Decimal,
    lower: Decimal,
    upper: Decimal,
) -> Decimal {
    max(value.min(upper), lower)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(6075.004));

        assert_eq!(result, dec!(6075.00));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(197.385));

        assert_eq!(result, dec!(197.39));
    }

    #[test]
    fn round_half_up_rounds_negative_away_from_zero() {
        let result = round_half_up(dec!(-3901.825));

        assert_eq!(result, dec!(-3901.83));
    }

    #[test]
    fn round_half_up_drops_sub_kurus_noise() {
        let result = round_half_up(dec!(50000.0000000000000001));

        assert_eq!(result, dec!(50000.00));
    }

    // =========================================================================
    // round_rate tests
    // =========================================================================

    #[test]
    fn round_rate_keeps_four_decimal_places() {
        let result = round_rate(dec!(0.150049));

        assert_eq!(result, dec!(0.1500));
    }

    #[test]
    fn round_rate_rounds_up_at_midpoint() {
        let result = round_rate(dec!(0.14995));

        assert_eq!(result, dec!(0.1500));
    }

    // =========================================================================
    // max / clamp tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(-2000.00), dec!(0)), dec!(0));
        assert_eq!(max(dec!(40500.00), dec!(0)), dec!(40500.00));
    }

    #[test]
    fn clamp_raises_value_below_lower_bound() {
        let result = clamp(dec!(1000.00), dec!(26005.50), dec!(195041.25));

        assert_eq!(result, dec!(26005.50));
    }

    #[test]
    fn clamp_lowers_value_above_upper_bound() {
        let result = clamp(dec!(250000.00), dec!(26005.50), dec!(195041.25));

        assert_eq!(result, dec!(195041.25));
    }

    #[test]
    fn clamp_keeps_value_inside_bounds() {
        let result = clamp(dec!(50000.00), dec!(26005.50), dec!(195041.25));

        assert_eq!(result, dec!(50000.00));
    }

    #[test]
    fn clamp_prefers_lower_bound_when_inverted() {
        let result = clamp(dec!(15), dec!(20), dec!(10));

        assert_eq!(result, dec!(20));
    }
}
