//! Shared primitives of the eligibility calculations: the statutory
//! rounding law for eligibility-month totals and the salary thresholds
//! that grade a single month.

use rust_decimal::Decimal;

use crate::models::ToeConfig;

/// Rounds an eligibility-month value down to the nearest half month.
///
/// This is the statutory rounding law: the result is the largest multiple
/// of 0.5 not exceeding the input. Idempotent.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use toe_core::calculations::common::round_toe_months_down;
///
/// assert_eq!(round_toe_months_down(dec!(0.75)), dec!(0.5));
/// assert_eq!(round_toe_months_down(dec!(11.49)), dec!(11.0));
/// assert_eq!(round_toe_months_down(dec!(12.0)), dec!(12.0));
/// assert_eq!(round_toe_months_down(dec!(0)), dec!(0));
/// ```
pub fn round_toe_months_down(value: Decimal) -> Decimal {
    let whole = value.floor();
    if value - whole >= Decimal::new(5, 1) {
        whole + Decimal::new(5, 1)
    } else {
        whole
    }
}

/// Rounds a money amount to cents using half-up rounding.
///
/// Values at exactly half a cent round away from zero, the standard
/// financial convention.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use toe_core::calculations::common::round_money;
///
/// assert_eq!(round_money(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_money(dec!(123.455)), dec!(123.46));
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Grades one month's gross salary into eligibility credit.
///
/// Legal thresholds: at or above the full-credit minimum (930 EUR) the
/// month earns 1.0; at or above the half-credit minimum (465 EUR), 0.5;
/// below that, nothing. The output is already a valid half-step value, so
/// no further rounding applies.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use toe_core::calculations::common::toe_value_from_salary;
/// use toe_core::models::ToeConfig;
///
/// let config = ToeConfig::default();
/// assert_eq!(toe_value_from_salary(dec!(930), &config), dec!(1.0));
/// assert_eq!(toe_value_from_salary(dec!(500), &config), dec!(0.5));
/// assert_eq!(toe_value_from_salary(dec!(464.99), &config), dec!(0));
/// ```
pub fn toe_value_from_salary(
    total_salary: Decimal,
    config: &ToeConfig,
) -> Decimal {
    if total_salary >= config.full_credit_wage_min {
        Decimal::ONE
    } else if total_salary >= config.half_credit_wage_min {
        Decimal::new(5, 1)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_toe_months_down tests
    // =========================================================================

    #[test]
    fn rounds_down_to_whole_below_half() {
        assert_eq!(round_toe_months_down(dec!(11.49)), dec!(11));
    }

    #[test]
    fn rounds_down_to_half_at_or_above_half() {
        assert_eq!(round_toe_months_down(dec!(11.5)), dec!(11.5));
        assert_eq!(round_toe_months_down(dec!(11.99)), dec!(11.5));
    }

    #[test]
    fn keeps_exact_half_steps() {
        assert_eq!(round_toe_months_down(dec!(0.5)), dec!(0.5));
        assert_eq!(round_toe_months_down(dec!(12)), dec!(12));
    }

    #[test]
    fn zero_maps_to_zero() {
        assert_eq!(round_toe_months_down(dec!(0)), dec!(0));
    }

    #[test]
    fn single_converted_month_floors_to_half() {
        // 1.0 x 0.75 = 0.75 rounds down to the nearest half step
        assert_eq!(round_toe_months_down(dec!(0.75)), dec!(0.5));
    }

    #[test]
    fn is_idempotent() {
        for v in [dec!(0), dec!(0.3), dec!(0.75), dec!(7.25), dec!(11.99)] {
            let once = round_toe_months_down(v);
            assert_eq!(round_toe_months_down(once), once);
        }
    }

    // =========================================================================
    // round_money tests
    // =========================================================================

    #[test]
    fn money_rounds_half_up_at_midpoint() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
    }

    #[test]
    fn money_rounding_preserves_cents() {
        assert_eq!(round_money(dec!(1234.56)), dec!(1234.56));
    }

    // =========================================================================
    // toe_value_from_salary tests
    // =========================================================================

    #[test]
    fn full_credit_at_threshold() {
        let config = ToeConfig::default();
        assert_eq!(toe_value_from_salary(dec!(930), &config), dec!(1.0));
        assert_eq!(toe_value_from_salary(dec!(5000), &config), dec!(1.0));
    }

    #[test]
    fn half_credit_between_thresholds() {
        let config = ToeConfig::default();
        assert_eq!(toe_value_from_salary(dec!(465), &config), dec!(0.5));
        assert_eq!(toe_value_from_salary(dec!(929.99), &config), dec!(0.5));
    }

    #[test]
    fn no_credit_below_half_threshold() {
        let config = ToeConfig::default();
        assert_eq!(toe_value_from_salary(dec!(464.99), &config), dec!(0));
        assert_eq!(toe_value_from_salary(dec!(0), &config), dec!(0));
    }
}
