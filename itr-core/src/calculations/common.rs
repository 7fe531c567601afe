//! Common utility functions for tax calculations.
//!
//! Only the final payable figure is ever rounded; every helper here is
//! applied once, at the step named in its documentation.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to a whole rupee using half-up rounding.
///
/// Used for the final payable tax only. Values at exactly 0.5 are rounded up
/// (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use itr_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(26000.49)), dec!(26000));
/// assert_eq!(round_half_up(dec!(26000.50)), dec!(26001));
/// assert_eq!(round_half_up(dec!(26000.104)), dec!(26000));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps a value to be no lower than zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use itr_core::calculations::common::floor_at_zero;
///
/// assert_eq!(floor_at_zero(dec!(-125000)), dec!(0));
/// assert_eq!(floor_at_zero(dec!(825000)), dec!(825000));
/// ```
pub fn floor_at_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Sums non-negative amounts, stopping at [`Decimal::MAX`] instead of
/// overflowing.
///
/// Uncapped deduction sections accept any claim, so the total of several
/// claims can exceed what a `Decimal` holds.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use itr_core::calculations::common::saturating_sum;
///
/// assert_eq!(saturating_sum([dec!(150000), dec!(25000)]), dec!(175000));
/// assert_eq!(saturating_sum([Decimal::MAX, dec!(1)]), Decimal::MAX);
/// ```
pub fn saturating_sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, |total, amount| {
        total.checked_add(amount).unwrap_or(Decimal::MAX)
    })
}
