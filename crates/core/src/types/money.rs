//! Decimal money helpers.
//!
//! Amounts are held as `rust_decimal::Decimal` in major currency units
//! (rupees, not paise). The payment processor works in minor units, so
//! conversions happen only at that boundary.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from money arithmetic and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// A monetary field was negative.
    #[error("{0} must not be negative")]
    Negative(&'static str),

    /// A monetary field is larger than a stored amount can hold.
    #[error("{0} must not exceed 9999999999.99")]
    TooLarge(&'static str),

    /// Amount arithmetic overflowed or left the processor's integer range.
    #[error("amount out of range")]
    OutOfRange,
}

/// Largest amount a stored money column (`NUMERIC(12, 2)`) accepts.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Check one amount against the stored range.
///
/// The amount is rounded to two places first, as the database would.
///
/// # Errors
///
/// Returns `MoneyError::Negative` or `MoneyError::TooLarge` naming `field`.
pub fn check_amount(field: &'static str, amount: Decimal) -> Result<(), MoneyError> {
    if amount.is_sign_negative() {
        return Err(MoneyError::Negative(field));
    }
    if amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero) > MAX_AMOUNT {
        return Err(MoneyError::TooLarge(field));
    }
    Ok(())
}

/// The three components an order total is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub shipping_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax: Decimal,
}

impl OrderTotals {
    /// Create a new set of totals.
    #[must_use]
    pub const fn new(subtotal: Decimal, shipping_cost: Decimal, tax: Decimal) -> Self {
        Self {
            subtotal,
            shipping_cost,
            tax,
        }
    }

    /// Reject negative components and any component or total outside the
    /// stored range.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Negative` or `MoneyError::TooLarge` naming the
    /// first offending field.
    pub fn validate(&self) -> Result<(), MoneyError> {
        check_amount("subtotal", self.subtotal)?;
        check_amount("shipping_cost", self.shipping_cost)?;
        check_amount("tax", self.tax)?;
        check_amount("total", self.total()?)
    }

    /// `subtotal + shipping_cost + tax`.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::OutOfRange` if the sum overflows.
    pub fn total(&self) -> Result<Decimal, MoneyError> {
        self.subtotal
            .checked_add(self.shipping_cost)
            .and_then(|sum| sum.checked_add(self.tax))
            .ok_or(MoneyError::OutOfRange)
    }
}

/// Convert a major-unit amount to processor minor units (`round(amount * 100)`).
///
/// Midpoints round away from zero, so `10.005` becomes `1001`.
///
/// # Errors
///
/// Returns `MoneyError::OutOfRange` if the result does not fit in an `i64`.
pub fn minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(MoneyError::OutOfRange)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyError::OutOfRange)
}

/// Render an amount with exactly two decimal places, e.g. `1250.5` → `"1250.50"`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_total_is_sum_of_components() {
        let totals = OrderTotals::new(dec("1200.00"), dec("150.00"), dec("216.00"));
        assert_eq!(totals.total().unwrap(), dec("1566.00"));
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let totals = OrderTotals::new(Decimal::MAX, dec("1"), dec("0"));
        assert_eq!(totals.total(), Err(MoneyError::OutOfRange));
        assert_eq!(totals.validate(), Err(MoneyError::TooLarge("subtotal")));
    }

    #[test]
    fn test_validate_bounds_components_and_total() {
        assert_eq!(MAX_AMOUNT, dec("9999999999.99"));

        let at_limit = OrderTotals::new(MAX_AMOUNT, dec("0"), dec("0"));
        assert_eq!(at_limit.validate(), Ok(()));

        let rounds_over = OrderTotals::new(dec("9999999999.995"), dec("0"), dec("0"));
        assert_eq!(rounds_over.validate(), Err(MoneyError::TooLarge("subtotal")));

        let sum_over = OrderTotals::new(MAX_AMOUNT, dec("0.01"), dec("0"));
        assert_eq!(sum_over.validate(), Err(MoneyError::TooLarge("total")));
    }

    #[test]
    fn test_validate_rejects_negative_tax() {
        let totals = OrderTotals::new(dec("10"), dec("0"), dec("-1"));
        assert_eq!(totals.validate(), Err(MoneyError::Negative("tax")));
    }

    #[test]
    fn test_minor_units_rounds_half_away_from_zero() {
        assert_eq!(minor_units(dec("499.99")).unwrap(), 49_999);
        assert_eq!(minor_units(dec("10.005")).unwrap(), 1001);
        assert_eq!(minor_units(dec("1")).unwrap(), 100);
    }

    #[test]
    fn test_format_amount_pads_two_places() {
        assert_eq!(format_amount(dec("1250.5")), "1250.50");
        assert_eq!(format_amount(dec("3")), "3.00");
        assert_eq!(format_amount(dec("99.999")), "100.00");
    }
}
