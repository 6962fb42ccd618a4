//! Money calculation utilities using rust_decimal for precision
//!
//! One rounding policy for the whole workflow: a derived unit price is
//! rounded once to 2 decimal places (midpoint away from zero), and line
//! refunds are exact multiples of that rounded price. The dashboard display
//! and the submitted refund total therefore always agree.

use rust_decimal::prelude::*;

/// Decimal places kept for monetary values
pub const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Round a monetary value to 2 decimal places, midpoint away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Unit price of a line recorded with a lump `sold_price` for `quantity` units.
///
/// Returns `None` when `quantity` is zero.
pub fn unit_price_from_lump(sold_price: Decimal, quantity: u32) -> Option<Decimal> {
    if quantity == 0 {
        return None;
    }
    Some(round_money(sold_price / Decimal::from(quantity)))
}

/// Refund owed for `quantity` units at `unit_price`
#[inline]
pub fn line_refund(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Compare two monetary values within [`MONEY_TOLERANCE`]
#[inline]
pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}

/// Format a monetary value with exactly 2 decimal places
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}
