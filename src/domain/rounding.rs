//! Decimal rounding applied after every cash and unit computation.
//!
//! Rounds on the exact binary value of the `f64` with ties to even, then
//! returns the nearest `f64` to the rounded decimal. This reproduces the
//! results of a correctly rounded `round(x, n)` step by step, so compounding
//! rounding error across trades is preserved.

/// Decimal places kept for unit quantities.
pub const UNIT_DECIMALS: usize = 1;

/// Decimal places kept for cash balances.
pub const CASH_DECIMALS: usize = 2;

pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

pub fn round_units(value: f64) -> f64 {
    round_to(value, UNIT_DECIMALS)
}

pub fn round_cash(value: f64) -> f64 {
    round_to(value, CASH_DECIMALS)
}
