// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Decimal helpers shared by the projection engine.
//!
//! Products and quotients that involve a rate are kept to
//! [`SIGNIFICANT_DIGITS`] significant digits, rounded half away from zero.
//! Sums are exact. Values handed to callers are rounded to cents.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::FinanceError;

pub const MONEY_DP: u32 = 2;
pub const SIGNIFICANT_DIGITS: u32 = 10;

/// Rounds to cents, half away from zero, always carrying two decimal places.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DP);
    rounded
}

fn to_context(value: Decimal) -> Decimal {
    value
        .round_sf_with_strategy(SIGNIFICANT_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .unwrap_or(value)
}

pub fn mul_ctx(lhs: Decimal, rhs: Decimal, what: &'static str) -> Result<Decimal, FinanceError> {
    lhs.checked_mul(rhs)
        .map(to_context)
        .ok_or(FinanceError::Overflow(what))
}

pub fn div_ctx(lhs: Decimal, rhs: Decimal, what: &'static str) -> Result<Decimal, FinanceError> {
    lhs.checked_div(rhs)
        .map(to_context)
        .ok_or(FinanceError::Overflow(what))
}

/// Converts through the shortest decimal string that round-trips to `value`,
/// so `0.07_f64` becomes exactly `0.07`.
pub fn decimal_from_f64(value: f64, what: &'static str) -> Result<Decimal, FinanceError> {
    if !value.is_finite() {
        return Err(FinanceError::Overflow(what));
    }
    value
        .to_string()
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_f64_retain(value))
        .ok_or(FinanceError::Overflow(what))
}

/// `(1 + rate)^years` evaluated in binary floating point.
pub fn growth_factor(rate: f64, years: u32, what: &'static str) -> Result<Decimal, FinanceError> {
    decimal_from_f64((1.0 + rate).powf(f64::from(years)), what)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn round_money_is_half_up_with_two_places() {
        assert_eq!(round_money(d("2.345")).to_string(), "2.35");
        assert_eq!(round_money(d("-2.345")).to_string(), "-2.35");
        assert_eq!(round_money(d("450000")).to_string(), "450000.00");
        assert_eq!(round_money(d("1.004")).to_string(), "1.00");
    }

    #[test]
    fn products_keep_ten_significant_digits() {
        let product = mul_ctx(d("24900"), d("0.043902439024390505"), "growth").unwrap();
        assert_eq!(product, d("1093.170732"));
    }

    #[test]
    fn quotient_rounds_to_context() {
        assert_eq!(div_ctx(d("18000"), d("0.04"), "fire number").unwrap(), d("450000"));
        assert_eq!(div_ctx(d("1"), d("3"), "third").unwrap(), d("0.3333333333"));
    }

    #[test]
    fn f64_conversion_uses_shortest_representation() {
        assert_eq!(decimal_from_f64(0.07, "rate").unwrap(), d("0.07"));
        assert_eq!(growth_factor(0.025, 2, "inflation").unwrap(), d("1.050625"));
        assert_eq!(growth_factor(0.025, 0, "inflation").unwrap(), Decimal::ONE);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert_eq!(
            decimal_from_f64(f64::INFINITY, "rate"),
            Err(FinanceError::Overflow("rate"))
        );
        assert!(decimal_from_f64(f64::NAN, "rate").is_err());
    }
}
