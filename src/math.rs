//! Mixed-precision arithmetic helpers.
//!
//! Amounts are arbitrary-precision integers while prices, fee rates and
//! invariant tolerances are fixed-point decimals. Every crossing between
//! the two worlds happens here, with one rounding rule: truncation toward
//! zero. Multiplying or dividing an [`Amount`] by a [`Decimal`] is exact
//! up to that final truncation — the decimal is decomposed into its
//! integer mantissa and power-of-ten scale and the whole computation runs
//! in big integers.

use core::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::Amount;
use crate::error::{LiquidityError, Result};

/// Returns `10^scale` as a big integer. A decimal's scale is at most 28,
/// so the power always fits an `i128`.
fn pow10(scale: u32) -> BigInt {
    BigInt::from(10i128.pow(scale))
}

/// Converts an [`Amount`] to a [`Decimal`].
///
/// # Errors
///
/// Returns [`LiquidityError::PrecisionLoss`] if the amount magnitude
/// exceeds the 96-bit decimal mantissa.
pub fn dec_from_amount(amount: &Amount) -> Result<Decimal> {
    let v = amount
        .get()
        .to_i128()
        .ok_or(LiquidityError::PrecisionLoss("amount exceeds i128"))?;
    Decimal::try_from(v).map_err(|_| LiquidityError::PrecisionLoss("amount exceeds decimal range"))
}

/// Computes the ratio `numer / denom` as a decimal.
///
/// # Errors
///
/// Returns [`LiquidityError::DivisionByZero`] if `denom` is zero and
/// [`LiquidityError::PrecisionLoss`] if either amount does not fit a
/// decimal.
pub fn ratio(numer: &Amount, denom: &Amount) -> Result<Decimal> {
    if denom.is_zero() {
        return Err(LiquidityError::DivisionByZero);
    }
    let n = dec_from_amount(numer)?;
    let d = dec_from_amount(denom)?;
    n.checked_div(d)
        .ok_or(LiquidityError::DecimalOverflow("amount ratio"))
}

/// Multiplies an amount by a decimal, truncating toward zero.
pub fn mul_trunc(amount: &Amount, rate: Decimal) -> Amount {
    let mantissa = BigInt::from(rate.mantissa());
    Amount::from((amount.get() * mantissa) / pow10(rate.scale()))
}

/// Divides an amount by a decimal, truncating toward zero.
///
/// # Errors
///
/// Returns [`LiquidityError::DivisionByZero`] if `rate` is zero.
pub fn div_trunc(amount: &Amount, rate: Decimal) -> Result<Amount> {
    if rate.is_zero() {
        return Err(LiquidityError::DivisionByZero);
    }
    let mantissa = BigInt::from(rate.mantissa());
    Ok(Amount::from(
        (amount.get() * pow10(rate.scale())) / mantissa,
    ))
}

/// Compares `a` against `b · rate` exactly, with no intermediate rounding.
#[must_use]
pub fn cmp_scaled(a: &Amount, b: &Amount, rate: Decimal) -> Ordering {
    let lhs = a.get() * pow10(rate.scale());
    let rhs = b.get() * BigInt::from(rate.mantissa());
    lhs.cmp(&rhs)
}

/// Relative error `|actual − expected| / expected`.
///
/// Returns `1.0` (100%) when `expected` is zero, so callers never divide
/// by zero inside an invariant check.
#[must_use]
pub fn error_rate(expected: Decimal, actual: Decimal) -> Decimal {
    if expected.is_zero() {
        return Decimal::ONE;
    }
    ((actual - expected) / expected).abs()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // -- dec_from_amount ------------------------------------------------------

    #[test]
    fn dec_from_amount_small() {
        let Ok(d) = dec_from_amount(&Amount::new(1_000_000u64)) else {
            panic!("expected Ok");
        };
        assert_eq!(d, dec!(1000000));
    }

    #[test]
    fn dec_from_amount_too_large() {
        let huge = Amount::new(BigInt::from(1u8) << 200);
        assert!(dec_from_amount(&huge).is_err());
    }

    // -- ratio ----------------------------------------------------------------

    #[test]
    fn ratio_basic() {
        let Ok(r) = ratio(&Amount::new(100_000_000u64), &Amount::new(50_000_000u64)) else {
            panic!("expected Ok");
        };
        assert_eq!(r, dec!(2));
    }

    #[test]
    fn ratio_zero_denominator() {
        assert_eq!(
            ratio(&Amount::new(1u32), &Amount::zero()),
            Err(LiquidityError::DivisionByZero)
        );
    }

    // -- mul_trunc / div_trunc ------------------------------------------------

    #[test]
    fn mul_trunc_truncates_toward_zero() {
        // 1000 * 0.003 = 3
        assert_eq!(mul_trunc(&Amount::new(1_000u32), dec!(0.003)), Amount::new(3u32));
        // 999 * 0.003 = 2.997 → 2
        assert_eq!(mul_trunc(&Amount::new(999u32), dec!(0.003)), Amount::new(2u32));
    }

    #[test]
    fn mul_trunc_exact_beyond_decimal_range() {
        // The amount itself need not fit a decimal
        let huge = Amount::new(BigInt::from(1u8) << 150);
        let half = mul_trunc(&huge, dec!(0.5));
        assert_eq!(half, Amount::new(BigInt::from(1u8) << 149));
    }

    #[test]
    fn div_trunc_basic() {
        // 1000 / 2.0 = 500
        assert_eq!(
            div_trunc(&Amount::new(1_000u32), dec!(2.0)),
            Ok(Amount::new(500u32))
        );
        // 1000 / 3.0 = 333.33… → 333
        assert_eq!(
            div_trunc(&Amount::new(1_000u32), dec!(3.0)),
            Ok(Amount::new(333u32))
        );
    }

    #[test]
    fn div_trunc_by_zero() {
        assert_eq!(
            div_trunc(&Amount::new(1u32), Decimal::ZERO),
            Err(LiquidityError::DivisionByZero)
        );
    }

    #[test]
    fn mul_then_div_round_trip_within_truncation() {
        let a = Amount::new(123_457u64);
        let p = dec!(1.9);
        let Ok(back) = div_trunc(&mul_trunc(&a, p), p) else {
            panic!("expected Ok");
        };
        assert!(&a - &back <= Amount::new(1u32));
        assert!(back <= a);
    }

    // -- cmp_scaled -----------------------------------------------------------

    #[test]
    fn cmp_scaled_exact() {
        // 7 vs 3 * 2.5 = 7.5 → Less, with no truncation masking it
        assert_eq!(
            cmp_scaled(&Amount::new(7u32), &Amount::new(3u32), dec!(2.5)),
            Ordering::Less
        );
        assert_eq!(
            cmp_scaled(&Amount::new(8u32), &Amount::new(3u32), dec!(2.5)),
            Ordering::Greater
        );
        assert_eq!(
            cmp_scaled(&Amount::new(6u32), &Amount::new(3u32), dec!(2)),
            Ordering::Equal
        );
    }

    // -- error_rate -----------------------------------------------------------

    #[test]
    fn error_rate_basic() {
        assert_eq!(error_rate(dec!(2.0), dec!(2.1)), dec!(0.05));
        assert_eq!(error_rate(dec!(2.0), dec!(1.9)), dec!(0.05));
        assert_eq!(error_rate(dec!(2.0), dec!(2.0)), Decimal::ZERO);
    }

    #[test]
    fn error_rate_zero_expected_is_total() {
        assert_eq!(error_rate(Decimal::ZERO, dec!(5)), Decimal::ONE);
    }
}
