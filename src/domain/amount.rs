//! Arbitrary-precision token amount.

use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{LiquidityError, Result};

/// A raw token amount in the smallest unit of its denomination.
///
/// `Amount` wraps an arbitrary-precision signed integer, so addition,
/// subtraction and multiplication are exact and cannot overflow.
/// Division truncates toward zero — the canonical rounding mode for all
/// payouts in the engine. Negative values are representable (differences
/// show up in invariant arithmetic) but [`Coin`](super::Coin) refuses
/// them at its boundary.
///
/// # Examples
///
/// ```
/// use tidepool::domain::Amount;
///
/// let a = Amount::new(100u32);
/// let b = Amount::new(200u32);
/// assert_eq!(&a + &b, Amount::new(300u32));
/// assert_eq!(b.checked_div_trunc(&Amount::new(3u32)), Ok(Amount::new(66u32)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[must_use]
pub struct Amount(BigInt);

impl Amount {
    /// Creates a new `Amount` from any integer convertible to `BigInt`.
    pub fn new<T: Into<BigInt>>(value: T) -> Self {
        Self(value.into())
    }

    /// The zero amount.
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    /// Returns a reference to the underlying integer.
    #[must_use]
    pub const fn get(&self) -> &BigInt {
        &self.0
    }

    /// Consumes the amount, returning the underlying integer.
    #[must_use]
    pub fn into_inner(self) -> BigInt {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    /// Returns `true` if the amount is strictly negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Multiplies two amounts exactly.
    pub fn mul(&self, other: &Self) -> Self {
        Self(&self.0 * &other.0)
    }

    /// Division truncating toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::DivisionByZero`] if `divisor` is zero.
    pub fn checked_div_trunc(&self, divisor: &Self) -> Result<Self> {
        if divisor.is_zero() {
            return Err(LiquidityError::DivisionByZero);
        }
        Ok(Self(&self.0 / &divisor.0))
    }

    /// Integer square root, truncated.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::NegativeAmount`] for negative inputs.
    pub fn isqrt(&self) -> Result<Self> {
        if self.is_negative() {
            return Err(LiquidityError::NegativeAmount("isqrt of negative amount"));
        }
        Ok(Self(self.0.sqrt()))
    }

    /// Returns the smaller of two amounts.
    pub fn min(&self, other: &Self) -> Self {
        if self <= other {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// Returns the larger of two amounts.
    pub fn max(&self, other: &Self) -> Self {
        if self >= other {
            self.clone()
        } else {
            other.clone()
        }
    }
}

impl From<BigInt> for Amount {
    fn from(value: BigInt) -> Self {
        Self(value)
    }
}

impl Add for &Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl Sub for &Amount {
    type Output = Amount;

    fn sub(self, rhs: &Amount) -> Amount {
        Amount(&self.0 - &rhs.0)
    }
}

impl AddAssign<&Amount> for Amount {
    fn add_assign(&mut self, rhs: &Amount) {
        self.0 += &rhs.0;
    }
}

impl SubAssign<&Amount> for Amount {
    fn sub_assign(&mut self, rhs: &Amount) {
        self.0 -= &rhs.0;
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- Construction & accessors -------------------------------------------

    #[test]
    fn new_and_get() {
        let a = Amount::new(42u32);
        assert_eq!(a.get(), &BigInt::from(42));
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Amount::default(), Amount::zero());
    }

    #[test]
    fn sign_predicates() {
        assert!(Amount::zero().is_zero());
        assert!(Amount::new(1).is_positive());
        assert!(Amount::new(-1).is_negative());
        assert!(!Amount::new(-1).is_positive());
    }

    // -- Arithmetic ----------------------------------------------------------

    #[test]
    fn add_sub_exact() {
        let a = Amount::new(100u32);
        let b = Amount::new(30u32);
        assert_eq!(&a + &b, Amount::new(130u32));
        assert_eq!(&a - &b, Amount::new(70u32));
        assert_eq!(&b - &a, Amount::new(-70));
    }

    #[test]
    fn mul_exact_beyond_machine_width() {
        // 2^127 * 2^127 exceeds every primitive integer width
        let big = Amount::new(BigInt::from(1u8) << 127);
        let sq = big.mul(&big);
        assert_eq!(sq, Amount::new(BigInt::from(1u8) << 254));
    }

    #[test]
    fn assign_ops() {
        let mut a = Amount::new(5u32);
        a += &Amount::new(7u32);
        assert_eq!(a, Amount::new(12u32));
        a -= &Amount::new(2u32);
        assert_eq!(a, Amount::new(10u32));
    }

    // -- checked_div_trunc ----------------------------------------------------

    #[test]
    fn div_truncates_toward_zero() {
        let a = Amount::new(10u32);
        assert_eq!(a.checked_div_trunc(&Amount::new(3u32)), Ok(Amount::new(3u32)));
        // Negative quotient also truncates toward zero, not floor
        let n = Amount::new(-10);
        assert_eq!(n.checked_div_trunc(&Amount::new(3u32)), Ok(Amount::new(-3)));
    }

    #[test]
    fn div_by_zero_rejected() {
        let a = Amount::new(10u32);
        assert_eq!(
            a.checked_div_trunc(&Amount::zero()),
            Err(LiquidityError::DivisionByZero)
        );
    }

    // -- isqrt ----------------------------------------------------------------

    #[test]
    fn isqrt_exact_and_truncated() {
        assert_eq!(Amount::new(0).isqrt(), Ok(Amount::zero()));
        assert_eq!(Amount::new(1_000_000u64).isqrt(), Ok(Amount::new(1_000u32)));
        assert_eq!(Amount::new(15u32).isqrt(), Ok(Amount::new(3u32)));
    }

    #[test]
    fn isqrt_negative_rejected() {
        assert!(Amount::new(-4).isqrt().is_err());
    }

    // -- min / max / abs ------------------------------------------------------

    #[test]
    fn min_max_abs() {
        let a = Amount::new(3u32);
        let b = Amount::new(7u32);
        assert_eq!(a.clone().min(b.clone()), a);
        assert_eq!(a.clone().max(b.clone()), b);
        assert_eq!(Amount::new(-5).abs(), Amount::new(5u32));
    }

    // -- Display & ordering ----------------------------------------------------

    #[test]
    fn display() {
        assert_eq!(format!("{}", Amount::new(1_000_000u64)), "1000000");
    }

    #[test]
    fn ordering() {
        assert!(Amount::new(1) < Amount::new(2));
        assert!(Amount::new(-1) < Amount::zero());
    }

    // -- Serde round-trip ------------------------------------------------------

    #[test]
    fn serde_round_trip() {
        let a = Amount::new(BigInt::from(1u8) << 200);
        let Ok(json) = serde_json::to_string(&a) else {
            panic!("serialize");
        };
        let Ok(back) = serde_json::from_str::<Amount>(&json) else {
            panic!("deserialize");
        };
        assert_eq!(a, back);
    }
}
