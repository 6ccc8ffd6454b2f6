//! Exchange-rate type for pool and order prices.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LiquidityError, Result};

/// A pool or limit price as a fixed-point decimal ratio.
///
/// The engine quotes every price the same way the pool does: the reserve
/// ratio `X / Y`. `Price` wraps a [`Decimal`] that is validated
/// non-negative at construction, and is totally ordered so it can key
/// the order book.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use tidepool::domain::Price;
///
/// let p = Price::new(Decimal::new(2, 0)).expect("non-negative");
/// assert_eq!(p.get(), Decimal::from(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    /// Price ratio of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Price ratio of 1:1.
    pub const ONE: Self = Self(Decimal::ONE);

    /// Creates a new `Price` from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::InvalidPrice`] if the value is negative.
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() {
            return Err(LiquidityError::InvalidPrice("price must be non-negative"));
        }
        Ok(Self(value))
    }

    /// Returns the underlying decimal value.
    #[must_use]
    pub const fn get(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the price is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Computes the reciprocal price (`1 / self`).
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::DivisionByZero`] if the price is zero.
    pub fn inverse(&self) -> Result<Self> {
        if self.0.is_zero() {
            return Err(LiquidityError::DivisionByZero);
        }
        let inv = Decimal::ONE
            .checked_div(self.0)
            .ok_or(LiquidityError::DecimalOverflow("price inverse"))?;
        Self::new(inv)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_valid() {
        let Ok(p) = Price::new(dec!(1.5)) else {
            panic!("expected Ok");
        };
        assert_eq!(p.get(), dec!(1.5));
    }

    #[test]
    fn new_zero() {
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn new_negative_rejected() {
        assert!(Price::new(dec!(-1)).is_err());
    }

    // -- Constants ----------------------------------------------------------

    #[test]
    fn constants() {
        assert!(Price::ZERO.is_zero());
        assert_eq!(Price::ONE.get(), Decimal::ONE);
    }

    // -- inverse ------------------------------------------------------------

    #[test]
    fn inverse_normal() {
        let Ok(p) = Price::new(dec!(2)) else {
            panic!("expected Ok");
        };
        let Ok(inv) = p.inverse() else {
            panic!("expected Ok");
        };
        assert_eq!(inv.get(), dec!(0.5));
    }

    #[test]
    fn inverse_zero_rejected() {
        assert_eq!(Price::ZERO.inverse(), Err(LiquidityError::DivisionByZero));
    }

    // -- Ordering -----------------------------------------------------------

    #[test]
    fn ordering_ignores_scale() {
        let (Ok(a), Ok(b)) = (Price::new(dec!(1.50)), Price::new(dec!(1.5))) else {
            panic!("expected Ok");
        };
        assert_eq!(a, b);
        assert!(Price::ZERO < a);
    }

    // -- Display ------------------------------------------------------------

    #[test]
    fn display() {
        let Ok(p) = Price::new(dec!(1.5)) else {
            panic!("expected Ok");
        };
        assert_eq!(format!("{p}"), "1.5");
    }
}
