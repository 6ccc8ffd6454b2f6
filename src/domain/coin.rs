//! Denominated token amount.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Amount;
use crate::error::{LiquidityError, Result};

/// A non-negative amount of a single denomination.
///
/// `Coin` is the unit of every balance movement in the engine. The
/// constructor refuses negative amounts so a `Coin` that exists is always
/// safe to transfer; zero-amount coins are permitted and are skipped by
/// the transfer layer.
///
/// # Examples
///
/// ```
/// use tidepool::domain::{Amount, Coin};
///
/// let c = Coin::new("uatom", Amount::new(1_000u32)).expect("non-negative");
/// assert_eq!(format!("{c}"), "1000uatom");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    denom: String,
    amount: Amount,
}

impl Coin {
    /// Creates a new `Coin`.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::NegativeAmount`] if `amount` is negative
    /// and [`LiquidityError::InvalidDenom`] if `denom` is empty.
    pub fn new(denom: impl Into<String>, amount: Amount) -> Result<Self> {
        let denom = denom.into();
        if denom.is_empty() {
            return Err(LiquidityError::InvalidDenom("denom must not be empty"));
        }
        if amount.is_negative() {
            return Err(LiquidityError::NegativeAmount("coin amount"));
        }
        Ok(Self { denom, amount })
    }

    /// Returns the denomination.
    #[must_use]
    pub fn denom(&self) -> &str {
        &self.denom
    }

    /// Returns the amount.
    #[must_use]
    pub const fn amount(&self) -> &Amount {
        &self.amount
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns a coin of the same denomination with a different amount.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::NegativeAmount`] if `amount` is negative.
    pub fn with_amount(&self, amount: Amount) -> Result<Self> {
        Self::new(self.denom.clone(), amount)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}
