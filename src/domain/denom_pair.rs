//! Ordered pair of distinct reserve denominations.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LiquidityError, Result};

/// An ordered pair of distinct denominations, canonically sorted.
///
/// The canonical ordering guarantees `denom_a() < denom_b()`
/// alphabetically, preventing duplicate pools such as `(X, Y)` and
/// `(Y, X)`.
///
/// # Examples
///
/// ```
/// use tidepool::domain::DenomPair;
///
/// // Order is enforced automatically:
/// let pair = DenomPair::new("denomY", "denomX").expect("distinct denoms");
/// assert_eq!(pair.denom_a(), "denomX");
/// assert_eq!(pair.denom_b(), "denomY");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DenomPair {
    denom_a: String,
    denom_b: String,
}

impl DenomPair {
    /// Creates a new canonically-ordered `DenomPair`.
    ///
    /// The two denominations are automatically sorted alphabetically.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::InvalidDenomPair`] if the denoms are
    /// equal, and [`LiquidityError::InvalidDenom`] if either is empty.
    pub fn new(denom1: impl Into<String>, denom2: impl Into<String>) -> Result<Self> {
        let (d1, d2) = (denom1.into(), denom2.into());
        if d1.is_empty() || d2.is_empty() {
            return Err(LiquidityError::InvalidDenom("denom must not be empty"));
        }
        if d1 == d2 {
            return Err(LiquidityError::InvalidDenomPair(
                "pair requires two distinct denoms",
            ));
        }
        let (denom_a, denom_b) = if d1 < d2 { (d1, d2) } else { (d2, d1) };
        Ok(Self { denom_a, denom_b })
    }

    /// Returns the first denomination (alphabetically lower).
    #[must_use]
    pub fn denom_a(&self) -> &str {
        &self.denom_a
    }

    /// Returns the second denomination (alphabetically higher).
    #[must_use]
    pub fn denom_b(&self) -> &str {
        &self.denom_b
    }

    /// Returns `true` if the given denom is part of this pair.
    #[must_use]
    pub fn contains(&self, denom: &str) -> bool {
        self.denom_a == denom || self.denom_b == denom
    }

    /// Returns the counterpart of `denom` in this pair.
    ///
    /// # Errors
    ///
    /// Returns [`LiquidityError::InvalidDenom`] if `denom` is not in the pair.
    pub fn other(&self, denom: &str) -> Result<&str> {
        if denom == self.denom_a {
            Ok(&self.denom_b)
        } else if denom == self.denom_b {
            Ok(&self.denom_a)
        } else {
            Err(LiquidityError::InvalidDenom("denom is not part of this pair"))
        }
    }
}

impl fmt::Display for DenomPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.denom_a, self.denom_b)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn valid_pair_preserves_order() {
        let Ok(pair) = DenomPair::new("denomX", "denomY") else {
            panic!("expected Ok");
        };
        assert_eq!(pair.denom_a(), "denomX");
        assert_eq!(pair.denom_b(), "denomY");
    }

    #[test]
    fn auto_sorts_reversed_input() {
        let Ok(pair) = DenomPair::new("denomY", "denomX") else {
            panic!("expected Ok");
        };
        assert_eq!(pair.denom_a(), "denomX");
        assert_eq!(pair.denom_b(), "denomY");
    }

    #[test]
    fn rejects_equal_denoms() {
        assert_eq!(
            DenomPair::new("denomX", "denomX"),
            Err(LiquidityError::InvalidDenomPair(
                "pair requires two distinct denoms"
            ))
        );
    }

    #[test]
    fn rejects_empty_denom() {
        assert!(DenomPair::new("", "denomY").is_err());
    }

    #[test]
    fn contains_and_other() {
        let Ok(pair) = DenomPair::new("denomX", "denomY") else {
            panic!("expected Ok");
        };
        assert!(pair.contains("denomX"));
        assert!(pair.contains("denomY"));
        assert!(!pair.contains("denomZ"));
        assert_eq!(pair.other("denomX"), Ok("denomY"));
        assert_eq!(pair.other("denomY"), Ok("denomX"));
        assert!(pair.other("denomZ").is_err());
    }

    #[test]
    fn equality_of_sorted_pairs() {
        let (Ok(p1), Ok(p2)) = (
            DenomPair::new("denomX", "denomY"),
            DenomPair::new("denomY", "denomX"),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(p1, p2);
    }

    #[test]
    fn display() {
        let Ok(pair) = DenomPair::new("denomY", "denomX") else {
            panic!("expected Ok");
        };
        assert_eq!(format!("{pair}"), "denomX/denomY");
    }
}
