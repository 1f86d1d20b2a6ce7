//! Monetary amounts in integer minor units.
//!
//! Every amount the storefront handles is in Brazilian reais, so `Money` carries
//! no currency code. Amounts are stored as centavos in an `i64`; parsing and
//! locale formatting live in the checkout engine's `price` module.

use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// An amount of money in minor currency units (centavos).
///
/// Arithmetic is integer-only. `Add` follows the standard integer overflow
/// behavior; use the `checked_*` methods where an input is not trusted.
///
/// ```
/// use vetmart_core::Money;
///
/// let price = Money::from_minor(4590);
/// assert_eq!(price.checked_mul(2), Some(Money::from_minor(9180)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero reais.
    pub const ZERO: Self = Self(0);

    /// Create an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Whether this amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(minor) => Some(Self(minor)),
            None => None,
        }
    }

    /// Multiply by a quantity, returning `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Self(minor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_of_amounts() {
        let total: Money = [4590, 4590, 14990]
            .into_iter()
            .map(Money::from_minor)
            .sum();
        assert_eq!(total, Money::from_minor(24170));
    }

    #[test]
    fn test_checked_mul_overflow() {
        assert_eq!(Money::from_minor(i64::MAX).checked_mul(2), None);
        assert_eq!(Money::from_minor(150).checked_mul(3), Some(Money::from_minor(450)));
    }

    #[test]
    fn test_checked_add_overflow() {
        assert_eq!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)), None);
    }

    #[test]
    fn test_zero() {
        assert!(Money::ZERO.is_zero());
        assert!(Money::default().is_zero());
        assert!(!Money::from_minor(1).is_zero());
    }

    #[test]
    fn test_serializes_as_minor_units() {
        let json = serde_json::to_string(&Money::from_minor(24170)).unwrap();
        assert_eq!(json, "24170");
    }
}
