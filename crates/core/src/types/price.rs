//! Non-negative decimal prices.
//!
//! Prices are exact decimals so that cart subtotals are the true sum of
//! `quantity × price`; rounding to cents happens only in [`Price::display`].
//! On the wire a price is a plain JSON number (`999`, `5.5`), which is what
//! the catalog API and the persisted cart slot both carry.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input could not be parsed as a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A price in the store currency (USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount.normalize()))
    }

    /// Parse a price from user input such as `"1099"` or `"5.50"`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` for non-numeric input and
    /// `PriceError::Negative` for amounts below zero.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// Whether the amount has no fraction of a cent (`5.5`, not `5.555`).
    #[must_use]
    pub const fn is_whole_cents(&self) -> bool {
        self.0.scale() <= 2
    }

    /// The exact decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display, rounded half-up to cents (e.g. `"$36.50"`).
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("${rounded:.2}")
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_rejected() {
        assert!(matches!(
            Price::new(Decimal::new(-1, 0)),
            Err(PriceError::Negative(_))
        ));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Price::parse("1099").unwrap().display(), "$1099.00");
        assert_eq!(Price::parse(" 5.5 ").unwrap().display(), "$5.50");
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_whole_cents() {
        assert!(Price::parse("5.50").unwrap().is_whole_cents());
        assert!(Price::parse("5.5000").unwrap().is_whole_cents());
        assert!(Price::parse("999").unwrap().is_whole_cents());
        assert!(!Price::parse("5.555").unwrap().is_whole_cents());
    }

    #[test]
    fn test_display_rounds_half_up() {
        assert_eq!(Price::parse("0.125").unwrap().display(), "$0.13");
    }

    #[test]
    fn test_multiply_and_sum() {
        let total: Price = [Price::parse("10").unwrap() * 2, Price::parse("5.5").unwrap() * 3]
            .into_iter()
            .sum();
        assert_eq!(total.amount(), Decimal::new(365, 1));
    }

    #[test]
    fn test_serializes_as_json_number() {
        let price = Price::parse("5.5").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "5.5");

        let parsed: Price = serde_json::from_str("999").unwrap();
        assert_eq!(parsed, Price::parse("999").unwrap());
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }
}
