//! Prices

use std::{fmt, iter::Sum, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Errors that can occur while building or combining prices.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The value could not be read as a decimal amount.
    #[error("invalid price {0:?}")]
    Invalid(String),

    /// Prices can't be negative.
    #[error("price {0} is negative")]
    Negative(Decimal),

    /// Multiplying or summing prices left the representable range.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// A non-negative monetary amount.
///
/// Remote payloads send amounts either as JSON strings (`"12.50"`) or as JSON
/// numbers (`12.5`); both normalize into the same exact decimal here, so no
/// caller ever has to coerce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Creates a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] when `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }

        Ok(Self(amount.normalize()))
    }

    /// Zero.
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Creates a price from whole currency units.
    pub fn from_units(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    /// Parses a price from its textual form, accepting plain and scientific notation.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the text is not a non-negative decimal.
    pub fn parse(raw: &str) -> Result<Self, PriceError> {
        let trimmed = raw.trim();

        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|error| PriceError::Invalid(format!("{raw}: {error}")))?;

        Self::new(amount)
    }

    /// The underlying decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Is this price zero?
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Unit price multiplied by `quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] when the product is not representable.
    pub fn times(self, quantity: u32) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(|amount| Self(amount.normalize()))
            .ok_or(PriceError::Overflow)
    }

    /// Adds two prices.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] when the sum is not representable.
    pub fn checked_add(self, other: Self) -> Result<Self, PriceError> {
        self.0
            .checked_add(other.0)
            .map(|amount| Self(amount.normalize()))
            .ok_or(PriceError::Overflow)
    }

    /// Sums a sequence of prices.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] when the total is not representable.
    pub fn total<I>(prices: I) -> Result<Self, PriceError>
    where
        I: IntoIterator<Item = Self>,
    {
        prices
            .into_iter()
            .try_fold(Self::zero(), Self::checked_add)
    }
}

impl Sum<Price> for Result<Price, PriceError> {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        Price::total(iter)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// Wire form of an amount: either a string or a bare number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => text,
            RawAmount::Number(number) => number.to_string(),
        };

        Self::parse(&raw).map_err(de::Error::custom)
    }
}
