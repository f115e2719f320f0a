//! Items

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::prices::{Price, PriceError};

/// Errors raised when a SKU is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkuError {
    /// SKUs must contain at least one non-whitespace character.
    #[error("sku cannot be empty")]
    Empty,
}

/// Stock-keeping identifier of a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sku(String);

impl Sku {
    /// Creates a SKU, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`SkuError::Empty`] for blank input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, SkuError> {
        let trimmed = raw.as_ref().trim();

        if trimmed.is_empty() {
            return Err(SkuError::Empty);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The SKU as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Sku {
    type Error = SkuError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sku> for String {
    fn from(value: Sku) -> Self {
        value.0
    }
}

/// Identifier of a cart line.
///
/// Guest lines are identified by client-generated UUIDs, server lines by whatever
/// the cart service assigns. Numeric server ids are kept in their decimal string
/// form so both kinds compare the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Generates a fresh client-side line id.
    pub fn generate() -> Self {
        Self::from(Uuid::now_v7())
    }

    /// Wraps an id assigned elsewhere.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Uuid> for ItemId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => Self(text),
            RawId::Number(number) => Self(number.to_string()),
        })
    }
}

/// Errors raised when a quantity is out of range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// Lines always hold at least one unit.
    #[error("quantity must be at least 1")]
    Zero,

    /// Requested quantity does not fit the line counter.
    #[error("quantity {0} is out of range")]
    OutOfRange(i64),
}

/// Number of units on a cart line. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Creates a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] for zero.
    pub fn new(value: u32) -> Result<Self, QuantityError> {
        if value == 0 {
            return Err(QuantityError::Zero);
        }

        Ok(Self(value))
    }

    /// The raw unit count.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Adds two quantities.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::OutOfRange`] with the unrepresentable sum.
    pub fn checked_add(self, other: Self) -> Result<Self, QuantityError> {
        self.0.checked_add(other.0).map(Self).ok_or_else(|| {
            QuantityError::OutOfRange(i64::from(self.0) + i64::from(other.0))
        })
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let value = u32::try_from(value).map_err(|_conversion| QuantityError::OutOfRange(value))?;

        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Item to be added to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    /// Variant being added.
    pub sku: Sku,

    /// Units to add.
    pub quantity: Quantity,

    /// Unit price shown to the visitor when the item was added.
    pub price: Price,

    /// Product display name.
    pub name: Option<String>,
}

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    id: ItemId,
    sku: Sku,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    quantity: Quantity,
    price: Price,
    subtotal: Price,
}

impl CartItem {
    /// Creates a line from a new item, computing its subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the subtotal overflows.
    pub fn new(id: ItemId, item: NewCartItem) -> Result<Self, PriceError> {
        let subtotal = item.price.times(item.quantity.get())?;

        Ok(Self {
            id,
            sku: item.sku,
            name: item.name,
            quantity: item.quantity,
            price: item.price,
            subtotal,
        })
    }

    /// Builds a line from values reported by a remote cart.
    ///
    /// The subtotal is always recomputed from price and quantity; a reported
    /// subtotal that disagrees is logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the subtotal overflows.
    pub fn from_parts(
        id: ItemId,
        sku: Sku,
        name: Option<String>,
        quantity: Quantity,
        price: Price,
        subtotal: Option<Price>,
    ) -> Result<Self, PriceError> {
        let computed = price.times(quantity.get())?;

        if let Some(reported) = subtotal.filter(|reported| *reported != computed) {
            warn!(%id, %reported, %computed, "reported line subtotal disagrees with price and quantity");
        }

        Ok(Self {
            id,
            sku,
            name,
            quantity,
            price,
            subtotal: computed,
        })
    }

    /// Line id.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Variant SKU.
    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    /// Display name, when known.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Units on the line.
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Unit price snapshot.
    pub fn price(&self) -> Price {
        self.price
    }

    /// Unit price times quantity.
    pub fn subtotal(&self) -> Price {
        self.subtotal
    }

    /// Sets the quantity and recomputes the subtotal. Leaves the line untouched on error.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the subtotal overflows.
    pub fn set_quantity(&mut self, quantity: Quantity) -> Result<(), PriceError> {
        self.subtotal = self.price.times(quantity.get())?;
        self.quantity = quantity;

        Ok(())
    }

    pub(crate) fn recompute_subtotal(&mut self) -> Result<(), PriceError> {
        self.subtotal = self.price.times(self.quantity.get())?;

        Ok(())
    }
}
