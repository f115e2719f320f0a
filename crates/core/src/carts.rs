//! Carts

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    items::{CartItem, ItemId, NewCartItem, Quantity, QuantityError, Sku},
    prices::{Price, PriceError},
};

/// Errors raised by cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// No line with the given id.
    #[error("cart item {0} not found")]
    ItemNotFound(ItemId),

    /// Requested quantity is not usable.
    #[error(transparent)]
    Quantity(#[from] QuantityError),

    /// Subtotal or total arithmetic failed.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// Result of [`Cart::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The line now holds the requested quantity.
    Updated,

    /// The requested quantity was zero or negative, so the line is gone.
    Removed,
}

/// Cart
///
/// Lines keep insertion order. After every mutation each line's subtotal equals
/// its unit price times its quantity and the cart total equals the sum of the
/// line subtotals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    total: Price,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        let now = Timestamp::now();

        Self {
            items: Vec::new(),
            total: Price::zero(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a cart holding the given lines, recomputing every subtotal and
    /// the total.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Price`] when the arithmetic overflows.
    pub fn from_items(items: impl Into<Vec<CartItem>>) -> Result<Self, CartError> {
        let mut cart = Self {
            items: items.into(),
            ..Self::new()
        };

        cart.reconcile()?;

        Ok(cart)
    }

    /// Recomputes every subtotal and the total from unit prices and quantities.
    ///
    /// Used after reading a cart from storage, where nothing guarantees the
    /// stored figures still agree with each other.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Price`] when the arithmetic overflows.
    pub fn reconcile(&mut self) -> Result<(), CartError> {
        for item in &mut self.items {
            item.recompute_subtotal()?;
        }

        self.total = self.sum_subtotals()?;

        Ok(())
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Grand total.
    pub fn total(&self) -> Price {
        self.total
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Does the cart have no lines?
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity().get()))
            .sum()
    }

    /// When the cart was created.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// When the cart last changed.
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Line with the given id.
    pub fn item(&self, id: &ItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Line holding the given variant.
    pub fn item_by_sku(&self, sku: &Sku) -> Option<&CartItem> {
        self.items.iter().find(|item| item.sku() == sku)
    }

    /// Adds an item.
    ///
    /// An existing line for the same SKU absorbs the new quantity and keeps its
    /// unit price snapshot; otherwise a new line with a fresh id is appended.
    ///
    /// # Errors
    ///
    /// - [`CartError::Quantity`]: the merged quantity doesn't fit the line
    ///   counter. The line is left unchanged.
    /// - [`CartError::Price`]: subtotal or total overflow.
    #[expect(
        clippy::indexing_slicing,
        reason = "index comes from position() or the push just above"
    )]
    pub fn add(&mut self, item: NewCartItem) -> Result<&CartItem, CartError> {
        let index = if let Some(index) = self.items.iter().position(|line| line.sku() == &item.sku) {
            let line = &mut self.items[index];

            line.set_quantity(line.quantity().checked_add(item.quantity)?)?;

            index
        } else {
            self.items.push(CartItem::new(ItemId::generate(), item)?);

            self.items.len() - 1
        };

        self.settle()?;

        Ok(&self.items[index])
    }

    /// Sets the quantity of a line. Zero or negative quantities remove it.
    ///
    /// Removing a line that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// - [`CartError::ItemNotFound`]: positive quantity for an unknown line.
    /// - [`CartError::Quantity`]: quantity above the line counter's range.
    /// - [`CartError::Price`]: subtotal or total overflow.
    pub fn update(&mut self, id: &ItemId, quantity: i64) -> Result<UpdateOutcome, CartError> {
        if quantity <= 0 {
            self.remove(id)?;

            return Ok(UpdateOutcome::Removed);
        }

        let quantity = Quantity::try_from(quantity)?;

        let line = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;

        line.set_quantity(quantity)?;

        self.settle()?;

        Ok(UpdateOutcome::Updated)
    }

    /// Removes a line, returning it if it was present.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Price`] when re-totalling overflows.
    pub fn remove(&mut self, id: &ItemId) -> Result<Option<CartItem>, CartError> {
        let Some(index) = self.items.iter().position(|item| item.id() == id) else {
            return Ok(None);
        };

        let removed = self.items.remove(index);

        self.settle()?;

        Ok(Some(removed))
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.total = Price::zero();
        self.updated_at = Timestamp::now();
    }

    fn sum_subtotals(&self) -> Result<Price, PriceError> {
        Price::total(self.items.iter().map(CartItem::subtotal))
    }

    fn settle(&mut self) -> Result<(), CartError> {
        self.total = self.sum_subtotals()?;
        self.updated_at = Timestamp::now();

        Ok(())
    }
}
