//! Guest cart store.
//!
//! Keeps an unauthenticated visitor's cart in client-side [`Storage`] under a
//! single namespaced key. Every mutation is applied in memory and immediately
//! followed by a full write of the cart.

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    carts::{Cart, CartError, UpdateOutcome},
    items::{CartItem, ItemId, NewCartItem},
    storage::{Storage, StorageError},
};

/// Storage key holding the serialized guest cart.
pub const GUEST_CART_KEY: &str = "rouge.cart.v1";

/// Errors raised by the guest cart store.
#[derive(Debug, Error)]
pub enum GuestCartError {
    /// The mutation itself was rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Reading or writing storage failed.
    #[error("guest cart storage failed")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("failed to encode guest cart")]
    Encode(#[source] serde_json::Error),
}

/// Guest cart backed by client-side storage.
pub struct GuestCartStore {
    storage: Arc<dyn Storage>,
    cart: Cart,
}

impl fmt::Debug for GuestCartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuestCartStore")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

impl GuestCartStore {
    /// Loads the guest cart from storage.
    ///
    /// A missing entry yields an empty cart. An entry that can't be decoded is
    /// deleted and replaced by an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`GuestCartError::Storage`] when storage can't be read at all.
    pub fn load(storage: Arc<dyn Storage>) -> Result<Self, GuestCartError> {
        let cart = match storage.get(GUEST_CART_KEY)? {
            Some(raw) => decode(&raw).unwrap_or_else(|reason| {
                warn!(key = GUEST_CART_KEY, %reason, "discarding unreadable guest cart");

                if let Err(error) = storage.remove(GUEST_CART_KEY) {
                    warn!(key = GUEST_CART_KEY, %error, "failed to delete unreadable guest cart");
                }

                Cart::new()
            }),
            None => Cart::new(),
        };

        debug!(lines = cart.len(), "loaded guest cart");

        Ok(Self { storage, cart })
    }

    /// Current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Owned copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.cart.clone()
    }

    /// Adds an item, merging with an existing line for the same SKU.
    ///
    /// # Errors
    ///
    /// Returns a [`GuestCartError`] if the cart rejects the item or storage
    /// can't be written. Nothing changes in that case.
    pub fn add_item(&mut self, item: NewCartItem) -> Result<CartItem, GuestCartError> {
        let mut next = self.cart.clone();

        let line = next.add(item)?.clone();

        self.commit(next)?;

        debug!(id = %line.id(), sku = %line.sku(), quantity = %line.quantity(), "guest cart item added");

        Ok(line)
    }

    /// Sets a line's quantity; zero or negative removes it.
    ///
    /// # Errors
    ///
    /// Returns a [`GuestCartError`] if the cart rejects the update or storage
    /// can't be written. Nothing changes in that case.
    pub fn update_item(
        &mut self,
        id: &ItemId,
        quantity: i64,
    ) -> Result<UpdateOutcome, GuestCartError> {
        let mut next = self.cart.clone();

        let outcome = next.update(id, quantity)?;

        self.commit(next)?;

        debug!(%id, quantity, ?outcome, "guest cart item updated");

        Ok(outcome)
    }

    /// Removes a line. Removing a missing line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`GuestCartError`] if storage can't be written.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<Option<CartItem>, GuestCartError> {
        let mut next = self.cart.clone();

        let removed = next.remove(id)?;

        self.commit(next)?;

        debug!(%id, removed = removed.is_some(), "guest cart item removed");

        Ok(removed)
    }

    /// Empties the cart and deletes its storage entry.
    ///
    /// # Errors
    ///
    /// Returns [`GuestCartError::Storage`] if the entry can't be deleted.
    pub fn clear(&mut self) -> Result<(), GuestCartError> {
        self.storage.remove(GUEST_CART_KEY)?;

        self.cart.clear();

        debug!("guest cart cleared");

        Ok(())
    }

    fn commit(&mut self, next: Cart) -> Result<(), GuestCartError> {
        let encoded = serde_json::to_string(&next).map_err(GuestCartError::Encode)?;

        self.storage.set(GUEST_CART_KEY, &encoded)?;

        self.cart = next;

        Ok(())
    }
}

fn decode(raw: &str) -> Result<Cart, String> {
    let mut cart: Cart = serde_json::from_str(raw).map_err(|error| error.to_string())?;

    cart.reconcile().map_err(|error| error.to_string())?;

    Ok(cart)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        items::{Quantity, Sku},
        prices::Price,
        storage::MemoryStorage,
    };

    use super::*;

    fn new_item(sku: &str, quantity: u32, price: &str) -> TestResult<NewCartItem> {
        Ok(NewCartItem {
            sku: Sku::new(sku)?,
            quantity: Quantity::new(quantity)?,
            price: Price::parse(price)?,
            name: None,
        })
    }

    fn memory() -> Arc<dyn Storage> {
        Arc::new(MemoryStorage::new())
    }

    #[test]
    fn missing_entry_loads_empty_cart() -> TestResult {
        let store = GuestCartStore::load(memory())?;

        assert!(store.cart().is_empty());

        Ok(())
    }

    #[test]
    fn corrupt_entry_loads_empty_cart_and_is_discarded() -> TestResult {
        let storage = memory();

        storage.set(GUEST_CART_KEY, "{not json")?;

        let store = GuestCartStore::load(Arc::clone(&storage))?;

        assert!(store.cart().is_empty());
        assert_eq!(storage.get(GUEST_CART_KEY)?, None);

        Ok(())
    }

    #[test]
    fn entry_with_wrong_shape_loads_empty_cart() -> TestResult {
        let storage = memory();

        storage.set(GUEST_CART_KEY, r#"{"items":[{"id":"1","sku":"","quantity":0}]}"#)?;

        let store = GuestCartStore::load(storage)?;

        assert!(store.cart().is_empty());

        Ok(())
    }

    #[test]
    fn scenario_merges_and_totals() -> TestResult {
        let mut store = GuestCartStore::load(memory())?;

        let line = store.add_item(new_item("SKU-1", 2, "100")?)?;

        assert_eq!(line.subtotal(), Price::from_units(200));
        assert_eq!(store.cart().total(), Price::from_units(200));

        let line = store.add_item(new_item("SKU-1", 1, "100")?)?;

        assert_eq!(line.quantity().get(), 3);
        assert_eq!(line.subtotal(), Price::from_units(300));
        assert_eq!(store.cart().total(), Price::from_units(300));

        store.add_item(new_item("SKU-2", 1, "50")?)?;

        assert_eq!(store.cart().total(), Price::from_units(350));

        Ok(())
    }

    #[test]
    fn every_mutation_is_persisted() -> TestResult {
        let storage = memory();
        let mut store = GuestCartStore::load(Arc::clone(&storage))?;

        let id = store.add_item(new_item("SKU-1", 1, "9.99")?)?.id().clone();

        assert_eq!(GuestCartStore::load(Arc::clone(&storage))?.cart(), store.cart());

        store.update_item(&id, 5)?;

        assert_eq!(GuestCartStore::load(Arc::clone(&storage))?.cart(), store.cart());

        store.remove_item(&id)?;

        let reloaded = GuestCartStore::load(storage)?;

        assert!(reloaded.cart().is_empty());

        Ok(())
    }

    #[test]
    fn round_trip_reproduces_equal_cart() -> TestResult {
        let storage = memory();
        let mut store = GuestCartStore::load(Arc::clone(&storage))?;

        store.add_item(new_item("SKU-1", 2, "12.50")?)?;
        store.add_item(new_item("SKU-2", 1, "3")?)?;

        let reloaded = GuestCartStore::load(storage)?;

        assert_eq!(reloaded.cart(), store.cart());
        assert_eq!(reloaded.cart().total(), Price::from_units(28));

        Ok(())
    }

    #[test]
    fn update_to_zero_removes() -> TestResult {
        let mut store = GuestCartStore::load(memory())?;

        let id = store.add_item(new_item("SKU-1", 2, "1")?)?.id().clone();

        assert_eq!(store.update_item(&id, 0)?, UpdateOutcome::Removed);
        assert!(store.cart().is_empty());

        Ok(())
    }

    #[test]
    fn failed_update_leaves_cart_and_storage_untouched() -> TestResult {
        let storage = memory();
        let mut store = GuestCartStore::load(Arc::clone(&storage))?;

        store.add_item(new_item("SKU-1", 2, "1")?)?;
        let before = storage.get(GUEST_CART_KEY)?;

        let result = store.update_item(&ItemId::from("missing"), 3);

        assert!(matches!(
            result,
            Err(GuestCartError::Cart(CartError::ItemNotFound(_)))
        ));
        assert_eq!(storage.get(GUEST_CART_KEY)?, before);
        assert_eq!(store.cart().len(), 1);

        Ok(())
    }

    #[test]
    fn clear_removes_storage_entry() -> TestResult {
        let storage = memory();
        let mut store = GuestCartStore::load(Arc::clone(&storage))?;

        store.add_item(new_item("SKU-1", 1, "1")?)?;
        store.clear()?;

        assert!(store.cart().is_empty());
        assert_eq!(storage.get(GUEST_CART_KEY)?, None);

        Ok(())
    }

    #[test]
    fn stored_totals_are_recomputed_on_load() -> TestResult {
        let storage = memory();

        storage.set(
            GUEST_CART_KEY,
            r#"{
                "items": [{"id": "a", "sku": "SKU-1", "quantity": 2, "price": 10, "subtotal": "999"}],
                "total": "1",
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-01T00:00:00Z"
            }"#,
        )?;

        let store = GuestCartStore::load(storage)?;

        assert_eq!(store.cart().total(), Price::from_units(20));

        Ok(())
    }
}
