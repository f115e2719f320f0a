//! Local (guest) cart store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rouge::prelude::*;

use crate::domain::carts::{errors::CartsError, service::CartStore};

#[derive(Debug)]
pub struct LocalCartStore {
    inner: Mutex<GuestCartStore>,
}

impl LocalCartStore {
    /// Load the guest cart from `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error when storage can't be read. Unreadable cart data is not
    /// an error; it yields an empty cart.
    pub fn load(storage: Arc<dyn Storage>) -> Result<Self, CartsError> {
        Ok(Self {
            inner: Mutex::new(GuestCartStore::load(storage)?),
        })
    }
}

#[async_trait]
impl CartStore for LocalCartStore {
    async fn cart(&self) -> Result<Cart, CartsError> {
        Ok(self.inner.lock().await.snapshot())
    }

    async fn refresh(&self) -> Result<Cart, CartsError> {
        self.cart().await
    }

    async fn add_item(&self, item: NewCartItem) -> Result<Cart, CartsError> {
        let mut guest = self.inner.lock().await;

        guest.add_item(item)?;

        Ok(guest.snapshot())
    }

    async fn update_item(&self, id: &ItemId, quantity: i64) -> Result<Cart, CartsError> {
        let mut guest = self.inner.lock().await;

        guest.update_item(id, quantity)?;

        Ok(guest.snapshot())
    }

    async fn remove_item(&self, id: &ItemId) -> Result<Cart, CartsError> {
        let mut guest = self.inner.lock().await;

        guest.remove_item(id)?;

        Ok(guest.snapshot())
    }

    async fn clear(&self) -> Result<(), CartsError> {
        self.inner.lock().await.clear()?;

        Ok(())
    }

    fn is_loading(&self) -> bool {
        false
    }
}
