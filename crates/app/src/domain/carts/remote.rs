//! Remote (customer) cart store.
//!
//! The server owns the cart. A successful mutation invalidates the cached copy
//! and refetches the canonical cart; a failed one leaves the cache as it was.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use rouge::prelude::*;

use crate::{
    domain::carts::{errors::CartsError, service::CartStore},
    remote::CartsApi,
    session::AccessToken,
};

pub struct RemoteCartStore {
    api: Arc<dyn CartsApi>,
    token: AccessToken,
    cache: RwLock<Option<Cart>>,
    in_flight: AtomicUsize,
}

impl fmt::Debug for RemoteCartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCartStore")
            .field("token", &self.token)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

/// Counts a request as in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);

        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RemoteCartStore {
    #[must_use]
    pub fn new(api: Arc<dyn CartsApi>, token: AccessToken) -> Self {
        Self {
            api,
            token,
            cache: RwLock::new(None),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Token this store acts for.
    #[must_use]
    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    /// Add a variant without refetching afterwards. Used for bulk copies that
    /// refresh once at the end.
    pub(crate) async fn push_item(&self, sku: &Sku, quantity: Quantity) -> Result<(), CartsError> {
        let _in_flight = InFlight::start(&self.in_flight);

        self.api.create_item(&self.token, sku, quantity).await?;

        *self.cache.write().await = None;

        Ok(())
    }

    async fn invalidate_and_refetch(&self) -> Result<Cart, CartsError> {
        *self.cache.write().await = None;

        self.refresh().await
    }
}

#[async_trait]
impl CartStore for RemoteCartStore {
    async fn cart(&self) -> Result<Cart, CartsError> {
        if let Some(cart) = self.cache.read().await.as_ref() {
            return Ok(cart.clone());
        }

        self.refresh().await
    }

    async fn refresh(&self) -> Result<Cart, CartsError> {
        let _in_flight = InFlight::start(&self.in_flight);

        let cart = self.api.fetch_cart(&self.token).await?;

        *self.cache.write().await = Some(cart.clone());

        Ok(cart)
    }

    async fn add_item(&self, item: NewCartItem) -> Result<Cart, CartsError> {
        {
            let _in_flight = InFlight::start(&self.in_flight);

            self.api
                .create_item(&self.token, &item.sku, item.quantity)
                .await?;
        }

        debug!(sku = %item.sku, quantity = %item.quantity, "remote cart item added");

        self.invalidate_and_refetch().await
    }

    async fn update_item(&self, id: &ItemId, quantity: i64) -> Result<Cart, CartsError> {
        if quantity <= 0 {
            return self.remove_item(id).await;
        }

        let quantity = Quantity::try_from(quantity)?;

        {
            let _in_flight = InFlight::start(&self.in_flight);

            self.api.update_item(&self.token, id, quantity).await?;
        }

        self.invalidate_and_refetch().await
    }

    async fn remove_item(&self, id: &ItemId) -> Result<Cart, CartsError> {
        {
            let _in_flight = InFlight::start(&self.in_flight);

            self.api.delete_item(&self.token, id).await?;
        }

        self.invalidate_and_refetch().await
    }

    async fn clear(&self) -> Result<(), CartsError> {
        let cart = self.refresh().await?;

        let mut first_error = None;

        for item in cart.items() {
            let _in_flight = InFlight::start(&self.in_flight);

            if let Err(error) = self.api.delete_item(&self.token, item.id()).await {
                warn!(id = %item.id(), %error, "failed to delete remote cart item");

                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }

        self.invalidate_and_refetch().await?;

        match first_error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}
