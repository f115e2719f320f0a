//! Test Helpers

use async_trait::async_trait;
use tokio::sync::Notify;

use rouge::prelude::*;

use crate::{
    remote::{CartsApi, RemoteError},
    session::AccessToken,
};

/// A [`CartsApi`] whose calls stay in flight until released.
///
/// Every call signals `entered`, then waits for `release`. Fetches answer with
/// an empty cart; mutations succeed.
#[derive(Debug, Default)]
pub(crate) struct GatedCartsApi {
    pub entered: Notify,
    pub release: Notify,
}

impl GatedCartsApi {
    async fn hold(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[async_trait]
impl CartsApi for GatedCartsApi {
    async fn fetch_cart(&self, _token: &AccessToken) -> Result<Cart, RemoteError> {
        self.hold().await;

        Ok(Cart::new())
    }

    async fn create_item(
        &self,
        _token: &AccessToken,
        _sku: &Sku,
        _quantity: Quantity,
    ) -> Result<(), RemoteError> {
        self.hold().await;

        Ok(())
    }

    async fn update_item(
        &self,
        _token: &AccessToken,
        _id: &ItemId,
        _quantity: Quantity,
    ) -> Result<(), RemoteError> {
        self.hold().await;

        Ok(())
    }

    async fn delete_item(&self, _token: &AccessToken, _id: &ItemId) -> Result<(), RemoteError> {
        self.hold().await;

        Ok(())
    }
}
