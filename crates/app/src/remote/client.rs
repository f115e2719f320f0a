//! HTTP client for the remote cart service.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use rouge::prelude::*;

use crate::{
    remote::{
        RemoteError,
        payloads::{CartEnvelope, CreateItemRequest, UpdateItemRequest},
    },
    session::AccessToken,
};

/// Configuration for connecting to the cart service.
#[derive(Debug, Clone)]
pub struct CartsApiConfig {
    /// Base URL of the REST API, e.g. `"https://api.example.com/v1"`.
    pub base_url: String,
}

/// Remote cart operations. Every call acts on the cart of the token's owner.
#[automock]
#[async_trait]
pub trait CartsApi: Send + Sync {
    /// Fetch the current cart.
    async fn fetch_cart(&self, token: &AccessToken) -> Result<Cart, RemoteError>;

    /// Add `quantity` units of a variant.
    async fn create_item(
        &self,
        token: &AccessToken,
        sku: &Sku,
        quantity: Quantity,
    ) -> Result<(), RemoteError>;

    /// Set the quantity of an existing line.
    async fn update_item(
        &self,
        token: &AccessToken,
        id: &ItemId,
        quantity: Quantity,
    ) -> Result<(), RemoteError>;

    /// Delete a line.
    async fn delete_item(&self, token: &AccessToken, id: &ItemId) -> Result<(), RemoteError>;
}

/// `reqwest`-backed [`CartsApi`].
#[derive(Debug, Clone)]
pub struct HttpCartsApi {
    config: CartsApiConfig,
    http: Client,
}

impl HttpCartsApi {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: CartsApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Create a client that sends requests through `http`.
    #[must_use]
    pub fn with_client(config: CartsApiConfig, http: Client) -> Self {
        Self { config, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn send(request: RequestBuilder, token: &AccessToken) -> Result<Response, RemoteError> {
        let response = request.bearer_auth(token.expose()).send().await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RemoteError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CartsApi for HttpCartsApi {
    async fn fetch_cart(&self, token: &AccessToken) -> Result<Cart, RemoteError> {
        let response = Self::send(self.http.get(self.url("cart")), token).await?;

        let bytes = response.bytes().await?;

        let cart = serde_json::from_slice::<CartEnvelope>(&bytes)
            .map_err(|error| RemoteError::InvalidPayload(error.to_string()))?
            .into_cart()?;

        debug!(lines = cart.len(), total = %cart.total(), "fetched remote cart");

        Ok(cart)
    }

    async fn create_item(
        &self,
        token: &AccessToken,
        sku: &Sku,
        quantity: Quantity,
    ) -> Result<(), RemoteError> {
        let request = self
            .http
            .post(self.url("cart/items"))
            .json(&CreateItemRequest { sku, quantity });

        Self::send(request, token).await?;

        debug!(%sku, %quantity, "remote cart item created");

        Ok(())
    }

    async fn update_item(
        &self,
        token: &AccessToken,
        id: &ItemId,
        quantity: Quantity,
    ) -> Result<(), RemoteError> {
        let request = self
            .http
            .patch(self.url(&format!("cart/items/{id}")))
            .json(&UpdateItemRequest { quantity });

        Self::send(request, token).await?;

        debug!(%id, %quantity, "remote cart item updated");

        Ok(())
    }

    async fn delete_item(&self, token: &AccessToken, id: &ItemId) -> Result<(), RemoteError> {
        Self::send(self.http.delete(self.url(&format!("cart/items/{id}"))), token).await?;

        debug!(%id, "remote cart item deleted");

        Ok(())
    }
}
