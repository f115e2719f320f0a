//! Cart store interface.

use async_trait::async_trait;
use mockall::automock;

use rouge::prelude::*;

use crate::domain::carts::errors::CartsError;

/// A cart backend: the local guest store or the remote customer cart.
///
/// Mutations return the cart as it stands once the mutation has been applied.
#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Current cart. May be served from a cache.
    async fn cart(&self) -> Result<Cart, CartsError>;

    /// Reload the cart from its source of truth.
    async fn refresh(&self) -> Result<Cart, CartsError>;

    /// Add an item, merging with an existing line for the same SKU.
    async fn add_item(&self, item: NewCartItem) -> Result<Cart, CartsError>;

    /// Set a line's quantity. Zero or negative quantities remove the line.
    async fn update_item(&self, id: &ItemId, quantity: i64) -> Result<Cart, CartsError>;

    /// Remove a line.
    async fn remove_item(&self, id: &ItemId) -> Result<Cart, CartsError>;

    /// Remove every line.
    async fn clear(&self) -> Result<(), CartsError>;

    /// Is a request against the backing store still in flight?
    fn is_loading(&self) -> bool;
}
