//! Rouge prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{Cart, CartError, UpdateOutcome},
    guest::{GUEST_CART_KEY, GuestCartError, GuestCartStore},
    items::{CartItem, ItemId, NewCartItem, Quantity, QuantityError, Sku, SkuError},
    prices::{Price, PriceError},
    storage::{FileStorage, MemoryStorage, Storage, StorageError},
};
