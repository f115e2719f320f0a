//! Rouge
//!
//! Cart model for the Rouge storefront: prices, cart lines, carts and the guest
//! cart store that keeps an unauthenticated visitor's cart in client-side storage.

pub mod carts;
pub mod guest;
pub mod items;
pub mod prelude;
pub mod prices;
pub mod storage;
