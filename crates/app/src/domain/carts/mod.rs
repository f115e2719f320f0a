//! Carts

pub mod coordinator;
pub mod errors;
mod local;
mod remote;
pub mod service;

pub use coordinator::{CartCoordinator, MigrationReport};
pub use errors::CartsError;
pub use local::LocalCartStore;
pub use remote::RemoteCartStore;
pub use service::*;
