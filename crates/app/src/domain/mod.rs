//! Rouge Domain Concerns

pub mod carts;
