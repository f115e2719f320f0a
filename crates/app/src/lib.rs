//! Rouge storefront cart client

pub mod config;
pub mod context;
pub mod domain;
pub mod notifications;
pub mod observability;
pub mod remote;
pub mod session;

#[cfg(test)]
mod test;
