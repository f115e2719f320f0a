//! Remote cart service client.

mod client;
mod errors;
mod payloads;

pub use client::*;
pub use errors::RemoteError;
