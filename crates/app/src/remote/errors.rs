//! Remote cart service errors.

use thiserror::Error;

/// Errors that can occur when talking to the remote cart service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The access token was missing, expired or rejected.
    #[error("not authorized to access the cart")]
    Unauthorized,

    /// The service answered with a non-2xx status.
    #[error("cart service responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body didn't describe a usable cart.
    #[error("unexpected cart payload: {0}")]
    InvalidPayload(String),
}
