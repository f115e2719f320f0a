//! Cart store errors.

use thiserror::Error;

use rouge::{guest::GuestCartError, prelude::*};

use crate::remote::RemoteError;

#[derive(Debug, Error)]
pub enum CartsError {
    #[error("session has not been resolved yet")]
    SessionUnresolved,

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("guest cart storage error")]
    Storage(#[source] GuestCartError),

    #[error("remote cart error")]
    Remote(#[from] RemoteError),
}

impl From<GuestCartError> for CartsError {
    fn from(error: GuestCartError) -> Self {
        match error {
            GuestCartError::Cart(error) => Self::Cart(error),
            GuestCartError::Storage(_) | GuestCartError::Encode(_) => Self::Storage(error),
        }
    }
}

impl From<QuantityError> for CartsError {
    fn from(error: QuantityError) -> Self {
        Self::Cart(CartError::Quantity(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_cart_rejections_surface_as_cart_errors() {
        let error = CartsError::from(GuestCartError::Cart(CartError::ItemNotFound(ItemId::from(
            "x",
        ))));

        assert!(matches!(error, CartsError::Cart(CartError::ItemNotFound(_))));
    }
}
