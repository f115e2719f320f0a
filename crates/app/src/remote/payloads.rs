//! Wire shapes of the remote cart service.
//!
//! The service is loose about types: prices and subtotals arrive as strings or
//! numbers, ids as strings or integers, and bodies are sometimes wrapped in a
//! `data` envelope. Everything is normalized here, before it reaches the cart.

use serde::{Deserialize, Serialize};
use tracing::warn;

use rouge::prelude::*;

use super::RemoteError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CartEnvelope {
    Wrapped { data: CartPayload },
    Bare(CartPayload),
}

impl CartEnvelope {
    pub(crate) fn into_cart(self) -> Result<Cart, RemoteError> {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data.into_cart(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartPayload {
    #[serde(default, alias = "cart_items")]
    items: Vec<CartItemPayload>,

    #[serde(default, alias = "grand_total")]
    total: Option<Price>,
}

impl CartPayload {
    fn into_cart(self) -> Result<Cart, RemoteError> {
        let items = self
            .items
            .into_iter()
            .map(CartItemPayload::into_item)
            .collect::<Result<Vec<_>, _>>()?;

        let cart = Cart::from_items(items).map_err(invalid)?;

        if let Some(reported) = self.total.filter(|reported| *reported != cart.total()) {
            warn!(%reported, computed = %cart.total(), "cart service total disagrees with its lines");
        }

        Ok(cart)
    }
}

#[derive(Debug, Deserialize)]
struct CartItemPayload {
    id: ItemId,

    #[serde(alias = "variant_sku")]
    sku: Sku,

    #[serde(default, alias = "product_name")]
    name: Option<String>,

    quantity: Quantity,

    #[serde(alias = "unit_price")]
    price: Price,

    #[serde(default)]
    subtotal: Option<Price>,
}

impl CartItemPayload {
    fn into_item(self) -> Result<CartItem, RemoteError> {
        CartItem::from_parts(
            self.id,
            self.sku,
            self.name,
            self.quantity,
            self.price,
            self.subtotal,
        )
        .map_err(invalid)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateItemRequest<'a> {
    pub sku: &'a Sku,
    pub quantity: Quantity,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateItemRequest {
    pub quantity: Quantity,
}

fn invalid(error: impl ToString) -> RemoteError {
    RemoteError::InvalidPayload(error.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn parse(value: serde_json::Value) -> Result<Cart, RemoteError> {
        serde_json::from_value::<CartEnvelope>(value)
            .map_err(invalid)?
            .into_cart()
    }

    #[test]
    fn normalizes_string_and_number_amounts() -> TestResult {
        let cart = parse(json!({
            "items": [
                { "id": 1, "sku": "SKU-1", "quantity": 2, "price": "100.00", "subtotal": "200.00" },
                { "id": "b2", "sku": "SKU-2", "quantity": 1, "price": 50, "subtotal": 50 }
            ],
            "total": "250"
        }))?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total(), Price::from_units(250));
        assert_eq!(cart.item(&ItemId::from("1")).map(CartItem::subtotal), Some(Price::from_units(200)));

        Ok(())
    }

    #[test]
    fn recomputes_a_line_subtotal_the_server_got_wrong() -> TestResult {
        let cart = parse(json!({
            "items": [
                { "id": 1, "sku": "SKU-1", "quantity": 2, "price": "10", "subtotal": "999" }
            ],
            "total": "999"
        }))?;

        assert_eq!(
            cart.item(&ItemId::from("1")).map(CartItem::subtotal),
            Some(Price::from_units(20))
        );
        assert_eq!(cart.total(), Price::from_units(20));

        Ok(())
    }

    #[test]
    fn accepts_data_envelope_and_aliases() -> TestResult {
        let cart = parse(json!({
            "data": {
                "cart_items": [
                    { "id": 9, "variant_sku": "SKU-9", "product_name": "Blush", "quantity": 3, "unit_price": 4.5 }
                ]
            }
        }))?;

        let item = cart
            .item(&ItemId::from("9"))
            .expect("line 9 should be present");

        assert_eq!(item.sku().as_str(), "SKU-9");
        assert_eq!(item.name(), Some("Blush"));
        assert_eq!(item.subtotal(), Price::parse("13.5")?);
        assert_eq!(cart.total(), Price::parse("13.5")?);

        Ok(())
    }

    #[test]
    fn empty_body_is_an_empty_cart() -> TestResult {
        let cart = parse(json!({}))?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn rejects_lines_without_quantity() {
        let result = parse(json!({
            "items": [{ "id": 1, "sku": "SKU-1", "quantity": 0, "price": "1" }]
        }));

        assert!(matches!(result, Err(RemoteError::InvalidPayload(_))));
    }

    #[test]
    fn create_request_shape() -> TestResult {
        let sku = Sku::new("SKU-1")?;
        let body = CreateItemRequest {
            sku: &sku,
            quantity: Quantity::new(2)?,
        };

        assert_eq!(serde_json::to_value(body)?, json!({ "sku": "SKU-1", "quantity": 2 }));

        Ok(())
    }
}
