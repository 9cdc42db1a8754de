//! Request and response bodies of the shop backend.
//!
//! These types are public so mock backends in tests can share them.

use serde::{Deserialize, Serialize};
use shopfront_core::{CartItems, Product, ProductId, Size};

/// Default message used when a rejection carries no `message`.
pub const UNKNOWN_REJECTION: &str = "Request was not successful";

/// The `{ success, message? }` envelope wrapped around every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    /// A successful envelope around `body`.
    pub const fn ok(body: T) -> Self {
        Self {
            success: true,
            message: None,
            body,
        }
    }
}

impl<T: Default> Envelope<T> {
    /// An unsuccessful envelope carrying `message`.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            body: T::default(),
        }
    }
}

/// Response body without payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {}

/// `GET /api/product/list` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductList {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// `POST /api/cart/get` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartData {
    #[serde(default)]
    pub cart_data: CartItems,
}

/// `POST /api/cart/add` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub item_id: ProductId,
    pub size: Size,
}

/// `POST /api/cart/update` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub item_id: ProductId,
    pub size: Size,
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_list_envelope() {
        let json = r#"{"success": true, "products": [{"_id": "p1", "name": "Tee", "price": 50}]}"#;
        let envelope: Envelope<ProductList> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.body.products.len(), 1);
    }

    #[test]
    fn test_rejected_envelope_without_payload() {
        let json = r#"{"success": false, "message": "db down"}"#;
        let envelope: Envelope<ProductList> = serde_json::from_str(json).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("db down"));
        assert!(envelope.body.products.is_empty());
    }

    #[test]
    fn test_cart_data_envelope() {
        let json = r#"{"success": true, "cartData": {"p1": {"M": 2}}}"#;
        let envelope: Envelope<CartData> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.body.cart_data.count(), 2);
    }

    #[test]
    fn test_update_request_wire_names() {
        let request = UpdateCartRequest {
            item_id: ProductId::parse("p1").unwrap(),
            size: Size::parse("M").unwrap(),
            quantity: 3,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"itemId": "p1", "size": "M", "quantity": 3})
        );
    }

    #[test]
    fn test_ack_envelope_serializes_flat() {
        assert_eq!(
            serde_json::to_value(Envelope::ok(Ack {})).unwrap(),
            serde_json::json!({"success": true})
        );
    }
}
