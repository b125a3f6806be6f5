// SPDX-License-Identifier: Apache-2.0

//! Normalizes the two upstream cart representations into one canonical
//! [`CartSnapshot`].
//!
//! The storefront surface wraps the cart under a `data` envelope and
//! uses snake_case keys (`line_items`, `product_id`, `list_price`);
//! the admin surface may hand us the same nesting flattened with
//! camelCase keys (`lineItems`, `productId`, `listPrice`). Downstream
//! logic only ever sees the canonical shape.

use crate::cart::{CartItem, CartSnapshot};
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NormalizeError {
    NotAnObject,
}

impl Display for NormalizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("cart payload is not a JSON object"),
        }
    }
}

impl std::error::Error for NormalizeError {}

/// Total over structurally incomplete input: missing collections become
/// empty vectors and missing optional item fields fall back to zero
/// defaults. Only a payload that is not a mapping at all is rejected.
pub fn normalize_cart(raw: &Value) -> Result<CartSnapshot, NormalizeError> {
    let root = raw.as_object().ok_or(NormalizeError::NotAnObject)?;

    // Storefront responses wrap the cart under a `data` envelope.
    let cart = root
        .get("data")
        .and_then(Value::as_object)
        .unwrap_or(root);

    // Line items may sit under a wrapper object or directly on the cart.
    let line_items = pick(cart, "line_items", "lineItems")
        .and_then(Value::as_object)
        .unwrap_or(cart);

    Ok(CartSnapshot {
        physical_items: item_list(pick(line_items, "physical_items", "physicalItems")),
        digital_items: item_list(pick(line_items, "digital_items", "digitalItems")),
    })
}

fn pick<'a>(
    map: &'a serde_json::Map<String, Value>,
    snake: &str,
    camel: &str,
) -> Option<&'a Value> {
    map.get(snake).or_else(|| map.get(camel))
}

fn item_list(value: Option<&Value>) -> Vec<CartItem> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_item).collect())
        .unwrap_or_default()
}

fn normalize_item(raw: &Value) -> Option<CartItem> {
    let item = raw.as_object()?;
    Some(CartItem {
        item_id: item_id(item),
        product_id: pick(item, "product_id", "productId")
            .and_then(Value::as_i64)
            .unwrap_or(0),
        quantity: item
            .get("quantity")
            .and_then(Value::as_u64)
            .and_then(|q| u32::try_from(q).ok())
            .unwrap_or(0),
        unit_list_price: pick(item, "list_price", "listPrice")
            .map(decimal_field)
            .unwrap_or(Decimal::ZERO),
    })
}

fn item_id(item: &serde_json::Map<String, Value>) -> Option<String> {
    let value = item
        .get("id")
        .or_else(|| item.get("item_id"))
        .or_else(|| item.get("itemId"))?;
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decimal_field(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => n.to_string().parse().unwrap_or(Decimal::ZERO),
        Value::String(s) => s.trim().parse().unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn storefront_and_admin_shapes_normalize_identically() {
        let storefront = json!({
            "data": {
                "line_items": {
                    "physical_items": [
                        {"id": "p1", "product_id": 101, "quantity": 2, "list_price": 10.00}
                    ],
                    "digital_items": [
                        {"id": "d1", "product_id": 6817, "quantity": 1, "list_price": 3.00}
                    ]
                }
            }
        });
        let admin = json!({
            "lineItems": {
                "physicalItems": [
                    {"id": "p1", "productId": 101, "quantity": 2, "listPrice": 10.00}
                ],
                "digitalItems": [
                    {"id": "d1", "productId": 6817, "quantity": 1, "listPrice": 3.00}
                ]
            }
        });
        let left = normalize_cart(&storefront).expect("storefront shape");
        let right = normalize_cart(&admin).expect("admin shape");
        assert_eq!(left, right);
        assert_eq!(left.digital_items[0].unit_list_price, dec!(3.00));
        assert_eq!(left.digital_items[0].item_id.as_deref(), Some("d1"));
    }

    #[test]
    fn missing_collections_normalize_to_empty() {
        let cart = normalize_cart(&json!({"data": {"line_items": {}}})).expect("empty cart");
        assert!(cart.physical_items.is_empty());
        assert!(cart.digital_items.is_empty());

        let bare = normalize_cart(&json!({})).expect("bare object");
        assert_eq!(bare, CartSnapshot::default());
    }

    #[test]
    fn missing_optional_fields_fall_back_to_zero_defaults() {
        let cart = normalize_cart(&json!({
            "physical_items": [{"product_id": 7}]
        }))
        .expect("partial item");
        let item = &cart.physical_items[0];
        assert_eq!(item.product_id, 7);
        assert_eq!(item.quantity, 0);
        assert_eq!(item.unit_list_price, Decimal::ZERO);
        assert_eq!(item.item_id, None);
    }

    #[test]
    fn snake_case_key_wins_over_camel_case() {
        let cart = normalize_cart(&json!({
            "physical_items": [
                {"product_id": 1, "productId": 2, "list_price": "4.50", "listPrice": "9.99", "quantity": 1}
            ]
        }))
        .expect("dual-keyed item");
        assert_eq!(cart.physical_items[0].product_id, 1);
        assert_eq!(cart.physical_items[0].unit_list_price, dec!(4.50));
    }

    #[test]
    fn numeric_item_ids_are_stringified() {
        let cart = normalize_cart(&json!({
            "digital_items": [{"id": 998877, "product_id": 6817, "quantity": 1, "list_price": 3}]
        }))
        .expect("numeric id");
        assert_eq!(cart.digital_items[0].item_id.as_deref(), Some("998877"));
    }

    #[test]
    fn string_prices_are_parsed() {
        let cart = normalize_cart(&json!({
            "physical_items": [{"product_id": 1, "quantity": 1, "list_price": "12.34"}]
        }))
        .expect("string price");
        assert_eq!(cart.physical_items[0].unit_list_price, dec!(12.34));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(
            normalize_cart(&json!([1, 2, 3])).expect_err("array payload"),
            NormalizeError::NotAnObject
        );
        assert_eq!(
            normalize_cart(&json!("cart")).expect_err("string payload"),
            NormalizeError::NotAnObject
        );
    }
}
