// SPDX-License-Identifier: Apache-2.0

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product entry in a cart. `item_id` is the store-assigned opaque
/// identifier, required to remove the item and absent on items we have
/// not round-tripped through the store yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub item_id: Option<String>,
    pub product_id: i64,
    pub quantity: u32,
    pub unit_list_price: Decimal,
}

/// Read-only view of a cart at a point in time. Fetched fresh from the
/// external store at the start of each reconciliation, never cached
/// across requests.
///
/// Invariant: at most one item across `digital_items` carries the
/// configured insurance product id; the reconciler restores this after
/// every mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub physical_items: Vec<CartItem>,
    pub digital_items: Vec<CartItem>,
}

impl CartSnapshot {
    /// Digital items matching the insurance product id, in cart order.
    /// More than one entry means a prior inconsistent state that the
    /// reconciler must collapse.
    #[must_use]
    pub fn insurance_items(&self, insurance_product_id: i64) -> Vec<&CartItem> {
        self.digital_items
            .iter()
            .filter(|item| item.product_id == insurance_product_id)
            .collect()
    }

    /// Physical-goods subtotal. Insurance lives among digital items, so
    /// this basis never prices insurance against itself.
    #[must_use]
    pub fn physical_subtotal(&self) -> Decimal {
        self.physical_items
            .iter()
            .map(|item| item.unit_list_price * Decimal::from(item.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(product_id: i64, quantity: u32, price: Decimal) -> CartItem {
        CartItem {
            item_id: Some(format!("item-{product_id}")),
            product_id,
            quantity,
            unit_list_price: price,
        }
    }

    #[test]
    fn physical_subtotal_multiplies_quantity() {
        let cart = CartSnapshot {
            physical_items: vec![item(1, 2, dec!(10.00)), item(2, 1, dec!(5.50))],
            digital_items: vec![item(6817, 1, dec!(3.00))],
        };
        assert_eq!(cart.physical_subtotal(), dec!(25.50));
    }

    #[test]
    fn insurance_items_matches_only_configured_product() {
        let cart = CartSnapshot {
            physical_items: vec![item(1, 1, dec!(10.00))],
            digital_items: vec![item(42, 1, dec!(1.00)), item(6817, 1, dec!(3.00))],
        };
        let found = cart.insurance_items(6817);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_id, 6817);
        assert!(cart.insurance_items(9999).is_empty());
    }

    #[test]
    fn empty_cart_has_zero_subtotal() {
        assert_eq!(CartSnapshot::default().physical_subtotal(), Decimal::ZERO);
    }
}
