// SPDX-License-Identifier: Apache-2.0

use crate::{CartStoreBackend, StoreError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeItem {
    pub item_id: String,
    pub product_id: i64,
    pub quantity: u32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct FakeCart {
    pub physical: Vec<FakeItem>,
    pub digital: Vec<FakeItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAdd {
    pub cart_id: String,
    pub product_id: i64,
    pub quantity: u32,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRemove {
    pub cart_id: String,
    pub item_id: String,
}

/// In-memory cart store for tests: records every add/remove call and
/// supports one-shot failure injection. Adds land among digital items,
/// which is the only place this service ever adds to; physical goods
/// are seeded directly.
pub struct FakeCartStore {
    pub carts: Mutex<HashMap<String, FakeCart>>,
    pub add_calls: Mutex<Vec<RecordedAdd>>,
    pub remove_calls: Mutex<Vec<RecordedRemove>>,
    pub fetch_calls: AtomicU64,
    pub fail_fetch: AtomicBool,
    pub fail_next_add: AtomicBool,
    pub fail_next_remove: AtomicBool,
    /// Serve the flattened camelCase admin shape instead of the
    /// storefront `data` envelope.
    pub serve_admin_shape: AtomicBool,
    next_item_id: AtomicU64,
}

impl Default for FakeCartStore {
    fn default() -> Self {
        Self {
            carts: Mutex::new(HashMap::new()),
            add_calls: Mutex::new(Vec::new()),
            remove_calls: Mutex::new(Vec::new()),
            fetch_calls: AtomicU64::new(0),
            fail_fetch: AtomicBool::new(false),
            fail_next_add: AtomicBool::new(false),
            fail_next_remove: AtomicBool::new(false),
            serve_admin_shape: AtomicBool::new(false),
            next_item_id: AtomicU64::new(1),
        }
    }
}

impl FakeCartStore {
    fn mint_item_id(&self) -> String {
        format!("li-{}", self.next_item_id.fetch_add(1, Ordering::Relaxed))
    }

    pub async fn seed_physical(&self, cart_id: &str, product_id: i64, quantity: u32, price: Decimal) {
        let item = FakeItem {
            item_id: self.mint_item_id(),
            product_id,
            quantity,
            price,
        };
        self.carts
            .lock()
            .await
            .entry(cart_id.to_string())
            .or_default()
            .physical
            .push(item);
    }

    pub async fn seed_digital(&self, cart_id: &str, product_id: i64, price: Decimal) -> String {
        let item_id = self.mint_item_id();
        self.carts
            .lock()
            .await
            .entry(cart_id.to_string())
            .or_default()
            .digital
            .push(FakeItem {
                item_id: item_id.clone(),
                product_id,
                quantity: 1,
                price,
            });
        item_id
    }

    pub async fn digital_items(&self, cart_id: &str) -> Vec<FakeItem> {
        self.carts
            .lock()
            .await
            .get(cart_id)
            .map(|cart| cart.digital.clone())
            .unwrap_or_default()
    }

    fn render_item(item: &FakeItem, admin_shape: bool) -> Value {
        if admin_shape {
            json!({
                "id": item.item_id,
                "productId": item.product_id,
                "quantity": item.quantity,
                "listPrice": item.price,
            })
        } else {
            json!({
                "id": item.item_id,
                "product_id": item.product_id,
                "quantity": item.quantity,
                "list_price": item.price,
            })
        }
    }
}

#[async_trait]
impl CartStoreBackend for FakeCartStore {
    fn backend_tag(&self) -> &'static str {
        "fake"
    }

    async fn fetch_cart(&self, cart_id: &str) -> Result<Value, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_fetch.load(Ordering::Relaxed) {
            return Err(StoreError::Upstream {
                status: Some(500),
                message: "injected fetch failure".to_string(),
            });
        }
        let carts = self.carts.lock().await;
        let cart = carts.get(cart_id).ok_or(StoreError::NotFound)?;
        let admin_shape = self.serve_admin_shape.load(Ordering::Relaxed);
        let physical: Vec<Value> = cart
            .physical
            .iter()
            .map(|i| Self::render_item(i, admin_shape))
            .collect();
        let digital: Vec<Value> = cart
            .digital
            .iter()
            .map(|i| Self::render_item(i, admin_shape))
            .collect();
        if admin_shape {
            Ok(json!({
                "lineItems": {"physicalItems": physical, "digitalItems": digital}
            }))
        } else {
            Ok(json!({
                "data": {"line_items": {"physical_items": physical, "digital_items": digital}}
            }))
        }
    }

    async fn add_line_item(
        &self,
        cart_id: &str,
        product_id: i64,
        quantity: u32,
        unit_price: Option<Decimal>,
    ) -> Result<Value, StoreError> {
        self.add_calls.lock().await.push(RecordedAdd {
            cart_id: cart_id.to_string(),
            product_id,
            quantity,
            unit_price,
        });
        if self.fail_next_add.swap(false, Ordering::Relaxed) {
            return Err(StoreError::Upstream {
                status: Some(422),
                message: "injected add failure".to_string(),
            });
        }
        let item_id = self.mint_item_id();
        self.carts
            .lock()
            .await
            .entry(cart_id.to_string())
            .or_default()
            .digital
            .push(FakeItem {
                item_id: item_id.clone(),
                product_id,
                quantity,
                price: unit_price.unwrap_or(Decimal::ZERO),
            });
        Ok(json!({"id": item_id}))
    }

    async fn remove_line_item(&self, cart_id: &str, item_id: &str) -> Result<(), StoreError> {
        self.remove_calls.lock().await.push(RecordedRemove {
            cart_id: cart_id.to_string(),
            item_id: item_id.to_string(),
        });
        if self.fail_next_remove.swap(false, Ordering::Relaxed) {
            return Err(StoreError::Upstream {
                status: Some(500),
                message: "injected remove failure".to_string(),
            });
        }
        let mut carts = self.carts.lock().await;
        let Some(cart) = carts.get_mut(cart_id) else {
            return Err(StoreError::NotFound);
        };
        let before = cart.digital.len() + cart.physical.len();
        cart.digital.retain(|i| i.item_id != item_id);
        cart.physical.retain(|i| i.item_id != item_id);
        if cart.digital.len() + cart.physical.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
