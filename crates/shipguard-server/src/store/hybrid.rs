// SPDX-License-Identifier: Apache-2.0

use crate::{CartStoreBackend, StoreError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Probe-and-fallback resolution between the two upstream surfaces.
///
/// Reads and removes go storefront-first and fall back to admin on any
/// failure. Adds that carry a price override go straight to admin: the
/// storefront surface is known to reject overrides, so probing it
/// would only burn a round trip per reconciliation. The fallback is
/// invisible to callers.
pub struct HybridBackend {
    storefront: Arc<dyn CartStoreBackend>,
    admin: Arc<dyn CartStoreBackend>,
}

impl HybridBackend {
    #[must_use]
    pub fn new(storefront: Arc<dyn CartStoreBackend>, admin: Arc<dyn CartStoreBackend>) -> Self {
        Self { storefront, admin }
    }
}

#[async_trait]
impl CartStoreBackend for HybridBackend {
    fn backend_tag(&self) -> &'static str {
        "hybrid"
    }

    async fn fetch_cart(&self, cart_id: &str) -> Result<Value, StoreError> {
        match self.storefront.fetch_cart(cart_id).await {
            Ok(raw) => Ok(raw),
            Err(err) => {
                debug!(cart_id, %err, "storefront fetch failed; falling back to admin");
                self.admin.fetch_cart(cart_id).await
            }
        }
    }

    async fn add_line_item(
        &self,
        cart_id: &str,
        product_id: i64,
        quantity: u32,
        unit_price: Option<Decimal>,
    ) -> Result<Value, StoreError> {
        if unit_price.is_some() {
            return self
                .admin
                .add_line_item(cart_id, product_id, quantity, unit_price)
                .await;
        }
        match self
            .storefront
            .add_line_item(cart_id, product_id, quantity, None)
            .await
        {
            Ok(raw) => Ok(raw),
            Err(err) => {
                warn!(cart_id, product_id, %err, "storefront add failed; falling back to admin");
                self.admin
                    .add_line_item(cart_id, product_id, quantity, None)
                    .await
            }
        }
    }

    async fn remove_line_item(&self, cart_id: &str, item_id: &str) -> Result<(), StoreError> {
        match self.storefront.remove_line_item(cart_id, item_id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                debug!(cart_id, item_id, %err, "storefront remove failed; falling back to admin");
                self.admin.remove_line_item(cart_id, item_id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct CountingBackend {
        fetches: AtomicU64,
        adds: AtomicU64,
        removes: AtomicU64,
        fail_all: bool,
    }

    #[async_trait]
    impl CartStoreBackend for CountingBackend {
        fn backend_tag(&self) -> &'static str {
            "counting"
        }

        async fn fetch_cart(&self, _cart_id: &str) -> Result<Value, StoreError> {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            if self.fail_all {
                return Err(StoreError::NotFound);
            }
            Ok(serde_json::json!({}))
        }

        async fn add_line_item(
            &self,
            _cart_id: &str,
            _product_id: i64,
            _quantity: u32,
            _unit_price: Option<Decimal>,
        ) -> Result<Value, StoreError> {
            self.adds.fetch_add(1, Ordering::Relaxed);
            if self.fail_all {
                return Err(StoreError::Upstream {
                    status: Some(422),
                    message: "rejected".to_string(),
                });
            }
            Ok(serde_json::json!({}))
        }

        async fn remove_line_item(&self, _cart_id: &str, _item_id: &str) -> Result<(), StoreError> {
            self.removes.fetch_add(1, Ordering::Relaxed);
            if self.fail_all {
                return Err(StoreError::NotFound);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn priced_add_goes_straight_to_admin() {
        let storefront = Arc::new(CountingBackend::default());
        let admin = Arc::new(CountingBackend::default());
        let hybrid = HybridBackend::new(storefront.clone(), admin.clone());

        hybrid
            .add_line_item("c-1", 6817, 1, Some(Decimal::new(300, 2)))
            .await
            .expect("priced add");
        assert_eq!(storefront.adds.load(Ordering::Relaxed), 0);
        assert_eq!(admin.adds.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn unpriced_add_prefers_storefront() {
        let storefront = Arc::new(CountingBackend::default());
        let admin = Arc::new(CountingBackend::default());
        let hybrid = HybridBackend::new(storefront.clone(), admin.clone());

        hybrid.add_line_item("c-1", 101, 1, None).await.expect("add");
        assert_eq!(storefront.adds.load(Ordering::Relaxed), 1);
        assert_eq!(admin.adds.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn fetch_falls_back_to_admin_on_storefront_failure() {
        let storefront = Arc::new(CountingBackend {
            fail_all: true,
            ..CountingBackend::default()
        });
        let admin = Arc::new(CountingBackend::default());
        let hybrid = HybridBackend::new(storefront.clone(), admin.clone());

        hybrid.fetch_cart("c-1").await.expect("fallback fetch");
        assert_eq!(storefront.fetches.load(Ordering::Relaxed), 1);
        assert_eq!(admin.fetches.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn remove_surfaces_admin_error_when_both_fail() {
        let storefront = Arc::new(CountingBackend {
            fail_all: true,
            ..CountingBackend::default()
        });
        let admin = Arc::new(CountingBackend {
            fail_all: true,
            ..CountingBackend::default()
        });
        let hybrid = HybridBackend::new(storefront, admin.clone());

        let err = hybrid
            .remove_line_item("c-1", "li-1")
            .await
            .expect_err("both surfaces down");
        assert_eq!(err, StoreError::NotFound);
        assert_eq!(admin.removes.load(Ordering::Relaxed), 1);
    }
}
