// SPDX-License-Identifier: Apache-2.0

use crate::store::{build_client, ensure_success, into_json};
use crate::{CartStoreBackend, StoreError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Duration;

/// Customer-facing storefront cart API: bearer auth, snake_case
/// payloads under a `data` envelope. This surface cannot override a
/// line item's list price; priced adds need the admin path.
pub struct StorefrontBackend {
    base_url: String,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl StorefrontBackend {
    #[must_use]
    pub fn new(base_url: String, bearer_token: Option<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: bearer_token.filter(|t| !t.trim().is_empty()),
            client: build_client(timeout),
        }
    }

    fn cart_url(&self, cart_id: &str) -> String {
        format!("{}/api/storefront/carts/{cart_id}", self.base_url)
    }

    fn auth_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| StoreError::Transport(format!("invalid auth header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl CartStoreBackend for StorefrontBackend {
    fn backend_tag(&self) -> &'static str {
        "storefront"
    }

    async fn fetch_cart(&self, cart_id: &str) -> Result<Value, StoreError> {
        let resp = self
            .client
            .get(self.cart_url(cart_id))
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        into_json(resp).await
    }

    async fn add_line_item(
        &self,
        cart_id: &str,
        product_id: i64,
        quantity: u32,
        unit_price: Option<Decimal>,
    ) -> Result<Value, StoreError> {
        if unit_price.is_some() {
            // Rejected locally rather than letting the surface silently
            // drop the override and add at catalog price.
            return Err(StoreError::Upstream {
                status: None,
                message: "storefront surface cannot override list_price".to_string(),
            });
        }
        let body = json!({
            "line_items": [{"product_id": product_id, "quantity": quantity}]
        });
        let resp = self
            .client
            .post(format!("{}/items", self.cart_url(cart_id)))
            .headers(self.auth_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        into_json(resp).await
    }

    async fn remove_line_item(&self, cart_id: &str, item_id: &str) -> Result<(), StoreError> {
        let resp = self
            .client
            .delete(format!("{}/items/{item_id}", self.cart_url(cart_id)))
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        ensure_success(resp).await
    }
}
