// SPDX-License-Identifier: Apache-2.0

use crate::store::{build_client, ensure_success, into_json};
use crate::{CartStoreBackend, StoreError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use std::time::Duration;

const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Privileged admin cart API: token-header auth, camelCase fields in
/// responses. The only surface that accepts a `list_price` override on
/// add, which insurance items require.
pub struct AdminBackend {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl AdminBackend {
    #[must_use]
    pub fn new(base_url: String, auth_token: Option<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.filter(|t| !t.trim().is_empty()),
            client: build_client(timeout),
        }
    }

    fn cart_url(&self, cart_id: &str) -> String {
        format!("{}/v3/carts/{cart_id}", self.base_url)
    }

    fn auth_headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(token)
                .map_err(|e| StoreError::Transport(format!("invalid auth header: {e}")))?;
            headers.insert(AUTH_TOKEN_HEADER, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl CartStoreBackend for AdminBackend {
    fn backend_tag(&self) -> &'static str {
        "admin"
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
        let mut line_item = Map::new();
        line_item.insert("product_id".to_string(), json!(product_id));
        line_item.insert("quantity".to_string(), json!(quantity));
        if let Some(price) = unit_price {
            line_item.insert("list_price".to_string(), json!(price));
        }
        let body = json!({"line_items": [line_item]});
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
