// SPDX-License-Identifier: Apache-2.0

use shipguard_core::PricingRule;
use std::time::Duration;

/// Which upstream API surface handles cart mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Storefront,
    Admin,
    Hybrid,
}

impl StoreMode {
    pub fn parse(input: &str) -> Result<Self, String> {
        match input {
            "storefront" => Ok(Self::Storefront),
            "admin" => Ok(Self::Admin),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!(
                "unsupported store mode {other:?}; use storefront, admin, or hybrid"
            )),
        }
    }
}

/// Connection settings for the external cart store. Loaded once at
/// startup, immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub mode: StoreMode,
    pub base_url: String,
    pub storefront_token: Option<String>,
    pub admin_token: Option<String>,
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: StoreMode::Hybrid,
            base_url: String::new(),
            storefront_token: None,
            admin_token: None,
            timeout: Duration::from_millis(10_000),
        }
    }
}

/// Service-level settings: the insurance product and its pricing rule.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub insurance_product_id: i64,
    pub rule: PricingRule,
    pub bind_addr: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            insurance_product_id: 6817,
            rule: PricingRule::default(),
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}
