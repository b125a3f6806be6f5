#![forbid(unsafe_code)]

use async_trait::async_trait;
use axum::routing::{get, post};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod config;
mod http;
pub mod reconcile;
pub mod store;

pub const CRATE_NAME: &str = "shipguard-server";

/// Failure classes of the external cart store, independent of which
/// API surface produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// Cart or line item absent upstream.
    NotFound,
    /// Credentials rejected. Operator-actionable, fatal to the request.
    Auth(String),
    /// Any other non-2xx from the store.
    Upstream {
        status: Option<u16>,
        message: String,
    },
    /// Network-level failure before a response arrived.
    Transport(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("not found upstream"),
            Self::Auth(msg) => write!(f, "upstream rejected credentials: {msg}"),
            Self::Upstream { status, message } => match status {
                Some(code) => write!(f, "upstream error status={code}: {message}"),
                None => write!(f, "upstream error: {message}"),
            },
            Self::Transport(msg) => write!(f, "transport failure: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// The external cart store, abstracted over the storefront and admin
/// API surfaces. The store offers no multi-item transaction; callers
/// sequence removes and adds themselves.
#[async_trait]
pub trait CartStoreBackend: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str;

    /// Returns the raw cart payload in whichever schema shape the
    /// surface produces; callers normalize it.
    async fn fetch_cart(&self, cart_id: &str) -> Result<Value, StoreError>;

    /// Adds a line item, optionally overriding its unit price. Some
    /// surfaces reject the override and require the admin path.
    async fn add_line_item(
        &self,
        cart_id: &str,
        product_id: i64,
        quantity: u32,
        unit_price: Option<Decimal>,
    ) -> Result<Value, StoreError>;

    /// Removes a line item. Removing an already-absent item is not a
    /// hard failure for callers.
    async fn remove_line_item(&self, cart_id: &str, item_id: &str) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<reconcile::Reconciler>,
}

impl AppState {
    #[must_use]
    pub fn new(reconciler: Arc<reconcile::Reconciler>) -> Self {
        Self { reconciler }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/v1/insurance", post(http::handlers::set_insurance_handler))
        .route(
            "/v1/insurance/recalculate",
            post(http::handlers::recalculate_handler),
        )
        .route(
            "/v1/insurance/preview",
            get(http::handlers::preview_handler),
        )
        .route("/v1/carts/:cart_id", get(http::handlers::cart_snapshot_handler))
        .with_state(state)
}

pub use config::{ServiceConfig, StoreConfig, StoreMode};
pub use reconcile::{ReconcileAction, ReconcileError, ReconcileOutcome, Reconciler};
pub use store::admin::AdminBackend;
pub use store::fake::FakeCartStore;
pub use store::hybrid::HybridBackend;
pub use store::storefront::StorefrontBackend;
