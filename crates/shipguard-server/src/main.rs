#![forbid(unsafe_code)]

use rust_decimal::Decimal;
use shipguard_core::PricingRule;
use shipguard_server::{
    build_router, AdminBackend, AppState, CartStoreBackend, HybridBackend, Reconciler,
    ServiceConfig, StoreConfig, StoreMode, StorefrontBackend,
};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_decimal(name: &str, default: Decimal) -> Decimal {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<Decimal>().ok())
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = env_opt("SHIPGUARD_LOG_LEVEL").map_or_else(
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        EnvFilter::new,
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_pricing_rule() -> PricingRule {
    let defaults = PricingRule::default();
    PricingRule {
        threshold_amount: env_decimal("SHIPGUARD_THRESHOLD_AMOUNT", defaults.threshold_amount),
        rate_at_or_below_threshold: env_decimal(
            "SHIPGUARD_RATE_AT_OR_BELOW",
            defaults.rate_at_or_below_threshold,
        ),
        rate_above_threshold: env_decimal("SHIPGUARD_RATE_ABOVE", defaults.rate_above_threshold),
    }
}

fn load_store_config() -> Result<StoreConfig, String> {
    let defaults = StoreConfig::default();
    let mode = match env_opt("SHIPGUARD_STORE_MODE") {
        Some(raw) => StoreMode::parse(&raw)?,
        None => defaults.mode,
    };
    Ok(StoreConfig {
        mode,
        base_url: env_str("SHIPGUARD_STORE_BASE_URL", ""),
        storefront_token: env_opt("SHIPGUARD_STOREFRONT_TOKEN"),
        admin_token: env_opt("SHIPGUARD_ADMIN_TOKEN"),
        timeout: Duration::from_millis(env_u64("SHIPGUARD_STORE_TIMEOUT_MS", 10_000)),
    })
}

fn build_store(cfg: &StoreConfig) -> Arc<dyn CartStoreBackend> {
    match cfg.mode {
        StoreMode::Storefront => Arc::new(StorefrontBackend::new(
            cfg.base_url.clone(),
            cfg.storefront_token.clone(),
            cfg.timeout,
        )),
        StoreMode::Admin => Arc::new(AdminBackend::new(
            cfg.base_url.clone(),
            cfg.admin_token.clone(),
            cfg.timeout,
        )),
        StoreMode::Hybrid => Arc::new(HybridBackend::new(
            Arc::new(StorefrontBackend::new(
                cfg.base_url.clone(),
                cfg.storefront_token.clone(),
                cfg.timeout,
            )),
            Arc::new(AdminBackend::new(
                cfg.base_url.clone(),
                cfg.admin_token.clone(),
                cfg.timeout,
            )),
        )),
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let store_cfg = load_store_config()?;
    if store_cfg.base_url.is_empty() {
        warn!("SHIPGUARD_STORE_BASE_URL is empty; upstream calls will fail");
    }
    if store_cfg.admin_token.is_none() {
        warn!("SHIPGUARD_ADMIN_TOKEN is not set; priced adds will be rejected upstream");
    }

    let service_cfg = ServiceConfig {
        insurance_product_id: env_i64("SHIPGUARD_INSURANCE_PRODUCT_ID", 6817),
        rule: load_pricing_rule(),
        bind_addr: env_str("SHIPGUARD_BIND", "0.0.0.0:8080"),
    };

    let store = build_store(&store_cfg);
    info!(
        backend = store.backend_tag(),
        product_id = service_cfg.insurance_product_id,
        "starting shipguard-server"
    );

    let reconciler = Arc::new(Reconciler::new(
        store,
        service_cfg.rule.clone(),
        service_cfg.insurance_product_id,
    ));
    let app = build_router(AppState::new(reconciler));

    let bind_addr = &service_cfg.bind_addr;
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("listening on {bind_addr}");

    // In-flight reconciliations run to completion on shutdown so the
    // upstream cart is not left half-mutated.
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
