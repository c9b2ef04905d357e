// =============================================================================
// SignalBoard — Main Entry Point
// =============================================================================
//
// Request-driven analysis backend: no schedulers, no background loops. The
// HTTP surface is the only driver — every fetch, indicator pass, and signal
// classification happens inside a single `/analyze` request.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod analysis;
mod api;
mod app_state;
mod cache;
mod error;
mod indicators;
mod providers;
mod runtime_config;
mod series;
mod signals;
mod types;
mod valuation;

use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║                SignalBoard — Starting Up                 ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config_path =
        std::env::var("SIGNALBOARD_CONFIG").unwrap_or_else(|_| "runtime_config.json".into());

    let config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    info!(
        path = %config_path,
        lookback_days = config.lookback_days,
        cache_ttl_secs = config.cache_ttl_secs,
        "Runtime config ready"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config, config_path));

    // ── 3. Start the API server ──────────────────────────────────────────
    let api_state = state.clone();
    let bind_addr =
        std::env::var("SIGNALBOARD_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let bind_addr_clone = bind_addr.clone();

    tokio::spawn(async move {
        let app = api::rest::router(api_state);
        let listener = tokio::net::TcpListener::bind(&bind_addr_clone)
            .await
            .expect("Failed to bind API server");
        info!(addr = %bind_addr_clone, "API server listening");
        axum::serve(listener, app)
            .await
            .expect("API server failed");
    });

    info!("API server launched. Press Ctrl+C to stop.");

    // ── 4. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = state.runtime_config.read().save(&state.config_path) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("SignalBoard shut down complete.");
    Ok(())
}
