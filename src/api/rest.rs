// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. Every operation is a read-only market
// lookup or a small config tweak, so there is no authentication layer. CORS
// is configured permissively so a local dashboard can talk to the backend
// directly; tighten the allowed origins in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::analysis::{AnalysisEngine, AnalysisRequest};
use crate::app_state::AppState;
use crate::error::AnalysisError;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Health ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        // ── Analysis ────────────────────────────────────────────────
        .route("/api/v1/analyze/:symbol", get(analyze))
        .route("/api/v1/reports", get(reports))
        // ── Runtime config ──────────────────────────────────────────
        .route("/api/v1/config", get(get_config))
        .route("/api/v1/config", post(set_config))
        // ── Cache ───────────────────────────────────────────────────
        .route("/api/v1/cache/clear", post(clear_cache))
        // ── Middleware & State ──────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    cached_symbols: usize,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        cached_symbols: state.cache.len(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Analysis
// =============================================================================

#[derive(Deserialize)]
struct AnalyzeQuery {
    /// Fair-value override fed into the value-gap strategy.
    #[serde(default)]
    fair_value: Option<f64>,
    /// Bypass the fetch cache for this request.
    #[serde(default)]
    refresh: bool,
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let request = AnalysisRequest {
        symbol,
        fair_value_override: query.fair_value,
        refresh: query.refresh,
    };

    match AnalysisEngine::analyze(&state, request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!(error = %e, "analysis request failed");
            Err(error_response(&e))
        }
    }
}

/// Map an analysis failure onto a status code and a stable error body.
fn error_response(error: &AnalysisError) -> (StatusCode, Json<serde_json::Value>) {
    match error {
        AnalysisError::DataUnavailable { .. } => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "data_unavailable",
                "message": error.to_string(),
            })),
        ),
        AnalysisError::InsufficientHistory { required, got } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "insufficient_history",
                "message": error.to_string(),
                "required": required,
                "got": got,
            })),
        ),
        AnalysisError::Provider(_) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({
                "error": "provider",
                "message": error.to_string(),
            })),
        ),
    }
}

async fn reports(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let reports = state.recent_reports.read().clone();
    Json(reports)
}

// =============================================================================
// Runtime config
// =============================================================================

async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.runtime_config.read().clone();
    Json(config)
}

#[derive(Deserialize)]
struct ConfigUpdate {
    #[serde(default)]
    lookback_days: Option<u32>,
    #[serde(default)]
    cache_ttl_secs: Option<u64>,
}

async fn set_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ConfigUpdate>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // A zero-day lookback would make every fetch window empty. A zero TTL is
    // allowed and simply disables caching.
    if update.lookback_days == Some(0) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "invalid_config",
                "message": "lookback_days must be at least 1",
            })),
        ));
    }

    let mut config = state.runtime_config.write();
    let mut changes = Vec::new();

    if let Some(val) = update.lookback_days {
        if config.lookback_days != val {
            changes.push(format!("lookback_days: {} -> {}", config.lookback_days, val));
            config.lookback_days = val;
        }
    }
    if let Some(val) = update.cache_ttl_secs {
        if config.cache_ttl_secs != val {
            changes.push(format!("cache_ttl_secs: {} -> {}", config.cache_ttl_secs, val));
            config.cache_ttl_secs = val;
        }
    }

    // Clone config and drop the write lock before touching the disk.
    let config_clone = config.clone();
    drop(config);

    if !changes.is_empty() {
        info!(changes = ?changes, "runtime config updated via API");

        // Save to disk (best-effort).
        if let Err(e) = config_clone.save(&state.config_path) {
            warn!(error = %e, "failed to persist runtime config");
        }
    }

    let mut response = serde_json::to_value(&config_clone).unwrap_or_default();
    if let Some(obj) = response.as_object_mut() {
        obj.insert(
            "changes".to_string(),
            serde_json::to_value(&changes).unwrap_or_default(),
        );
    }
    Ok(Json(response))
}

// =============================================================================
// Cache
// =============================================================================

async fn clear_cache(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cleared = state.cache.clear();
    info!(cleared, "fetch cache cleared via API");
    Json(serde_json::json!({ "cleared": cleared }))
}
