// =============================================================================
// Analysis Service — one fetch → compute → classify pass per request
// =============================================================================
//
// The orchestrator behind `GET /api/v1/analyze/:symbol`.
//
// Pipeline:
//   1. Cache lookup (skipped on refresh)
//   2. Resolve symbol candidates; fetch bars, fundamentals, display name
//   3. Reject series shorter than the longest configured indicator window
//   4. Compute the indicator snapshot; current price = last close
//   5. Estimate fair value; apply the user's numeric override (Strategy B
//      input only — the estimate itself is never overwritten)
//   6. Classify Strategy A (always) and Strategy B (when a fair value exists)
//   7. Assemble the report, push it onto the recent-reports ring, return
//
// Fundamentals and name lookups are best-effort: their failures ride along
// in the report instead of failing the pass. Only "no bars at all", "too few
// bars", and hard provider errors abort.
// =============================================================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app_state::AppState;
use crate::error::AnalysisError;
use crate::indicators::{compute_snapshot, IndicatorSnapshot};
use crate::providers::{is_local_numeric_code, symbol_candidates};
use crate::signals::{classify_oscillator, classify_value_gap, OscillatorVerdict, ValueGapVerdict};
use crate::types::MarketBundle;
use crate::valuation::{estimate_fair_value, ValuationResult};

// =============================================================================
// Request / report types
// =============================================================================

/// One user-triggered analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// The symbol as the user typed it (bare numeric code or full ticker).
    pub symbol: String,
    /// Optional fair-value override applied to the value-gap strategy.
    pub fair_value_override: Option<f64>,
    /// Skip the fetch cache and force a fresh fetch.
    pub refresh: bool,
}

/// The complete result of one analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Unique report id (UUID v4).
    pub id: String,
    /// The symbol as requested.
    pub symbol: String,
    /// The provider symbol the bars actually came from.
    pub resolved_symbol: String,
    /// Company display name; falls back to the raw input code.
    pub name: String,
    /// Close of the latest bar.
    pub price: f64,
    pub previous_close: Option<f64>,
    /// Percent change of `price` against `previous_close`.
    pub change_pct: Option<f64>,
    /// Date of the latest bar.
    pub as_of: NaiveDate,
    /// How many daily bars fed the indicator engine.
    pub bars_used: usize,
    pub indicators: IndicatorSnapshot,
    /// Present when fundamentals were available.
    pub valuation: Option<ValuationResult>,
    /// Present when the fundamentals fetch failed.
    pub valuation_error: Option<String>,
    /// Strategy A verdict (oscillator-only). Always present.
    pub oscillator: OscillatorVerdict,
    /// Strategy B verdict (price vs. valuation). Present iff a fair value
    /// existed, from the estimate or the user's override.
    pub value_gap: Option<ValueGapVerdict>,
    /// The fair value the value-gap strategy actually consumed.
    pub fair_value_used: Option<f64>,
    pub fair_value_overridden: bool,
    /// RFC 3339 timestamp of report assembly.
    pub generated_at: String,
}

/// An [`AnalysisReport`] plus cache metadata for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub report: AnalysisReport,
    /// True when the bundle came from the fetch cache.
    pub cache_hit: bool,
    /// Age of the cached bundle in seconds, when `cache_hit`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age_secs: Option<u64>,
}

// =============================================================================
// Analysis Engine
// =============================================================================

pub struct AnalysisEngine;

impl AnalysisEngine {
    /// Run one full analysis pass for `request`.
    pub async fn analyze(
        state: &Arc<AppState>,
        request: AnalysisRequest,
    ) -> Result<AnalysisResponse, AnalysisError> {
        let symbol = request.symbol.trim().to_string();
        let config = state.runtime_config.read().clone();
        let ttl = config.cache_ttl();

        // ── 1. Cache lookup ──────────────────────────────────────────────
        let cached = if request.refresh {
            None
        } else {
            state.cache.get(&symbol, ttl)
        };

        let (bundle, cache_hit, cache_age) = match cached {
            Some((bundle, age)) => {
                debug!(symbol = %symbol, age_secs = age.as_secs(), "serving bundle from cache");
                (bundle, true, Some(age))
            }
            None => {
                let bundle = Self::fetch_bundle(state, &symbol, config.lookback_days).await?;
                state.cache.put(&symbol, bundle.clone(), ttl);
                (bundle, false, None)
            }
        };

        // ── 2. History gate ──────────────────────────────────────────────
        let required = config.indicator.longest_required_window();
        if bundle.bars.len() < required {
            return Err(AnalysisError::InsufficientHistory {
                required,
                got: bundle.bars.len(),
            });
        }

        // ── 3. Indicator snapshot ────────────────────────────────────────
        let snapshot = compute_snapshot(&bundle.bars, &config.indicator);

        let Some(last_bar) = bundle.bars.last() else {
            // Unreachable: the gate guarantees at least one bar.
            return Err(AnalysisError::InsufficientHistory {
                required: required.max(1),
                got: 0,
            });
        };
        let price = last_bar.close;
        let as_of = last_bar.date;

        let previous_close = bundle
            .fundamentals
            .as_ref()
            .and_then(|f| f.previous_close)
            .or_else(|| {
                let n = bundle.bars.len();
                (n >= 2).then(|| bundle.bars[n - 2].close)
            });
        let change_pct = previous_close
            .filter(|prev| prev.is_finite() && *prev > 0.0)
            .map(|prev| (price - prev) / prev * 100.0);

        // ── 4. Valuation ─────────────────────────────────────────────────
        let valuation = bundle
            .fundamentals
            .as_ref()
            .map(|f| estimate_fair_value(f, &config.valuation));
        let valuation_error = bundle.fundamentals_error.clone();

        // Non-positive overrides are ignored rather than classified against.
        let override_value = request
            .fair_value_override
            .filter(|v| v.is_finite() && *v > 0.0);
        let fair_value_overridden = override_value.is_some();
        let fair_value_used =
            override_value.or_else(|| valuation.as_ref().map(|v| v.fair_value));

        // ── 5. Classification ────────────────────────────────────────────
        let oscillator = classify_oscillator(&snapshot);
        let value_gap = fair_value_used.map(|fair| classify_value_gap(&snapshot, price, fair));

        // ── 6. Assemble report ───────────────────────────────────────────
        let report = AnalysisReport {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.clone(),
            resolved_symbol: bundle.resolved_symbol.clone(),
            name: bundle.display_name.clone(),
            price,
            previous_close,
            change_pct,
            as_of,
            bars_used: bundle.bars.len(),
            indicators: snapshot,
            valuation,
            valuation_error,
            oscillator,
            value_gap,
            fair_value_used,
            fair_value_overridden,
            generated_at: chrono::Utc::now().to_rfc3339(),
        };

        state.push_report(report.clone());

        info!(
            symbol = %report.symbol,
            resolved = %report.resolved_symbol,
            price = report.price,
            oscillator = %report.oscillator.signal,
            cache_hit,
            "analysis pass complete"
        );

        Ok(AnalysisResponse {
            report,
            cache_hit,
            cache_age_secs: cache_age.map(|d| d.as_secs()),
        })
    }

    /// Fetch everything one analysis pass needs for `symbol`.
    ///
    /// Bars are mandatory (candidates tried in order, first non-empty
    /// series wins); fundamentals and the display name degrade gracefully.
    async fn fetch_bundle(
        state: &Arc<AppState>,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<MarketBundle, AnalysisError> {
        // ── Bars ─────────────────────────────────────────────────────────
        let mut resolved = None;
        for candidate in symbol_candidates(symbol) {
            let bars = state.market_data.daily_bars(&candidate, lookback_days).await?;
            if bars.is_empty() {
                debug!(symbol, candidate = %candidate, "candidate returned no bars");
                continue;
            }
            debug!(symbol, resolved_symbol = %candidate, count = bars.len(), "daily bars resolved");
            resolved = Some((candidate, bars));
            break;
        }

        let Some((resolved_symbol, bars)) = resolved else {
            return Err(AnalysisError::DataUnavailable {
                symbol: symbol.to_string(),
            });
        };

        // ── Fundamentals (best-effort) ───────────────────────────────────
        let (fundamentals, fundamentals_error) =
            match state.fundamentals.fundamentals(&resolved_symbol).await {
                Ok(f) => (Some(f), None),
                Err(e) => {
                    warn!(symbol = %resolved_symbol, error = %e, "fundamentals fetch failed");
                    (None, Some(e.to_string()))
                }
            };

        // ── Display name (best-effort, local codes only) ─────────────────
        let display_name = if is_local_numeric_code(symbol) {
            match state.name_lookup.display_name(symbol).await {
                Ok(name) => name,
                Err(e) => {
                    warn!(symbol, error = %e, "name lookup failed, using raw code");
                    symbol.to_string()
                }
            }
        } else {
            symbol.to_string()
        };

        Ok(MarketBundle {
            resolved_symbol,
            display_name,
            bars,
            fundamentals,
            fundamentals_error,
        })
    }
}
