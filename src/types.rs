// =============================================================================
// Shared types used across the SignalBoard analysis backend
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily OHLC bar. Ordered sequences are chronological, one entry
/// per trading day, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    /// Check basic OHLC consistency.
    ///
    /// A bar is well-formed when all prices are finite, `high >= low`, and
    /// open/close fall inside the high/low range. Providers drop bars that
    /// fail this check rather than feed them to the indicator engine.
    pub fn is_well_formed(&self) -> bool {
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite();

        finite
            && self.high >= self.low
            && self.open >= self.low
            && self.open <= self.high
            && self.close >= self.low
            && self.close <= self.high
    }
}

/// Sparse per-share fundamentals for a symbol. Any field may be absent;
/// absence triggers the valuation fallback tiers rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    /// Earnings per share (trailing twelve months).
    pub eps: Option<f64>,
    /// Book value per share.
    pub bps: Option<f64>,
    /// Return on equity as a fraction (0.10 = 10 %).
    pub roe: Option<f64>,
    /// Latest traded price reported by the fundamentals source.
    pub current_price: f64,
    /// Previous session close, when the source reports one.
    pub previous_close: Option<f64>,
}

/// Everything one fetch pass produced for a symbol. This is the unit the
/// fetch cache stores — raw inputs, not finished conclusions, so indicator
/// parameters and fair-value overrides never serve stale results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketBundle {
    /// The symbol the bars actually came from (after exchange-suffix retry).
    pub resolved_symbol: String,
    /// Human-readable company name; falls back to the raw input code.
    pub display_name: String,
    pub bars: Vec<PriceBar>,
    /// Present when the fundamentals fetch succeeded.
    pub fundamentals: Option<Fundamentals>,
    /// Present when the fundamentals fetch failed; carried into the report.
    pub fundamentals_error: Option<String>,
}
