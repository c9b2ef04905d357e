// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators shown on the
// dashboard. Every function returns `Option<T>` so callers are forced to
// handle insufficient-data and flat-window edge cases; an undefined value is
// reported as such, never fabricated.

pub mod bollinger;
pub mod macd;
pub mod rsi;
pub mod williams;

use serde::Serialize;

use crate::runtime_config::IndicatorParams;
use crate::types::PriceBar;

/// Latest indicator values for one symbol, computed once per analysis
/// request over the full fetched window.
///
/// Each field is `Option<f64>` and serializes as `null` when the indicator
/// is undefined for the given series.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSnapshot {
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub rsi: Option<f64>,
    pub williams_r: Option<f64>,
    pub macd_oscillator: Option<f64>,
}

/// Compute the full indicator snapshot for a bar series.
///
/// Window lengths come from [`IndicatorParams`] — configuration constants,
/// not request parameters.
pub fn compute_snapshot(bars: &[PriceBar], params: &IndicatorParams) -> IndicatorSnapshot {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let bands = bollinger::calculate_bollinger(&closes, params.bollinger_window, params.bollinger_k);

    IndicatorSnapshot {
        bollinger_upper: bands.as_ref().map(|b| b.upper),
        bollinger_middle: bands.as_ref().map(|b| b.middle),
        bollinger_lower: bands.as_ref().map(|b| b.lower),
        rsi: rsi::calculate_rsi(&closes, params.rsi_window),
        williams_r: williams::calculate_williams_r(&highs, &lows, &closes, params.williams_window),
        macd_oscillator: macd::calculate_macd(&closes, params.macd_fast, params.macd_slow),
    }
}
