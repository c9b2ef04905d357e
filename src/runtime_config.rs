// =============================================================================
// Runtime Configuration — hot-reloadable analysis settings with atomic save
// =============================================================================
//
// Central configuration hub for the SignalBoard backend. Indicator windows
// and valuation assumptions live here as configuration constants — they are
// not request parameters, and the dashboard can retune them at runtime
// without a restart.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_lookback_days() -> u32 {
    180
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_bollinger_window() -> usize {
    20
}

fn default_bollinger_k() -> f64 {
    2.0
}

fn default_rsi_window() -> usize {
    14
}

fn default_williams_window() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_required_return() -> f64 {
    0.09
}

fn default_default_roe() -> f64 {
    0.10
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Window lengths for the indicator engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Bollinger Band look-back window (closes).
    #[serde(default = "default_bollinger_window")]
    pub bollinger_window: usize,

    /// Bollinger Band width in standard deviations.
    #[serde(default = "default_bollinger_k")]
    pub bollinger_k: f64,

    /// RSI look-back window (deltas; needs window + 1 closes).
    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,

    /// Williams %R look-back window (bars).
    #[serde(default = "default_williams_window")]
    pub williams_window: usize,

    /// MACD fast EMA span.
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    /// MACD slow EMA span.
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            bollinger_window: default_bollinger_window(),
            bollinger_k: default_bollinger_k(),
            rsi_window: default_rsi_window(),
            williams_window: default_williams_window(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
        }
    }
}

impl IndicatorParams {
    /// The minimum bar count for a fully defined snapshot: the longest of
    /// the Bollinger window, RSI window + 1 (deltas need one extra close),
    /// and the Williams window. Shorter series are rejected up front.
    pub fn longest_required_window(&self) -> usize {
        self.bollinger_window
            .max(self.rsi_window + 1)
            .max(self.williams_window)
    }
}

// =============================================================================
// ValuationParams
// =============================================================================

/// Assumptions for the fair-value estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationParams {
    /// Required rate of return `r` in the S-RIM / EPS-multiple tiers.
    #[serde(default = "default_required_return")]
    pub required_return: f64,

    /// ROE assumed when neither a reported ROE nor EPS/BPS is usable.
    #[serde(default = "default_default_roe")]
    pub default_roe: f64,
}

impl Default for ValuationParams {
    fn default() -> Self {
        Self {
            required_return: default_required_return(),
            default_roe: default_default_roe(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the SignalBoard backend.
///
/// Every field has a serde default so that older JSON files missing new
/// fields will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// How many calendar days of daily bars to request per fetch.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Fetch-cache time-to-live in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Indicator window lengths.
    #[serde(default)]
    pub indicator: IndicatorParams,

    /// Valuation assumptions.
    #[serde(default)]
    pub valuation: ValuationParams,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            cache_ttl_secs: default_cache_ttl_secs(),
            indicator: IndicatorParams::default(),
            valuation: ValuationParams::default(),
        }
    }
}

impl RuntimeConfig {
    /// The cache TTL as a [`Duration`].
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            lookback_days = config.lookback_days,
            cache_ttl_secs = config.cache_ttl_secs,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    ///
    /// This prevents corruption if the process crashes mid-write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        // Atomic write: write to a temporary sibling file, then rename.
        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.lookback_days, 180);
        assert_eq!(cfg.cache_ttl_secs, 3600);
        assert_eq!(cfg.indicator.bollinger_window, 20);
        assert!((cfg.indicator.bollinger_k - 2.0).abs() < f64::EPSILON);
        assert_eq!(cfg.indicator.rsi_window, 14);
        assert_eq!(cfg.indicator.williams_window, 14);
        assert_eq!(cfg.indicator.macd_fast, 12);
        assert_eq!(cfg.indicator.macd_slow, 26);
        assert!((cfg.valuation.required_return - 0.09).abs() < f64::EPSILON);
        assert!((cfg.valuation.default_roe - 0.10).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.lookback_days, 180);
        assert_eq!(cfg.cache_ttl_secs, 3600);
        assert_eq!(cfg.indicator.rsi_window, 14);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "lookback_days": 90, "indicator": { "rsi_window": 21 } }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.lookback_days, 90);
        assert_eq!(cfg.indicator.rsi_window, 21);
        assert_eq!(cfg.indicator.bollinger_window, 20);
        assert_eq!(cfg.cache_ttl_secs, 3600);
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = RuntimeConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.lookback_days, cfg2.lookback_days);
        assert_eq!(cfg.cache_ttl_secs, cfg2.cache_ttl_secs);
        assert_eq!(cfg.indicator.macd_slow, cfg2.indicator.macd_slow);
    }

    #[test]
    fn longest_window_with_defaults_is_bollinger() {
        // max(20, 14 + 1, 14) = 20
        assert_eq!(IndicatorParams::default().longest_required_window(), 20);
    }

    #[test]
    fn longest_window_tracks_rsi_plus_one() {
        let params = IndicatorParams {
            rsi_window: 30,
            ..IndicatorParams::default()
        };
        assert_eq!(params.longest_required_window(), 31);
    }
}
