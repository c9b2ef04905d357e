// =============================================================================
// Yahoo Finance REST Client — daily bars and per-share fundamentals
// =============================================================================
//
// Two public endpoints, no session or signing:
//   - v8 chart        → daily OHLC history (epoch-second timestamps plus
//                       parallel open/high/low/close/volume arrays that may
//                       contain nulls on halted sessions)
//   - v10 quoteSummary → per-share fundamentals (numerics wrapped in
//                       `{ "raw": .., "fmt": .. }` objects)
//
// An HTTP 404 from the chart endpoint means "symbol unknown" and surfaces as
// an empty bar vector so the caller can retry an alternate exchange suffix.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::ProviderError;
use crate::providers::{truncate_body, FundamentalsProvider, MarketDataProvider};
use crate::types::{Fundamentals, PriceBar};

/// Modules requested from the quote-summary endpoint.
const QUOTE_SUMMARY_MODULES: &str = "price,defaultKeyStatistics,financialData";

/// Yahoo Finance HTTP client for chart history and quote-summary fundamentals.
#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `YahooClient` against the public query endpoint.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            // Yahoo rejects requests without a browser-like user agent.
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()
            .expect("failed to build reqwest client");

        debug!("YahooClient initialised (base_url=https://query1.finance.yahoo.com)");

        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            client,
        }
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Parse a v8 chart body into chronological daily bars.
    ///
    /// Rows with null OHLC entries (halted sessions) are skipped silently;
    /// rows that parse but fail the OHLC consistency check are dropped with
    /// a warning. A missing or empty `result` block yields an empty vector.
    fn bars_from_chart(symbol: &str, body: &str) -> Result<Vec<PriceBar>, ProviderError> {
        let parsed: ChartResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::Malformed(format!("chart response: {e}")))?;

        let result = match parsed.chart.result.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        }) {
            Some(result) => result,
            None => return Ok(Vec::new()),
        };

        let timestamps = result.timestamp.unwrap_or_default();
        if timestamps.is_empty() {
            return Ok(Vec::new());
        }

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("chart result missing quote block".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        let mut dropped = 0usize;

        for (i, ts) in timestamps.iter().enumerate() {
            let (Some(open), Some(high), Some(low), Some(close)) = (
                series_value(&quote.open, i),
                series_value(&quote.high, i),
                series_value(&quote.low, i),
                series_value(&quote.close, i),
            ) else {
                continue;
            };

            let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
                dropped += 1;
                continue;
            };

            let bar = PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume: series_value(&quote.volume, i).unwrap_or(0.0),
            };

            if !bar.is_well_formed() {
                dropped += 1;
                continue;
            }

            bars.push(bar);
        }

        if dropped > 0 {
            warn!(symbol, dropped, "dropped malformed daily bars");
        }

        Ok(bars)
    }

    /// Parse a v10 quote-summary body into a [`Fundamentals`] record.
    ///
    /// Missing eps/bps/roe/previous-close fields stay `None`; a record with
    /// no usable current price at all is malformed, since every valuation
    /// tier needs one.
    fn fundamentals_from_summary(body: &str) -> Result<Fundamentals, ProviderError> {
        let parsed: QuoteSummaryResponse = serde_json::from_str(body)
            .map_err(|e| ProviderError::Malformed(format!("quote summary response: {e}")))?;

        let result = parsed
            .quote_summary
            .result
            .and_then(|mut r| {
                if r.is_empty() {
                    None
                } else {
                    Some(r.remove(0))
                }
            })
            .ok_or_else(|| ProviderError::Malformed("quote summary carries no result".into()))?;

        let price = result.price.as_ref();
        let key_stats = result.key_statistics.as_ref();
        let financial = result.financial_data.as_ref();

        let current_price = financial
            .and_then(|m| m.current_price.as_ref().and_then(RawValue::value))
            .or_else(|| price.and_then(|m| m.regular_market_price.as_ref().and_then(RawValue::value)))
            .ok_or_else(|| {
                ProviderError::Malformed("quote summary carries no current price".into())
            })?;

        Ok(Fundamentals {
            eps: key_stats.and_then(|m| m.trailing_eps.as_ref().and_then(RawValue::value)),
            bps: key_stats.and_then(|m| m.book_value.as_ref().and_then(RawValue::value)),
            roe: financial.and_then(|m| m.return_on_equity.as_ref().and_then(RawValue::value)),
            current_price,
            previous_close: price
                .and_then(|m| m.regular_market_previous_close.as_ref().and_then(RawValue::value)),
        })
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Provider trait implementations
// =============================================================================

#[async_trait]
impl MarketDataProvider for YahooClient {
    /// GET /v8/finance/chart/{symbol} with an explicit epoch-second range.
    #[instrument(skip(self), name = "yahoo::daily_bars")]
    async fn daily_bars(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let period2 = Utc::now().timestamp();
        let period1 = period2 - i64::from(lookback_days) * 86_400;
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url, symbol, period1, period2
        );

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(symbol, "chart endpoint returned 404, treating as unknown symbol");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let bars = Self::bars_from_chart(symbol, &body)?;
        debug!(symbol, count = bars.len(), "daily bars fetched");
        Ok(bars)
    }
}

#[async_trait]
impl FundamentalsProvider for YahooClient {
    /// GET /v10/finance/quoteSummary/{symbol}.
    #[instrument(skip(self), name = "yahoo::fundamentals")]
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals, ProviderError> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}",
            self.base_url, symbol, QUOTE_SUMMARY_MODULES
        );

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let fundamentals = Self::fundamentals_from_summary(&body)?;
        debug!(
            symbol,
            has_eps = fundamentals.eps.is_some(),
            has_bps = fundamentals.bps.is_some(),
            has_roe = fundamentals.roe.is_some(),
            "fundamentals fetched"
        );
        Ok(fundamentals)
    }
}

/// Read index `i` of a nullable numeric series, dropping non-finite values.
fn series_value(series: &[Option<f64>], i: usize) -> Option<f64> {
    series.get(i).copied().flatten().filter(|v| v.is_finite())
}

// =============================================================================
// Response payloads
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "defaultKeyStatistics", default)]
    key_statistics: Option<KeyStatisticsModule>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Deserialize)]
struct PriceModule {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<RawValue>,
    #[serde(rename = "regularMarketPreviousClose", default)]
    regular_market_previous_close: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct KeyStatisticsModule {
    #[serde(rename = "trailingEps", default)]
    trailing_eps: Option<RawValue>,
    #[serde(rename = "bookValue", default)]
    book_value: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "returnOnEquity", default)]
    return_on_equity: Option<RawValue>,
    #[serde(rename = "currentPrice", default)]
    current_price: Option<RawValue>,
}

/// Yahoo wraps most numerics as `{ "raw": 1.23, "fmt": "1.23" }`.
#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl RawValue {
    fn value(&self) -> Option<f64> {
        self.raw.filter(|v| v.is_finite())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // ---- bars_from_chart ----

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "005930.KS"},
                "timestamp": [1700000000, 1700086400, 1700172800],
                "indicators": {
                    "quote": [{
                        "open":   [70000.0, 70500.0, null],
                        "high":   [71000.0, 71500.0, null],
                        "low":    [69500.0, 70000.0, null],
                        "close":  [70800.0, 71200.0, null],
                        "volume": [1000000, 1200000, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn chart_parses_and_skips_null_rows() {
        let bars = YahooClient::bars_from_chart("005930.KS", CHART_BODY).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
        assert_eq!(bars[0].close, 70800.0);
        assert_eq!(bars[1].volume, 1_200_000.0);
    }

    #[test]
    fn chart_drops_inconsistent_ohlc_rows() {
        // Second row has high < low.
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1700000000, 1700086400],
                    "indicators": {
                        "quote": [{
                            "open":   [100.0, 100.0],
                            "high":   [105.0, 90.0],
                            "low":    [99.0, 95.0],
                            "close":  [103.0, 96.0],
                            "volume": [1000, 1000]
                        }]
                    }
                }]
            }
        }"#;
        let bars = YahooClient::bars_from_chart("TEST", body).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 103.0);
    }

    #[test]
    fn chart_null_result_means_unknown_symbol() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        let bars = YahooClient::bars_from_chart("NOPE", body).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn chart_missing_quote_block_is_malformed() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1700000000],
                    "indicators": {"quote": []}
                }]
            }
        }"#;
        let err = YahooClient::bars_from_chart("TEST", body).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn chart_garbage_body_is_malformed() {
        let err = YahooClient::bars_from_chart("TEST", "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    // ---- fundamentals_from_summary ----

    const SUMMARY_BODY: &str = r#"{
        "quoteSummary": {
            "result": [{
                "price": {
                    "regularMarketPrice": {"raw": 70000.0, "fmt": "70,000.00"},
                    "regularMarketPreviousClose": {"raw": 69500.0, "fmt": "69,500.00"}
                },
                "defaultKeyStatistics": {
                    "trailingEps": {"raw": 5000.0, "fmt": "5,000.00"},
                    "bookValue": {"raw": 50000.0, "fmt": "50,000.00"}
                },
                "financialData": {
                    "returnOnEquity": {"raw": 0.10, "fmt": "10.00%"},
                    "currentPrice": {"raw": 70100.0, "fmt": "70,100.00"}
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn summary_parses_all_fields() {
        let f = YahooClient::fundamentals_from_summary(SUMMARY_BODY).unwrap();
        assert_eq!(f.eps, Some(5000.0));
        assert_eq!(f.bps, Some(50000.0));
        assert_eq!(f.roe, Some(0.10));
        assert_eq!(f.previous_close, Some(69500.0));
        // financialData's currentPrice wins over the price module quote.
        assert_eq!(f.current_price, 70100.0);
    }

    #[test]
    fn summary_with_only_price_module_yields_sparse_record() {
        let body = r#"{
            "quoteSummary": {
                "result": [{
                    "price": {"regularMarketPrice": {"raw": 123.45}}
                }]
            }
        }"#;
        let f = YahooClient::fundamentals_from_summary(body).unwrap();
        assert_eq!(f.current_price, 123.45);
        assert!(f.eps.is_none());
        assert!(f.bps.is_none());
        assert!(f.roe.is_none());
        assert!(f.previous_close.is_none());
    }

    #[test]
    fn summary_empty_raw_wrappers_stay_absent() {
        let body = r#"{
            "quoteSummary": {
                "result": [{
                    "price": {"regularMarketPrice": {"raw": 50.0}},
                    "defaultKeyStatistics": {"trailingEps": {}, "bookValue": {}}
                }]
            }
        }"#;
        let f = YahooClient::fundamentals_from_summary(body).unwrap();
        assert!(f.eps.is_none());
        assert!(f.bps.is_none());
    }

    #[test]
    fn summary_without_price_is_malformed() {
        let body = r#"{
            "quoteSummary": {
                "result": [{
                    "defaultKeyStatistics": {"trailingEps": {"raw": 10.0}}
                }]
            }
        }"#;
        let err = YahooClient::fundamentals_from_summary(body).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn summary_empty_result_is_malformed() {
        let body = r#"{"quoteSummary": {"result": [], "error": null}}"#;
        let err = YahooClient::fundamentals_from_summary(body).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }
}
