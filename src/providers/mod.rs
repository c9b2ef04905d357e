// =============================================================================
// Data Provider Seams — market data, fundamentals, and name lookup
// =============================================================================
//
// The analysis service only ever talks to these three traits; the concrete
// HTTP adapters live in sibling modules and tests substitute in-memory
// fakes. All trait objects are `Send + Sync` so they can be shared across
// request handlers behind a plain `Arc`.
// =============================================================================

pub mod naver;
pub mod yahoo;

pub use naver::NaverClient;
pub use yahoo::YahooClient;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{Fundamentals, PriceBar};

/// Daily OHLC history source.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch chronological daily bars covering roughly `lookback_days`
    /// calendar days ending now.
    ///
    /// # Edge cases
    /// - An empty vector means "symbol unknown to this provider" and is the
    ///   caller's cue to retry with an alternate exchange suffix.
    /// - Malformed bars are dropped, never returned.
    async fn daily_bars(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<PriceBar>, ProviderError>;
}

/// Per-share fundamentals source. Any of eps/bps/roe/previous_close may be
/// absent in the result; absence is data, not an error.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals, ProviderError>;
}

/// Company display-name source for local-market numeric codes.
#[async_trait]
pub trait NameLookupProvider: Send + Sync {
    async fn display_name(&self, code: &str) -> Result<String, ProviderError>;
}

// =============================================================================
// Symbol resolution
// =============================================================================

/// True when `symbol` is a bare local-market numeric code (e.g. "005930").
pub fn is_local_numeric_code(symbol: &str) -> bool {
    !symbol.is_empty() && symbol.bytes().all(|b| b.is_ascii_digit())
}

/// Provider symbols to try for a user-supplied input, in order.
///
/// All-digit local codes carry no exchange information, so they expand to
/// the KOSPI suffix first and the KOSDAQ suffix second; anything else is
/// passed through verbatim.
pub fn symbol_candidates(symbol: &str) -> Vec<String> {
    if is_local_numeric_code(symbol) {
        vec![format!("{symbol}.KS"), format!("{symbol}.KQ")]
    } else {
        vec![symbol.to_string()]
    }
}

/// Cap an upstream response body so error chains and log lines stay readable.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    match body.char_indices().nth(MAX_CHARS) {
        Some((idx, _)) => format!("{} [truncated]", &body[..idx]),
        None => body.to_string(),
    }
}
