// =============================================================================
// Central Application State — SignalBoard analysis backend
// =============================================================================
//
// The single source of truth shared by every request handler. AppState ties
// together the runtime configuration, the fetch cache, the three external
// data providers, and the recent-reports ring the dashboard polls.
//
// Thread safety:
//   - parking_lot::RwLock for all mutable shared collections.
//   - Arc trait objects for the providers, which are internally immutable.
//   - The fetch cache guards its own map; see cache.rs.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::analysis::AnalysisReport;
use crate::cache::{Clock, FetchCache, SystemClock};
use crate::providers::{
    FundamentalsProvider, MarketDataProvider, NameLookupProvider, NaverClient, YahooClient,
};
use crate::runtime_config::RuntimeConfig;

/// Maximum number of recent analysis reports to retain.
const MAX_RECENT_REPORTS: usize = 50;

/// Central application state shared across handlers via `Arc<AppState>`.
pub struct AppState {
    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    /// Where config updates are persisted (best-effort).
    pub config_path: PathBuf,

    // ── External data providers ─────────────────────────────────────────
    pub market_data: Arc<dyn MarketDataProvider>,
    pub fundamentals: Arc<dyn FundamentalsProvider>,
    pub name_lookup: Arc<dyn NameLookupProvider>,

    // ── Fetch cache ─────────────────────────────────────────────────────
    pub cache: FetchCache,

    // ── Report Audit Trail ──────────────────────────────────────────────
    pub recent_reports: RwLock<Vec<AnalysisReport>>,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the server was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct an `AppState` wired to the real providers and clock.
    ///
    /// The returned value is typically wrapped in `Arc` immediately.
    pub fn new(config: RuntimeConfig, config_path: impl Into<PathBuf>) -> Self {
        let yahoo = Arc::new(YahooClient::new());
        Self::with_providers(
            config,
            config_path,
            yahoo.clone(),
            yahoo,
            Arc::new(NaverClient::new()),
            Arc::new(SystemClock),
        )
    }

    /// Full constructor with injected providers and clock. Tests use this to
    /// substitute in-memory fakes and a manual clock.
    pub fn with_providers(
        config: RuntimeConfig,
        config_path: impl Into<PathBuf>,
        market_data: Arc<dyn MarketDataProvider>,
        fundamentals: Arc<dyn FundamentalsProvider>,
        name_lookup: Arc<dyn NameLookupProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            runtime_config: Arc::new(RwLock::new(config)),
            config_path: config_path.into(),
            market_data,
            fundamentals,
            name_lookup,
            cache: FetchCache::new(clock),
            recent_reports: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Report Audit ────────────────────────────────────────────────────

    /// Record an analysis report. The ring buffer is capped at
    /// [`MAX_RECENT_REPORTS`]; oldest entries are evicted when the limit is
    /// reached. Newest entries sit at the end.
    pub fn push_report(&self, report: AnalysisReport) {
        let mut reports = self.recent_reports.write();
        reports.push(report);
        while reports.len() > MAX_RECENT_REPORTS {
            reports.remove(0);
        }
    }

    // ── Timing ──────────────────────────────────────────────────────────

    /// Seconds since the server started.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
