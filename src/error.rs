// =============================================================================
// Error taxonomy — recoverable analysis failures
// =============================================================================
//
// Nothing here is fatal to the process. Every variant maps to an HTTP status
// plus a tagged JSON body in the API layer; the dashboard decides the user
// messaging. Flat-window singularities in RSI / Williams %R are handled
// in-band by the indicator engine (RSI = 100, williams = None) and never
// surface as errors.

use thiserror::Error;

/// Failures from an external data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (timeout, DNS, TLS, connection reset).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status code.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response arrived but did not have the expected shape.
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Failures of a full analysis pass.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Every symbol candidate returned an empty bar series.
    #[error("no market data available for '{symbol}'")]
    DataUnavailable { symbol: String },

    /// Fewer bars than the longest configured indicator window. Surfaced,
    /// never silently computed over a short series.
    #[error("insufficient history: need {required} bars, got {got}")]
    InsufficientHistory { required: usize, got: usize },

    /// A provider call failed outright (as opposed to "found nothing").
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
