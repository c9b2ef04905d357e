// =============================================================================
// Signals Module
// =============================================================================
//
// Two independent classification policies over the same indicator snapshot,
// one per dashboard screen variant:
// - Oscillator strategy: RSI + Williams %R alignment only.
// - Value-gap strategy: overheat checks plus price vs fair value.
//
// Both are pure functions; conditions are evaluated in the listed order and
// the first match wins. An undefined indicator never satisfies a condition.

pub mod oscillator;
pub mod value_gap;

pub use oscillator::{classify_oscillator, OscillatorSignal, OscillatorVerdict};
pub use value_gap::{classify_value_gap, ValueGapSignal, ValueGapVerdict};

/// Format an optional metric for rationale strings.
pub(crate) fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "undefined".to_string(),
    }
}
