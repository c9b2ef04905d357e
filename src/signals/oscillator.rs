// =============================================================================
// Oscillator Strategy — RSI + Williams %R alignment
// =============================================================================
//
// Classification rules, first match wins:
//   STRONG_BUY  if RSI <= 30 and Williams %R <= -80   (both deeply oversold)
//   SELL        if RSI >= 70 and Williams %R >= -20   (both overbought)
//   WATCH       otherwise
//
// An undefined indicator never satisfies a condition, so a short or flat
// series degrades to WATCH instead of inventing a signal.

use serde::Serialize;

use crate::indicators::IndicatorSnapshot;
use crate::signals::fmt_metric;

/// Signal categories of the oscillator strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OscillatorSignal {
    StrongBuy,
    Sell,
    Watch,
}

impl std::fmt::Display for OscillatorSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "STRONG_BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Watch => write!(f, "WATCH"),
        }
    }
}

/// Verdict plus a human-readable rationale for the dashboard banner.
#[derive(Debug, Clone, Serialize)]
pub struct OscillatorVerdict {
    pub signal: OscillatorSignal,
    pub reason: String,
}

/// Classify the oscillator strategy over an indicator snapshot.
pub fn classify_oscillator(snapshot: &IndicatorSnapshot) -> OscillatorVerdict {
    let rsi = snapshot.rsi;
    let williams = snapshot.williams_r;

    let rsi_oversold = rsi.map_or(false, |r| r <= 30.0);
    let williams_oversold = williams.map_or(false, |w| w <= -80.0);
    if rsi_oversold && williams_oversold {
        return OscillatorVerdict {
            signal: OscillatorSignal::StrongBuy,
            reason: format!(
                "RSI {} <= 30 and Williams %R {} <= -80: both oscillators oversold",
                fmt_metric(rsi),
                fmt_metric(williams)
            ),
        };
    }

    let rsi_overbought = rsi.map_or(false, |r| r >= 70.0);
    let williams_overbought = williams.map_or(false, |w| w >= -20.0);
    if rsi_overbought && williams_overbought {
        return OscillatorVerdict {
            signal: OscillatorSignal::Sell,
            reason: format!(
                "RSI {} >= 70 and Williams %R {} >= -20: both oscillators overbought",
                fmt_metric(rsi),
                fmt_metric(williams)
            ),
        };
    }

    OscillatorVerdict {
        signal: OscillatorSignal::Watch,
        reason: format!(
            "no oversold/overbought alignment (RSI {}, Williams %R {})",
            fmt_metric(rsi),
            fmt_metric(williams)
        ),
    }
}
