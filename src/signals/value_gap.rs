// =============================================================================
// Value-Gap Strategy — overheat checks, then price vs fair value
// =============================================================================
//
// Classification rules, first match wins:
//   SELL_OVERHEATED  if RSI > 70 or price > upper Bollinger band
//   BUY_OPPORTUNITY  if price < fair_value * 0.95
//   WATCH            otherwise
//
// The strategy needs a fair value (estimate or user override), so the
// caller only invokes it when one exists. An undefined indicator never
// satisfies an overheat condition.

use serde::Serialize;

use crate::indicators::IndicatorSnapshot;
use crate::signals::fmt_metric;

/// Signal categories of the value-gap strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueGapSignal {
    SellOverheated,
    BuyOpportunity,
    Watch,
}

impl std::fmt::Display for ValueGapSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SellOverheated => write!(f, "SELL_OVERHEATED"),
            Self::BuyOpportunity => write!(f, "BUY_OPPORTUNITY"),
            Self::Watch => write!(f, "WATCH"),
        }
    }
}

/// Verdict plus a human-readable rationale for the dashboard banner.
#[derive(Debug, Clone, Serialize)]
pub struct ValueGapVerdict {
    pub signal: ValueGapSignal,
    pub reason: String,
}

/// Classify the value-gap strategy for `price` against `fair_value`.
pub fn classify_value_gap(
    snapshot: &IndicatorSnapshot,
    price: f64,
    fair_value: f64,
) -> ValueGapVerdict {
    let rsi_hot = snapshot.rsi.map_or(false, |r| r > 70.0);
    let band_breach = snapshot.bollinger_upper.map_or(false, |u| price > u);

    if rsi_hot || band_breach {
        let mut causes = Vec::new();
        if rsi_hot {
            causes.push(format!("RSI {} > 70", fmt_metric(snapshot.rsi)));
        }
        if band_breach {
            causes.push(format!(
                "price {price:.2} above upper band {}",
                fmt_metric(snapshot.bollinger_upper)
            ));
        }
        return ValueGapVerdict {
            signal: ValueGapSignal::SellOverheated,
            reason: causes.join("; "),
        };
    }

    if price < fair_value * 0.95 {
        return ValueGapVerdict {
            signal: ValueGapSignal::BuyOpportunity,
            reason: format!(
                "price {price:.2} is below 95% of fair value {fair_value:.2}"
            ),
        };
    }

    ValueGapVerdict {
        signal: ValueGapSignal::Watch,
        reason: format!(
            "price {price:.2} near fair value {fair_value:.2}, no overheat condition"
        ),
    }
}
