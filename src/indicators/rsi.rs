// =============================================================================
// Relative Strength Index (RSI) — simple rolling mean
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether a stock is overbought or oversold.
//
// Step 1 — Per-bar gain = max(delta, 0), loss = max(-delta, 0).
// Step 2 — Average gain / loss = simple rolling mean over the trailing
//          `window` deltas. Deliberately NOT Wilder's smoothing: the plain
//          rolling mean is the formula this dashboard ships.
// Step 3 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// When avg_loss is zero (only gains, or a completely flat window) the ratio
// is singular; the result is defined as exactly 100.0 instead of an error.
// =============================================================================

use crate::series::rolling_mean;

/// Compute the latest RSI value over the trailing `window` price deltas.
///
/// Needs `window + 1` closes (`window` deltas).
///
/// # Edge cases
/// - `window == 0` => `None`
/// - `closes.len() < window + 1` => `None`
/// - `avg_loss == 0` (all gains or flat window) => exactly `100.0`
pub fn calculate_rsi(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window + 1 {
        return None;
    }

    let gains: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let losses: Vec<f64> = closes.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    let avg_gain = rolling_mean(&gains, window).last().copied().flatten()?;
    let avg_loss = rolling_mean(&losses, window).last().copied().flatten()?;

    Some(rsi_from_averages(avg_gain, avg_loss))
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// `avg_loss == 0` is the singular case and yields exactly 100.0 — this
/// covers both "only gains" and "no movement at all".
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_none());
    }

    #[test]
    fn rsi_window_zero() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).is_none());
    }

    #[test]
    fn rsi_insufficient_data() {
        // Need window+1 closes (window deltas). 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(calculate_rsi(&closes, 14).is_none());
    }

    #[test]
    fn rsi_exactly_enough_data() {
        let closes: Vec<f64> = (1..=15).map(|x| x as f64).collect();
        assert!(calculate_rsi(&closes, 14).is_some());
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let rsi = calculate_rsi(&closes, 14).unwrap();
        assert!((rsi - 100.0).abs() < 1e-10, "expected 100.0, got {rsi}");
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let rsi = calculate_rsi(&closes, 14).unwrap();
        assert!(rsi.abs() < 1e-10, "expected 0.0, got {rsi}");
    }

    #[test]
    fn rsi_flat_series_reports_100() {
        // avg_loss == 0 on a flat window is the singular case: exactly 100,
        // never NaN or an error.
        let closes = vec![100.0; 25];
        let rsi = calculate_rsi(&closes, 14).unwrap();
        assert_eq!(rsi, 100.0);
    }

    #[test]
    fn rsi_uses_simple_rolling_mean() {
        // closes [1, 2, 4, 3], window 2: trailing gains [2, 0], losses [0, 1]
        // => avg_gain 1.0, avg_loss 0.5, RS 2, RSI = 100 - 100/3 = 66.67.
        // Wilder smoothing would give 60 here.
        let rsi = calculate_rsi(&[1.0, 2.0, 4.0, 3.0], 2).unwrap();
        assert!((rsi - 200.0 / 3.0).abs() < 1e-10, "got {rsi}");
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let rsi = calculate_rsi(&closes, 14).unwrap();
        assert!((0.0..=100.0).contains(&rsi), "RSI {rsi} out of range");
    }
}
