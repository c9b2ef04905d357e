// =============================================================================
// MACD Oscillator
// =============================================================================
//
// Moving Average Convergence Divergence: the difference between a fast and a
// slow EMA of the closes.
//
//   oscillator = EMA(close, fast) - EMA(close, slow)
//
// Only the MACD line itself is produced. There is no signal-line crossover:
// the dashboard renders the oscillator value directly, so a 9-period signal
// EMA would have no consumer.

use crate::series::ema;

/// Calculate the latest MACD oscillator value.
///
/// Because both EMAs are seeded with the first observation, the oscillator
/// is defined for any non-empty series (a single close yields 0.0).
///
/// # Edge cases
/// - Empty input, `fast == 0`, or `slow == 0` => `None`
/// - Non-finite result => `None`
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize) -> Option<f64> {
    if closes.is_empty() || fast == 0 || slow == 0 {
        return None;
    }

    let fast_ema = ema(closes, fast).last().copied()?;
    let slow_ema = ema(closes, slow).last().copied()?;

    let oscillator = fast_ema - slow_ema;
    oscillator.is_finite().then_some(oscillator)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_empty_input() {
        assert!(calculate_macd(&[], 12, 26).is_none());
    }

    #[test]
    fn macd_zero_spans() {
        assert!(calculate_macd(&[1.0, 2.0], 0, 26).is_none());
        assert!(calculate_macd(&[1.0, 2.0], 12, 0).is_none());
    }

    #[test]
    fn macd_single_close_is_zero() {
        // Both EMAs equal the seed, so the difference is exactly zero.
        let macd = calculate_macd(&[42.0], 12, 26).unwrap();
        assert!(macd.abs() < 1e-10);
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        let macd = calculate_macd(&closes, 12, 26).unwrap();
        assert!(macd > 0.0, "expected positive MACD, got {macd}");
    }

    #[test]
    fn macd_negative_in_downtrend() {
        let closes: Vec<f64> = (1..=60).rev().map(|x| x as f64).collect();
        let macd = calculate_macd(&closes, 12, 26).unwrap();
        assert!(macd < 0.0, "expected negative MACD, got {macd}");
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let closes = vec![500.0; 40];
        let macd = calculate_macd(&closes, 12, 26).unwrap();
        assert!(macd.abs() < 1e-10);
    }

    #[test]
    fn macd_known_values() {
        // fast span 1 => fast EMA tracks the close exactly; slow span 3 EMA
        // of [1..5] ends at 4.0625, so the oscillator is 0.9375.
        let macd = calculate_macd(&[1.0, 2.0, 3.0, 4.0, 5.0], 1, 3).unwrap();
        assert!((macd - 0.9375).abs() < 1e-10, "got {macd}");
    }
}
