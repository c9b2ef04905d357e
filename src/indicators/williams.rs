// =============================================================================
// Williams %R
// =============================================================================
//
// A momentum oscillator in [-100, 0] comparing the latest close to the
// recent high/low range:
//
//   %R = (highest_high - close) / (highest_high - lowest_low) * -100
//
// 0 means the close sits at the top of the range, -100 at the bottom.
// A flat window (highest high == lowest low) makes the ratio 0/0; the value
// is undefined there and reported as `None`, never a fabricated number.

use crate::series::{rolling_max, rolling_min};

/// Calculate the latest Williams %R over the trailing `window` bars.
///
/// # Edge cases
/// - `window == 0` or fewer than `window` bars => `None`
/// - Mismatched high/low/close lengths => `None`
/// - Flat window (`highest_high == lowest_low`) => `None`
pub fn calculate_williams_r(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    window: usize,
) -> Option<f64> {
    if window == 0 || highs.len() < window {
        return None;
    }
    if lows.len() != highs.len() || closes.len() != highs.len() {
        return None;
    }

    let highest_high = rolling_max(highs, window).last().copied().flatten()?;
    let lowest_low = rolling_min(lows, window).last().copied().flatten()?;
    let close = *closes.last()?;

    // Flat window — divide-by-zero guard.
    if highest_high == lowest_low {
        return None;
    }

    let wr = (highest_high - close) / (highest_high - lowest_low) * -100.0;
    wr.is_finite().then_some(wr)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn williams_empty_input() {
        assert!(calculate_williams_r(&[], &[], &[], 14).is_none());
    }

    #[test]
    fn williams_insufficient_data() {
        let highs = vec![10.0, 11.0];
        let lows = vec![9.0, 10.0];
        let closes = vec![9.5, 10.5];
        assert!(calculate_williams_r(&highs, &lows, &closes, 14).is_none());
    }

    #[test]
    fn williams_mismatched_lengths() {
        let highs = vec![10.0, 11.0, 12.0];
        let lows = vec![9.0, 10.0];
        let closes = vec![9.5, 10.5, 11.5];
        assert!(calculate_williams_r(&highs, &lows, &closes, 2).is_none());
    }

    #[test]
    fn williams_close_at_high_is_zero() {
        let highs = vec![10.0, 12.0, 14.0];
        let lows = vec![8.0, 9.0, 10.0];
        let closes = vec![9.0, 11.0, 14.0];
        let wr = calculate_williams_r(&highs, &lows, &closes, 3).unwrap();
        assert!(wr.abs() < 1e-10, "expected 0, got {wr}");
    }

    #[test]
    fn williams_close_at_low_is_minus_100() {
        let highs = vec![10.0, 12.0, 14.0];
        let lows = vec![8.0, 9.0, 10.0];
        let closes = vec![9.0, 11.0, 8.0];
        let wr = calculate_williams_r(&highs, &lows, &closes, 3).unwrap();
        assert!((wr + 100.0).abs() < 1e-10, "expected -100, got {wr}");
    }

    #[test]
    fn williams_midpoint_is_minus_50() {
        let highs = vec![20.0; 14];
        let lows = vec![10.0; 14];
        let mut closes = vec![15.0; 14];
        *closes.last_mut().unwrap() = 15.0;
        let wr = calculate_williams_r(&highs, &lows, &closes, 14).unwrap();
        assert!((wr + 50.0).abs() < 1e-10, "expected -50, got {wr}");
    }

    #[test]
    fn williams_flat_window_undefined() {
        let flat = vec![100.0; 20];
        assert!(calculate_williams_r(&flat, &flat, &flat, 14).is_none());
    }

    #[test]
    fn williams_range_check() {
        let highs = vec![45.0, 46.2, 45.8, 46.9, 47.3, 46.5, 46.0, 47.1, 48.0, 47.6, 47.2, 46.8, 47.9, 48.4];
        let lows = vec![44.1, 45.0, 44.9, 45.7, 46.2, 45.3, 45.1, 46.0, 46.8, 46.4, 46.1, 45.9, 46.7, 47.2];
        let closes = vec![44.8, 45.9, 45.2, 46.5, 46.8, 45.9, 45.6, 46.9, 47.5, 47.0, 46.5, 46.3, 47.6, 47.8];
        let wr = calculate_williams_r(&highs, &lows, &closes, 14).unwrap();
        assert!((-100.0..=0.0).contains(&wr), "%R {wr} out of range");
    }
}
