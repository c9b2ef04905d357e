// =============================================================================
// Bollinger Bands
// =============================================================================
//
// A volatility envelope around a simple moving average: the middle band is
// the rolling mean of the closes, the upper/lower bands sit k standard
// deviations above/below it. The deviation is the *sample* standard
// deviation (see `series::rolling_std`); band width depends on that choice.
//
// Only the latest band values are consumed by the signal classifier.

use crate::series::{rolling_mean, rolling_std};

/// Latest Bollinger Band values.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Calculate the latest Bollinger Bands over the trailing `window` closes.
///
/// - `middle` = rolling mean
/// - `upper`  = middle + `k` * sample std
/// - `lower`  = middle - `k` * sample std
///
/// # Edge cases
/// - `window == 0` or fewer than `window` closes => `None`
/// - `window == 1` => `None` (no sample deviation from one observation)
/// - Non-finite band values => `None`
pub fn calculate_bollinger(closes: &[f64], window: usize, k: f64) -> Option<BollingerBands> {
    if window == 0 || closes.len() < window {
        return None;
    }

    let middle = rolling_mean(closes, window).last().copied().flatten()?;
    let std_dev = rolling_std(closes, window).last().copied().flatten()?;

    let upper = middle + k * std_dev;
    let lower = middle - k * std_dev;

    if upper.is_finite() && lower.is_finite() {
        Some(BollingerBands {
            upper,
            middle,
            lower,
        })
    } else {
        None
    }
}
