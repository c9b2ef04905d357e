// =============================================================================
// Series Utilities — rolling-window statistics and EMA
// =============================================================================
//
// Building blocks for the indicator engine. Every rolling function returns a
// vector aligned to the input: position i holds the statistic of the trailing
// window ending at i, and the first `window - 1` positions are `None` because
// no complete window exists yet. Callers usually consume only the final
// element, but alignment keeps the undefined prefix explicit instead of
// shifting indices silently.
//
// `rolling_std` uses the *sample* standard deviation (ddof = 1). Bollinger
// Band width is sensitive to this choice, so it is fixed here rather than
// left to each caller.

/// Rolling mean over a trailing `window`.
///
/// # Edge cases
/// - `window == 0` or `window > series.len()` => all `None`
/// - Non-finite window results become `None`.
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_apply(series, window, |w| {
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        mean.is_finite().then_some(mean)
    })
}

/// Rolling sample standard deviation (ddof = 1) over a trailing `window`.
///
/// # Edge cases
/// - `window < 2` => all `None` (one observation has no sample deviation)
/// - `window > series.len()` => all `None`
/// - Non-finite window results become `None`.
pub fn rolling_std(series: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; series.len()];
    }
    rolling_apply(series, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let variance = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std_dev = variance.sqrt();
        std_dev.is_finite().then_some(std_dev)
    })
}

/// Rolling maximum over a trailing `window`.
pub fn rolling_max(series: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_apply(series, window, |w| {
        let max = w.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        max.is_finite().then_some(max)
    })
}

/// Rolling minimum over a trailing `window`.
pub fn rolling_min(series: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling_apply(series, window, |w| {
        let min = w.iter().copied().fold(f64::INFINITY, f64::min);
        min.is_finite().then_some(min)
    })
}

/// Exponential moving average with `alpha = 2 / (span + 1)`, seeded with the
/// first observation (not an SMA of the first `span` values).
///
/// The result is defined from index 0 and aligned to the input.
///
/// # Edge cases
/// - `span == 0` or empty input => empty vec
/// - A non-finite seed => empty vec
/// - A non-finite intermediate value stops the series early — downstream
///   consumers should not trust a broken tail.
pub fn ema(series: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || series.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);

    let seed = series[0];
    if !seed.is_finite() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(series.len());
    result.push(seed);

    let mut prev = seed;
    for &value in &series[1..] {
        let next = value * alpha + prev * (1.0 - alpha);
        if !next.is_finite() {
            break;
        }
        result.push(next);
        prev = next;
    }

    result
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Apply `f` to every complete trailing window, aligning results to the input.
fn rolling_apply<F>(series: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    if window == 0 || window > series.len() {
        return vec![None; series.len()];
    }

    let mut result = vec![None; series.len()];
    for i in (window - 1)..series.len() {
        result[i] = f(&series[i + 1 - window..=i]);
    }
    result
}
