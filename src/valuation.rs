// =============================================================================
// Valuation Estimator — tiered fair-value fallback
// =============================================================================
//
// Produces a single fair-value estimate from a sparse fundamentals record.
// Tiers are evaluated in strict priority order:
//
//   1. S-RIM:         fair = BPS * (ROE_eff / r)   when BPS > 0, ROE_eff > 0
//   2. EPS multiple:  fair = EPS * (1 / r)         when EPS > 0
//   3. Price fallback: fair = price * 0.9          (all inputs absent)
//
// ROE_eff = reported ROE, else EPS/BPS when both are usable, else the
// configured default (0.10). The required return `r` defaults to 0.09.
//
// A post-hoc clamp suppresses outliers from noisy fundamentals data and is
// applied after the tiers regardless of which one fired:
//   fair < 0.5 * price  =>  0.8 * price
//   fair > 3.0 * price  =>  1.5 * price
// The clamp is idempotent: re-clamping a clamped value changes nothing.
//
// A fundamentals *fetch failure* never reaches this module — the analysis
// service reports it separately instead of fabricating a zero estimate.
// =============================================================================

use serde::Serialize;

use crate::runtime_config::ValuationParams;
use crate::types::Fundamentals;

/// Which tier produced the fair value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValuationBasis {
    Srim,
    EpsMultiple,
    PriceFallback,
}

impl std::fmt::Display for ValuationBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Srim => write!(f, "SRIM"),
            Self::EpsMultiple => write!(f, "EPS_MULTIPLE"),
            Self::PriceFallback => write!(f, "PRICE_FALLBACK"),
        }
    }
}

/// Result of a valuation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ValuationResult {
    /// Fair value after the outlier clamp.
    pub fair_value: f64,
    /// Fair value straight out of the tier formula, before clamping.
    pub raw_fair_value: f64,
    pub basis: ValuationBasis,
    /// Whether the clamp moved the value.
    pub clamped: bool,
}

/// Estimate a fair value from `fundamentals`.
///
/// Always produces a result: absent inputs fall through the tiers down to
/// the price fallback, which is an observable basis, not an error. Assumes
/// `fundamentals.current_price > 0` (the analysis service guarantees a
/// positive last close before valuing).
pub fn estimate_fair_value(fundamentals: &Fundamentals, params: &ValuationParams) -> ValuationResult {
    let price = fundamentals.current_price;
    let r = params.required_return;

    // --- Effective ROE: reported, else EPS/BPS, else the default ---------
    let derived_roe = match (fundamentals.eps, fundamentals.bps) {
        (Some(eps), Some(bps)) if bps > 0.0 => Some(eps / bps),
        _ => None,
    };
    let roe_eff = fundamentals
        .roe
        .or(derived_roe)
        .unwrap_or(params.default_roe);

    // --- Tiered formula, first usable tier wins --------------------------
    let (raw, basis) = match (fundamentals.bps, fundamentals.eps) {
        (Some(bps), _) if bps > 0.0 && roe_eff > 0.0 => {
            (bps * (roe_eff / r), ValuationBasis::Srim)
        }
        (_, Some(eps)) if eps > 0.0 => (eps * (1.0 / r), ValuationBasis::EpsMultiple),
        _ => (price * 0.9, ValuationBasis::PriceFallback),
    };

    // --- Outlier clamp, applied regardless of tier ------------------------
    let (fair, clamped) = clamp_to_price(raw, price);

    ValuationResult {
        fair_value: fair,
        raw_fair_value: raw,
        basis,
        clamped,
    }
}

/// Clamp an estimate into a sane band around the current price.
///
/// Returns the (possibly adjusted) value and whether it was adjusted. The
/// replacement multiples 0.8 / 1.5 both lie inside the 0.5..3.0 band, so the
/// operation is idempotent.
pub fn clamp_to_price(fair: f64, price: f64) -> (f64, bool) {
    if fair < price * 0.5 {
        (price * 0.8, true)
    } else if fair > price * 3.0 {
        (price * 1.5, true)
    } else {
        (fair, false)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn fundamentals(
        eps: Option<f64>,
        bps: Option<f64>,
        roe: Option<f64>,
        price: f64,
    ) -> Fundamentals {
        Fundamentals {
            eps,
            bps,
            roe,
            current_price: price,
            previous_close: None,
        }
    }

    fn params() -> ValuationParams {
        ValuationParams::default()
    }

    // ---- tiers -----------------------------------------------------------

    #[test]
    fn srim_with_reported_roe() {
        // BPS=50,000, ROE=0.10, r=0.09 => 50000 * (0.10/0.09) = 55,555.56
        let f = fundamentals(None, Some(50_000.0), Some(0.10), 50_000.0);
        let v = estimate_fair_value(&f, &params());
        assert_eq!(v.basis, ValuationBasis::Srim);
        assert!((v.raw_fair_value - 55_555.5555).abs() < 0.01);
        assert!(!v.clamped);
        assert!((v.fair_value - v.raw_fair_value).abs() < 1e-10);
    }

    #[test]
    fn srim_with_derived_roe() {
        // ROE absent => EPS/BPS = 5000/50000 = 0.10, same S-RIM result.
        let f = fundamentals(Some(5_000.0), Some(50_000.0), None, 50_000.0);
        let v = estimate_fair_value(&f, &params());
        assert_eq!(v.basis, ValuationBasis::Srim);
        assert!((v.raw_fair_value - 55_555.5555).abs() < 0.01);
    }

    #[test]
    fn srim_with_default_roe() {
        // Only BPS usable => ROE defaults to 0.10.
        let f = fundamentals(None, Some(50_000.0), None, 50_000.0);
        let v = estimate_fair_value(&f, &params());
        assert_eq!(v.basis, ValuationBasis::Srim);
        assert!((v.raw_fair_value - 55_555.5555).abs() < 0.01);
    }

    #[test]
    fn eps_multiple_when_bps_unusable() {
        // EPS=5000, no BPS/ROE => 5000 * (1/0.09) = 55,555.56
        let f = fundamentals(Some(5_000.0), None, None, 50_000.0);
        let v = estimate_fair_value(&f, &params());
        assert_eq!(v.basis, ValuationBasis::EpsMultiple);
        assert!((v.raw_fair_value - 55_555.5555).abs() < 0.01);
    }

    #[test]
    fn negative_roe_skips_srim() {
        let f = fundamentals(Some(5_000.0), Some(50_000.0), Some(-0.05), 50_000.0);
        let v = estimate_fair_value(&f, &params());
        assert_eq!(v.basis, ValuationBasis::EpsMultiple);
    }

    #[test]
    fn negative_bps_skips_srim() {
        let f = fundamentals(Some(5_000.0), Some(-1_000.0), Some(0.10), 50_000.0);
        let v = estimate_fair_value(&f, &params());
        assert_eq!(v.basis, ValuationBasis::EpsMultiple);
    }

    #[test]
    fn price_fallback_when_all_absent() {
        let f = fundamentals(None, None, None, 10_000.0);
        let v = estimate_fair_value(&f, &params());
        assert_eq!(v.basis, ValuationBasis::PriceFallback);
        assert!((v.raw_fair_value - 9_000.0).abs() < 1e-10);
        assert!(!v.clamped);
    }

    #[test]
    fn negative_eps_falls_to_price_fallback() {
        let f = fundamentals(Some(-2_000.0), None, None, 10_000.0);
        let v = estimate_fair_value(&f, &params());
        assert_eq!(v.basis, ValuationBasis::PriceFallback);
    }

    // ---- clamp -----------------------------------------------------------

    #[test]
    fn clamp_low_outlier() {
        let (fair, clamped) = clamp_to_price(100.0, 1_000.0);
        assert!((fair - 800.0).abs() < 1e-10);
        assert!(clamped);
    }

    #[test]
    fn clamp_high_outlier() {
        let (fair, clamped) = clamp_to_price(10_000.0, 1_000.0);
        assert!((fair - 1_500.0).abs() < 1e-10);
        assert!(clamped);
    }

    #[test]
    fn clamp_inside_band_untouched() {
        let (fair, clamped) = clamp_to_price(1_200.0, 1_000.0);
        assert!((fair - 1_200.0).abs() < 1e-10);
        assert!(!clamped);
    }

    #[test]
    fn clamp_is_idempotent() {
        let price = 1_000.0;
        for raw in [10.0, 499.0, 500.0, 900.0, 2_999.0, 3_001.0, 50_000.0] {
            let (once, _) = clamp_to_price(raw, price);
            let (twice, again) = clamp_to_price(once, price);
            assert!((once - twice).abs() < 1e-10, "raw {raw} not idempotent");
            assert!(!again, "second clamp moved value for raw {raw}");
        }
    }

    #[test]
    fn estimator_applies_clamp_to_srim_tier() {
        // Huge BPS relative to price blows past 3x and lands on 1.5x.
        let f = fundamentals(None, Some(500_000.0), Some(0.20), 10_000.0);
        let v = estimate_fair_value(&f, &params());
        assert_eq!(v.basis, ValuationBasis::Srim);
        assert!(v.clamped);
        assert!((v.fair_value - 15_000.0).abs() < 1e-10);
        assert!(v.raw_fair_value > v.fair_value);
    }

    #[test]
    fn clamped_value_within_band() {
        let price = 7_500.0;
        for raw in [1.0, 100.0, 1_000.0, 10_000.0, 1_000_000.0] {
            let (fair, _) = clamp_to_price(raw, price);
            assert!(fair >= 0.5 * price && fair <= 3.0 * price);
        }
    }
}
