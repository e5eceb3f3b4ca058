//! Volatility estimation.
//!
//! Historical (realized) volatility over lookback windows of daily closes,
//! and the fallback policy that decides which volatility a pricing call
//! uses when the options chain does not quote one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::VolatilityConfig;

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Lookback (in returns) of the historical fallback volatility.
pub const DEFAULT_FALLBACK_PERIOD: u32 = 30;

/// Realized volatility over one lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityResult {
    /// Requested window length in trading days.
    pub days: u32,
    /// Standard deviation of daily log returns (decimal).
    pub volatility: f64,
    /// Annualized volatility in percent (`volatility · √252 · 100`).
    pub annualized: f64,
}

/// Where a resolved volatility came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilitySource {
    /// Implied volatility quoted by the options chain.
    Implied,
    /// Implied volatility backed out of the quoted mid price.
    Solved,
    /// Historical volatility fallback.
    Historical,
    /// Nothing usable; pricing with it will fail.
    Unavailable,
}

/// Volatility chosen for a pricing call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedVolatility {
    /// Annualized volatility as a decimal.
    pub value: f64,
    /// Origin of the value.
    pub source: VolatilitySource,
}

/// Historical volatility estimator and implied-volatility fallback policy.
#[derive(Debug, Clone)]
pub struct VolatilityEstimator {
    trading_days_per_year: f64,
    fallback_period: u32,
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self {
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            fallback_period: DEFAULT_FALLBACK_PERIOD,
        }
    }
}

impl VolatilityEstimator {
    /// Create an estimator from configuration.
    #[must_use]
    pub fn new(config: &VolatilityConfig) -> Self {
        Self {
            trading_days_per_year: config.trading_days_per_year,
            fallback_period: config.fallback_period_days,
        }
    }

    /// Lookback of the historical fallback.
    #[must_use]
    pub const fn fallback_period(&self) -> u32 {
        self.fallback_period
    }

    /// Daily log returns `ln(P_t / P_(t-1))`.
    ///
    /// Pairs involving a non-positive or non-finite price are skipped.
    #[must_use]
    pub fn log_returns(closes: &[f64]) -> Vec<f64> {
        closes
            .windows(2)
            .filter(|w| w.iter().all(|p| p.is_finite() && *p > 0.0))
            .map(|w| (w[1] / w[0]).ln())
            .collect()
    }

    /// Realized volatility for each requested window.
    ///
    /// Each window uses the most recent `period` returns (or all of them
    /// when fewer are available). Windows with fewer than two returns
    /// report zero volatility.
    #[must_use]
    pub fn historical_volatility(&self, closes: &[f64], periods: &[u32]) -> Vec<VolatilityResult> {
        let returns = Self::log_returns(closes);
        periods
            .iter()
            .map(|&days| self.window(&returns, days))
            .collect()
    }

    fn window(&self, returns: &[f64], days: u32) -> VolatilityResult {
        let take = (days as usize).min(returns.len());
        let recent = &returns[returns.len() - take..];

        let volatility = if recent.len() < 2 {
            0.0
        } else {
            population_std_dev(recent)
        };

        VolatilityResult {
            days,
            volatility,
            annualized: volatility * self.trading_days_per_year.sqrt() * 100.0,
        }
    }

    /// Historical fallback volatility as an annualized decimal.
    #[must_use]
    pub fn fallback_volatility(&self, closes: &[f64]) -> f64 {
        let returns = Self::log_returns(closes);
        self.window(&returns, self.fallback_period).annualized / 100.0
    }

    /// Pick the volatility for a pricing call.
    ///
    /// Order of preference: quoted implied volatility, volatility solved
    /// from the quoted premium, then the historical fallback.
    #[must_use]
    pub fn resolve(
        &self,
        quoted: Option<f64>,
        solved: Option<f64>,
        historical: f64,
    ) -> ResolvedVolatility {
        let usable = |v: &f64| v.is_finite() && *v > 0.0;

        let resolved = if let Some(value) = quoted.filter(usable) {
            ResolvedVolatility {
                value,
                source: VolatilitySource::Implied,
            }
        } else if let Some(value) = solved.filter(usable) {
            ResolvedVolatility {
                value,
                source: VolatilitySource::Solved,
            }
        } else if usable(&historical) {
            ResolvedVolatility {
                value: historical,
                source: VolatilitySource::Historical,
            }
        } else {
            ResolvedVolatility {
                value: 0.0,
                source: VolatilitySource::Unavailable,
            }
        };

        debug!(value = resolved.value, source = ?resolved.source, "volatility resolved");
        resolved
    }
}

/// Uncorrected (population) standard deviation.
fn population_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_log_returns() {
        let returns = VolatilityEstimator::log_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!(approx_eq(returns[0], 1.1_f64.ln(), 1e-12));
        assert!(approx_eq(returns[1], 0.9_f64.ln(), 1e-12));
    }

    #[test]
    fn test_log_returns_skip_bad_prices() {
        let returns = VolatilityEstimator::log_returns(&[100.0, 0.0, 101.0, 102.0]);
        assert_eq!(returns.len(), 1);
        assert!(approx_eq(returns[0], (102.0_f64 / 101.0).ln(), 1e-12));
    }

    #[test]
    fn test_alternating_series() {
        // Returns are +x, -x, +x, -x: mean 0, population std dev x
        let closes = [100.0, 110.0, 100.0, 110.0, 100.0];
        let estimator = VolatilityEstimator::default();
        let results = estimator.historical_volatility(&closes, &[4]);

        let x = 1.1_f64.ln();
        assert_eq!(results[0].days, 4);
        assert!(approx_eq(results[0].volatility, x, 1e-12));
        assert!(approx_eq(
            results[0].annualized,
            x * 252.0_f64.sqrt() * 100.0,
            1e-9
        ));
    }

    #[test]
    fn test_constant_growth_has_zero_volatility() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let results = VolatilityEstimator::default().historical_volatility(&closes, &[10, 30]);
        for r in results {
            assert!(r.volatility < 1e-12);
        }
    }

    #[test]
    fn test_window_uses_most_recent_returns() {
        // Calm history followed by a volatile tail
        let mut closes = vec![100.0; 30];
        closes.extend([105.0, 100.0, 105.0, 100.0, 105.0]);

        let results = VolatilityEstimator::default().historical_volatility(&closes, &[4, 34]);
        let short = results[0];
        let long = results[1];

        assert!(approx_eq(short.volatility, 1.05_f64.ln(), 1e-12));
        assert!(long.volatility < short.volatility);
    }

    #[test]
    fn test_insufficient_data_reports_zero() {
        let estimator = VolatilityEstimator::default();

        let results = estimator.historical_volatility(&[100.0, 101.0], &[10]);
        assert_eq!(results[0].volatility, 0.0);
        assert_eq!(results[0].annualized, 0.0);

        let results = estimator.historical_volatility(&[], &[10, 20]);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.volatility == 0.0));
    }

    #[test]
    fn test_period_longer_than_history_uses_all_returns() {
        let closes = [100.0, 102.0, 99.0, 103.0];
        let estimator = VolatilityEstimator::default();
        let results = estimator.historical_volatility(&closes, &[3, 90]);
        assert!(approx_eq(results[0].volatility, results[1].volatility, 1e-15));
        assert_eq!(results[1].days, 90);
    }

    #[test]
    fn test_fallback_volatility_is_decimal() {
        let closes = [100.0, 110.0, 100.0, 110.0, 100.0];
        let estimator = VolatilityEstimator::default();
        let fallback = estimator.fallback_volatility(&closes);
        let expected = 1.1_f64.ln() * 252.0_f64.sqrt();
        assert!(approx_eq(fallback, expected, 1e-9));
    }

    #[test]
    fn test_resolve_preference_order() {
        let estimator = VolatilityEstimator::default();

        let r = estimator.resolve(Some(0.25), Some(0.3), 0.2);
        assert_eq!(r.source, VolatilitySource::Implied);
        assert_eq!(r.value, 0.25);

        let r = estimator.resolve(Some(0.0), Some(0.3), 0.2);
        assert_eq!(r.source, VolatilitySource::Solved);

        let r = estimator.resolve(None, None, 0.2);
        assert_eq!(r.source, VolatilitySource::Historical);
        assert_eq!(r.value, 0.2);

        let r = estimator.resolve(None, Some(f64::NAN), 0.0);
        assert_eq!(r.source, VolatilitySource::Unavailable);
        assert_eq!(r.value, 0.0);
    }
}
