//! Volatility estimation configuration.

use serde::{Deserialize, Serialize};

/// Volatility estimation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityConfig {
    /// Lookback windows (trading days) reported when a request omits them.
    #[serde(default = "default_periods")]
    pub default_periods: Vec<u32>,
    /// Window of the historical fallback used when a chain has no IV.
    #[serde(default = "default_fallback_period")]
    pub fallback_period_days: u32,
    /// Trading days per year for annualization.
    #[serde(default = "default_trading_days")]
    pub trading_days_per_year: f64,
    /// Calendar-day lookback requested from the history provider.
    #[serde(default = "default_history_lookback")]
    pub history_lookback_days: u32,
    /// Back volatility out of the quoted mid when the chain IV is missing.
    #[serde(default)]
    pub solve_iv_from_mid: bool,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        Self {
            default_periods: default_periods(),
            fallback_period_days: default_fallback_period(),
            trading_days_per_year: default_trading_days(),
            history_lookback_days: default_history_lookback(),
            solve_iv_from_mid: false,
        }
    }
}

impl VolatilityConfig {
    /// Calendar-day lookback that covers `max_period` trading days.
    #[must_use]
    pub fn lookback_for(&self, max_period: u32) -> u32 {
        // ~7 calendar days per 5 trading days, plus slack for holidays
        let needed = max_period.saturating_mul(7) / 5 + 10;
        self.history_lookback_days.max(needed)
    }
}

fn default_periods() -> Vec<u32> {
    vec![10, 20, 30, 60, 90]
}

const fn default_fallback_period() -> u32 {
    30
}

const fn default_trading_days() -> f64 {
    252.0
}

const fn default_history_lookback() -> u32 {
    365
}
