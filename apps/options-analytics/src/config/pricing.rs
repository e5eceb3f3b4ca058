//! Pricing model configuration.

use serde::{Deserialize, Serialize};

/// Pricing model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Risk-free rate (annualized) used when a request does not supply one.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// Default dividend yield.
    #[serde(default)]
    pub default_dividend_yield: f64,
    /// Calendar days per year for time-to-expiry.
    #[serde(default = "default_days_per_year")]
    pub days_per_year: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            default_dividend_yield: 0.0,
            days_per_year: default_days_per_year(),
        }
    }
}

pub(crate) const fn default_risk_free_rate() -> f64 {
    0.045
}

const fn default_days_per_year() -> f64 {
    365.0
}
