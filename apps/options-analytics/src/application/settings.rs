//! Use case settings derived from the loaded configuration.

use chrono::{NaiveDate, Utc};

use crate::config::{Config, PricingConfig, StrategyConfig, VolatilityConfig};
use crate::pricing::year_fraction;

/// Settings shared by the use cases.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsSettings {
    /// Pricing defaults.
    pub pricing: PricingConfig,
    /// Volatility estimation settings.
    pub volatility: VolatilityConfig,
    /// Strategy analysis settings.
    pub strategy: StrategyConfig,
    /// Fixed valuation date; the current UTC date when absent.
    pub valuation_date: Option<NaiveDate>,
}

impl From<&Config> for AnalyticsSettings {
    fn from(config: &Config) -> Self {
        Self {
            pricing: config.pricing.clone(),
            volatility: config.volatility.clone(),
            strategy: config.strategy.clone(),
            valuation_date: config.valuation_date,
        }
    }
}

impl AnalyticsSettings {
    /// Pin the valuation date.
    #[must_use]
    pub const fn with_valuation_date(mut self, date: NaiveDate) -> Self {
        self.valuation_date = Some(date);
        self
    }

    /// The date time-to-expiry is measured from.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.valuation_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Years from the valuation date to `expiration`.
    #[must_use]
    pub fn time_to_expiry(&self, expiration: NaiveDate) -> f64 {
        year_fraction(expiration, self.today(), self.pricing.days_per_year)
    }

    /// Request rate, else the configured default.
    #[must_use]
    pub fn risk_free_rate(&self, requested: Option<f64>) -> f64 {
        requested.unwrap_or(self.pricing.risk_free_rate)
    }

    /// Request dividend yield, else the configured default.
    #[must_use]
    pub fn dividend_yield(&self, requested: Option<f64>) -> f64 {
        requested.unwrap_or(self.pricing.default_dividend_yield)
    }
}
