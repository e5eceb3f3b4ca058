//! Price History Port (Driven Port)
//!
//! Interface for historical closing prices.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::MarketDataError;

/// Bar interval of a price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryInterval {
    /// One close per trading day.
    #[default]
    Daily,
    /// One close per week.
    Weekly,
}

/// Closing prices, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistory {
    /// Symbol (e.g., "AAPL").
    pub symbol: String,
    /// Bar interval.
    pub interval: HistoryInterval,
    /// Closing prices, oldest first.
    pub closes: Vec<Decimal>,
}

impl PriceHistory {
    /// Closes as `f64`; unrepresentable values are dropped.
    #[must_use]
    pub fn closes_f64(&self) -> Vec<f64> {
        self.closes.iter().filter_map(ToPrimitive::to_f64).collect()
    }

    /// Most recent close.
    #[must_use]
    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().and_then(ToPrimitive::to_f64)
    }
}

/// Port for fetching historical prices.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceHistoryPort: Send + Sync {
    /// Get closing prices covering the last `lookback_days` calendar days.
    async fn get_historical(
        &self,
        symbol: &str,
        lookback_days: u32,
        interval: HistoryInterval,
    ) -> Result<PriceHistory, MarketDataError>;
}
