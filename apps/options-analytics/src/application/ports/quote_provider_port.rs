//! Quote Provider Port (Driven Port)
//!
//! Interface for the latest underlying price.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::MarketDataError;

/// Latest price of an underlying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotQuote {
    /// Symbol (e.g., "AAPL").
    pub symbol: String,
    /// Last price.
    pub price: Decimal,
}

impl SpotQuote {
    /// Create a new quote.
    #[must_use]
    pub fn new(symbol: impl Into<String>, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            price,
        }
    }

    /// Price as `f64` for the pricing model.
    #[must_use]
    pub fn price_f64(&self) -> f64 {
        self.price.to_f64().unwrap_or(0.0)
    }
}

/// Port for fetching the underlying price.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProviderPort: Send + Sync {
    /// Get the latest quote for a symbol.
    async fn get_quote(&self, symbol: &str) -> Result<SpotQuote, MarketDataError>;
}
