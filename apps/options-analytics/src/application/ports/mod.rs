//! Application Ports (Driven Ports)
//!
//! Interfaces the use cases depend on for market data. Implementations
//! live in `infrastructure`; tests use the generated mocks.

mod option_chain_port;
mod price_history_port;
mod quote_provider_port;

use crate::error::AnalyticsError;

pub use option_chain_port::{ChainSnapshot, ContractQuote, OptionChainPort};
pub use price_history_port::{HistoryInterval, PriceHistory, PriceHistoryPort};
pub use quote_provider_port::{QuoteProviderPort, SpotQuote};

#[cfg(test)]
pub use option_chain_port::MockOptionChainPort;
#[cfg(test)]
pub use price_history_port::MockPriceHistoryPort;
#[cfg(test)]
pub use quote_provider_port::MockQuoteProviderPort;

/// Market data collaborator error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketDataError {
    /// Symbol not known to the provider.
    #[error("Symbol not found: {symbol}")]
    SymbolNotFound {
        /// The unknown symbol.
        symbol: String,
    },

    /// No chain listed for the requested expiration.
    #[error("No options chain for {symbol} expiring {expiration}")]
    ExpirationNotFound {
        /// Underlying symbol.
        symbol: String,
        /// Requested expiration.
        expiration: String,
    },

    /// Provider could not be reached.
    #[error("Market data connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Provider returned nothing usable.
    #[error("Market data unavailable: {message}")]
    DataUnavailable {
        /// Error details.
        message: String,
    },
}

impl From<MarketDataError> for AnalyticsError {
    fn from(error: MarketDataError) -> Self {
        Self::data_unavailable(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn market_data_error_maps_to_data_unavailable() {
        let err: AnalyticsError = MarketDataError::SymbolNotFound {
            symbol: "ZZZZ".to_string(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::DataUnavailable);
        assert!(err.to_string().contains("ZZZZ"));
    }
}
