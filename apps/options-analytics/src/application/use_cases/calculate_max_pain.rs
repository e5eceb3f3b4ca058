//! Calculate Max Pain Use Case

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::dto::{MaxPainRequest, MaxPainResponse};
use crate::application::ports::{OptionChainPort, QuoteProviderPort};
use crate::error::AnalyticsResult;
use crate::options::MaxPainCalculator;

/// Use case for the max-pain strike of an expiration.
pub struct CalculateMaxPainUseCase<Q, C>
where
    Q: QuoteProviderPort,
    C: OptionChainPort,
{
    quotes: Arc<Q>,
    chains: Arc<C>,
    calculator: MaxPainCalculator,
}

impl<Q, C> CalculateMaxPainUseCase<Q, C>
where
    Q: QuoteProviderPort,
    C: OptionChainPort,
{
    /// Create a new CalculateMaxPainUseCase.
    pub const fn new(quotes: Arc<Q>, chains: Arc<C>) -> Self {
        Self {
            quotes,
            chains,
            calculator: MaxPainCalculator::new(),
        }
    }

    /// Execute the use case.
    ///
    /// The current price is the chain's underlying price, else the quote
    /// provider's; it is informational and reported as 0 when neither
    /// source has one.
    #[tracing::instrument(skip(self, request), fields(symbol = %request.symbol))]
    pub async fn execute(&self, request: MaxPainRequest) -> AnalyticsResult<MaxPainResponse> {
        let snapshot = self
            .chains
            .get_chain(&request.symbol, request.expiration_date)
            .await?;
        let chain = snapshot.into_chain();

        let result = self.calculator.calculate(&chain)?;

        let current_price = match chain.underlying_price() {
            Some(price) => price,
            None => match self.quotes.get_quote(&request.symbol).await {
                Ok(quote) => quote.price_f64(),
                Err(e) => {
                    warn!(error = %e, "Underlying quote unavailable");
                    0.0
                }
            },
        };

        info!(
            expiration = %chain.expiration,
            max_pain = result.max_pain_price,
            total_open_interest = result.total_open_interest,
            "Max pain calculated"
        );

        Ok(MaxPainResponse::new(
            request.symbol,
            chain.expiration,
            current_price,
            result,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        ChainSnapshot, ContractQuote, MarketDataError, MockOptionChainPort, MockQuoteProviderPort,
        SpotQuote,
    };
    use crate::error::ErrorCode;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn expiration() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 20).unwrap()
    }

    fn chain(underlying_price: Option<Decimal>) -> ChainSnapshot {
        ChainSnapshot {
            symbol: "SPY".to_string(),
            expiration_date: expiration(),
            underlying_price,
            calls: vec![
                ContractQuote::with_open_interest(dec!(95), 100),
                ContractQuote::with_open_interest(dec!(100), 200),
                ContractQuote::with_open_interest(dec!(105), 50),
            ],
            puts: vec![
                ContractQuote::with_open_interest(dec!(95), 50),
                ContractQuote::with_open_interest(dec!(100), 200),
                ContractQuote::with_open_interest(dec!(105), 100),
            ],
        }
    }

    #[tokio::test]
    async fn max_pain_with_nearest_expiration() {
        let mut chains = MockOptionChainPort::new();
        chains
            .expect_get_chain()
            .withf(|symbol, expiration| symbol == "SPY" && expiration.is_none())
            .times(1)
            .returning(|_, _| Ok(chain(Some(dec!(101.25)))));
        let mut quotes = MockQuoteProviderPort::new();
        quotes.expect_get_quote().never();

        let use_case = CalculateMaxPainUseCase::new(Arc::new(quotes), Arc::new(chains));
        let response = use_case
            .execute(MaxPainRequest {
                symbol: "SPY".to_string(),
                expiration_date: None,
            })
            .await
            .unwrap();

        assert_eq!(response.max_pain_price, 100.0);
        assert_eq!(response.total_open_interest, 700);
        assert_eq!(response.put_call_ratio, 1.0);
        assert_eq!(response.current_price, 101.25);
        assert_eq!(response.expiration_date, expiration());
        assert_eq!(response.price_points.len(), 3);
    }

    #[tokio::test]
    async fn current_price_from_quote_provider() {
        let mut chains = MockOptionChainPort::new();
        chains
            .expect_get_chain()
            .returning(|_, _| Ok(chain(None)));
        let mut quotes = MockQuoteProviderPort::new();
        quotes
            .expect_get_quote()
            .times(1)
            .returning(|symbol| Ok(SpotQuote::new(symbol, dec!(99.5))));

        let use_case = CalculateMaxPainUseCase::new(Arc::new(quotes), Arc::new(chains));
        let response = use_case
            .execute(MaxPainRequest {
                symbol: "SPY".to_string(),
                expiration_date: Some(expiration()),
            })
            .await
            .unwrap();
        assert_eq!(response.current_price, 99.5);
    }

    #[tokio::test]
    async fn empty_chain_is_data_unavailable() {
        let mut chains = MockOptionChainPort::new();
        chains.expect_get_chain().returning(|symbol, _| {
            Ok(ChainSnapshot {
                symbol: symbol.to_string(),
                expiration_date: expiration(),
                underlying_price: None,
                calls: vec![],
                puts: vec![],
            })
        });

        let use_case =
            CalculateMaxPainUseCase::new(Arc::new(MockQuoteProviderPort::new()), Arc::new(chains));
        let Err(err) = use_case
            .execute(MaxPainRequest {
                symbol: "SPY".to_string(),
                expiration_date: None,
            })
            .await
        else {
            panic!("expected DataUnavailable");
        };
        assert_eq!(err.code(), ErrorCode::DataUnavailable);
    }

    #[tokio::test]
    async fn chain_error_is_data_unavailable() {
        let mut chains = MockOptionChainPort::new();
        chains.expect_get_chain().returning(|symbol, expiration| {
            Err(MarketDataError::ExpirationNotFound {
                symbol: symbol.to_string(),
                expiration: format!("{expiration:?}"),
            })
        });

        let use_case =
            CalculateMaxPainUseCase::new(Arc::new(MockQuoteProviderPort::new()), Arc::new(chains));
        let Err(err) = use_case
            .execute(MaxPainRequest {
                symbol: "SPY".to_string(),
                expiration_date: Some(expiration()),
            })
            .await
        else {
            panic!("expected DataUnavailable");
        };
        assert_eq!(err.code(), ErrorCode::DataUnavailable);
    }
}
