//! Calculate Greeks Use Case

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::dto::{CalculateGreeksRequest, GreeksResponse};
use crate::application::ports::{
    HistoryInterval, OptionChainPort, PriceHistoryPort, QuoteProviderPort,
};
use crate::application::settings::AnalyticsSettings;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::pricing::{IvSolver, PricingEngine, PricingInputs};
use crate::volatility::VolatilityEstimator;

/// Use case for pricing one contract and computing its Greeks.
pub struct CalculateGreeksUseCase<Q, C, H>
where
    Q: QuoteProviderPort,
    C: OptionChainPort,
    H: PriceHistoryPort,
{
    quotes: Arc<Q>,
    chains: Arc<C>,
    history: Arc<H>,
    engine: PricingEngine,
    estimator: VolatilityEstimator,
    iv_solver: IvSolver,
    settings: AnalyticsSettings,
}

impl<Q, C, H> CalculateGreeksUseCase<Q, C, H>
where
    Q: QuoteProviderPort,
    C: OptionChainPort,
    H: PriceHistoryPort,
{
    /// Create a new CalculateGreeksUseCase.
    pub fn new(quotes: Arc<Q>, chains: Arc<C>, history: Arc<H>, settings: AnalyticsSettings) -> Self {
        Self {
            quotes,
            chains,
            history,
            engine: PricingEngine::new(),
            estimator: VolatilityEstimator::new(&settings.volatility),
            iv_solver: IvSolver::default(),
            settings,
        }
    }

    /// Execute the use case.
    ///
    /// Volatility comes from the chain's quoted IV for the contract, then
    /// (if enabled) the IV solved from its mid, then the historical
    /// fallback.
    #[tracing::instrument(skip(self, request), fields(symbol = %request.symbol, strike = request.strike))]
    pub async fn execute(&self, request: CalculateGreeksRequest) -> AnalyticsResult<GreeksResponse> {
        let time_to_expiry = self.settings.time_to_expiry(request.expiration_date);
        if time_to_expiry <= 0.0 {
            return Err(AnalyticsError::OptionExpired { time_to_expiry });
        }

        let spot = match request.underlying_price {
            Some(price) => price,
            None => self.quotes.get_quote(&request.symbol).await?.price_f64(),
        };

        let inputs = PricingInputs::new(
            spot,
            request.strike,
            time_to_expiry,
            0.0,
            self.settings.risk_free_rate(request.risk_free_rate),
            self.settings.dividend_yield(request.dividend_yield),
            request.option_type,
        );

        let contract = match self
            .chains
            .get_chain(&request.symbol, Some(request.expiration_date))
            .await
        {
            Ok(snapshot) => snapshot
                .into_chain()
                .find(request.strike, request.option_type)
                .cloned(),
            Err(e) => {
                warn!(error = %e, "Options chain unavailable, falling back to historical volatility");
                None
            }
        };

        let quoted = contract.as_ref().and_then(|c| c.implied_volatility());
        let solved = match (quoted, contract.as_ref().and_then(|c| c.mid())) {
            (None, Some(mid)) if self.settings.volatility.solve_iv_from_mid => {
                self.iv_solver.solve(mid, &inputs).ok()
            }
            _ => None,
        };
        let historical = if quoted.is_none() && solved.is_none() {
            self.historical_fallback(&request.symbol).await?
        } else {
            0.0
        };

        let volatility = self.estimator.resolve(quoted, solved, historical);
        let inputs = inputs.with_volatility(volatility.value);

        let theoretical_price = self.engine.calculate_price(&inputs)?;
        let greeks = self.engine.calculate_greeks(&inputs)?;

        info!(
            volatility = volatility.value,
            source = ?volatility.source,
            price = theoretical_price,
            "Greeks calculated"
        );

        Ok(GreeksResponse {
            symbol: request.symbol,
            strike: request.strike,
            expiration_date: request.expiration_date,
            option_type: request.option_type,
            underlying_price: spot,
            time_to_expiry,
            implied_volatility: volatility.value,
            volatility_source: volatility.source,
            theoretical_price,
            greeks,
        }
        .rounded())
    }

    async fn historical_fallback(&self, symbol: &str) -> AnalyticsResult<f64> {
        let lookback = self
            .settings
            .volatility
            .lookback_for(self.estimator.fallback_period());
        let history = self
            .history
            .get_historical(symbol, lookback, HistoryInterval::Daily)
            .await?;
        Ok(self.estimator.fallback_volatility(&history.closes_f64()))
    }
}
