//! Analyze Strategy Use Case

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::dto::{AnalyzeStrategyRequest, StrategyAnalysisResponse};
use crate::application::ports::{
    HistoryInterval, OptionChainPort, PriceHistoryPort, QuoteProviderPort,
};
use crate::application::settings::AnalyticsSettings;
use crate::error::AnalyticsResult;
use crate::pricing::{IvSolver, PricingEngine};
use crate::strategy::{
    MarketContext, StrategyBuilder, StrategyBuilderConfig, StrategyComposer, StrategyRequest,
};
use crate::volatility::VolatilityEstimator;

/// Use case for multi-leg strategy analysis.
pub struct AnalyzeStrategyUseCase<Q, C, H>
where
    Q: QuoteProviderPort,
    C: OptionChainPort,
    H: PriceHistoryPort,
{
    quotes: Arc<Q>,
    chains: Arc<C>,
    history: Arc<H>,
    composer: StrategyComposer,
    settings: AnalyticsSettings,
}

impl<Q, C, H> AnalyzeStrategyUseCase<Q, C, H>
where
    Q: QuoteProviderPort,
    C: OptionChainPort,
    H: PriceHistoryPort,
{
    /// Create a new AnalyzeStrategyUseCase.
    pub fn new(quotes: Arc<Q>, chains: Arc<C>, history: Arc<H>, settings: AnalyticsSettings) -> Self {
        let mut composer = StrategyComposer::new(
            PricingEngine::new(),
            VolatilityEstimator::new(&settings.volatility),
            settings.strategy.clone(),
        );
        if settings.volatility.solve_iv_from_mid {
            composer = composer.with_iv_solver(IvSolver::default());
        }

        Self {
            quotes,
            chains,
            history,
            composer,
            settings,
        }
    }

    /// Execute the use case.
    ///
    /// Spot is required. The chain and price history only improve premium
    /// and volatility resolution, so their failures are logged and the
    /// analysis proceeds without them.
    #[tracing::instrument(
        skip(self, request),
        fields(symbol = %request.symbol, strategy = %request.strategy_type)
    )]
    pub async fn execute(
        &self,
        request: AnalyzeStrategyRequest,
    ) -> AnalyticsResult<StrategyAnalysisResponse> {
        let strategy = self.strategy_request(&request)?;
        strategy.validate()?;

        let spot = self.quotes.get_quote(&request.symbol).await?.price_f64();

        let chain = match self
            .chains
            .get_chain(&request.symbol, Some(request.expiration_date))
            .await
        {
            Ok(snapshot) => Some(snapshot.into_chain()),
            Err(e) => {
                warn!(error = %e, "Options chain unavailable, legs priced from the model");
                None
            }
        };

        let lookback = self
            .settings
            .volatility
            .lookback_for(self.settings.volatility.fallback_period_days);
        let close_prices = match self
            .history
            .get_historical(&request.symbol, lookback, HistoryInterval::Daily)
            .await
        {
            Ok(history) => history.closes_f64(),
            Err(e) => {
                warn!(error = %e, "Price history unavailable, no historical volatility fallback");
                Vec::new()
            }
        };

        let market = MarketContext {
            spot,
            time_to_expiry: self.settings.time_to_expiry(request.expiration_date),
            risk_free_rate: self.settings.pricing.risk_free_rate,
            dividend_yield: self.settings.pricing.default_dividend_yield,
            chain,
            close_prices,
        };

        let analysis = self.composer.analyze(&strategy, &market)?;

        info!(
            legs = analysis.legs.len(),
            net_debit = analysis.net_debit,
            max_profit = analysis.max_profit,
            max_loss = analysis.max_loss,
            warnings = analysis.warnings.len(),
            "Strategy analyzed"
        );

        Ok(StrategyAnalysisResponse::new(request.symbol, analysis))
    }

    /// Explicit legs, or the preset for the strategy type and strikes.
    fn strategy_request(&self, request: &AnalyzeStrategyRequest) -> AnalyticsResult<StrategyRequest> {
        match &request.strikes {
            Some(strikes) if request.legs.is_empty() => {
                let config = StrategyBuilderConfig {
                    max_width: self.settings.strategy.preset_max_width,
                    quantity: request.quantity,
                };
                StrategyBuilder::with_config(request.expiration_date, config)
                    .build(&request.strategy_type, strikes)
            }
            _ => Ok(StrategyRequest {
                strategy_type: request.strategy_type.clone(),
                legs: request.legs.clone(),
                expiration: request.expiration_date,
            }),
        }
    }
}
