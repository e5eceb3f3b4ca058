//! Historical Volatility Use Case

use std::sync::Arc;

use tracing::info;

use crate::application::dto::{HistoricalVolatilityRequest, HistoricalVolatilityResponse};
use crate::application::ports::{HistoryInterval, PriceHistoryPort};
use crate::application::settings::AnalyticsSettings;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::volatility::VolatilityEstimator;

/// Use case for realized volatility over several lookback windows.
pub struct HistoricalVolatilityUseCase<H>
where
    H: PriceHistoryPort,
{
    history: Arc<H>,
    estimator: VolatilityEstimator,
    settings: AnalyticsSettings,
}

impl<H> HistoricalVolatilityUseCase<H>
where
    H: PriceHistoryPort,
{
    /// Create a new HistoricalVolatilityUseCase.
    pub fn new(history: Arc<H>, settings: AnalyticsSettings) -> Self {
        Self {
            history,
            estimator: VolatilityEstimator::new(&settings.volatility),
            settings,
        }
    }

    /// Execute the use case.
    #[tracing::instrument(skip(self, request), fields(symbol = %request.symbol))]
    pub async fn execute(
        &self,
        request: HistoricalVolatilityRequest,
    ) -> AnalyticsResult<HistoricalVolatilityResponse> {
        let periods = request
            .periods
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.settings.volatility.default_periods.clone());
        if periods.contains(&0) {
            return Err(AnalyticsError::invalid_input(
                "volatility periods must be positive",
            ));
        }

        let max_period = periods.iter().copied().max().unwrap_or(0);
        let lookback = self.settings.volatility.lookback_for(max_period);
        let history = self
            .history
            .get_historical(&request.symbol, lookback, HistoryInterval::Daily)
            .await?;

        let current_price = history.last_close().ok_or_else(|| {
            AnalyticsError::data_unavailable(format!("no price history for {}", request.symbol))
        })?;

        let results = self
            .estimator
            .historical_volatility(&history.closes_f64(), &periods);

        info!(
            closes = history.closes.len(),
            periods = periods.len(),
            "Historical volatility calculated"
        );

        Ok(HistoricalVolatilityResponse::new(
            request.symbol,
            current_price,
            results,
        ))
    }
}
