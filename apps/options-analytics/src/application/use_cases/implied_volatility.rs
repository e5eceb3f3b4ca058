//! Implied Volatility Use Case

use tracing::info;

use crate::application::dto::{ImpliedVolatilityRequest, ImpliedVolatilityResponse};
use crate::application::settings::AnalyticsSettings;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::pricing::{IvSolver, PricingInputs};

/// Use case for backing volatility out of an observed option price.
pub struct ImpliedVolatilityUseCase {
    solver: IvSolver,
    settings: AnalyticsSettings,
}

impl ImpliedVolatilityUseCase {
    /// Create a new ImpliedVolatilityUseCase.
    pub fn new(settings: AnalyticsSettings) -> Self {
        Self {
            solver: IvSolver::default(),
            settings,
        }
    }

    /// Execute the use case.
    #[tracing::instrument(skip(self, request), fields(strike = request.strike))]
    pub fn execute(
        &self,
        request: &ImpliedVolatilityRequest,
    ) -> AnalyticsResult<ImpliedVolatilityResponse> {
        let time_to_expiry = match (request.time_to_expiry, request.expiration_date) {
            (Some(years), _) => years,
            (None, Some(expiration)) => self.settings.time_to_expiry(expiration),
            (None, None) => {
                return Err(AnalyticsError::invalid_input(
                    "either timeToExpiry or expirationDate is required",
                ));
            }
        };

        let inputs = PricingInputs::new(
            request.underlying_price,
            request.strike,
            time_to_expiry,
            0.0,
            self.settings.risk_free_rate(request.risk_free_rate),
            self.settings.dividend_yield(request.dividend_yield),
            request.option_type,
        );
        let implied_volatility = self.solver.solve(request.option_price, &inputs)?;

        info!(implied_volatility, "Implied volatility solved");
        Ok(ImpliedVolatilityResponse::new(
            implied_volatility,
            time_to_expiry,
        ))
    }
}
