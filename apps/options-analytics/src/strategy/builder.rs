//! Multi-Leg Strategy Presets
//!
//! Generates the legs of common strategies:
//! - Vertical spreads: bull call, bear call, bull put, bear put
//! - Straddles and strangles
//! - Iron condors and iron butterflies
//! - Call and put butterflies
//!
//! Presets carry no premiums; the composer resolves them from the chain or
//! the pricing model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::composer::StrategyRequest;
use super::leg::{OptionLeg, StrategyType};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::options::OptionType;

/// Configuration for preset construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyBuilderConfig {
    /// Maximum distance between adjacent strikes (dollars), if any.
    pub max_width: Option<f64>,
    /// Contracts per unit leg. Legs scaled to a non-positive count fail
    /// strategy validation.
    pub quantity: i32,
}

impl Default for StrategyBuilderConfig {
    fn default() -> Self {
        Self {
            max_width: None,
            quantity: 1,
        }
    }
}

/// Options strategy preset builder.
#[derive(Debug, Clone)]
pub struct StrategyBuilder {
    expiration: NaiveDate,
    config: StrategyBuilderConfig,
}

impl StrategyBuilder {
    /// Create a builder for one expiration.
    #[must_use]
    pub fn new(expiration: NaiveDate) -> Self {
        Self::with_config(expiration, StrategyBuilderConfig::default())
    }

    /// Create a builder with explicit configuration.
    #[must_use]
    pub const fn with_config(expiration: NaiveDate, config: StrategyBuilderConfig) -> Self {
        Self { expiration, config }
    }

    /// Build a preset from its label and strikes.
    ///
    /// Strikes are given in ascending order:
    /// - verticals: `[lower, upper]`
    /// - straddle / iron butterfly: `[center]` / `[lower, center, upper]`
    /// - strangle: `[put, call]`
    /// - iron condor: `[long put, short put, short call, long call]`
    /// - butterflies: `[lower, middle, upper]`
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidInput`] for a custom label, a wrong
    /// number of strikes, or an invalid strike layout.
    pub fn build(
        &self,
        strategy_type: &StrategyType,
        strikes: &[f64],
    ) -> AnalyticsResult<StrategyRequest> {
        match (strategy_type, strikes) {
            (
                StrategyType::BullCallSpread
                | StrategyType::BearCallSpread
                | StrategyType::BullPutSpread
                | StrategyType::BearPutSpread,
                &[lower, upper],
            ) => self.vertical_spread(strategy_type.clone(), lower, upper),
            (StrategyType::Straddle, &[strike]) => self.straddle(strike),
            (StrategyType::Strangle, &[put_strike, call_strike]) => {
                self.strangle(put_strike, call_strike)
            }
            (StrategyType::IronCondor, &[long_put, short_put, short_call, long_call]) => {
                self.iron_condor(long_put, short_put, short_call, long_call)
            }
            (StrategyType::IronButterfly, &[lower, center, upper]) => {
                self.iron_butterfly(lower, center, upper)
            }
            (StrategyType::CallButterfly, &[lower, middle, upper]) => {
                self.butterfly(OptionType::Call, lower, middle, upper)
            }
            (StrategyType::PutButterfly, &[lower, middle, upper]) => {
                self.butterfly(OptionType::Put, lower, middle, upper)
            }
            (StrategyType::Custom(label), _) => Err(AnalyticsError::invalid_input(format!(
                "no preset for strategy '{label}'; supply legs"
            ))),
            _ => Err(AnalyticsError::invalid_input(format!(
                "wrong number of strikes ({}) for {strategy_type}",
                strikes.len()
            ))),
        }
    }

    /// Build a vertical spread from its lower and upper strike.
    ///
    /// Bull call: buy lower call, sell upper call. Bear call: sell lower,
    /// buy upper. Bull put: buy lower put, sell upper put. Bear put: sell
    /// lower, buy upper.
    ///
    /// # Errors
    ///
    /// Returns an error if the strikes are not ascending or the type is not
    /// a vertical spread.
    pub fn vertical_spread(
        &self,
        strategy_type: StrategyType,
        lower: f64,
        upper: f64,
    ) -> AnalyticsResult<StrategyRequest> {
        self.check_ascending(&[lower, upper])?;

        let legs = match strategy_type {
            StrategyType::BullCallSpread => vec![
                OptionLeg::buy(lower, OptionType::Call),
                OptionLeg::sell(upper, OptionType::Call),
            ],
            StrategyType::BearCallSpread => vec![
                OptionLeg::sell(lower, OptionType::Call),
                OptionLeg::buy(upper, OptionType::Call),
            ],
            StrategyType::BullPutSpread => vec![
                OptionLeg::buy(lower, OptionType::Put),
                OptionLeg::sell(upper, OptionType::Put),
            ],
            StrategyType::BearPutSpread => vec![
                OptionLeg::sell(lower, OptionType::Put),
                OptionLeg::buy(upper, OptionType::Put),
            ],
            other => {
                return Err(AnalyticsError::invalid_input(format!(
                    "{other} is not a vertical spread"
                )));
            }
        };

        Ok(self.request(strategy_type, legs))
    }

    /// Build a long straddle: long call and long put at the same strike.
    ///
    /// # Errors
    ///
    /// Returns an error if the strike is not positive.
    pub fn straddle(&self, strike: f64) -> AnalyticsResult<StrategyRequest> {
        self.check_ascending(&[strike])?;
        Ok(self.request(
            StrategyType::Straddle,
            vec![
                OptionLeg::buy(strike, OptionType::Call),
                OptionLeg::buy(strike, OptionType::Put),
            ],
        ))
    }

    /// Build a long strangle: long OTM put and long OTM call.
    ///
    /// # Errors
    ///
    /// Returns an error unless `put_strike < call_strike`.
    pub fn strangle(&self, put_strike: f64, call_strike: f64) -> AnalyticsResult<StrategyRequest> {
        self.check_ascending(&[put_strike, call_strike])?;
        Ok(self.request(
            StrategyType::Strangle,
            vec![
                OptionLeg::buy(put_strike, OptionType::Put),
                OptionLeg::buy(call_strike, OptionType::Call),
            ],
        ))
    }

    /// Build an iron condor.
    ///
    /// An iron condor consists of:
    /// - Bull put spread (long put + short put at higher strike)
    /// - Bear call spread (short call + long call at higher strike)
    ///
    /// # Errors
    ///
    /// Returns an error unless the four strikes are strictly ascending.
    pub fn iron_condor(
        &self,
        long_put: f64,
        short_put: f64,
        short_call: f64,
        long_call: f64,
    ) -> AnalyticsResult<StrategyRequest> {
        self.check_ascending(&[long_put, short_put, short_call, long_call])?;
        Ok(self.request(
            StrategyType::IronCondor,
            vec![
                OptionLeg::buy(long_put, OptionType::Put),
                OptionLeg::sell(short_put, OptionType::Put),
                OptionLeg::sell(short_call, OptionType::Call),
                OptionLeg::buy(long_call, OptionType::Call),
            ],
        ))
    }

    /// Build an iron butterfly: short straddle at `center` with long wings.
    ///
    /// # Errors
    ///
    /// Returns an error unless the strikes are strictly ascending.
    pub fn iron_butterfly(
        &self,
        lower: f64,
        center: f64,
        upper: f64,
    ) -> AnalyticsResult<StrategyRequest> {
        self.check_ascending(&[lower, center, upper])?;
        Ok(self.request(
            StrategyType::IronButterfly,
            vec![
                OptionLeg::buy(lower, OptionType::Put),
                OptionLeg::sell(center, OptionType::Put),
                OptionLeg::sell(center, OptionType::Call),
                OptionLeg::buy(upper, OptionType::Call),
            ],
        ))
    }

    /// Build a long 1-2-1 butterfly of calls or puts.
    ///
    /// # Errors
    ///
    /// Returns an error unless the strikes are strictly ascending.
    pub fn butterfly(
        &self,
        option_type: OptionType,
        lower: f64,
        middle: f64,
        upper: f64,
    ) -> AnalyticsResult<StrategyRequest> {
        self.check_ascending(&[lower, middle, upper])?;
        let strategy_type = match option_type {
            OptionType::Call => StrategyType::CallButterfly,
            OptionType::Put => StrategyType::PutButterfly,
        };
        Ok(self.request(
            strategy_type,
            vec![
                OptionLeg::buy(lower, option_type),
                OptionLeg::sell(middle, option_type).with_quantity(2),
                OptionLeg::buy(upper, option_type),
            ],
        ))
    }

    fn request(&self, strategy_type: StrategyType, legs: Vec<OptionLeg>) -> StrategyRequest {
        StrategyRequest {
            strategy_type,
            legs: legs
                .into_iter()
                .map(|leg| {
                    let scaled = leg.quantity.saturating_mul(self.config.quantity);
                    leg.with_quantity(scaled)
                })
                .collect(),
            expiration: self.expiration,
        }
    }

    fn check_ascending(&self, strikes: &[f64]) -> AnalyticsResult<()> {
        if strikes.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(AnalyticsError::invalid_input("strikes must be positive"));
        }
        if strikes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalyticsError::invalid_input(format!(
                "strikes must be strictly ascending: {strikes:?}"
            )));
        }
        if let Some(max_width) = self.config.max_width
            && let Some(width) = strikes
                .windows(2)
                .map(|w| w[1] - w[0])
                .find(|width| *width > max_width)
        {
            return Err(AnalyticsError::invalid_input(format!(
                "width {width} exceeds max width {max_width}"
            )));
        }
        Ok(())
    }
}
