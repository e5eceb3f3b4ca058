//! Multi-leg strategy analysis.
//!
//! Resolves each leg's premium and Greeks, then derives the position's
//! net premium, aggregate Greeks, expiration payoff extremes, break-evens
//! and P&L curve.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::leg::{LegAction, OptionLeg, StrategyType};
use super::payoff::{Payoff, PayoffLeg, PnlPoint};
use crate::config::{BreakevenMethod, LegFailurePolicy, StrategyConfig};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::options::{Greeks, OptionChain, OptionType, aggregate_greeks};
use crate::pricing::{IvSolver, PricingEngine, PricingInputs};
use crate::volatility::{ResolvedVolatility, VolatilityEstimator, VolatilitySource};

// ============================================================================
// Request / Context
// ============================================================================

/// A strategy to analyze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRequest {
    /// Descriptive label.
    #[serde(default)]
    pub strategy_type: StrategyType,
    /// Legs of the position.
    pub legs: Vec<OptionLeg>,
    /// Common expiration of all legs.
    pub expiration: NaiveDate,
}

impl StrategyRequest {
    /// Check that the strategy has legs and that every leg is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::EmptyStrategy`] when there are no legs and
    /// [`AnalyticsError::InvalidLeg`] for the first malformed leg.
    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.legs.is_empty() {
            return Err(AnalyticsError::EmptyStrategy);
        }
        self.legs
            .iter()
            .enumerate()
            .try_for_each(|(index, leg)| leg.validate(index))
    }
}

/// Market state the legs are priced against.
#[derive(Debug, Clone, Default)]
pub struct MarketContext {
    /// Underlying spot price.
    pub spot: f64,
    /// Time to expiration in years.
    pub time_to_expiry: f64,
    /// Annualized risk-free rate.
    pub risk_free_rate: f64,
    /// Annualized continuous dividend yield.
    pub dividend_yield: f64,
    /// Chain for the strategy's expiration, if one could be fetched.
    pub chain: Option<OptionChain>,
    /// Daily closes for the historical volatility fallback.
    pub close_prices: Vec<f64>,
}

// ============================================================================
// Analysis
// ============================================================================

/// Where a leg's premium came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumSource {
    /// Supplied with the leg.
    Explicit,
    /// Mid of the chain quote.
    MarketMid,
    /// Black-Scholes price.
    Theoretical,
    /// Nothing could price the leg; premium is zero.
    Unresolved,
}

/// Resolution detail for one leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegAnalysis {
    /// Position of the leg in the request.
    pub index: usize,
    /// Strike price.
    pub strike: f64,
    /// Call or put.
    pub option_type: OptionType,
    /// Buy or sell.
    pub action: LegAction,
    /// Number of contracts.
    pub quantity: i32,
    /// Per-share premium used in the payoff.
    pub premium: f64,
    /// Origin of the premium.
    pub premium_source: PremiumSource,
    /// Volatility used for the Greeks (decimal).
    pub volatility: f64,
    /// Origin of the volatility.
    pub volatility_source: VolatilitySource,
    /// Greeks scaled by the signed quantity.
    pub greeks: Greeks,
    /// Why the leg could not be fully priced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Result of analyzing a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAnalysis {
    /// Descriptive label.
    pub strategy_type: StrategyType,
    /// Expiration of the legs.
    pub expiration: NaiveDate,
    /// Underlying spot price.
    pub underlying_price: f64,
    /// Per-leg detail in request order.
    pub legs: Vec<LegAnalysis>,
    /// Cash flow at entry: negative is paid (debit), positive received (credit).
    pub net_premium: f64,
    /// `-net_premium`.
    pub net_debit: f64,
    /// Premiums paid on bought legs.
    pub capital_committed: f64,
    /// Largest sampled expiration P&L.
    pub max_profit: f64,
    /// Worst sampled expiration loss as a positive amount; zero when no
    /// sample loses money.
    pub max_loss: f64,
    /// Profit keeps growing as the underlying rises.
    pub profit_unbounded: bool,
    /// Loss keeps growing as the underlying rises.
    pub loss_unbounded: bool,
    /// Sorted break-even prices.
    pub breakevens: Vec<f64>,
    /// Position Greeks.
    pub greeks: Greeks,
    /// Expiration P&L samples.
    pub pnl_curve: Vec<PnlPoint>,
    /// Leg-level problems tolerated under the lenient policy.
    pub warnings: Vec<String>,
}

/// Leg resolution and the error that degraded it, if any.
struct LegOutcome {
    analysis: LegAnalysis,
    error: Option<AnalyticsError>,
}

// ============================================================================
// Composer
// ============================================================================

/// Combines option legs into a position and analyzes it.
#[derive(Debug, Clone, Default)]
pub struct StrategyComposer {
    engine: PricingEngine,
    estimator: VolatilityEstimator,
    iv_solver: Option<IvSolver>,
    config: StrategyConfig,
}

impl StrategyComposer {
    /// Create a composer.
    #[must_use]
    pub const fn new(
        engine: PricingEngine,
        estimator: VolatilityEstimator,
        config: StrategyConfig,
    ) -> Self {
        Self {
            engine,
            estimator,
            iv_solver: None,
            config,
        }
    }

    /// Back volatility out of quoted mids when the chain has no IV.
    #[must_use]
    pub fn with_iv_solver(mut self, solver: IvSolver) -> Self {
        self.iv_solver = Some(solver);
        self
    }

    /// Analysis configuration.
    #[must_use]
    pub const fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Analyze a strategy.
    ///
    /// # Errors
    ///
    /// - [`AnalyticsError::EmptyStrategy`] when there are no legs
    /// - [`AnalyticsError::InvalidLeg`] for a malformed leg
    /// - any leg pricing error under [`LegFailurePolicy::Strict`], or when
    ///   no leg could be priced at all
    pub fn analyze(
        &self,
        request: &StrategyRequest,
        market: &MarketContext,
    ) -> AnalyticsResult<StrategyAnalysis> {
        request.validate()?;

        let historical = self.estimator.fallback_volatility(&market.close_prices);

        let outcomes = if request.legs.len() >= self.config.parallel_leg_threshold {
            self.resolve_parallel(&request.legs, market, historical)?
        } else {
            self.resolve_sequential(&request.legs, market, historical)?
        };

        if outcomes
            .iter()
            .all(|o| o.analysis.premium_source == PremiumSource::Unresolved)
            && let Some(error) = outcomes.iter().find_map(|o| o.error.clone())
        {
            return Err(error);
        }

        let legs: Vec<LegAnalysis> = outcomes.into_iter().map(|o| o.analysis).collect();
        Ok(self.summarize(request, market.spot, legs))
    }

    fn resolve_parallel(
        &self,
        legs: &[OptionLeg],
        market: &MarketContext,
        historical: f64,
    ) -> AnalyticsResult<Vec<LegOutcome>> {
        legs.par_iter()
            .enumerate()
            .map(|(index, leg)| self.resolve_leg(index, leg, market, historical))
            .collect()
    }

    fn resolve_sequential(
        &self,
        legs: &[OptionLeg],
        market: &MarketContext,
        historical: f64,
    ) -> AnalyticsResult<Vec<LegOutcome>> {
        legs.iter()
            .enumerate()
            .map(|(index, leg)| self.resolve_leg(index, leg, market, historical))
            .collect()
    }

    fn resolve_leg(
        &self,
        index: usize,
        leg: &OptionLeg,
        market: &MarketContext,
        historical: f64,
    ) -> AnalyticsResult<LegOutcome> {
        let contract = market
            .chain
            .as_ref()
            .and_then(|chain| chain.find(leg.strike, leg.option_type));
        let market_mid = contract.and_then(|c| c.mid());
        let quoted_iv = contract.and_then(|c| c.implied_volatility());

        let inputs = PricingInputs::new(
            market.spot,
            leg.strike,
            market.time_to_expiry,
            0.0,
            market.risk_free_rate,
            market.dividend_yield,
            leg.option_type,
        );

        let solved_iv = match (&self.iv_solver, quoted_iv, market_mid) {
            (Some(solver), None, Some(mid)) => solver.solve(mid, &inputs).ok(),
            _ => None,
        };
        let volatility = self.estimator.resolve(quoted_iv, solved_iv, historical);
        let inputs = inputs.with_volatility(volatility.value);

        let priced = self.price_leg(leg, market_mid, &inputs);
        match priced {
            Ok((premium, premium_source, greeks)) => {
                debug!(
                    leg = index,
                    premium,
                    source = ?premium_source,
                    volatility = volatility.value,
                    "Leg resolved"
                );
                Ok(LegOutcome {
                    analysis: Self::leg_analysis(
                        index,
                        leg,
                        premium,
                        premium_source,
                        volatility,
                        greeks.scale(leg.signed_quantity()),
                        None,
                    ),
                    error: None,
                })
            }
            Err(error) if self.config.leg_failure_policy == LegFailurePolicy::Strict => {
                warn!(leg = index, error = %error, "Leg pricing failed (strict policy)");
                Err(error)
            }
            Err(error) => {
                let (premium, premium_source) = match (leg.premium, market_mid) {
                    (Some(premium), _) => (premium, PremiumSource::Explicit),
                    (None, Some(mid)) => (mid, PremiumSource::MarketMid),
                    (None, None) => (0.0, PremiumSource::Unresolved),
                };
                let message = format!("leg {index}: {error}");
                warn!(leg = index, error = %error, "Leg pricing failed, using zero Greeks");
                Ok(LegOutcome {
                    analysis: Self::leg_analysis(
                        index,
                        leg,
                        premium,
                        premium_source,
                        volatility,
                        Greeks::zero(),
                        Some(message),
                    ),
                    error: Some(error),
                })
            }
        }
    }

    /// Premium (with its source) and per-contract Greeks for a leg.
    fn price_leg(
        &self,
        leg: &OptionLeg,
        market_mid: Option<f64>,
        inputs: &PricingInputs,
    ) -> AnalyticsResult<(f64, PremiumSource, Greeks)> {
        let greeks = self.engine.calculate_greeks(inputs)?;
        let (premium, source) = match (leg.premium, market_mid) {
            (Some(premium), _) => (premium, PremiumSource::Explicit),
            (None, Some(mid)) => (mid, PremiumSource::MarketMid),
            (None, None) => (
                self.engine.calculate_price(inputs)?,
                PremiumSource::Theoretical,
            ),
        };
        Ok((premium, source, greeks))
    }

    fn leg_analysis(
        index: usize,
        leg: &OptionLeg,
        premium: f64,
        premium_source: PremiumSource,
        volatility: ResolvedVolatility,
        greeks: Greeks,
        warning: Option<String>,
    ) -> LegAnalysis {
        LegAnalysis {
            index,
            strike: leg.strike,
            option_type: leg.option_type,
            action: leg.action,
            quantity: leg.quantity,
            premium,
            premium_source,
            volatility: volatility.value,
            volatility_source: volatility.source,
            greeks,
            warning,
        }
    }

    fn summarize(
        &self,
        request: &StrategyRequest,
        spot: f64,
        legs: Vec<LegAnalysis>,
    ) -> StrategyAnalysis {
        let multiplier = f64::from(self.config.contract_multiplier);

        // Cash flow is opposite to position sign: buying pays, selling receives
        let net_premium: f64 = legs
            .iter()
            .map(|l| -l.action.sign() * l.premium * f64::from(l.quantity) * multiplier)
            .sum();
        let capital_committed: f64 = legs
            .iter()
            .filter(|l| l.action == LegAction::Buy)
            .map(|l| l.premium * f64::from(l.quantity) * multiplier)
            .sum();

        let payoff = Payoff::new(
            legs.iter()
                .map(|l| PayoffLeg {
                    strike: l.strike,
                    option_type: l.option_type,
                    signed_quantity: l.action.sign() * f64::from(l.quantity),
                    premium: l.premium,
                })
                .collect(),
            multiplier,
        );

        let (max_profit, max_loss) = payoff.extremes();
        let breakevens = match self.config.breakeven_method {
            BreakevenMethod::GridScan => payoff.grid_breakevens(&self.config),
            BreakevenMethod::Exact => payoff.exact_breakevens(),
        };
        let pnl_curve = payoff.pnl_curve(self.config.curve_points, capital_committed);
        let greeks = aggregate_greeks(legs.iter().map(|l| &l.greeks));
        let warnings = legs.iter().filter_map(|l| l.warning.clone()).collect();

        debug!(
            strategy = %request.strategy_type,
            legs = legs.len(),
            net_premium,
            max_profit,
            max_loss,
            breakevens = breakevens.len(),
            "Strategy analyzed"
        );

        StrategyAnalysis {
            strategy_type: request.strategy_type.clone(),
            expiration: request.expiration,
            underlying_price: spot,
            legs,
            net_premium,
            net_debit: -net_premium,
            capital_committed,
            max_profit,
            max_loss,
            profit_unbounded: payoff.profit_unbounded(),
            loss_unbounded: payoff.loss_unbounded(),
            breakevens,
            greeks,
            pnl_curve,
            warnings,
        }
    }
}
