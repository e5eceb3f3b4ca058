//! Implied Volatility Solver
//!
//! Backs volatility out of an observed option premium:
//! - Newton-Raphson: Fast convergence (2-4 iterations) for well-behaved cases
//! - Modified Corrado-Miller: Initial guess for Newton-Raphson
//! - Bisection: Guaranteed convergence for edge cases (deep ITM/OTM)
//! - Hybrid: Newton-Raphson with bisection fallback
//!
//! Prices come from [`PricingEngine`], so solved volatilities round-trip
//! exactly through the engine's normal CDF approximation.

#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::black_scholes::{PricingEngine, PricingInputs};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::options::OptionType;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for IV solver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IvSolverConfig {
    /// Maximum iterations for Newton-Raphson.
    pub max_iterations: u32,
    /// Convergence tolerance (absolute price error).
    pub tolerance: f64,
    /// Minimum volatility bound (e.g., 0.01 = 1%).
    pub min_vol: f64,
    /// Maximum volatility bound (e.g., 5.0 = 500%).
    pub max_vol: f64,
    /// Switch to bisection when strike is this far from money (e.g., 0.20 = 20%).
    pub hybrid_threshold: f64,
}

impl Default for IvSolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
            min_vol: 0.001,
            max_vol: 5.0,
            hybrid_threshold: 0.20,
        }
    }
}

// ============================================================================
// IV Solvers
// ============================================================================

/// Implied Volatility Solver.
#[derive(Debug, Clone, Default)]
pub struct IvSolver {
    config: IvSolverConfig,
    engine: PricingEngine,
}

impl IvSolver {
    /// Create a new IV solver with the given configuration.
    #[must_use]
    pub const fn new(config: IvSolverConfig) -> Self {
        Self {
            config,
            engine: PricingEngine::new(),
        }
    }

    /// Compute implied volatility using the hybrid approach.
    ///
    /// Uses Newton-Raphson for near-the-money options and bisection
    /// for far-from-the-money options where vega is small. The volatility
    /// field of `inputs` is ignored.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` / `OptionExpired` for malformed inputs
    /// - `NoSolution` when the price is outside the attainable range
    /// - `ConvergenceFailed` when neither method converges
    pub fn solve(&self, market_price: f64, inputs: &PricingInputs) -> AnalyticsResult<f64> {
        Self::validate_inputs(market_price, inputs)?;

        let PricingInputs {
            spot: s,
            strike: k,
            time_to_expiry: t,
            risk_free_rate: r,
            dividend_yield: q,
            option_type,
            ..
        } = *inputs;

        // Check if option has time value
        let intrinsic = match option_type {
            OptionType::Call => (s * (-q * t).exp() - k * (-r * t).exp()).max(0.0),
            OptionType::Put => (k * (-r * t).exp() - s * (-q * t).exp()).max(0.0),
        };

        if market_price < intrinsic - self.config.tolerance {
            return Err(AnalyticsError::NoSolution {
                reason: format!(
                    "Market price ({market_price:.4}) is below intrinsic value ({intrinsic:.4})"
                ),
            });
        }

        // Determine moneyness to choose solver
        let moneyness = (s / k).ln().abs();

        if moneyness > self.config.hybrid_threshold {
            self.bisection(market_price, inputs)
        } else {
            let initial_guess = self.corrado_miller_guess(market_price, inputs);
            self.newton_raphson(market_price, inputs, initial_guess)
                .or_else(|_| self.bisection(market_price, inputs))
        }
    }

    /// Validate input parameters.
    fn validate_inputs(market_price: f64, inputs: &PricingInputs) -> AnalyticsResult<()> {
        if !market_price.is_finite() || market_price <= 0.0 {
            return Err(AnalyticsError::invalid_input(format!(
                "Market price must be positive, got: {market_price}"
            )));
        }
        // Price once at a nominal volatility so spot/strike/expiry get the
        // engine's own validation
        PricingEngine::new()
            .calculate_price(&inputs.with_volatility(0.2))
            .map(|_| ())
    }

    /// Modified Corrado-Miller initial guess for Newton-Raphson.
    ///
    /// Provides a good starting point that typically converges in 2-4 iterations.
    fn corrado_miller_guess(&self, market_price: f64, inputs: &PricingInputs) -> f64 {
        let PricingInputs {
            spot: s,
            strike: k,
            time_to_expiry: t,
            risk_free_rate: r,
            dividend_yield: q,
            option_type,
            ..
        } = *inputs;

        // Forward price
        let f = s * ((r - q) * t).exp();
        let df = (-r * t).exp();

        // Convert to call price if put (put-call parity)
        let call_price = match option_type {
            OptionType::Call => market_price,
            OptionType::Put => market_price + df * (f - k),
        };

        let x = f - k;
        let y = call_price / df;

        if y <= 0.0 {
            return 0.30;
        }

        let numerator = y - 0.5 * x;
        let sqrt_term = (y - 0.5 * x).powi(2) - (x.powi(2) / PI);

        if sqrt_term < 0.0 {
            return 0.30;
        }

        let sigma_approx = (PI / (2.0 * t)).sqrt() * (numerator + sqrt_term.sqrt()) / f;

        sigma_approx.clamp(self.config.min_vol, self.config.max_vol)
    }

    /// Newton-Raphson IV solver.
    fn newton_raphson(
        &self,
        market_price: f64,
        inputs: &PricingInputs,
        initial_guess: f64,
    ) -> AnalyticsResult<f64> {
        let mut sigma = initial_guess.clamp(self.config.min_vol, self.config.max_vol);

        for i in 0..self.config.max_iterations {
            let trial = inputs.with_volatility(sigma);
            let error = self.engine.calculate_price(&trial)? - market_price;

            if error.abs() < self.config.tolerance {
                return Ok(sigma);
            }

            // Engine vega is per volatility point
            let vega = self.engine.calculate_greeks(&trial)?.vega * 100.0;

            if vega.abs() < 1e-12 {
                return Err(AnalyticsError::ConvergenceFailed {
                    iterations: i,
                    last_error: error.abs(),
                });
            }

            sigma -= error / vega;
            sigma = sigma.clamp(self.config.min_vol, self.config.max_vol);
        }

        let last = self.engine.calculate_price(&inputs.with_volatility(sigma))?;
        Err(AnalyticsError::ConvergenceFailed {
            iterations: self.config.max_iterations,
            last_error: (last - market_price).abs(),
        })
    }

    /// Bisection IV solver.
    ///
    /// Used as fallback for deep ITM/OTM options.
    fn bisection(&self, market_price: f64, inputs: &PricingInputs) -> AnalyticsResult<f64> {
        let mut low = self.config.min_vol;
        let mut high = self.config.max_vol;

        let price_low = self.engine.calculate_price(&inputs.with_volatility(low))?;
        let price_high = self.engine.calculate_price(&inputs.with_volatility(high))?;

        if market_price < price_low {
            return Err(AnalyticsError::NoSolution {
                reason: format!(
                    "Market price ({market_price:.4}) is below minimum theoretical price ({price_low:.4})"
                ),
            });
        }
        if market_price > price_high {
            return Err(AnalyticsError::NoSolution {
                reason: format!(
                    "Market price ({market_price:.4}) exceeds maximum theoretical price ({price_high:.4})"
                ),
            });
        }

        for _ in 0..self.config.max_iterations {
            let mid = low.midpoint(high);
            let error = self.engine.calculate_price(&inputs.with_volatility(mid))? - market_price;

            if error.abs() < self.config.tolerance {
                return Ok(mid);
            }

            if error > 0.0 {
                high = mid;
            } else {
                low = mid;
            }

            if (high - low) < 1e-10 {
                return Ok(mid);
            }
        }

        let last = self
            .engine
            .calculate_price(&inputs.with_volatility(low.midpoint(high)))?;
        Err(AnalyticsError::ConvergenceFailed {
            iterations: self.config.max_iterations,
            last_error: (last - market_price).abs(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
