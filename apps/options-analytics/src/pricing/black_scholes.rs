//! Black-Scholes Pricing Engine
//!
//! European option prices and Greeks with a continuous dividend yield.
//!
//! - `S_adj = S·e^(−qT)` (dividend-adjusted spot)
//! - `d1 = (ln(S_adj/K) + (r + σ²/2)·T) / (σ·√T)`, `d2 = d1 − σ·√T`
//! - Call `= S_adj·N(d1) − K·e^(−rT)·N(d2)`
//! - Put `= K·e^(−rT)·N(−d2) − S_adj·N(−d1)`
//!
//! `N(x)` is the Abramowitz-Stegun 7.1.26 rational approximation of `erf`
//! (absolute error below 1.5e-7). Downstream figures are pinned to this
//! approximation, so it must not be swapped for a library `erf`.

// Black-Scholes uses standard mathematical notation (s, k, t, r, q, sigma)
// Financial formulas use standard notation where mul_add() obscures meaning
#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]

use std::f64::consts::{PI, SQRT_2};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::options::{Greeks, OptionType};

// ============================================================================
// Normal Distribution
// ============================================================================

const ERF_P: f64 = 0.327_591_1;
const ERF_A1: f64 = 0.254_829_592;
const ERF_A2: f64 = -0.284_496_736;
const ERF_A3: f64 = 1.421_413_741;
const ERF_A4: f64 = -1.453_152_027;
const ERF_A5: f64 = 1.061_405_429;

/// Standard normal CDF (Abramowitz-Stegun 7.1.26).
///
/// Symmetric by construction: `norm_cdf(x) + norm_cdf(-x) == 1`.
#[must_use]
pub fn norm_cdf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let z = x.abs() / SQRT_2;
    let t = 1.0 / (1.0 + ERF_P * z);
    let poly = ((((ERF_A5 * t + ERF_A4) * t + ERF_A3) * t + ERF_A2) * t + ERF_A1) * t;
    let erf = 1.0 - poly * (-z * z).exp();
    0.5 * (1.0 + sign * erf)
}

/// Standard normal PDF.
#[must_use]
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Year fraction between `as_of` and `expiration` in calendar days.
///
/// Zero or negative once the expiration date has been reached.
#[must_use]
pub fn year_fraction(expiration: NaiveDate, as_of: NaiveDate, days_per_year: f64) -> f64 {
    (expiration - as_of).num_days() as f64 / days_per_year
}

// ============================================================================
// Inputs
// ============================================================================

/// Inputs to a single-option pricing call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInputs {
    /// Spot price of the underlying.
    pub spot: f64,
    /// Strike price.
    pub strike: f64,
    /// Time to expiry in years.
    pub time_to_expiry: f64,
    /// Annualized volatility as a decimal (0.20 = 20%).
    pub volatility: f64,
    /// Annualized continuously compounded risk-free rate.
    pub risk_free_rate: f64,
    /// Continuous dividend yield.
    pub dividend_yield: f64,
    /// Call or put.
    pub option_type: OptionType,
}

impl PricingInputs {
    /// Create pricing inputs.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        volatility: f64,
        risk_free_rate: f64,
        dividend_yield: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            volatility,
            risk_free_rate,
            dividend_yield,
            option_type,
        }
    }

    /// Same inputs with a different volatility.
    #[must_use]
    pub const fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// Same inputs with a different spot.
    #[must_use]
    pub const fn with_spot(mut self, spot: f64) -> Self {
        self.spot = spot;
        self
    }

    /// Same inputs with a different option type.
    #[must_use]
    pub const fn with_option_type(mut self, option_type: OptionType) -> Self {
        self.option_type = option_type;
        self
    }

    fn validate(&self) -> AnalyticsResult<()> {
        let fields = [
            ("spot", self.spot),
            ("strike", self.strike),
            ("time to expiry", self.time_to_expiry),
            ("volatility", self.volatility),
            ("risk-free rate", self.risk_free_rate),
            ("dividend yield", self.dividend_yield),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AnalyticsError::invalid_input(format!(
                "{name} must be finite, got: {value}"
            )));
        }
        if self.time_to_expiry <= 0.0 {
            return Err(AnalyticsError::OptionExpired {
                time_to_expiry: self.time_to_expiry,
            });
        }
        if self.spot <= 0.0 {
            return Err(AnalyticsError::invalid_input(format!(
                "Spot price must be positive, got: {}",
                self.spot
            )));
        }
        if self.strike <= 0.0 {
            return Err(AnalyticsError::invalid_input(format!(
                "Strike price must be positive, got: {}",
                self.strike
            )));
        }
        if self.dividend_yield < 0.0 {
            return Err(AnalyticsError::invalid_input(format!(
                "Dividend yield must be non-negative, got: {}",
                self.dividend_yield
            )));
        }
        if self.volatility <= 0.0 {
            return Err(AnalyticsError::InvalidVolatility {
                volatility: self.volatility,
            });
        }
        Ok(())
    }
}

/// Shared Black-Scholes terms for one set of inputs.
struct Terms {
    d1: f64,
    d2: f64,
    sqrt_t: f64,
    /// `e^(−qT)`
    carry: f64,
    /// `e^(−rT)`
    discount: f64,
    /// `S·e^(−qT)`
    adjusted_spot: f64,
}

impl Terms {
    fn new(inputs: &PricingInputs) -> AnalyticsResult<Self> {
        inputs.validate()?;

        let PricingInputs {
            spot: s,
            strike: k,
            time_to_expiry: t,
            volatility: sigma,
            risk_free_rate: r,
            dividend_yield: q,
            ..
        } = *inputs;

        let sqrt_t = t.sqrt();
        let carry = (-q * t).exp();
        let discount = (-r * t).exp();
        let adjusted_spot = s * carry;
        let d1 = ((adjusted_spot / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
        let d2 = d1 - sigma * sqrt_t;

        Ok(Self {
            d1,
            d2,
            sqrt_t,
            carry,
            discount,
            adjusted_spot,
        })
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Black-Scholes pricing engine.
///
/// Stateless; volatility is always supplied by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    /// Create a new pricing engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Theoretical option price.
    ///
    /// # Errors
    ///
    /// - `OptionExpired` when `T <= 0`
    /// - `InvalidVolatility` when `σ <= 0`
    /// - `InvalidInput` for non-finite values or non-positive spot/strike
    pub fn calculate_price(&self, inputs: &PricingInputs) -> AnalyticsResult<f64> {
        let terms = Terms::new(inputs)?;
        let strike_pv = inputs.strike * terms.discount;

        let price = match inputs.option_type {
            OptionType::Call => {
                terms.adjusted_spot * norm_cdf(terms.d1) - strike_pv * norm_cdf(terms.d2)
            }
            OptionType::Put => {
                strike_pv * norm_cdf(-terms.d2) - terms.adjusted_spot * norm_cdf(-terms.d1)
            }
        };
        Ok(price)
    }

    /// Greeks at full precision.
    ///
    /// Theta is per calendar day, vega per volatility point and rho per rate
    /// point.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PricingEngine::calculate_price`].
    pub fn calculate_greeks(&self, inputs: &PricingInputs) -> AnalyticsResult<Greeks> {
        let terms = Terms::new(inputs)?;
        let PricingInputs {
            spot: s,
            strike: k,
            time_to_expiry: t,
            volatility: sigma,
            risk_free_rate: r,
            dividend_yield: q,
            option_type,
        } = *inputs;

        let pdf_d1 = norm_pdf(terms.d1);
        let strike_pv = k * terms.discount;

        let gamma = terms.carry * pdf_d1 / (s * sigma * terms.sqrt_t);
        let vega = terms.adjusted_spot * pdf_d1 * terms.sqrt_t / 100.0;
        let decay = -terms.adjusted_spot * pdf_d1 * sigma / (2.0 * terms.sqrt_t);

        let (delta, theta_annual, rho) = match option_type {
            OptionType::Call => {
                let nd1 = norm_cdf(terms.d1);
                let nd2 = norm_cdf(terms.d2);
                (
                    terms.carry * nd1,
                    decay - r * strike_pv * nd2 + q * terms.adjusted_spot * nd1,
                    k * t * terms.discount * nd2 / 100.0,
                )
            }
            OptionType::Put => {
                let nd1 = norm_cdf(terms.d1);
                let n_neg_d1 = norm_cdf(-terms.d1);
                let n_neg_d2 = norm_cdf(-terms.d2);
                (
                    terms.carry * (nd1 - 1.0),
                    decay + r * strike_pv * n_neg_d2 - q * terms.adjusted_spot * n_neg_d1,
                    -k * t * terms.discount * n_neg_d2 / 100.0,
                )
            }
        };

        Ok(Greeks::new(delta, gamma, theta_annual / 365.0, vega, rho))
    }
}

// ============================================================================
// Tests
// ============================================================================
