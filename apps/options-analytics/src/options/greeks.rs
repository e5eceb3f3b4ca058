//! Option Greeks and their aggregation.

use serde::{Deserialize, Serialize};

/// Decimal places used when presenting Greeks.
pub const GREEKS_DECIMALS: u32 = 4;

/// Round `value` to `decimals` places, half away from zero.
#[must_use]
pub fn round_dp(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Greeks for an option or a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta - rate of change of option price with respect to underlying price.
    /// Range: -1.0 to 1.0 for individual options.
    pub delta: f64,
    /// Gamma - rate of change of delta with respect to underlying price.
    pub gamma: f64,
    /// Theta - rate of change of option price with respect to time (per calendar day).
    /// Typically negative for long options.
    pub theta: f64,
    /// Vega - sensitivity to implied volatility (per 1% change in IV).
    pub vega: f64,
    /// Rho - sensitivity to interest rate changes (per 1% change in rates).
    pub rho: f64,
}

impl Greeks {
    /// Create new Greeks.
    #[must_use]
    pub const fn new(delta: f64, gamma: f64, theta: f64, vega: f64, rho: f64) -> Self {
        Self {
            delta,
            gamma,
            theta,
            vega,
            rho,
        }
    }

    /// Create zero Greeks.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0)
    }

    /// Scale Greeks by a quantity (positive for long, negative for short).
    #[must_use]
    pub fn scale(&self, quantity: f64) -> Self {
        Self {
            delta: self.delta * quantity,
            gamma: self.gamma * quantity,
            theta: self.theta * quantity,
            vega: self.vega * quantity,
            rho: self.rho * quantity,
        }
    }

    /// Add another Greeks to this one.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self {
            delta: self.delta + other.delta,
            gamma: self.gamma + other.gamma,
            theta: self.theta + other.theta,
            vega: self.vega + other.vega,
            rho: self.rho + other.rho,
        }
    }

    /// Greeks rounded for presentation.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            delta: round_dp(self.delta, GREEKS_DECIMALS),
            gamma: round_dp(self.gamma, GREEKS_DECIMALS),
            theta: round_dp(self.theta, GREEKS_DECIMALS),
            vega: round_dp(self.vega, GREEKS_DECIMALS),
            rho: round_dp(self.rho, GREEKS_DECIMALS),
        }
    }

    /// Whether every Greek is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.delta.is_finite()
            && self.gamma.is_finite()
            && self.theta.is_finite()
            && self.vega.is_finite()
            && self.rho.is_finite()
    }
}

/// Sum position Greeks.
#[must_use]
pub fn aggregate_greeks<'a>(positions: impl IntoIterator<Item = &'a Greeks>) -> Greeks {
    positions
        .into_iter()
        .fold(Greeks::zero(), |acc, g| acc.add(g))
}
