//! Expiration payoff of a multi-leg position.
//!
//! All P&L values are in dollars for the whole position
//! (`per-share P&L × signed quantity × contract multiplier`).

use serde::{Deserialize, Serialize};

use crate::config::StrategyConfig;
use crate::options::OptionType;

/// Price offsets around each strike sampled for max profit/loss.
const SAMPLE_OFFSETS: [f64; 5] = [-10.0, -5.0, 0.0, 5.0, 10.0];

/// Distance sampled beyond the lowest and highest strike.
const SAMPLE_EDGE: f64 = 20.0;

/// Roots closer than this are the same break-even.
const ROOT_EPSILON: f64 = 1e-9;

/// One point of the P&L curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnlPoint {
    /// Underlying price at expiration.
    pub price: f64,
    /// Position P&L in dollars.
    pub pnl: f64,
    /// P&L as a percentage of capital committed.
    pub pnl_percent: f64,
}

/// A leg with its resolved premium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayoffLeg {
    /// Strike price.
    pub strike: f64,
    /// Call or put.
    pub option_type: OptionType,
    /// `+qty` for buy, `-qty` for sell.
    pub signed_quantity: f64,
    /// Per-share premium.
    pub premium: f64,
}

/// Expiration payoff of a set of legs.
#[derive(Debug, Clone)]
pub struct Payoff {
    legs: Vec<PayoffLeg>,
    multiplier: f64,
    strikes: Vec<f64>,
}

impl Payoff {
    /// Create a payoff from resolved legs.
    #[must_use]
    pub fn new(legs: Vec<PayoffLeg>, multiplier: f64) -> Self {
        let mut strikes: Vec<f64> = legs.iter().map(|l| l.strike).collect();
        strikes.sort_by(f64::total_cmp);
        strikes.dedup_by(|a, b| (*a - *b).abs() < ROOT_EPSILON);
        Self {
            legs,
            multiplier,
            strikes,
        }
    }

    /// Sorted unique strikes.
    #[must_use]
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    fn min_strike(&self) -> f64 {
        self.strikes.first().copied().unwrap_or(0.0)
    }

    fn max_strike(&self) -> f64 {
        self.strikes.last().copied().unwrap_or(0.0)
    }

    /// Position P&L if the underlying settles at `price`.
    #[must_use]
    pub fn pnl_at(&self, price: f64) -> f64 {
        self.legs
            .iter()
            .map(|leg| {
                let intrinsic = leg.option_type.intrinsic(price, leg.strike);
                (intrinsic - leg.premium) * leg.signed_quantity * self.multiplier
            })
            .sum()
    }

    /// P&L per dollar of underlying above the highest strike.
    ///
    /// Only calls contribute once every strike is in the money.
    #[must_use]
    pub fn upside_slope(&self) -> f64 {
        self.legs
            .iter()
            .filter(|leg| leg.option_type == OptionType::Call)
            .map(|leg| leg.signed_quantity * self.multiplier)
            .sum()
    }

    /// Whether profit grows without bound as the price rises.
    #[must_use]
    pub fn profit_unbounded(&self) -> bool {
        self.upside_slope() > ROOT_EPSILON
    }

    /// Whether loss grows without bound as the price rises.
    #[must_use]
    pub fn loss_unbounded(&self) -> bool {
        self.upside_slope() < -ROOT_EPSILON
    }

    /// Prices sampled for max profit and max loss.
    ///
    /// Each strike and strike ±5 and ±10, the lowest strike − 20, the
    /// highest strike + 20 and zero. Negative prices are dropped.
    #[must_use]
    pub fn sample_prices(&self) -> Vec<f64> {
        let mut prices: Vec<f64> = self
            .strikes
            .iter()
            .flat_map(|strike| SAMPLE_OFFSETS.iter().map(move |offset| strike + offset))
            .collect();
        prices.push(self.min_strike() - SAMPLE_EDGE);
        prices.push(self.max_strike() + SAMPLE_EDGE);
        prices.push(0.0);

        prices.retain(|p| *p >= 0.0);
        prices.sort_by(f64::total_cmp);
        prices.dedup();
        prices
    }

    /// Largest sampled P&L and the worst sampled loss.
    ///
    /// The loss is zero when every sample is profitable.
    #[must_use]
    pub fn extremes(&self) -> (f64, f64) {
        let (max, min) = self
            .sample_prices()
            .into_iter()
            .map(|p| self.pnl_at(p))
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), pnl| {
                (hi.max(pnl), lo.min(pnl))
            });
        (max, (-min).max(0.0))
    }

    /// Break-evens found by a fixed-step scan.
    ///
    /// A grid price is accepted when its absolute P&L is below the configured
    /// tolerance and no accepted price lies within the dedup window.
    #[must_use]
    pub fn grid_breakevens(&self, config: &StrategyConfig) -> Vec<f64> {
        let start = (self.min_strike() - config.breakeven_margin).max(0.0);
        let end = self.max_strike() + config.breakeven_margin;
        let steps = ((end - start) / config.breakeven_step).floor() as usize;

        let mut found: Vec<f64> = Vec::new();
        for i in 0..=steps {
            let price = config.breakeven_step.mul_add(i as f64, start);
            if self.pnl_at(price).abs() >= config.breakeven_tolerance {
                continue;
            }
            if found
                .iter()
                .any(|be| (be - price).abs() < config.breakeven_dedup_window)
            {
                continue;
            }
            found.push(price);
        }
        found
    }

    /// Exact break-evens from the linear segments between strikes.
    #[must_use]
    pub fn exact_breakevens(&self) -> Vec<f64> {
        let mut knots = Vec::with_capacity(self.strikes.len() + 1);
        if self.min_strike() > 0.0 {
            knots.push(0.0);
        }
        knots.extend_from_slice(&self.strikes);

        let mut roots = Vec::new();
        let values: Vec<f64> = knots.iter().map(|&p| self.pnl_at(p)).collect();

        for (i, (&price, &pnl)) in knots.iter().zip(&values).enumerate() {
            if pnl.abs() < ROOT_EPSILON {
                roots.push(price);
            }
            if let (Some(&next_price), Some(&next_pnl)) = (knots.get(i + 1), values.get(i + 1))
                && pnl * next_pnl < 0.0
            {
                roots.push(price - pnl * (next_price - price) / (next_pnl - pnl));
            }
        }

        // Ray beyond the highest strike
        let last_price = self.max_strike();
        let last_pnl = self.pnl_at(last_price);
        let slope = self.upside_slope();
        if slope.abs() > ROOT_EPSILON && last_pnl.abs() >= ROOT_EPSILON {
            let root = last_price - last_pnl / slope;
            if root > last_price {
                roots.push(root);
            }
        }

        roots.sort_by(f64::total_cmp);
        roots.dedup_by(|a, b| (*a - *b).abs() < ROOT_EPSILON);
        roots
    }

    /// Evenly spaced P&L samples around the strikes.
    ///
    /// Spans half the strike range beyond each side; a single strike spans
    /// ±10% of it. Percentages are relative to `capital` and zero when no
    /// capital is committed.
    #[must_use]
    pub fn pnl_curve(&self, points: usize, capital: f64) -> Vec<PnlPoint> {
        let (min, max) = (self.min_strike(), self.max_strike());
        let range = if max - min > 0.0 { max - min } else { min * 0.2 };
        let low = 0.5f64.mul_add(-range, min).max(0.0);
        let high = 0.5f64.mul_add(range, max);

        let intervals = points.saturating_sub(1).max(1) as f64;
        let step = (high - low) / intervals;

        (0..points)
            .map(|i| {
                let price = step.mul_add(i as f64, low);
                let pnl = self.pnl_at(price);
                let pnl_percent = if capital > 0.0 {
                    pnl / capital * 100.0
                } else {
                    0.0
                };
                PnlPoint {
                    price,
                    pnl,
                    pnl_percent,
                }
            })
            .collect()
    }
}
