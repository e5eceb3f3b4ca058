//! Max pain aggregation across an options chain.
//!
//! For each candidate strike `p` the aggregate payoff to option holders is
//! `call_pain(p) + put_pain(p)` where
//!
//! - `call_pain(p) = Σ (p - K) · OI` over calls with `K < p`
//! - `put_pain(p)  = Σ (K - p) · OI` over puts with `K > p`
//!
//! The total is piecewise linear and convex in `p` with breakpoints at the
//! strikes, so the minimum over listed strikes is the global minimum.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::contract::{OptionChain, OptionContract, STRIKE_EPSILON};
use crate::error::{AnalyticsError, AnalyticsResult};

/// Holder payoff at one candidate settlement price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainPoint {
    /// Candidate settlement price (a listed strike).
    pub strike: f64,
    /// Payoff to call holders.
    pub call_pain: f64,
    /// Payoff to put holders.
    pub put_pain: f64,
    /// Combined payoff.
    pub total_pain: f64,
}

/// Result of a max pain calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxPainResult {
    /// Strike minimizing total holder payoff.
    pub max_pain_price: f64,
    /// Pain at every candidate strike, ascending.
    pub price_points: Vec<PainPoint>,
    /// Call open interest.
    pub call_open_interest: u64,
    /// Put open interest.
    pub put_open_interest: u64,
    /// Call plus put open interest.
    pub total_open_interest: u64,
    /// Put/call open interest ratio (0 when there is no call open interest).
    pub put_call_ratio: f64,
}

/// Max pain calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxPainCalculator;

impl MaxPainCalculator {
    /// Create a new calculator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compute max pain for a chain.
    ///
    /// # Errors
    ///
    /// Returns `DataUnavailable` when the chain has no usable strikes.
    pub fn calculate(&self, chain: &OptionChain) -> AnalyticsResult<MaxPainResult> {
        let strikes = candidate_strikes(chain);
        if strikes.is_empty() {
            return Err(AnalyticsError::data_unavailable(format!(
                "options chain for {} has no strikes",
                chain.expiration
            )));
        }

        let price_points: Vec<PainPoint> = strikes
            .iter()
            .map(|&p| Self::pain_at(&chain.calls, &chain.puts, p))
            .collect();

        // Strict comparison keeps the first (lowest) strike on ties
        let mut best = price_points[0];
        for point in &price_points[1..] {
            if point.total_pain < best.total_pain {
                best = *point;
            }
        }

        let call_open_interest: u64 = chain.calls.iter().map(|c| c.open_interest).sum();
        let put_open_interest: u64 = chain.puts.iter().map(|c| c.open_interest).sum();
        let put_call_ratio = if call_open_interest == 0 {
            0.0
        } else {
            put_open_interest as f64 / call_open_interest as f64
        };

        debug!(
            expiration = %chain.expiration,
            candidates = price_points.len(),
            max_pain = best.strike,
            "max pain computed"
        );

        Ok(MaxPainResult {
            max_pain_price: best.strike,
            price_points,
            call_open_interest,
            put_open_interest,
            total_open_interest: call_open_interest + put_open_interest,
            put_call_ratio,
        })
    }

    /// Holder payoff if the underlying settles at `price`.
    #[must_use]
    pub fn pain_at(calls: &[OptionContract], puts: &[OptionContract], price: f64) -> PainPoint {
        let call_pain: f64 = calls
            .iter()
            .filter(|c| c.strike < price)
            .map(|c| (price - c.strike) * c.open_interest as f64)
            .sum();
        let put_pain: f64 = puts
            .iter()
            .filter(|c| c.strike > price)
            .map(|c| (c.strike - price) * c.open_interest as f64)
            .sum();

        PainPoint {
            strike: price,
            call_pain,
            put_pain,
            total_pain: call_pain + put_pain,
        }
    }
}

/// Sorted unique strikes across both sides of the chain.
fn candidate_strikes(chain: &OptionChain) -> Vec<f64> {
    let mut strikes: Vec<f64> = chain
        .calls
        .iter()
        .chain(chain.puts.iter())
        .map(|c| c.strike)
        .filter(|k| k.is_finite() && *k > 0.0)
        .collect();
    strikes.sort_by(f64::total_cmp);
    strikes.dedup_by(|a, b| (*a - *b).abs() < STRIKE_EPSILON);
    strikes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionType;
    use chrono::NaiveDate;

    fn contract(strike: f64, option_type: OptionType, open_interest: u64) -> OptionContract {
        OptionContract {
            strike,
            expiration: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            option_type,
            bid: 0.0,
            ask: 0.0,
            last_price: 0.0,
            open_interest,
            implied_volatility: 0.0,
            in_the_money: false,
        }
    }

    fn chain(calls: &[(f64, u64)], puts: &[(f64, u64)]) -> OptionChain {
        OptionChain {
            expiration: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            underlying_price: 100.0,
            calls: calls
                .iter()
                .map(|&(k, oi)| contract(k, OptionType::Call, oi))
                .collect(),
            puts: puts
                .iter()
                .map(|&(k, oi)| contract(k, OptionType::Put, oi))
                .collect(),
        }
    }

    #[test]
    fn test_three_strike_scenario() {
        let chain = chain(
            &[(95.0, 100), (100.0, 200), (105.0, 50)],
            &[(95.0, 50), (100.0, 200), (105.0, 100)],
        );
        let result = MaxPainCalculator::new().calculate(&chain).unwrap();

        // Brute force over the candidates
        let brute = [95.0, 100.0, 105.0]
            .into_iter()
            .map(|p| MaxPainCalculator::pain_at(&chain.calls, &chain.puts, p))
            .min_by(|a, b| a.total_pain.total_cmp(&b.total_pain))
            .unwrap();

        assert_eq!(result.max_pain_price, brute.strike);
        assert_eq!(result.max_pain_price, 100.0);
        assert_eq!(result.price_points.len(), 3);
        assert_eq!(result.price_points[0].total_pain, 2000.0);
        assert_eq!(result.price_points[1].total_pain, 1000.0);
        assert_eq!(result.price_points[2].total_pain, 2000.0);
        assert_eq!(result.total_open_interest, 700);
        assert!((result.put_call_ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_resolves_to_lowest_strike() {
        // Symmetric open interest -> equal pain at 100 and 110
        let chain = chain(&[(100.0, 10)], &[(110.0, 10)]);
        let result = MaxPainCalculator::new().calculate(&chain).unwrap();

        assert_eq!(result.price_points[0].total_pain, 100.0);
        assert_eq!(result.price_points[1].total_pain, 100.0);
        assert_eq!(result.max_pain_price, 100.0);
    }

    #[test]
    fn test_no_calls_ratio_is_zero() {
        let chain = chain(&[], &[(100.0, 10), (90.0, 5)]);
        let result = MaxPainCalculator::new().calculate(&chain).unwrap();

        assert_eq!(result.put_call_ratio, 0.0);
        assert_eq!(result.call_open_interest, 0);
        assert_eq!(result.price_points[0].strike, 90.0);
    }

    #[test]
    fn test_duplicate_strikes_deduplicated() {
        let chain = chain(&[(100.0, 1), (105.0, 1)], &[(100.0, 1), (95.0, 1)]);
        let result = MaxPainCalculator::new().calculate(&chain).unwrap();
        let strikes: Vec<f64> = result.price_points.iter().map(|p| p.strike).collect();
        assert_eq!(strikes, vec![95.0, 100.0, 105.0]);
    }

    #[test]
    fn test_empty_chain() {
        let chain = chain(&[], &[]);
        let Err(err) = MaxPainCalculator::new().calculate(&chain) else {
            panic!("expected error for empty chain");
        };
        assert_eq!(err.code(), crate::error::ErrorCode::DataUnavailable);
    }

    #[test]
    fn test_minimality_over_candidates() {
        let chain = chain(
            &[(90.0, 300), (95.0, 120), (100.0, 800), (110.0, 40)],
            &[(85.0, 60), (95.0, 500), (100.0, 250), (105.0, 900)],
        );
        let result = MaxPainCalculator::new().calculate(&chain).unwrap();
        let best = result
            .price_points
            .iter()
            .find(|p| p.strike == result.max_pain_price)
            .unwrap();
        for point in &result.price_points {
            assert!(point.total_pain >= best.total_pain);
        }
    }
}
