//! Option contract and chain snapshots.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Strikes closer than this are treated as the same strike.
pub const STRIKE_EPSILON: f64 = 1e-6;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Call option (right to buy).
    #[serde(alias = "CALL", alias = "Call", alias = "c", alias = "C")]
    Call,
    /// Put option (right to sell).
    #[serde(alias = "PUT", alias = "Put", alias = "p", alias = "P")]
    Put,
}

impl OptionType {
    /// Value of the option if exercised at `price`.
    #[must_use]
    pub fn intrinsic(self, price: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (price - strike).max(0.0),
            Self::Put => (strike - price).max(0.0),
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(Self::Call),
            "put" | "p" => Ok(Self::Put),
            other => Err(AnalyticsError::invalid_input(format!(
                "option type must be 'call' or 'put', got: {other}"
            ))),
        }
    }
}

/// Immutable snapshot of a listed option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    /// Strike price.
    pub strike: f64,
    /// Expiration date.
    pub expiration: NaiveDate,
    /// Call or put.
    pub option_type: OptionType,
    /// Best bid (0 when not quoted).
    pub bid: f64,
    /// Best ask (0 when not quoted).
    pub ask: f64,
    /// Last traded price (0 when never traded).
    pub last_price: f64,
    /// Open interest in contracts.
    pub open_interest: u64,
    /// Implied volatility as a decimal; 0 means unknown.
    pub implied_volatility: f64,
    /// Whether the contract was in the money when the snapshot was taken.
    pub in_the_money: bool,
}

impl OptionContract {
    /// Market premium for this contract.
    ///
    /// Mid of bid/ask when both sides are quoted, otherwise the last traded
    /// price if positive.
    #[must_use]
    pub fn mid(&self) -> Option<f64> {
        if self.bid > 0.0 && self.ask >= self.bid && self.ask.is_finite() {
            return Some(self.bid.midpoint(self.ask));
        }
        if self.last_price > 0.0 && self.last_price.is_finite() {
            return Some(self.last_price);
        }
        None
    }

    /// Implied volatility when known.
    #[must_use]
    pub fn implied_volatility(&self) -> Option<f64> {
        (self.implied_volatility > 0.0 && self.implied_volatility.is_finite())
            .then_some(self.implied_volatility)
    }

    /// Whether this contract has the given strike and type.
    #[must_use]
    pub fn matches(&self, strike: f64, option_type: OptionType) -> bool {
        self.option_type == option_type && (self.strike - strike).abs() < STRIKE_EPSILON
    }
}

/// Options chain for one underlying and one expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChain {
    /// Expiration date of every contract in the chain.
    pub expiration: NaiveDate,
    /// Underlying price reported with the chain (0 when unknown).
    pub underlying_price: f64,
    /// Call contracts.
    pub calls: Vec<OptionContract>,
    /// Put contracts.
    pub puts: Vec<OptionContract>,
}

impl OptionChain {
    /// Find a contract by strike and type.
    #[must_use]
    pub fn find(&self, strike: f64, option_type: OptionType) -> Option<&OptionContract> {
        let side = match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        };
        side.iter().find(|c| c.matches(strike, option_type))
    }

    /// Whether the chain has no contracts at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }

    /// Underlying price if the chain carries one.
    #[must_use]
    pub fn underlying_price(&self) -> Option<f64> {
        (self.underlying_price > 0.0 && self.underlying_price.is_finite())
            .then_some(self.underlying_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(strike: f64, option_type: OptionType, bid: f64, ask: f64) -> OptionContract {
        OptionContract {
            strike,
            expiration: NaiveDate::from_ymd_opt(2026, 12, 18).unwrap(),
            option_type,
            bid,
            ask,
            last_price: 0.0,
            open_interest: 0,
            implied_volatility: 0.0,
            in_the_money: false,
        }
    }

    #[test]
    fn test_intrinsic() {
        assert_eq!(OptionType::Call.intrinsic(110.0, 100.0), 10.0);
        assert_eq!(OptionType::Call.intrinsic(90.0, 100.0), 0.0);
        assert_eq!(OptionType::Put.intrinsic(90.0, 100.0), 10.0);
        assert_eq!(OptionType::Put.intrinsic(110.0, 100.0), 0.0);
    }

    #[test]
    fn test_option_type_parse() {
        assert_eq!("CALL".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!(" p ".parse::<OptionType>().unwrap(), OptionType::Put);
        assert!("straddle".parse::<OptionType>().is_err());

        let parsed: OptionType = serde_json::from_str("\"put\"").unwrap();
        assert_eq!(parsed, OptionType::Put);
    }

    #[test]
    fn test_mid_prefers_quote_then_last() {
        let mut c = contract(100.0, OptionType::Call, 2.0, 2.5);
        assert_eq!(c.mid(), Some(2.25));

        c.bid = 0.0;
        assert_eq!(c.mid(), None);

        c.last_price = 2.1;
        assert_eq!(c.mid(), Some(2.1));

        // Crossed market is not a usable quote
        c.bid = 3.0;
        c.ask = 2.0;
        assert_eq!(c.mid(), Some(2.1));
    }

    #[test]
    fn test_unknown_iv() {
        let mut c = contract(100.0, OptionType::Put, 1.0, 1.2);
        assert_eq!(c.implied_volatility(), None);
        c.implied_volatility = 0.31;
        assert_eq!(c.implied_volatility(), Some(0.31));
    }

    #[test]
    fn test_chain_find() {
        let chain = OptionChain {
            expiration: NaiveDate::from_ymd_opt(2026, 12, 18).unwrap(),
            underlying_price: 101.0,
            calls: vec![contract(100.0, OptionType::Call, 4.0, 4.2)],
            puts: vec![contract(100.0, OptionType::Put, 3.0, 3.2)],
        };

        assert_eq!(chain.find(100.0, OptionType::Put).unwrap().bid, 3.0);
        assert!(chain.find(105.0, OptionType::Call).is_none());
        assert_eq!(chain.underlying_price(), Some(101.0));
        assert!(!chain.is_empty());
    }
}
