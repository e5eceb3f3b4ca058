//! Option Chain Port (Driven Port)
//!
//! Interface for fetching an options chain. Provider payloads are modeled
//! as explicit optional-field structs; [`ChainSnapshot::into_chain`]
//! resolves the defaults the engine relies on.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::MarketDataError;
use crate::options::{OptionChain, OptionContract, OptionType};

/// One contract as reported by a chain provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQuote {
    /// Strike price.
    pub strike: Decimal,
    /// Best bid (missing: 0).
    #[serde(default)]
    pub bid: Option<Decimal>,
    /// Best ask (missing: 0).
    #[serde(default)]
    pub ask: Option<Decimal>,
    /// Last trade price (missing: 0).
    #[serde(default)]
    pub last_price: Option<Decimal>,
    /// Open interest (missing: 0).
    #[serde(default)]
    pub open_interest: Option<u64>,
    /// Implied volatility as a decimal (missing: 0, unknown).
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    /// In-the-money flag (missing: derived from the underlying price).
    #[serde(default)]
    pub in_the_money: Option<bool>,
}

impl ContractQuote {
    /// Quote with only a strike and open interest.
    #[must_use]
    pub const fn with_open_interest(strike: Decimal, open_interest: u64) -> Self {
        Self {
            strike,
            bid: None,
            ask: None,
            last_price: None,
            open_interest: Some(open_interest),
            implied_volatility: None,
            in_the_money: None,
        }
    }

    fn into_contract(
        self,
        option_type: OptionType,
        expiration: NaiveDate,
        underlying_price: f64,
    ) -> OptionContract {
        let to_f64 = |value: Option<Decimal>| {
            value
                .and_then(|d| d.to_f64())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(0.0)
        };
        let strike = self.strike.to_f64().unwrap_or(0.0);
        let in_the_money = self.in_the_money.unwrap_or_else(|| {
            underlying_price > 0.0 && option_type.intrinsic(underlying_price, strike) > 0.0
        });

        OptionContract {
            strike,
            expiration,
            option_type,
            bid: to_f64(self.bid),
            ask: to_f64(self.ask),
            last_price: to_f64(self.last_price),
            open_interest: self.open_interest.unwrap_or(0),
            implied_volatility: self
                .implied_volatility
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(0.0),
            in_the_money,
        }
    }
}

/// Options chain as reported by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSnapshot {
    /// Underlying symbol.
    pub symbol: String,
    /// Expiration of every contract in the snapshot.
    #[serde(alias = "expiration_date")]
    pub expiration_date: NaiveDate,
    /// Underlying price reported with the chain.
    #[serde(default)]
    pub underlying_price: Option<Decimal>,
    /// Call contracts.
    #[serde(default)]
    pub calls: Vec<ContractQuote>,
    /// Put contracts.
    #[serde(default)]
    pub puts: Vec<ContractQuote>,
}

impl ChainSnapshot {
    /// Underlying price as `f64`, if reported and positive.
    #[must_use]
    pub fn underlying_price_f64(&self) -> Option<f64> {
        self.underlying_price
            .and_then(|d| d.to_f64())
            .filter(|p| p.is_finite() && *p > 0.0)
    }

    /// Resolve provider defaults into an engine chain.
    #[must_use]
    pub fn into_chain(self) -> OptionChain {
        let underlying_price = self.underlying_price_f64().unwrap_or(0.0);
        let expiration = self.expiration_date;
        OptionChain {
            expiration,
            underlying_price,
            calls: self
                .calls
                .into_iter()
                .map(|c| c.into_contract(OptionType::Call, expiration, underlying_price))
                .collect(),
            puts: self
                .puts
                .into_iter()
                .map(|c| c.into_contract(OptionType::Put, expiration, underlying_price))
                .collect(),
        }
    }
}

/// Port for fetching options chains.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OptionChainPort: Send + Sync {
    /// Get the chain for `expiration`, or the nearest listed expiration.
    async fn get_chain(
        &self,
        symbol: &str,
        expiration: Option<NaiveDate>,
    ) -> Result<ChainSnapshot, MarketDataError>;
}
