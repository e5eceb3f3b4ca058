//! In-memory market data provider.
//!
//! Serves quotes, chains and price history from a snapshot held in memory.
//! Backs the CLI (loaded from a JSON file) and integration tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ports::{
    ChainSnapshot, HistoryInterval, MarketDataError, OptionChainPort, PriceHistory,
    PriceHistoryPort, QuoteProviderPort, SpotQuote,
};

/// Trading days per calendar year used to size history windows.
const TRADING_DAYS_PER_CALENDAR_YEAR: f64 = 252.0 / 365.0;

/// Market data for one underlying.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSnapshot {
    /// Latest underlying price.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Daily closes, oldest first.
    #[serde(default)]
    pub closes: Vec<Decimal>,
    /// Listed chains, any order.
    #[serde(default)]
    pub chains: Vec<ChainSnapshot>,
}

/// Market data snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Data per symbol (upper-case keys).
    #[serde(default)]
    pub symbols: HashMap<String, SymbolSnapshot>,
}

/// In-memory implementation of every market data port.
#[derive(Debug, Default)]
pub struct InMemoryMarketData {
    symbols: RwLock<HashMap<String, SymbolSnapshot>>,
    as_of: Option<NaiveDate>,
}

fn key(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

impl InMemoryMarketData {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: MarketSnapshot) -> Self {
        let symbols = snapshot
            .symbols
            .into_iter()
            .map(|(symbol, data)| (key(&symbol), data))
            .collect();
        Self {
            symbols: RwLock::new(symbols),
            as_of: None,
        }
    }

    /// Load a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::DataUnavailable`] if the file cannot be
    /// read or parsed.
    pub fn from_snapshot_file(path: impl AsRef<Path>) -> Result<Self, MarketDataError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| MarketDataError::DataUnavailable {
                message: format!("failed to read snapshot '{}': {e}", path.display()),
            })?;
        let snapshot: MarketSnapshot =
            serde_json::from_str(&contents).map_err(|e| MarketDataError::DataUnavailable {
                message: format!("failed to parse snapshot '{}': {e}", path.display()),
            })?;
        debug!(path = %path.display(), symbols = snapshot.symbols.len(), "Market snapshot loaded");
        Ok(Self::from_snapshot(snapshot))
    }

    /// Date the nearest expiration is chosen from (today when unset).
    #[must_use]
    pub const fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    /// Set the underlying price for a symbol.
    pub fn set_price(&self, symbol: &str, price: Decimal) {
        let mut symbols = self.symbols.write().unwrap_or_else(PoisonError::into_inner);
        symbols.entry(key(symbol)).or_default().price = Some(price);
    }

    /// Replace the daily closes for a symbol.
    pub fn set_closes(&self, symbol: &str, closes: Vec<Decimal>) {
        let mut symbols = self.symbols.write().unwrap_or_else(PoisonError::into_inner);
        symbols.entry(key(symbol)).or_default().closes = closes;
    }

    /// Add or replace the chain for its symbol and expiration.
    pub fn add_chain(&self, chain: ChainSnapshot) {
        let mut symbols = self.symbols.write().unwrap_or_else(PoisonError::into_inner);
        let chains = &mut symbols.entry(key(&chain.symbol)).or_default().chains;
        chains.retain(|c| c.expiration_date != chain.expiration_date);
        chains.push(chain);
    }

    fn with_symbol<T>(
        &self,
        symbol: &str,
        f: impl FnOnce(&SymbolSnapshot) -> Result<T, MarketDataError>,
    ) -> Result<T, MarketDataError> {
        let symbols = self.symbols.read().unwrap_or_else(PoisonError::into_inner);
        symbols
            .get(&key(symbol))
            .ok_or_else(|| MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
            .and_then(f)
    }
}

#[async_trait]
impl QuoteProviderPort for InMemoryMarketData {
    async fn get_quote(&self, symbol: &str) -> Result<SpotQuote, MarketDataError> {
        self.with_symbol(symbol, |data| {
            data.price
                .map(|price| SpotQuote::new(key(symbol), price))
                .ok_or_else(|| MarketDataError::DataUnavailable {
                    message: format!("no price for {symbol}"),
                })
        })
    }
}

#[async_trait]
impl OptionChainPort for InMemoryMarketData {
    async fn get_chain(
        &self,
        symbol: &str,
        expiration: Option<NaiveDate>,
    ) -> Result<ChainSnapshot, MarketDataError> {
        let as_of = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
        self.with_symbol(symbol, |data| {
            let chain = match expiration {
                Some(date) => data.chains.iter().find(|c| c.expiration_date == date),
                None => data
                    .chains
                    .iter()
                    .filter(|c| c.expiration_date >= as_of)
                    .min_by_key(|c| c.expiration_date),
            };
            chain
                .cloned()
                .ok_or_else(|| MarketDataError::ExpirationNotFound {
                    symbol: symbol.to_string(),
                    expiration: expiration.map_or_else(|| "nearest".to_string(), |d| d.to_string()),
                })
        })
    }
}

#[async_trait]
impl PriceHistoryPort for InMemoryMarketData {
    async fn get_historical(
        &self,
        symbol: &str,
        lookback_days: u32,
        interval: HistoryInterval,
    ) -> Result<PriceHistory, MarketDataError> {
        self.with_symbol(symbol, |data| {
            let wanted = (f64::from(lookback_days) * TRADING_DAYS_PER_CALENDAR_YEAR).ceil() as usize;
            let start = data.closes.len().saturating_sub(wanted);
            let window = &data.closes[start..];

            let closes = match interval {
                HistoryInterval::Daily => window.to_vec(),
                HistoryInterval::Weekly => {
                    let mut weekly: Vec<Decimal> = window.iter().rev().step_by(5).copied().collect();
                    weekly.reverse();
                    weekly
                }
            };

            Ok(PriceHistory {
                symbol: key(symbol),
                interval,
                closes,
            })
        })
    }
}
