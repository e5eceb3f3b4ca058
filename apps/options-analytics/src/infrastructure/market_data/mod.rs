//! Market Data Adapters
//!
//! Implementations of `QuoteProviderPort`, `OptionChainPort` and
//! `PriceHistoryPort`.

pub mod in_memory;

pub use in_memory::{InMemoryMarketData, MarketSnapshot, SymbolSnapshot};
