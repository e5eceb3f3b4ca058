//! Infrastructure Layer
//!
//! Adapters implementing the ports defined in the application layer.
//!
//! - `market_data/`: quote, options chain and price history providers
//!
//! Inbound adapters (the JSON tool router) live in `crate::tools`.

pub mod market_data;

pub use market_data::InMemoryMarketData;
