//! Option contract types, Greeks and chain-level analytics.
//!
//! This module provides:
//! - Contract and chain snapshots consumed read-only by the engine
//! - Greeks with scaling/aggregation for multi-leg positions
//! - Max pain aggregation across a chain

mod contract;
mod greeks;
mod max_pain;

pub use contract::{OptionChain, OptionContract, OptionType, STRIKE_EPSILON};
pub use greeks::{GREEKS_DECIMALS, Greeks, aggregate_greeks, round_dp};
pub use max_pain::{MaxPainCalculator, MaxPainResult, PainPoint};
