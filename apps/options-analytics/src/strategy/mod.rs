//! Multi-leg options strategies.
//!
//! - [`StrategyComposer`]: premium/Greeks resolution and payoff analysis
//! - [`Payoff`]: expiration P&L, extremes, break-evens and P&L curve
//! - [`StrategyBuilder`]: leg presets for common strategies

mod builder;
mod composer;
mod leg;
mod payoff;

pub use builder::{StrategyBuilder, StrategyBuilderConfig};
pub use composer::{
    LegAnalysis, MarketContext, PremiumSource, StrategyAnalysis, StrategyComposer,
    StrategyRequest,
};
pub use leg::{LegAction, OptionLeg, StrategyType};
pub use payoff::{Payoff, PayoffLeg, PnlPoint};
