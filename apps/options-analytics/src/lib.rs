// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::items_after_statements,
        clippy::suboptimal_flops,
        clippy::unreadable_literal
    )
)]

//! Options Analytics Engine
//!
//! Quantitative analytics for listed equity options, exposed as JSON tool
//! calls for an agent.
//!
//! # Architecture
//!
//! ## Core (pure, synchronous)
//!
//! - `pricing`: Black-Scholes-Merton prices, Greeks and implied volatility
//! - `volatility`: historical volatility and volatility resolution
//! - `options`: contracts, chains, Greeks and max-pain aggregation
//! - `strategy`: multi-leg payoff, break-evens, P&L curve and aggregate Greeks
//!
//! ## Application
//!
//! - `ports`: market data interfaces (`QuoteProviderPort`, `OptionChainPort`,
//!   `PriceHistoryPort`)
//! - `use_cases`: one use case per tool
//! - `dto`: tool arguments and rounded tool results
//!
//! ## Infrastructure
//!
//! - `market_data`: in-memory provider loaded from a JSON snapshot
//! - `tools`: JSON tool router
//!
//! Engine results carry full precision; rounding happens in the DTOs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// Error types and stable error codes.
pub mod error;

/// Option contracts, chains, Greeks and max pain.
pub mod options;

/// Black-Scholes pricing and implied volatility.
pub mod pricing;

/// Multi-leg strategy analysis.
pub mod strategy;

/// Historical volatility estimation.
pub mod volatility;

/// Configuration loading and validation.
pub mod config;

/// Logging setup.
pub mod telemetry;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Market data adapters.
pub mod infrastructure;

/// JSON tool router.
pub mod tools;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{AnalyticsError, AnalyticsResult, ErrorCode};
pub use options::{Greeks, MaxPainCalculator, MaxPainResult, OptionChain, OptionContract, OptionType};
pub use pricing::{IvSolver, PricingEngine, PricingInputs};
pub use strategy::{OptionLeg, StrategyAnalysis, StrategyComposer, StrategyRequest, StrategyType};
pub use tools::{ToolCall, ToolResponse, ToolRouter};
pub use volatility::VolatilityEstimator;
