//! Options pricing.
//!
//! This module provides:
//! - Black-Scholes prices and Greeks ([`PricingEngine`])
//! - Implied volatility computation (Newton-Raphson, bisection, hybrid)
//!
//! # Example
//!
//! ```
//! use options_analytics::options::OptionType;
//! use options_analytics::pricing::{PricingEngine, PricingInputs};
//!
//! let engine = PricingEngine::new();
//! let inputs = PricingInputs::new(100.0, 100.0, 1.0, 0.20, 0.05, 0.0, OptionType::Call);
//! let price = engine.calculate_price(&inputs)?;
//! assert!((price - 10.45).abs() < 0.05);
//! # Ok::<(), options_analytics::AnalyticsError>(())
//! ```

mod black_scholes;
mod iv;

pub use black_scholes::{PricingEngine, PricingInputs, norm_cdf, norm_pdf, year_fraction};
pub use iv::{IvSolver, IvSolverConfig};
