//! Application Use Cases
//!
//! One use case per tool. Each one gathers market data through the ports
//! and hands plain numbers to the engine.

mod analyze_strategy;
mod calculate_greeks;
mod calculate_max_pain;
mod historical_volatility;
mod implied_volatility;

pub use analyze_strategy::AnalyzeStrategyUseCase;
pub use calculate_greeks::CalculateGreeksUseCase;
pub use calculate_max_pain::CalculateMaxPainUseCase;
pub use historical_volatility::HistoricalVolatilityUseCase;
pub use implied_volatility::ImpliedVolatilityUseCase;
