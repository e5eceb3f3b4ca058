//! Data Transfer Objects (DTOs)
//!
//! Tool arguments and tool results. Requests accept camelCase fields with
//! snake_case aliases; responses are camelCase and rounded for
//! presentation (Greeks and volatilities to 4 places, dollar amounts to 2).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::options::{GREEKS_DECIMALS, Greeks, MaxPainResult, OptionType, PainPoint, round_dp};
use crate::strategy::{OptionLeg, StrategyAnalysis, StrategyType};
use crate::volatility::{VolatilityResult, VolatilitySource};

/// Decimal places for dollar amounts and percentages.
const MONEY_DECIMALS: u32 = 2;

fn money(value: f64) -> f64 {
    round_dp(value, MONEY_DECIMALS)
}

fn ratio(value: f64) -> f64 {
    round_dp(value, GREEKS_DECIMALS)
}

// ============================================================================
// calculate_greeks
// ============================================================================

/// Arguments of `calculate_greeks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateGreeksRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Strike price.
    pub strike: f64,
    /// Expiration date.
    #[serde(alias = "expiration_date")]
    pub expiration_date: NaiveDate,
    /// Call or put.
    #[serde(alias = "option_type")]
    pub option_type: OptionType,
    /// Spot override; fetched from the quote provider when absent.
    #[serde(default, alias = "underlying_price")]
    pub underlying_price: Option<f64>,
    /// Risk-free rate override.
    #[serde(default, alias = "risk_free_rate")]
    pub risk_free_rate: Option<f64>,
    /// Dividend yield override.
    #[serde(default, alias = "dividend_yield")]
    pub dividend_yield: Option<f64>,
}

/// Result of `calculate_greeks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreeksResponse {
    /// Underlying symbol.
    pub symbol: String,
    /// Strike price.
    pub strike: f64,
    /// Expiration date.
    pub expiration_date: NaiveDate,
    /// Call or put.
    pub option_type: OptionType,
    /// Spot used for pricing.
    pub underlying_price: f64,
    /// Years to expiration.
    pub time_to_expiry: f64,
    /// Volatility used for pricing (decimal).
    pub implied_volatility: f64,
    /// Origin of the volatility.
    pub volatility_source: VolatilitySource,
    /// Black-Scholes price.
    pub theoretical_price: f64,
    /// Delta, gamma, theta, vega and rho.
    #[serde(flatten)]
    pub greeks: Greeks,
}

impl GreeksResponse {
    /// Round for presentation.
    #[must_use]
    pub fn rounded(mut self) -> Self {
        self.greeks = self.greeks.rounded();
        self.time_to_expiry = round_dp(self.time_to_expiry, 6);
        self.implied_volatility = ratio(self.implied_volatility);
        self.theoretical_price = ratio(self.theoretical_price);
        self
    }
}

// ============================================================================
// calculate_max_pain
// ============================================================================

/// Arguments of `calculate_max_pain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxPainRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Expiration; the nearest listed one when absent.
    #[serde(default, alias = "expiration_date")]
    pub expiration_date: Option<NaiveDate>,
}

/// Result of `calculate_max_pain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxPainResponse {
    /// Underlying symbol.
    pub symbol: String,
    /// Expiration of the chain used.
    pub expiration_date: NaiveDate,
    /// Strike minimizing option-holder payoff.
    pub max_pain_price: f64,
    /// Current underlying price (0 when unknown).
    pub current_price: f64,
    /// Call open interest.
    pub call_open_interest: u64,
    /// Put open interest.
    pub put_open_interest: u64,
    /// Call plus put open interest.
    pub total_open_interest: u64,
    /// Put/call open interest ratio.
    pub put_call_ratio: f64,
    /// Pain at every candidate strike.
    pub price_points: Vec<PainPoint>,
}

impl MaxPainResponse {
    /// Build a rounded response.
    #[must_use]
    pub fn new(
        symbol: String,
        expiration_date: NaiveDate,
        current_price: f64,
        result: MaxPainResult,
    ) -> Self {
        Self {
            symbol,
            expiration_date,
            max_pain_price: result.max_pain_price,
            current_price: money(current_price),
            call_open_interest: result.call_open_interest,
            put_open_interest: result.put_open_interest,
            total_open_interest: result.total_open_interest,
            put_call_ratio: money(result.put_call_ratio),
            price_points: result
                .price_points
                .into_iter()
                .map(|p| PainPoint {
                    strike: p.strike,
                    call_pain: money(p.call_pain),
                    put_pain: money(p.put_pain),
                    total_pain: money(p.total_pain),
                })
                .collect(),
        }
    }
}

// ============================================================================
// calculate_historical_volatility
// ============================================================================

/// Arguments of `calculate_historical_volatility`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalVolatilityRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Lookback windows in trading days; configured defaults when absent.
    #[serde(default)]
    pub periods: Option<Vec<u32>>,
}

/// Result of `calculate_historical_volatility`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalVolatilityResponse {
    /// Underlying symbol.
    pub symbol: String,
    /// Most recent close.
    pub current_price: f64,
    /// One result per requested window.
    pub periods: Vec<VolatilityResult>,
}

impl HistoricalVolatilityResponse {
    /// Build a rounded response.
    #[must_use]
    pub fn new(symbol: String, current_price: f64, periods: Vec<VolatilityResult>) -> Self {
        Self {
            symbol,
            current_price: money(current_price),
            periods: periods
                .into_iter()
                .map(|r| VolatilityResult {
                    days: r.days,
                    volatility: ratio(r.volatility),
                    annualized: money(r.annualized),
                })
                .collect(),
        }
    }
}

// ============================================================================
// analyze_strategy
// ============================================================================

/// Arguments of `analyze_strategy`.
///
/// Either `legs` or `strikes` (for a preset `strategyType`) must be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeStrategyRequest {
    /// Underlying symbol.
    pub symbol: String,
    /// Descriptive label; selects the preset when `legs` is empty.
    #[serde(default, alias = "strategy_type")]
    pub strategy_type: StrategyType,
    /// Explicit legs.
    #[serde(default)]
    pub legs: Vec<OptionLeg>,
    /// Preset strikes, ascending.
    #[serde(default)]
    pub strikes: Option<Vec<f64>>,
    /// Contracts per unit preset leg.
    #[serde(default = "default_preset_quantity")]
    pub quantity: i32,
    /// Expiration of every leg.
    #[serde(alias = "expiration_date")]
    pub expiration_date: NaiveDate,
}

const fn default_preset_quantity() -> i32 {
    1
}

/// Result of `analyze_strategy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAnalysisResponse {
    /// Underlying symbol.
    pub symbol: String,
    /// The analysis.
    #[serde(flatten)]
    pub analysis: StrategyAnalysis,
}

impl StrategyAnalysisResponse {
    /// Build a rounded response.
    #[must_use]
    pub fn new(symbol: String, mut analysis: StrategyAnalysis) -> Self {
        for leg in &mut analysis.legs {
            leg.premium = ratio(leg.premium);
            leg.volatility = ratio(leg.volatility);
            leg.greeks = leg.greeks.rounded();
        }
        analysis.underlying_price = money(analysis.underlying_price);
        analysis.net_premium = money(analysis.net_premium);
        analysis.net_debit = money(analysis.net_debit);
        analysis.capital_committed = money(analysis.capital_committed);
        analysis.max_profit = money(analysis.max_profit);
        analysis.max_loss = money(analysis.max_loss);
        analysis.breakevens = analysis.breakevens.into_iter().map(money).collect();
        analysis.greeks = analysis.greeks.rounded();
        for point in &mut analysis.pnl_curve {
            point.price = money(point.price);
            point.pnl = money(point.pnl);
            point.pnl_percent = money(point.pnl_percent);
        }
        Self { symbol, analysis }
    }
}

// ============================================================================
// calculate_implied_volatility
// ============================================================================

/// Arguments of `calculate_implied_volatility`.
///
/// Time to expiry is given directly in years or derived from an
/// expiration date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpliedVolatilityRequest {
    /// Observed option price.
    #[serde(alias = "option_price", alias = "price")]
    pub option_price: f64,
    /// Underlying spot price.
    #[serde(alias = "underlying_price")]
    pub underlying_price: f64,
    /// Strike price.
    pub strike: f64,
    /// Years to expiration.
    #[serde(default, alias = "time_to_expiry")]
    pub time_to_expiry: Option<f64>,
    /// Expiration date, used when `timeToExpiry` is absent.
    #[serde(default, alias = "expiration_date")]
    pub expiration_date: Option<NaiveDate>,
    /// Call or put.
    #[serde(alias = "option_type")]
    pub option_type: OptionType,
    /// Risk-free rate override.
    #[serde(default, alias = "risk_free_rate")]
    pub risk_free_rate: Option<f64>,
    /// Dividend yield override.
    #[serde(default, alias = "dividend_yield")]
    pub dividend_yield: Option<f64>,
}

/// Result of `calculate_implied_volatility`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpliedVolatilityResponse {
    /// Implied volatility (decimal).
    pub implied_volatility: f64,
    /// Implied volatility in percent.
    pub implied_volatility_percent: f64,
    /// Years to expiration used.
    pub time_to_expiry: f64,
}

impl ImpliedVolatilityResponse {
    /// Build a rounded response.
    #[must_use]
    pub fn new(implied_volatility: f64, time_to_expiry: f64) -> Self {
        Self {
            implied_volatility: ratio(implied_volatility),
            implied_volatility_percent: money(implied_volatility * 100.0),
            time_to_expiry: round_dp(time_to_expiry, 6),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeks_request_accepts_snake_case() {
        let json = r#"{
            "symbol": "AAPL",
            "strike": 190,
            "expiration_date": "2026-12-18",
            "option_type": "put",
            "underlying_price": 187.5
        }"#;
        let request: CalculateGreeksRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.option_type, OptionType::Put);
        assert_eq!(request.underlying_price, Some(187.5));
        assert!(request.risk_free_rate.is_none());
    }

    #[test]
    fn greeks_response_flattens_and_rounds() {
        let response = GreeksResponse {
            symbol: "AAPL".to_string(),
            strike: 100.0,
            expiration_date: NaiveDate::from_ymd_opt(2026, 12, 18).unwrap(),
            option_type: OptionType::Call,
            underlying_price: 100.0,
            time_to_expiry: 0.123_456_789,
            implied_volatility: 0.234_567_8,
            volatility_source: VolatilitySource::Implied,
            theoretical_price: 4.567_891,
            greeks: Greeks::new(0.512_345_6, 0.031_234_5, -0.021_111_9, 0.195_555_5, 0.111_111_1),
        }
        .rounded();

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["delta"], 0.5123);
        assert_eq!(value["theta"], -0.0211);
        assert_eq!(value["impliedVolatility"], 0.2346);
        assert_eq!(value["volatilitySource"], "implied");
        assert_eq!(value["timeToExpiry"], 0.123_457);
    }

    #[test]
    fn strategy_request_with_preset() {
        let json = r#"{
            "symbol": "SPY",
            "strategy_type": "iron_condor",
            "strikes": [430, 440, 460, 470],
            "expirationDate": "2026-12-18"
        }"#;
        let request: AnalyzeStrategyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.strategy_type, StrategyType::IronCondor);
        assert!(request.legs.is_empty());
        assert_eq!(request.strikes.as_deref(), Some(&[430.0, 440.0, 460.0, 470.0][..]));
    }

    #[test]
    fn implied_volatility_response() {
        let response = ImpliedVolatilityResponse::new(0.253_456, 0.5);
        assert_eq!(response.implied_volatility, 0.2535);
        assert_eq!(response.implied_volatility_percent, 25.35);
    }
}
