//! Tool router (driver adapter).
//!
//! Dispatches JSON tool calls to the application use cases and wraps the
//! outcome in a [`ToolResponse`]. Errors never escape as `Err`: they are
//! reported in the response with their stable [`ErrorCode`].
//!
//! ```json
//! {"tool": "calculate_max_pain", "arguments": {"symbol": "SPY"}}
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::application::AnalyticsSettings;
use crate::application::ports::{OptionChainPort, PriceHistoryPort, QuoteProviderPort};
use crate::application::use_cases::{
    AnalyzeStrategyUseCase, CalculateGreeksUseCase, CalculateMaxPainUseCase,
    HistoricalVolatilityUseCase, ImpliedVolatilityUseCase,
};
use crate::error::{AnalyticsError, AnalyticsResult, ErrorCode};

/// `calculate_greeks` tool name.
pub const CALCULATE_GREEKS: &str = "calculate_greeks";
/// `calculate_max_pain` tool name.
pub const CALCULATE_MAX_PAIN: &str = "calculate_max_pain";
/// `calculate_historical_volatility` tool name.
pub const CALCULATE_HISTORICAL_VOLATILITY: &str = "calculate_historical_volatility";
/// `analyze_strategy` tool name.
pub const ANALYZE_STRATEGY: &str = "analyze_strategy";
/// `calculate_implied_volatility` tool name.
pub const CALCULATE_IMPLIED_VOLATILITY: &str = "calculate_implied_volatility";

/// Every tool the router serves.
pub const TOOLS: [&str; 5] = [
    CALCULATE_GREEKS,
    CALCULATE_MAX_PAIN,
    CALCULATE_HISTORICAL_VOLATILITY,
    ANALYZE_STRATEGY,
    CALCULATE_IMPLIED_VOLATILITY,
];

/// A tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name.
    pub tool: String,
    /// Tool arguments.
    #[serde(default)]
    pub arguments: Value,
}

/// Error reported in a tool response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl From<&AnalyticsError> for ToolError {
    fn from(error: &AnalyticsError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Response to a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Tool that was called.
    pub tool: String,
    /// Whether the call succeeded.
    pub ok: bool,
    /// Tool result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResponse {
    fn success(tool: String, result: Value) -> Self {
        Self {
            tool,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(tool: String, error: &AnalyticsError) -> Self {
        Self {
            tool,
            ok: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Routes tool calls to use cases.
pub struct ToolRouter<Q, C, H>
where
    Q: QuoteProviderPort,
    C: OptionChainPort,
    H: PriceHistoryPort,
{
    greeks: CalculateGreeksUseCase<Q, C, H>,
    max_pain: CalculateMaxPainUseCase<Q, C>,
    historical_volatility: HistoricalVolatilityUseCase<H>,
    strategy: AnalyzeStrategyUseCase<Q, C, H>,
    implied_volatility: ImpliedVolatilityUseCase,
}

impl<Q, C, H> ToolRouter<Q, C, H>
where
    Q: QuoteProviderPort,
    C: OptionChainPort,
    H: PriceHistoryPort,
{
    /// Wire every use case to the given market data providers.
    pub fn new(quotes: Arc<Q>, chains: Arc<C>, history: Arc<H>, settings: &AnalyticsSettings) -> Self {
        Self {
            greeks: CalculateGreeksUseCase::new(
                Arc::clone(&quotes),
                Arc::clone(&chains),
                Arc::clone(&history),
                settings.clone(),
            ),
            max_pain: CalculateMaxPainUseCase::new(Arc::clone(&quotes), Arc::clone(&chains)),
            historical_volatility: HistoricalVolatilityUseCase::new(
                Arc::clone(&history),
                settings.clone(),
            ),
            strategy: AnalyzeStrategyUseCase::new(quotes, chains, history, settings.clone()),
            implied_volatility: ImpliedVolatilityUseCase::new(settings.clone()),
        }
    }

    /// Names of the tools this router serves.
    #[must_use]
    pub const fn tools(&self) -> &'static [&'static str] {
        &TOOLS
    }

    /// Dispatch a tool call.
    pub async fn dispatch(&self, call: ToolCall) -> ToolResponse {
        info!(tool = %call.tool, "Tool invoked");
        match self.route(&call.tool, call.arguments).await {
            Ok(result) => ToolResponse::success(call.tool, result),
            Err(e) => {
                warn!(tool = %call.tool, code = %e.code(), error = %e, "Tool call failed");
                ToolResponse::failure(call.tool, &e)
            }
        }
    }

    /// Parse one JSON line into a tool call and dispatch it.
    pub async fn handle_line(&self, line: &str) -> ToolResponse {
        match serde_json::from_str::<ToolCall>(line) {
            Ok(call) => self.dispatch(call).await,
            Err(e) => {
                let error = AnalyticsError::invalid_input(format!("malformed tool call: {e}"));
                warn!(error = %error, "Rejected tool call");
                ToolResponse::failure(String::new(), &error)
            }
        }
    }

    async fn route(&self, tool: &str, arguments: Value) -> AnalyticsResult<Value> {
        match tool {
            CALCULATE_GREEKS => to_value(&self.greeks.execute(parse(arguments)?).await?),
            CALCULATE_MAX_PAIN => to_value(&self.max_pain.execute(parse(arguments)?).await?),
            CALCULATE_HISTORICAL_VOLATILITY => to_value(
                &self
                    .historical_volatility
                    .execute(parse(arguments)?)
                    .await?,
            ),
            ANALYZE_STRATEGY => to_value(&self.strategy.execute(parse(arguments)?).await?),
            CALCULATE_IMPLIED_VOLATILITY => {
                to_value(&self.implied_volatility.execute(&parse(arguments)?)?)
            }
            other => Err(AnalyticsError::invalid_input(format!(
                "unknown tool '{other}', expected one of: {}",
                TOOLS.join(", ")
            ))),
        }
    }
}

fn parse<T: DeserializeOwned>(arguments: Value) -> AnalyticsResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| AnalyticsError::invalid_input(format!("invalid arguments: {e}")))
}

fn to_value<T: Serialize>(result: &T) -> AnalyticsResult<Value> {
    serde_json::to_value(result)
        .map_err(|e| AnalyticsError::invalid_input(format!("unserializable result: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ChainSnapshot, ContractQuote};
    use crate::infrastructure::InMemoryMarketData;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    type Router = ToolRouter<InMemoryMarketData, InMemoryMarketData, InMemoryMarketData>;

    fn router() -> Router {
        let valuation_date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let data = Arc::new(InMemoryMarketData::new().with_as_of(valuation_date));
        data.set_price("SPY", dec!(101));
        data.add_chain(ChainSnapshot {
            symbol: "SPY".to_string(),
            expiration_date: NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
            underlying_price: None,
            calls: vec![
                ContractQuote::with_open_interest(dec!(95), 100),
                ContractQuote::with_open_interest(dec!(100), 200),
                ContractQuote::with_open_interest(dec!(105), 50),
            ],
            puts: vec![
                ContractQuote::with_open_interest(dec!(95), 50),
                ContractQuote::with_open_interest(dec!(100), 200),
                ContractQuote::with_open_interest(dec!(105), 100),
            ],
        });

        let settings = AnalyticsSettings::default().with_valuation_date(valuation_date);
        ToolRouter::new(Arc::clone(&data), Arc::clone(&data), data, &settings)
    }

    #[tokio::test]
    async fn max_pain_tool() {
        let response = router()
            .dispatch(ToolCall {
                tool: CALCULATE_MAX_PAIN.to_string(),
                arguments: json!({"symbol": "SPY"}),
            })
            .await;

        assert!(response.ok, "{:?}", response.error);
        let result = response.result.unwrap();
        assert_eq!(result["maxPainPrice"], 100.0);
        assert_eq!(result["currentPrice"], 101.0);
        assert_eq!(result["expirationDate"], "2026-01-16");
    }

    #[tokio::test]
    async fn implied_volatility_tool() {
        let response = router()
            .dispatch(ToolCall {
                tool: CALCULATE_IMPLIED_VOLATILITY.to_string(),
                arguments: json!({
                    "optionPrice": 10.4506,
                    "underlyingPrice": 100.0,
                    "strike": 100.0,
                    "timeToExpiry": 1.0,
                    "optionType": "call",
                    "riskFreeRate": 0.05
                }),
            })
            .await;

        assert!(response.ok, "{:?}", response.error);
        assert_eq!(response.result.unwrap()["impliedVolatility"], 0.2);
    }

    #[tokio::test]
    async fn unknown_tool() {
        let response = router()
            .dispatch(ToolCall {
                tool: "get_news".to_string(),
                arguments: Value::Null,
            })
            .await;

        assert!(!response.ok);
        assert!(response.result.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert!(error.message.contains("get_news"));
    }

    #[tokio::test]
    async fn invalid_arguments() {
        let response = router()
            .dispatch(ToolCall {
                tool: CALCULATE_GREEKS.to_string(),
                arguments: json!({"symbol": "SPY", "strike": "not a number"}),
            })
            .await;

        assert_eq!(response.error.unwrap().code, ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn engine_errors_keep_their_code() {
        let response = router()
            .dispatch(ToolCall {
                tool: ANALYZE_STRATEGY.to_string(),
                arguments: json!({
                    "symbol": "SPY",
                    "legs": [],
                    "expirationDate": "2026-01-16"
                }),
            })
            .await;

        assert_eq!(response.error.unwrap().code, ErrorCode::EmptyStrategy);
    }

    #[tokio::test]
    async fn malformed_line() {
        let response = router().handle_line("{not json").await;
        assert!(!response.ok);
        assert_eq!(response.tool, "");
        assert_eq!(response.error.unwrap().code, ErrorCode::InvalidInput);
    }

    #[test]
    fn response_serialization_skips_absent_fields() {
        let response = ToolResponse::failure(
            ANALYZE_STRATEGY.to_string(),
            &AnalyticsError::EmptyStrategy,
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["code"], "EMPTY_STRATEGY");
        assert!(value.get("result").is_none());
    }

    #[test]
    fn lists_every_tool() {
        assert_eq!(router().tools().len(), 5);
        assert!(router().tools().contains(&ANALYZE_STRATEGY));
    }
}
