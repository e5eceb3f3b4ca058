//! End-to-end tests: JSON tool calls through the router against an
//! in-memory market snapshot.

use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;
use options_analytics::application::AnalyticsSettings;
use options_analytics::config::load_config_from_string;
use options_analytics::infrastructure::InMemoryMarketData;
use options_analytics::tools::ToolRouter;
use serde_json::{Value, json};

type Router = ToolRouter<InMemoryMarketData, InMemoryMarketData, InMemoryMarketData>;

fn snapshot() -> Value {
    let closes: Vec<String> = (0..120)
        .map(|i| if i % 2 == 0 { "100.00" } else { "102.00" }.to_string())
        .collect();
    json!({
        "symbols": {
            "AAPL": {
                "price": "100.00",
                "closes": closes,
                "chains": [{
                    "symbol": "AAPL",
                    "expirationDate": "2026-02-20",
                    "underlyingPrice": "100.00",
                    "calls": [
                        {"strike": "95", "bid": "6.10", "ask": "6.30", "openInterest": 400, "impliedVolatility": 0.24},
                        {"strike": "100", "bid": "2.90", "ask": "3.10", "openInterest": 900, "impliedVolatility": 0.22},
                        {"strike": "105", "bid": "1.10", "ask": "1.30", "openInterest": 600, "impliedVolatility": 0.21}
                    ],
                    "puts": [
                        {"strike": "95", "bid": "1.00", "ask": "1.20", "openInterest": 700, "impliedVolatility": 0.26},
                        {"strike": "100", "bid": "2.40", "ask": "2.60", "openInterest": 800, "impliedVolatility": 0.23},
                        {"strike": "105", "bid": "5.80", "ask": "6.00", "openInterest": 200, "impliedVolatility": 0.22}
                    ]
                }]
            }
        }
    })
}

fn router() -> Router {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", snapshot()).unwrap();

    let yaml = format!(
        "valuation_date: '2026-01-02'\nmarket_data:\n  snapshot_path: '{}'\n",
        file.path().display()
    );
    let config = load_config_from_string(&yaml).unwrap();
    let valuation_date = config.valuation_date.unwrap();
    assert_eq!(valuation_date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());

    let snapshot_path = config.market_data.snapshot_path.as_deref().unwrap();
    let data = Arc::new(
        InMemoryMarketData::from_snapshot_file(snapshot_path)
            .unwrap()
            .with_as_of(valuation_date),
    );
    ToolRouter::new(
        Arc::clone(&data),
        Arc::clone(&data),
        data,
        &AnalyticsSettings::from(&config),
    )
}

async fn call(router: &Router, line: Value) -> Value {
    let response = router.handle_line(&line.to_string()).await;
    serde_json::to_value(response).unwrap()
}

#[tokio::test]
async fn test_calculate_greeks_uses_quoted_iv() {
    let router = router();
    let response = call(
        &router,
        json!({
            "tool": "calculate_greeks",
            "arguments": {
                "symbol": "AAPL",
                "strike": 100,
                "expirationDate": "2026-02-20",
                "optionType": "call"
            }
        }),
    )
    .await;

    assert_eq!(response["ok"], true, "{response}");
    let result = &response["result"];
    assert_eq!(result["impliedVolatility"], 0.22);
    assert_eq!(result["volatilitySource"], "implied");
    assert_eq!(result["underlyingPrice"], 100.0);
    let delta = result["delta"].as_f64().unwrap();
    assert!(delta > 0.5 && delta < 0.6, "delta {delta}");
    assert!(result["theta"].as_f64().unwrap() < 0.0);
}

#[tokio::test]
async fn test_calculate_max_pain_nearest_expiration() {
    let router = router();
    let response = call(
        &router,
        json!({"tool": "calculate_max_pain", "arguments": {"symbol": "aapl"}}),
    )
    .await;

    assert_eq!(response["ok"], true, "{response}");
    let result = &response["result"];
    assert_eq!(result["expirationDate"], "2026-02-20");
    assert_eq!(result["totalOpenInterest"], 3600);
    assert_eq!(result["callOpenInterest"], 1900);
    assert_eq!(result["putOpenInterest"], 1700);
    assert_eq!(result["maxPainPrice"], 100.0);
}

#[tokio::test]
async fn test_historical_volatility_periods() {
    let router = router();
    let response = call(
        &router,
        json!({
            "tool": "calculate_historical_volatility",
            "arguments": {"symbol": "AAPL", "periods": [20, 60]}
        }),
    )
    .await;

    assert_eq!(response["ok"], true, "{response}");
    let periods = response["result"]["periods"].as_array().unwrap();
    assert_eq!(periods.len(), 2);
    assert_eq!(periods[0]["days"], 20);
    assert!(periods[0]["annualized"].as_f64().unwrap() > 0.0);
    assert_eq!(response["result"]["currentPrice"], 102.0);
}

#[tokio::test]
async fn test_analyze_preset_iron_butterfly() {
    let router = router();
    let response = call(
        &router,
        json!({
            "tool": "analyze_strategy",
            "arguments": {
                "symbol": "AAPL",
                "strategyType": "iron_butterfly",
                "strikes": [95, 100, 105],
                "expirationDate": "2026-02-20"
            }
        }),
    )
    .await;

    assert_eq!(response["ok"], true, "{response}");
    let result = &response["result"];
    // Credit: 3.00 + 2.50 - 1.10 - 1.20 = 3.20 per share
    assert_eq!(result["netPremium"], 320.0);
    assert_eq!(result["netDebit"], -320.0);
    assert_eq!(result["maxProfit"], 320.0);
    assert_eq!(result["maxLoss"], 180.0);
    assert_eq!(result["breakevens"], json!([97.0, 103.0]));
    assert_eq!(result["legs"].as_array().unwrap().len(), 4);
    assert_eq!(result["legs"][0]["premiumSource"], "market_mid");
    assert_eq!(result["pnlCurve"].as_array().unwrap().len(), 101);
}

#[tokio::test]
async fn test_errors_are_reported_with_codes() {
    let router = router();

    let unknown_symbol = call(
        &router,
        json!({"tool": "calculate_max_pain", "arguments": {"symbol": "MSFT"}}),
    )
    .await;
    assert_eq!(unknown_symbol["ok"], false);
    assert_eq!(unknown_symbol["error"]["code"], "DATA_UNAVAILABLE");

    let expired = call(
        &router,
        json!({
            "tool": "calculate_greeks",
            "arguments": {
                "symbol": "AAPL",
                "strike": 100,
                "expirationDate": "2025-12-19",
                "optionType": "put"
            }
        }),
    )
    .await;
    assert_eq!(expired["error"]["code"], "OPTION_EXPIRED");

    let bad_leg = call(
        &router,
        json!({
            "tool": "analyze_strategy",
            "arguments": {
                "symbol": "AAPL",
                "legs": [{"strike": 100, "type": "call", "action": "buy", "quantity": 0}],
                "expirationDate": "2026-02-20"
            }
        }),
    )
    .await;
    assert_eq!(bad_leg["error"]["code"], "INVALID_LEG");

    let negative_quantity = call(
        &router,
        json!({
            "tool": "analyze_strategy",
            "arguments": {
                "symbol": "AAPL",
                "legs": [{"strike": 100, "type": "call", "action": "sell", "quantity": -1}],
                "expirationDate": "2026-02-20"
            }
        }),
    )
    .await;
    assert_eq!(negative_quantity["error"]["code"], "INVALID_LEG");

    let empty_for_unknown_symbol = call(
        &router,
        json!({
            "tool": "analyze_strategy",
            "arguments": {"symbol": "NOPE", "legs": [], "expirationDate": "2026-02-20"}
        }),
    )
    .await;
    assert_eq!(empty_for_unknown_symbol["error"]["code"], "EMPTY_STRATEGY");
}
