//! Options Analytics Binary
//!
//! Serves analytics tool calls over stdio: one JSON tool call per stdin
//! line, one JSON response per stdout line. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! echo '{"tool":"calculate_max_pain","arguments":{"symbol":"SPY"}}' \
//!     | cargo run --bin options-analytics
//! ```
//!
//! # Environment Variables
//!
//! - `OPTIONS_ANALYTICS_CONFIG`: config file path (default: options-analytics.yaml)
//! - `RUST_LOG`: log filter (overrides the configured level)

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use options_analytics::application::AnalyticsSettings;
use options_analytics::config::{Config, DEFAULT_CONFIG_PATH, load_config};
use options_analytics::infrastructure::InMemoryMarketData;
use options_analytics::telemetry::init_telemetry;
use options_analytics::tools::ToolRouter;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "OPTIONS_ANALYTICS_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = read_config()?;
    init_telemetry(&config.observability.logging);

    let market_data = Arc::new(create_market_data(&config)?);
    let settings = AnalyticsSettings::from(&config);
    let router = ToolRouter::new(
        Arc::clone(&market_data),
        Arc::clone(&market_data),
        market_data,
        &settings,
    );

    tracing::info!(tools = ?router.tools(), "Options analytics ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled = 0_u64;

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let response = router.handle_line(&line).await;
        let mut encoded = serde_json::to_vec(&response).context("failed to encode response")?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
        handled += 1;
    }

    tracing::info!(handled, "Input closed, shutting down");
    Ok(())
}

/// Load the config named by the environment, else the default file if
/// present, else built-in defaults.
fn read_config() -> anyhow::Result<Config> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return load_config(Some(&path)).with_context(|| format!("loading config from {path}"));
    }
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        return load_config(None).context("loading default config");
    }
    Ok(Config::default())
}

fn create_market_data(config: &Config) -> anyhow::Result<InMemoryMarketData> {
    let market_data = match &config.market_data.snapshot_path {
        Some(path) => InMemoryMarketData::from_snapshot_file(path)?,
        None => {
            tracing::warn!("No market data snapshot configured, market data tools will fail");
            InMemoryMarketData::new()
        }
    };

    Ok(match config.valuation_date {
        Some(date) => market_data.with_as_of(date),
        None => market_data,
    })
}
