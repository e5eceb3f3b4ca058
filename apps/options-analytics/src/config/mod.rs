//! Configuration module for the options analytics engine.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before any component is constructed.
//!
//! # Usage
//!
//! ```rust,ignore
//! use options_analytics::config::{Config, load_config};
//!
//! // Load from default path (options-analytics.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("risk-free rate: {}", config.pricing.risk_free_rate);
//! ```

mod market_data;
mod observability;
mod pricing;
mod strategy;
mod volatility;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use market_data::MarketDataConfig;
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use pricing::PricingConfig;
pub use strategy::{BreakevenMethod, LegFailurePolicy, StrategyConfig};
pub use volatility::VolatilityConfig;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "options-analytics.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Pricing model configuration.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Volatility estimation configuration.
    #[serde(default)]
    pub volatility: VolatilityConfig,
    /// Strategy analysis configuration.
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Market data configuration.
    #[serde(default)]
    pub market_data: MarketDataConfig,
    /// Pin "today" for time-to-expiry (defaults to the current UTC date).
    #[serde(default)]
    pub valuation_date: Option<NaiveDate>,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to [`DEFAULT_CONFIG_PATH`].
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let var_name = &cap[1];
        let default_value = cap.get(2).map(|m| m.as_str());

        match std::env::var(var_name) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let pricing = &config.pricing;
    if !(-0.1..=1.0).contains(&pricing.risk_free_rate) {
        return Err(ConfigError::ValidationError(
            "pricing.risk_free_rate must be between -0.1 and 1.0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&pricing.default_dividend_yield) {
        return Err(ConfigError::ValidationError(
            "pricing.default_dividend_yield must be between 0.0 and 1.0".to_string(),
        ));
    }
    if pricing.days_per_year <= 0.0 {
        return Err(ConfigError::ValidationError(
            "pricing.days_per_year must be positive".to_string(),
        ));
    }

    let volatility = &config.volatility;
    if volatility.default_periods.is_empty() || volatility.default_periods.contains(&0) {
        return Err(ConfigError::ValidationError(
            "volatility.default_periods must be non-empty and positive".to_string(),
        ));
    }
    if volatility.fallback_period_days < 2 {
        return Err(ConfigError::ValidationError(
            "volatility.fallback_period_days must be at least 2".to_string(),
        ));
    }
    if volatility.trading_days_per_year <= 0.0 {
        return Err(ConfigError::ValidationError(
            "volatility.trading_days_per_year must be positive".to_string(),
        ));
    }

    let strategy = &config.strategy;
    if strategy.contract_multiplier == 0 {
        return Err(ConfigError::ValidationError(
            "strategy.contract_multiplier must be positive".to_string(),
        ));
    }
    if strategy.breakeven_step <= 0.0 {
        return Err(ConfigError::ValidationError(
            "strategy.breakeven_step must be positive".to_string(),
        ));
    }
    if strategy.breakeven_tolerance < 0.0 || strategy.breakeven_dedup_window < 0.0 {
        return Err(ConfigError::ValidationError(
            "strategy break-even tolerance and window must be non-negative".to_string(),
        ));
    }
    if strategy.curve_points < 2 {
        return Err(ConfigError::ValidationError(
            "strategy.curve_points must be at least 2".to_string(),
        ));
    }
    if let Some(width) = strategy.preset_max_width
        && (!width.is_finite() || width <= 0.0)
    {
        return Err(ConfigError::ValidationError(
            "strategy.preset_max_width must be positive".to_string(),
        ));
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!((config.pricing.risk_free_rate - 0.045).abs() < f64::EPSILON);
        assert_eq!(config.pricing.default_dividend_yield, 0.0);
        assert_eq!(config.volatility.default_periods, vec![10, 20, 30, 60, 90]);
        assert_eq!(config.volatility.fallback_period_days, 30);
        assert_eq!(config.strategy.contract_multiplier, 100);
        assert_eq!(config.strategy.curve_points, 101);
        assert_eq!(config.strategy.leg_failure_policy, LegFailurePolicy::Lenient);
        assert_eq!(config.strategy.breakeven_method, BreakevenMethod::GridScan);
        assert!(config.valuation_date.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_empty_config_uses_defaults() {
        let config = match load_config_from_string("{}") {
            Ok(c) => c,
            Err(e) => panic!("should load empty config: {e}"),
        };
        assert!((config.pricing.risk_free_rate - 0.045).abs() < f64::EPSILON);
        assert_eq!(config.observability.logging.level, "info");
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "level: ${OPTIONS_ANALYTICS_TEST_NONEXISTENT_VAR:-debug}";
        assert_eq!(interpolate_env_vars(input), "level: debug");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        // PATH should always exist
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "snapshot_path: ${OPTIONS_ANALYTICS_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "snapshot_path: ");
    }

    #[test]
    fn test_validation_invalid_risk_free_rate() {
        let yaml = r"
pricing:
  risk_free_rate: 1.5
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for invalid risk_free_rate");
        };
        assert!(err.to_string().contains("risk_free_rate"));
    }

    #[test]
    fn test_validation_zero_period() {
        let yaml = r"
volatility:
  default_periods: [10, 0]
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero period");
        };
        assert!(err.to_string().contains("default_periods"));
    }

    #[test]
    fn test_validation_non_positive_preset_width() {
        let yaml = r"
strategy:
  preset_max_width: 0.0
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero preset width");
        };
        assert!(err.to_string().contains("preset_max_width"));
    }

    #[test]
    fn test_validation_invalid_log_format() {
        let yaml = r"
observability:
  logging:
    format: xml
";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for invalid format");
        };
        assert!(err.to_string().contains("format"));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
pricing:
  risk_free_rate: 0.04
  default_dividend_yield: 0.01

volatility:
  default_periods: [5, 21]
  fallback_period_days: 21
  solve_iv_from_mid: true

strategy:
  leg_failure_policy: strict
  breakeven_method: exact
  curve_points: 51
  preset_max_width: 10.0

observability:
  logging:
    level: "debug"
    format: "pretty"

market_data:
  snapshot_path: "fixtures/market.json"

valuation_date: "2026-10-19"
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        assert!((config.pricing.risk_free_rate - 0.04).abs() < f64::EPSILON);
        assert_eq!(config.volatility.default_periods, vec![5, 21]);
        assert!(config.volatility.solve_iv_from_mid);
        assert_eq!(config.strategy.leg_failure_policy, LegFailurePolicy::Strict);
        assert_eq!(config.strategy.breakeven_method, BreakevenMethod::Exact);
        assert_eq!(config.strategy.curve_points, 51);
        assert_eq!(config.strategy.preset_max_width, Some(10.0));
        assert_eq!(config.observability.logging.format, "pretty");
        assert_eq!(
            config.market_data.snapshot_path.as_deref(),
            Some("fixtures/market.json")
        );
        assert_eq!(config.valuation_date, NaiveDate::from_ymd_opt(2026, 10, 19));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pricing:\n  risk_free_rate: 0.03").unwrap();

        let path = file.path().to_str().unwrap();
        let config = load_config(Some(path)).unwrap();
        assert!((config.pricing.risk_free_rate - 0.03).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_config_missing_file() {
        let Err(err) = load_config(Some("/nonexistent/options-analytics.yaml")) else {
            panic!("expected read error");
        };
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_lookback_covers_period() {
        let config = VolatilityConfig::default();
        assert_eq!(config.lookback_for(90), 365);
        assert_eq!(config.lookback_for(500), 710);
    }
}
