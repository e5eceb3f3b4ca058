//! Tracing Setup
//!
//! Initializes the `tracing` subscriber for the analytics engine.
//!
//! # Configuration
//!
//! - `RUST_LOG`: standard env filter, overrides `observability.logging.level`
//! - `observability.logging.format`: `json` (default) or `pretty`
//!
//! Logs always go to stderr; stdout carries tool responses.
//!
//! # Usage
//!
//! ```rust,ignore
//! use options_analytics::config::LoggingConfig;
//! use options_analytics::telemetry::init_telemetry;
//!
//! init_telemetry(&LoggingConfig::default());
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init_telemetry(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let result = if config.format == "pretty" {
        builder.pretty().with_ansi(false).try_init()
    } else {
        builder.json().with_target(true).try_init()
    };

    if result.is_ok() {
        tracing::info!(
            level = %config.level,
            format = %config.format,
            "Tracing initialized"
        );
    }
}
