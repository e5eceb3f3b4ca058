//! Market data source configuration.

use serde::{Deserialize, Serialize};

/// Market data configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketDataConfig {
    /// JSON snapshot served by the in-memory provider.
    #[serde(default)]
    pub snapshot_path: Option<String>,
}
