//! Strategy analysis configuration.

use serde::{Deserialize, Serialize};

/// What to do when pricing a single leg fails inside a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegFailurePolicy {
    /// Treat the leg as zero Greeks with its configured (or zero) premium
    /// and record a warning.
    #[default]
    Lenient,
    /// Fail the whole strategy.
    Strict,
}

/// How break-even prices are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakevenMethod {
    /// Fixed-step scan with an absolute P&L tolerance.
    #[default]
    GridScan,
    /// Exact roots of each linear payoff segment.
    Exact,
}

/// Strategy analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Shares per contract.
    #[serde(default = "default_multiplier")]
    pub contract_multiplier: u32,
    /// Per-leg failure policy.
    #[serde(default)]
    pub leg_failure_policy: LegFailurePolicy,
    /// Break-even search method.
    #[serde(default)]
    pub breakeven_method: BreakevenMethod,
    /// Grid step of the break-even scan (dollars).
    #[serde(default = "default_breakeven_step")]
    pub breakeven_step: f64,
    /// Absolute P&L below which a grid price counts as a break-even.
    #[serde(default = "default_breakeven_tolerance")]
    pub breakeven_tolerance: f64,
    /// Minimum distance between two reported break-evens.
    #[serde(default = "default_dedup_window")]
    pub breakeven_dedup_window: f64,
    /// Distance scanned beyond the lowest and highest strike.
    #[serde(default = "default_breakeven_margin")]
    pub breakeven_margin: f64,
    /// Samples in the P&L curve.
    #[serde(default = "default_curve_points")]
    pub curve_points: usize,
    /// Leg count at which legs are resolved in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_leg_threshold: usize,
    /// Widest allowed gap between adjacent preset strikes (dollars).
    #[serde(default)]
    pub preset_max_width: Option<f64>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            contract_multiplier: default_multiplier(),
            leg_failure_policy: LegFailurePolicy::default(),
            breakeven_method: BreakevenMethod::default(),
            breakeven_step: default_breakeven_step(),
            breakeven_tolerance: default_breakeven_tolerance(),
            breakeven_dedup_window: default_dedup_window(),
            breakeven_margin: default_breakeven_margin(),
            curve_points: default_curve_points(),
            parallel_leg_threshold: default_parallel_threshold(),
            preset_max_width: None,
        }
    }
}

const fn default_multiplier() -> u32 {
    100
}

const fn default_breakeven_step() -> f64 {
    0.5
}

const fn default_breakeven_tolerance() -> f64 {
    25.0
}

const fn default_dedup_window() -> f64 {
    1.0
}

const fn default_breakeven_margin() -> f64 {
    50.0
}

const fn default_curve_points() -> usize {
    101
}

const fn default_parallel_threshold() -> usize {
    8
}
