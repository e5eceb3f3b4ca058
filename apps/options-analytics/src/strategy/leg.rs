//! Strategy legs and strategy labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::options::OptionType;

/// Whether a leg is bought or sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegAction {
    /// Long position (bought).
    #[serde(alias = "long", alias = "BUY")]
    Buy,
    /// Short position (sold/written).
    #[serde(alias = "short", alias = "SELL")]
    Sell,
}

impl LegAction {
    /// Position sign: `+1` for buy, `-1` for sell.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for LegAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_quantity() -> i32 {
    1
}

/// A single leg of an options strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionLeg {
    /// Strike price.
    pub strike: f64,
    /// Call or put.
    #[serde(rename = "type", alias = "optionType")]
    pub option_type: OptionType,
    /// Buy or sell.
    pub action: LegAction,
    /// Number of contracts. Must be positive; see [`OptionLeg::validate`].
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    /// Per-share premium; resolved from the market or the model when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<f64>,
}

impl OptionLeg {
    /// Create a one-contract leg without a premium.
    #[must_use]
    pub const fn new(strike: f64, option_type: OptionType, action: LegAction) -> Self {
        Self {
            strike,
            option_type,
            action,
            quantity: 1,
            premium: None,
        }
    }

    /// Bought leg.
    #[must_use]
    pub const fn buy(strike: f64, option_type: OptionType) -> Self {
        Self::new(strike, option_type, LegAction::Buy)
    }

    /// Sold leg.
    #[must_use]
    pub const fn sell(strike: f64, option_type: OptionType) -> Self {
        Self::new(strike, option_type, LegAction::Sell)
    }

    /// Set the number of contracts.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: i32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set an explicit premium.
    #[must_use]
    pub const fn with_premium(mut self, premium: f64) -> Self {
        self.premium = Some(premium);
        self
    }

    /// Signed contract count (`+qty` buy, `-qty` sell).
    #[must_use]
    pub fn signed_quantity(&self) -> f64 {
        self.action.sign() * f64::from(self.quantity)
    }

    /// Validate the leg at position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidLeg`] for a non-positive strike or
    /// quantity, or a negative or non-finite explicit premium.
    pub fn validate(&self, index: usize) -> AnalyticsResult<()> {
        if !self.strike.is_finite() || self.strike <= 0.0 {
            return Err(AnalyticsError::invalid_leg(
                index,
                format!("strike must be positive, got {}", self.strike),
            ));
        }
        if self.quantity <= 0 {
            return Err(AnalyticsError::invalid_leg(
                index,
                format!("quantity must be positive, got {}", self.quantity),
            ));
        }
        if let Some(premium) = self.premium
            && (!premium.is_finite() || premium < 0.0)
        {
            return Err(AnalyticsError::invalid_leg(
                index,
                format!("premium must be non-negative, got {premium}"),
            ));
        }
        Ok(())
    }
}

/// Descriptive strategy label.
///
/// The label never changes how a strategy is analyzed; unknown labels are
/// kept verbatim as [`StrategyType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StrategyType {
    /// Long lower call, short higher call.
    BullCallSpread,
    /// Short lower call, long higher call.
    BearCallSpread,
    /// Short higher put, long lower put.
    BullPutSpread,
    /// Long higher put, short lower put.
    BearPutSpread,
    /// Long call and put at one strike.
    Straddle,
    /// Long OTM call and OTM put.
    Strangle,
    /// Bear call spread plus bull put spread.
    IronCondor,
    /// Short straddle with long wings.
    IronButterfly,
    /// Long 1-2-1 call butterfly.
    CallButterfly,
    /// Long 1-2-1 put butterfly.
    PutButterfly,
    /// Any other combination of legs.
    Custom(String),
}

impl StrategyType {
    /// Snake-case label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BullCallSpread => "bull_call_spread",
            Self::BearCallSpread => "bear_call_spread",
            Self::BullPutSpread => "bull_put_spread",
            Self::BearPutSpread => "bear_put_spread",
            Self::Straddle => "straddle",
            Self::Strangle => "strangle",
            Self::IronCondor => "iron_condor",
            Self::IronButterfly => "iron_butterfly",
            Self::CallButterfly => "call_butterfly",
            Self::PutButterfly => "put_butterfly",
            Self::Custom(label) => label,
        }
    }
}

impl Default for StrategyType {
    fn default() -> Self {
        Self::Custom("custom".to_string())
    }
}

impl From<String> for StrategyType {
    fn from(label: String) -> Self {
        let normalized = label.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "bull_call_spread" => Self::BullCallSpread,
            "bear_call_spread" => Self::BearCallSpread,
            "bull_put_spread" => Self::BullPutSpread,
            "bear_put_spread" => Self::BearPutSpread,
            "straddle" | "long_straddle" => Self::Straddle,
            "strangle" | "long_strangle" => Self::Strangle,
            "iron_condor" => Self::IronCondor,
            "iron_butterfly" | "iron_fly" => Self::IronButterfly,
            "call_butterfly" | "butterfly" => Self::CallButterfly,
            "put_butterfly" => Self::PutButterfly,
            _ => Self::Custom(label),
        }
    }
}

impl From<StrategyType> for String {
    fn from(strategy_type: StrategyType) -> Self {
        strategy_type.as_str().to_string()
    }
}

impl FromStr for StrategyType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
