//! Error handling for the options analytics engine.
//!
//! Every failure surfaced by the engine is an [`AnalyticsError`]. Each error
//! maps to a stable [`ErrorCode`] that tool responses carry alongside the
//! human-readable message.
//!
//! | Code | Raised when |
//! |------|-------------|
//! | `OPTION_EXPIRED` | Time to expiry is zero or negative |
//! | `INVALID_VOLATILITY` | Volatility is zero or negative in a pricing call |
//! | `INVALID_INPUT` | Non-finite or out-of-domain numeric input, bad tool arguments |
//! | `INVALID_LEG` | Strategy leg with non-positive strike/quantity or bad premium |
//! | `EMPTY_STRATEGY` | Strategy with no legs |
//! | `DATA_UNAVAILABLE` | A market data collaborator could not supply spot/chain/history |
//! | `NO_SOLUTION` | No implied volatility reproduces the observed price |
//! | `CONVERGENCE_FAILED` | The implied volatility solver ran out of iterations |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes for tool responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Option has expired.
    OptionExpired,
    /// Volatility is not positive.
    InvalidVolatility,
    /// Malformed numeric input or tool arguments.
    InvalidInput,
    /// Malformed strategy leg.
    InvalidLeg,
    /// Strategy without legs.
    EmptyStrategy,
    /// Market data could not be supplied.
    DataUnavailable,
    /// No implied volatility solution.
    NoSolution,
    /// Implied volatility solver did not converge.
    ConvergenceFailed,
}

impl ErrorCode {
    /// Get the error reason string.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::OptionExpired => "OPTION_EXPIRED",
            Self::InvalidVolatility => "INVALID_VOLATILITY",
            Self::InvalidInput => "INVALID_INPUT",
            Self::InvalidLeg => "INVALID_LEG",
            Self::EmptyStrategy => "EMPTY_STRATEGY",
            Self::DataUnavailable => "DATA_UNAVAILABLE",
            Self::NoSolution => "NO_SOLUTION",
            Self::ConvergenceFailed => "CONVERGENCE_FAILED",
        }
    }

    /// Whether the caller supplied the bad input (as opposed to missing data
    /// or a numerical failure).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::OptionExpired
                | Self::InvalidVolatility
                | Self::InvalidInput
                | Self::InvalidLeg
                | Self::EmptyStrategy
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Errors raised by the analytics engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// Time to expiry is zero or negative.
    #[error("Option has expired (time to expiry {time_to_expiry:.6} years)")]
    OptionExpired {
        /// Time to expiry in years.
        time_to_expiry: f64,
    },

    /// Volatility must be strictly positive to price an option.
    #[error("Invalid volatility: {volatility} (must be positive)")]
    InvalidVolatility {
        /// The offending volatility.
        volatility: f64,
    },

    /// Invalid numeric input or tool argument.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error message.
        message: String,
    },

    /// Invalid strategy leg.
    #[error("Invalid leg {index}: {message}")]
    InvalidLeg {
        /// Zero-based leg index.
        index: usize,
        /// Error message.
        message: String,
    },

    /// Strategy has no legs.
    #[error("Strategy must contain at least one leg")]
    EmptyStrategy,

    /// A market data collaborator could not supply the required data.
    #[error("Market data unavailable: {message}")]
    DataUnavailable {
        /// Error details.
        message: String,
    },

    /// No implied volatility reproduces the observed price.
    #[error("No valid IV solution: {reason}")]
    NoSolution {
        /// Reason no solution exists.
        reason: String,
    },

    /// Implied volatility solver failed to converge.
    #[error(
        "IV solver failed to converge after {iterations} iterations (last error: {last_error:.6})"
    )]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: u32,
        /// Last price error.
        last_error: f64,
    },
}

impl AnalyticsError {
    /// Build an [`AnalyticsError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Build an [`AnalyticsError::InvalidLeg`].
    pub fn invalid_leg(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidLeg {
            index,
            message: message.into(),
        }
    }

    /// Build an [`AnalyticsError::DataUnavailable`].
    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self::DataUnavailable {
            message: message.into(),
        }
    }

    /// The stable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::OptionExpired { .. } => ErrorCode::OptionExpired,
            Self::InvalidVolatility { .. } => ErrorCode::InvalidVolatility,
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::InvalidLeg { .. } => ErrorCode::InvalidLeg,
            Self::EmptyStrategy => ErrorCode::EmptyStrategy,
            Self::DataUnavailable { .. } => ErrorCode::DataUnavailable,
            Self::NoSolution { .. } => ErrorCode::NoSolution,
            Self::ConvergenceFailed { .. } => ErrorCode::ConvergenceFailed,
        }
    }
}

/// Result alias used throughout the engine.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AnalyticsError::OptionExpired {
                time_to_expiry: -0.01
            }
            .code(),
            ErrorCode::OptionExpired
        );
        assert_eq!(
            AnalyticsError::InvalidVolatility { volatility: 0.0 }.code(),
            ErrorCode::InvalidVolatility
        );
        assert_eq!(AnalyticsError::EmptyStrategy.code(), ErrorCode::EmptyStrategy);
        assert_eq!(
            AnalyticsError::invalid_leg(2, "quantity must be positive").code(),
            ErrorCode::InvalidLeg
        );
        assert_eq!(
            AnalyticsError::data_unavailable("no chain").code(),
            ErrorCode::DataUnavailable
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ErrorCode::InvalidLeg.is_client_error());
        assert!(ErrorCode::OptionExpired.is_client_error());
        assert!(!ErrorCode::DataUnavailable.is_client_error());
        assert!(!ErrorCode::ConvergenceFailed.is_client_error());
    }

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::invalid_leg(1, "strike must be positive, got: -5");
        assert_eq!(
            err.to_string(),
            "Invalid leg 1: strike must be positive, got: -5"
        );

        let err = AnalyticsError::InvalidVolatility { volatility: 0.0 };
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::DataUnavailable).unwrap();
        assert_eq!(json, "\"DATA_UNAVAILABLE\"");
        assert_eq!(ErrorCode::EmptyStrategy.to_string(), "EMPTY_STRATEGY");
    }
}
