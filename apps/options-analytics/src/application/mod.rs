//! Application layer: ports, use cases and DTOs.

pub mod dto;
pub mod ports;
pub mod settings;
pub mod use_cases;

pub use settings::AnalyticsSettings;
