//! Volatility model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl VolatilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityLevel::Low => "low",
            VolatilityLevel::Medium => "medium",
            VolatilityLevel::High => "high",
            VolatilityLevel::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl VolatilityTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityTrend::Increasing => "increasing",
            VolatilityTrend::Decreasing => "decreasing",
            VolatilityTrend::Stable => "stable",
        }
    }
}

/// Output of the volatility analyzer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityProfile {
    pub level: VolatilityLevel,
    /// Coefficient of variation
    pub score: f64,
    pub trend: VolatilityTrend,
}

impl VolatilityProfile {
    pub fn unknown() -> Self {
        Self {
            level: VolatilityLevel::Unknown,
            score: 0.0,
            trend: VolatilityTrend::Stable,
        }
    }
}
