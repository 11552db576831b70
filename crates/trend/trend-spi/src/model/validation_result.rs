//! Outcome of a single statistical trend test

use serde::{Deserialize, Serialize};

/// Sign of a detected monotonic trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendSign {
    Increasing,
    Decreasing,
}

impl TrendSign {
    /// Sign of `value`; `None` for zero
    pub fn of(value: f64) -> Option<Self> {
        if value > 0.0 {
            Some(TrendSign::Increasing)
        } else if value < 0.0 {
            Some(TrendSign::Decreasing)
        } else {
            None
        }
    }
}

/// Result of one validator run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub test_name: String,
    /// Test statistic (S for Mann-Kendall, slope for Sen/OLS, tau for ADF)
    pub statistic: f64,
    pub p_value: f64,
    pub trend_detected: bool,
    pub direction: Option<TrendSign>,
    pub confidence_interval: Option<(f64, f64)>,
    pub description: Option<String>,
}

impl ValidationResult {
    /// Neutral result for a test that could not run
    pub fn not_applicable(test_name: &str, reason: impl Into<String>) -> Self {
        Self {
            test_name: test_name.to_string(),
            statistic: 0.0,
            p_value: 1.0,
            trend_detected: false,
            direction: None,
            confidence_interval: None,
            description: Some(reason.into()),
        }
    }

    /// Neutral result for a series below the test's minimum length
    pub fn insufficient(test_name: &str, required: usize, actual: usize) -> Self {
        Self::not_applicable(
            test_name,
            format!("insufficient data: need {required} points, got {actual}"),
        )
    }
}
