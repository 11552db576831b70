//! Detected level shifts

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftDirection {
    Increase,
    Decrease,
}

impl ShiftDirection {
    pub fn from_magnitude(magnitude: f64) -> Self {
        if magnitude >= 0.0 {
            ShiftDirection::Increase
        } else {
            ShiftDirection::Decrease
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftDirection::Increase => "increase",
            ShiftDirection::Decrease => "decrease",
        }
    }
}

/// A detected shift in the level of the series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    pub timestamp: NaiveDateTime,
    /// Detection confidence in [0, 100]
    pub confidence: f64,
    /// Signed shift relative to the level before the change (0.25 = +25%)
    pub magnitude: f64,
    pub direction: ShiftDirection,
    /// Detector name, or several joined with `+` after merging
    pub method: String,
}

impl ChangePoint {
    pub fn new(timestamp: NaiveDateTime, confidence: f64, magnitude: f64, method: &str) -> Self {
        Self {
            timestamp,
            confidence: confidence.clamp(0.0, 100.0),
            magnitude,
            direction: ShiftDirection::from_magnitude(magnitude),
            method: method.to_string(),
        }
    }

    /// Detector names that contributed to this point
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.method.split('+')
    }
}
