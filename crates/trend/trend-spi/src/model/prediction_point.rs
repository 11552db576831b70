//! Forecast points

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionQuality {
    High,
    Medium,
    Low,
}

impl PredictionQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionQuality::High => "high",
            PredictionQuality::Medium => "medium",
            PredictionQuality::Low => "low",
        }
    }
}

/// One step of a model's native forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastInterval {
    pub value: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A forecast value with its 95% interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub timestamp: NaiveDateTime,
    pub predicted_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub quality: PredictionQuality,
    /// Half interval width relative to the prediction, in [0, 1]
    pub uncertainty_score: f64,
}

impl PredictionPoint {
    /// Build a point, ordering the bounds around the prediction
    pub fn new(
        timestamp: NaiveDateTime,
        predicted_value: f64,
        lower: f64,
        upper: f64,
        quality: PredictionQuality,
    ) -> Self {
        let lower_bound = lower.min(upper).min(predicted_value);
        let upper_bound = upper.max(lower).max(predicted_value);
        let width = upper_bound - lower_bound;
        let uncertainty_score = if predicted_value.abs() > f64::EPSILON {
            (width / (2.0 * predicted_value.abs())).clamp(0.0, 1.0)
        } else if width > 0.0 {
            1.0
        } else {
            0.0
        };
        Self {
            timestamp,
            predicted_value,
            lower_bound,
            upper_bound,
            quality,
            uncertainty_score,
        }
    }

    pub fn interval_width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}
