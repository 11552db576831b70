//! Public analysis result

use crate::model::{
    ChangePoint, EnsembleResult, PredictionPoint, SeasonalComponent, TrendClass,
    TrendDecomposition, TrendDirection, ValidationResult, VolatilityLevel, VolatilityTrend,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Coarse confidence in the volume of data behind a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceQuality {
    Strong,
    Moderate,
    Weak,
}

impl EvidenceQuality {
    /// Classify by number of cleaned observations
    pub fn from_count(count: usize) -> Self {
        match count {
            n if n >= 30 => EvidenceQuality::Strong,
            n if n >= 14 => EvidenceQuality::Moderate,
            _ => EvidenceQuality::Weak,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceQuality::Strong => "strong",
            EvidenceQuality::Moderate => "moderate",
            EvidenceQuality::Weak => "weak",
        }
    }
}

/// Complete verdict for one metric's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub metric_name: String,
    pub trend_direction: TrendDirection,
    /// Full ensemble classification before collapsing to a direction
    pub trend_classification: TrendClass,
    /// |Kendall tau| of the cleaned series, in [0, 1]
    pub trend_strength: f64,
    /// In [0, 100]
    pub confidence: f64,
    /// Mann-Kendall p-value
    pub statistical_significance: f64,
    pub has_seasonality: bool,
    pub seasonal_strength: f64,
    pub volatility_level: VolatilityLevel,
    pub volatility_score: f64,
    pub volatility_trend: VolatilityTrend,
    pub predictions: Vec<PredictionPoint>,
    pub change_points: Vec<ChangePoint>,
    pub summary: String,
    pub evidence_quality: EvidenceQuality,
    pub interpretation: String,
    pub seasonal_components: Vec<SeasonalComponent>,
    pub methods_used: Vec<String>,
    pub ensemble_agreement: f64,
    pub data_quality_score: f64,
    pub recommendations: Vec<String>,
    pub forecast_horizon: usize,
    pub structural_breaks: Vec<NaiveDateTime>,
    pub validation_results: Vec<ValidationResult>,
    pub ensemble: EnsembleResult,
    pub decomposition: Option<TrendDecomposition>,
}
