//! Decomposition result model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which decomposer produced a [`TrendDecomposition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionMethod {
    /// LOESS seasonal-trend decomposition
    Primary,
    /// Moving-average trend with day-of-week seasonal means
    Fallback,
}

impl DecompositionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecompositionMethod::Primary => "primary",
            DecompositionMethod::Fallback => "fallback",
        }
    }
}

/// Additive decomposition: observed = trend + seasonal + residual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDecomposition {
    pub timestamps: Vec<NaiveDateTime>,
    pub observed: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    pub method: DecompositionMethod,
}

impl TrendDecomposition {
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Observed values with the trend removed
    pub fn detrended(&self) -> Vec<f64> {
        self.observed
            .iter()
            .zip(&self.trend)
            .map(|(o, t)| o - t)
            .collect()
    }
}
