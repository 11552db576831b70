//! Ensemble voting result

use crate::model::TrendClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Independent trend classifiers that take part in the vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleMethod {
    ProbabilisticModel,
    Decomposition,
    Statistical,
    QuartileComparison,
}

impl EnsembleMethod {
    /// Fixed order used for tie-breaking
    pub const ALL: [EnsembleMethod; 4] = [
        EnsembleMethod::ProbabilisticModel,
        EnsembleMethod::Decomposition,
        EnsembleMethod::Statistical,
        EnsembleMethod::QuartileComparison,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnsembleMethod::ProbabilisticModel => "probabilistic_model",
            EnsembleMethod::Decomposition => "decomposition",
            EnsembleMethod::Statistical => "statistical",
            EnsembleMethod::QuartileComparison => "quartile_comparison",
        }
    }
}

/// Consensus classification across methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResult {
    pub primary: TrendClass,
    /// Share of the vote won by `primary`, in [0, 100]
    pub confidence: f64,
    pub method_classifications: BTreeMap<EnsembleMethod, TrendClass>,
    /// Renormalised weights of the voting methods; sums to 1 or is empty
    pub weights: BTreeMap<EnsembleMethod, f64>,
    /// Fraction of voters agreeing with `primary`, in [0, 1]
    pub agreement_score: f64,
}

impl EnsembleResult {
    /// Result when no method could vote
    pub fn insufficient() -> Self {
        Self {
            primary: TrendClass::InsufficientData,
            confidence: 0.0,
            method_classifications: BTreeMap::new(),
            weights: BTreeMap::new(),
            agreement_score: 0.0,
        }
    }

    pub fn voter_count(&self) -> usize {
        self.weights.len()
    }
}
