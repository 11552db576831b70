//! Weighted ensemble voting over per-method classifications

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trend_spi::{EnsembleMethod, EnsembleResult, TrendClass};

/// Relative weight of each voter before renormalisation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleWeights {
    pub probabilistic_model: f64,
    pub decomposition: f64,
    pub statistical: f64,
    pub quartile_comparison: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            probabilistic_model: 0.5,
            decomposition: 0.3,
            statistical: 0.2,
            quartile_comparison: 0.2,
        }
    }
}

impl EnsembleWeights {
    pub fn weight(&self, method: EnsembleMethod) -> f64 {
        match method {
            EnsembleMethod::ProbabilisticModel => self.probabilistic_model,
            EnsembleMethod::Decomposition => self.decomposition,
            EnsembleMethod::Statistical => self.statistical,
            EnsembleMethod::QuartileComparison => self.quartile_comparison,
        }
    }
}

const TIE_TOLERANCE: f64 = 1e-12;

/// Combine votes into a consensus classification
///
/// Methods voting `InsufficientData` or carrying no weight are dropped
/// before the remaining weights are renormalised to sum to 1. Confidence
/// is the winning class's share of that weight.
pub fn aggregate(
    votes: &BTreeMap<EnsembleMethod, TrendClass>,
    weights: &EnsembleWeights,
) -> EnsembleResult {
    let voters: Vec<(EnsembleMethod, TrendClass, f64)> = EnsembleMethod::ALL
        .iter()
        .filter_map(|&method| {
            let class = *votes.get(&method)?;
            let weight = weights.weight(method);
            (class != TrendClass::InsufficientData && weight > 0.0 && weight.is_finite())
                .then_some((method, class, weight))
        })
        .collect();

    let total: f64 = voters.iter().map(|(_, _, w)| w).sum();
    if voters.is_empty() || total <= 0.0 {
        return EnsembleResult::insufficient();
    }

    let normalised: BTreeMap<EnsembleMethod, f64> = voters
        .iter()
        .map(|&(method, _, w)| (method, w / total))
        .collect();

    let mut tally: BTreeMap<TrendClass, f64> = BTreeMap::new();
    for &(method, class, _) in &voters {
        *tally.entry(class).or_insert(0.0) += normalised[&method];
    }

    let best = tally.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let leaders: Vec<TrendClass> = tally
        .iter()
        .filter(|(_, score)| **score >= best - TIE_TOLERANCE)
        .map(|(&class, _)| class)
        .collect();
    let primary = break_tie(&leaders, &voters);

    let agreeing = voters.iter().filter(|(_, c, _)| *c == primary).count();
    let agreement_score = if voters.len() == 1 {
        1.0
    } else {
        agreeing as f64 / voters.len() as f64
    };

    EnsembleResult {
        primary,
        confidence: (tally.get(&primary).copied().unwrap_or(0.0) * 100.0).clamp(0.0, 100.0),
        method_classifications: voters.iter().map(|&(m, c, _)| (m, c)).collect(),
        weights: normalised,
        agreement_score: agreement_score.clamp(0.0, 1.0),
    }
}

/// Resolve a weight tie: the class backed by more voters wins, and a tie
/// that survives the head count settles on `Stable`
fn break_tie(
    leaders: &[TrendClass],
    voters: &[(EnsembleMethod, TrendClass, f64)],
) -> TrendClass {
    if let [only] = leaders {
        return *only;
    }
    let backers = |class: TrendClass| voters.iter().filter(|(_, c, _)| *c == class).count();
    let most = leaders.iter().map(|&c| backers(c)).max().unwrap_or(0);
    let mut top = leaders.iter().copied().filter(|&c| backers(c) == most);
    match (top.next(), top.next()) {
        (Some(class), None) => class,
        _ => TrendClass::Stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(entries: &[(EnsembleMethod, TrendClass)]) -> BTreeMap<EnsembleMethod, TrendClass> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_unanimous_vote() {
        let result = aggregate(
            &votes(&[
                (EnsembleMethod::ProbabilisticModel, TrendClass::Increasing),
                (EnsembleMethod::Decomposition, TrendClass::Increasing),
                (EnsembleMethod::Statistical, TrendClass::Increasing),
            ]),
            &EnsembleWeights::default(),
        );
        assert_eq!(result.primary, TrendClass::Increasing);
        assert!((result.confidence - 100.0).abs() < 1e-9);
        assert_eq!(result.agreement_score, 1.0);
        let sum: f64 = result.weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_majority() {
        let result = aggregate(
            &votes(&[
                (EnsembleMethod::ProbabilisticModel, TrendClass::Stable),
                (EnsembleMethod::Decomposition, TrendClass::Increasing),
                (EnsembleMethod::Statistical, TrendClass::Decreasing),
            ]),
            &EnsembleWeights::default(),
        );
        assert_eq!(result.primary, TrendClass::Stable);
        assert!((result.confidence - 50.0).abs() < 1e-9);
        assert!((result.agreement_score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_goes_to_more_voters() {
        let result = aggregate(
            &votes(&[
                (EnsembleMethod::ProbabilisticModel, TrendClass::Stable),
                (EnsembleMethod::Decomposition, TrendClass::Increasing),
                (EnsembleMethod::Statistical, TrendClass::Increasing),
            ]),
            &EnsembleWeights::default(),
        );
        assert_eq!(result.primary, TrendClass::Increasing);
        assert!((result.confidence - 50.0).abs() < 1e-9);
        assert!((result.agreement_score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_lone_model_vote_does_not_override_agreeing_voters() {
        let result = aggregate(
            &votes(&[
                (EnsembleMethod::ProbabilisticModel, TrendClass::Increasing),
                (EnsembleMethod::Decomposition, TrendClass::Stable),
                (EnsembleMethod::Statistical, TrendClass::Stable),
            ]),
            &EnsembleWeights::default(),
        );
        assert_eq!(result.primary, TrendClass::Stable);

        let with_quartile = aggregate(
            &votes(&[
                (EnsembleMethod::ProbabilisticModel, TrendClass::Decreasing),
                (EnsembleMethod::Decomposition, TrendClass::Stable),
                (EnsembleMethod::Statistical, TrendClass::Stable),
                (EnsembleMethod::QuartileComparison, TrendClass::Stable),
            ]),
            &EnsembleWeights::default(),
        );
        assert_eq!(with_quartile.primary, TrendClass::Stable);
        assert!((with_quartile.confidence - 700.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_unbreakable_tie_falls_back_to_stable() {
        let weights = EnsembleWeights {
            probabilistic_model: 0.0,
            decomposition: 0.5,
            statistical: 0.5,
            quartile_comparison: 0.0,
        };
        let result = aggregate(
            &votes(&[
                (EnsembleMethod::Decomposition, TrendClass::Increasing),
                (EnsembleMethod::Statistical, TrendClass::Decreasing),
            ]),
            &weights,
        );
        assert_eq!(result.primary, TrendClass::Stable);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.agreement_score, 0.0);
    }

    #[test]
    fn test_quartile_votes_with_baseline_weight() {
        let result = aggregate(
            &votes(&[
                (EnsembleMethod::ProbabilisticModel, TrendClass::Increasing),
                (EnsembleMethod::Decomposition, TrendClass::Increasing),
                (EnsembleMethod::Statistical, TrendClass::Increasing),
                (EnsembleMethod::QuartileComparison, TrendClass::Increasing),
            ]),
            &EnsembleWeights::default(),
        );
        assert_eq!(result.voter_count(), 4);
        let quartile = result.weights[&EnsembleMethod::QuartileComparison];
        let statistical = result.weights[&EnsembleMethod::Statistical];
        assert!((quartile - statistical).abs() < 1e-12);
        assert!((quartile - 0.2 / 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_renormalises_missing_methods() {
        let result = aggregate(
            &votes(&[
                (EnsembleMethod::ProbabilisticModel, TrendClass::InsufficientData),
                (EnsembleMethod::Decomposition, TrendClass::Decreasing),
                (EnsembleMethod::Statistical, TrendClass::Stable),
            ]),
            &EnsembleWeights::default(),
        );
        assert_eq!(result.voter_count(), 2);
        assert!((result.weights[&EnsembleMethod::Decomposition] - 0.6).abs() < 1e-12);
        assert_eq!(result.primary, TrendClass::Decreasing);
        assert!((result.confidence - 60.0).abs() < 1e-9);
        assert!(!result
            .method_classifications
            .contains_key(&EnsembleMethod::ProbabilisticModel));
    }

    #[test]
    fn test_single_voter() {
        let result = aggregate(
            &votes(&[(EnsembleMethod::QuartileComparison, TrendClass::Volatile)]),
            &EnsembleWeights::default(),
        );
        assert_eq!(result.primary, TrendClass::Volatile);
        assert_eq!(result.agreement_score, 1.0);
        assert_eq!(result.confidence, 100.0);
    }

    #[test]
    fn test_no_voters() {
        let result = aggregate(&BTreeMap::new(), &EnsembleWeights::default());
        assert_eq!(result, EnsembleResult::insufficient());
        assert!(result.weights.is_empty());
    }
}
