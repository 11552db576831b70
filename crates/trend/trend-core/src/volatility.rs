//! Volatility level and its direction over time

use crate::stats::{self, OlsFit};
use serde::{Deserialize, Serialize};
use trend_spi::{Result, VolatilityLevel, VolatilityProfile, VolatilityTrend};

pub const MIN_VOLATILITY_POINTS: usize = 7;

/// Coefficient-of-variation cut-offs between low/medium and medium/high
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityThresholds {
    pub low: f64,
    pub medium: f64,
}

impl Default for VolatilityThresholds {
    fn default() -> Self {
        Self {
            low: 0.10,
            medium: 0.30,
        }
    }
}

impl VolatilityThresholds {
    pub fn level(&self, score: f64) -> VolatilityLevel {
        if score < self.low {
            VolatilityLevel::Low
        } else if score < self.medium {
            VolatilityLevel::Medium
        } else {
            VolatilityLevel::High
        }
    }
}

/// Rolling sample standard deviation over full windows
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 || values.len() < window {
        return Vec::new();
    }
    values.windows(window).map(stats::std_dev).collect()
}

pub fn analyze_volatility(values: &[f64], thresholds: &VolatilityThresholds) -> Result<VolatilityProfile> {
    let n = values.len();
    if n < MIN_VOLATILITY_POINTS {
        return Ok(VolatilityProfile::unknown());
    }

    let score = stats::coefficient_of_variation(values);
    let window = (n / 4).clamp(2, 7);
    let rolling = rolling_std(values, window);

    let mut trend = VolatilityTrend::Stable;
    if rolling.len() >= 2 {
        if let Some(fit) = OlsFit::fit_index(&rolling) {
            if fit.slope_p_value()? < 0.05 {
                trend = if fit.slope > 0.0 {
                    VolatilityTrend::Increasing
                } else {
                    VolatilityTrend::Decreasing
                };
            }
        }
    }

    Ok(VolatilityProfile {
        level: thresholds.level(score),
        score,
        trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_series_unknown() {
        let profile = analyze_volatility(&[1.0, 2.0, 3.0], &VolatilityThresholds::default()).unwrap();
        assert_eq!(profile, VolatilityProfile::unknown());
    }

    #[test]
    fn test_constant_series_low() {
        let profile = analyze_volatility(&[50.0; 20], &VolatilityThresholds::default()).unwrap();
        assert_eq!(profile.level, VolatilityLevel::Low);
        assert_eq!(profile.score, 0.0);
        assert_eq!(profile.trend, VolatilityTrend::Stable);
    }

    #[test]
    fn test_levels() {
        let t = VolatilityThresholds::default();
        assert_eq!(t.level(0.05), VolatilityLevel::Low);
        assert_eq!(t.level(0.2), VolatilityLevel::Medium);
        assert_eq!(t.level(0.3), VolatilityLevel::High);
    }

    #[test]
    fn test_widening_swings_increase() {
        let values: Vec<f64> = (0..40)
            .map(|i| 100.0 + if i % 2 == 0 { 1.0 } else { -1.0 } * (1.0 + i as f64))
            .collect();
        let profile = analyze_volatility(&values, &VolatilityThresholds::default()).unwrap();
        assert_eq!(profile.trend, VolatilityTrend::Increasing);
        assert_eq!(profile.level, VolatilityLevel::Medium);
    }

    #[test]
    fn test_rolling_std() {
        let rolling = rolling_std(&[1.0, 1.0, 3.0, 3.0], 2);
        assert_eq!(rolling.len(), 3);
        assert_eq!(rolling[0], 0.0);
        assert!((rolling[1] - 2f64.sqrt()).abs() < 1e-12);
    }
}
