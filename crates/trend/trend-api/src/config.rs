//! Engine configuration
//!
//! Every section and field is optional in JSON; omitted values take the
//! engine defaults.

use serde::{Deserialize, Serialize};
use trend_core::{
    Capabilities, ClassificationThresholds, EnsembleWeights, NoiseLimits, VolatilityThresholds,
};
use trend_spi::{EnsembleMethod, Result, TrendError};

/// Optional capabilities to enable
///
/// A capability that was not compiled in falls back to the baseline method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityConfig {
    pub probabilistic_model: bool,
    pub advanced_decomposition: bool,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            probabilistic_model: true,
            advanced_decomposition: true,
        }
    }
}

impl From<CapabilityConfig> for Capabilities {
    fn from(config: CapabilityConfig) -> Self {
        Capabilities {
            probabilistic_model: config.probabilistic_model,
            advanced_decomposition: config.advanced_decomposition,
        }
    }
}

/// Classification, noise and volatility cut-offs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub classification: ClassificationThresholds,
    pub noise_limits: NoiseLimits,
    pub volatility: VolatilityThresholds,
    /// Tukey fence multiplier for outlier clipping
    pub iqr_multiplier: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            classification: ClassificationThresholds::default(),
            noise_limits: NoiseLimits::default(),
            volatility: VolatilityThresholds::default(),
            iqr_multiplier: 1.5,
        }
    }
}

/// Change-point detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangePointConfig {
    /// Detections closer than this many days are merged
    pub merge_window_days: i64,
    /// CUSUM alarm threshold in standard deviations
    pub cusum_threshold_sigmas: f64,
    /// Significance level for the sliding-window t-test
    pub sliding_window_alpha: f64,
}

impl Default for ChangePointConfig {
    fn default() -> Self {
        Self {
            merge_window_days: 7,
            cusum_threshold_sigmas: 2.0,
            sliding_window_alpha: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Fitted models kept per engine
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 32 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub default_days: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { default_days: 7 }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub capabilities: CapabilityConfig,
    pub thresholds: ThresholdConfig,
    pub ensemble: EnsembleWeights,
    pub change_points: ChangePointConfig,
    pub cache: CacheConfig,
    pub forecast: ForecastConfig,
}

impl AnalysisConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TrendError::Config(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| TrendError::Config(e.to_string()))
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        let c = &self.thresholds.classification;
        let ordered = c.strong_decrease < c.decrease
            && c.decrease <= 0.0
            && 0.0 <= c.increase
            && c.increase < c.strong_increase;
        if !ordered || ![c.strong_decrease, c.decrease, c.increase, c.strong_increase]
            .iter()
            .all(|t| t.is_finite())
        {
            return Err(TrendError::Config(
                "classification thresholds must satisfy strong_decrease < decrease <= 0 <= increase < strong_increase"
                    .to_string(),
            ));
        }

        let n = &self.thresholds.noise_limits;
        for (name, limit) in [
            ("probabilistic_model", n.probabilistic_model),
            ("decomposition", n.decomposition),
            ("statistical", n.statistical),
            ("quartile_comparison", n.quartile_comparison),
        ] {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(TrendError::Config(format!(
                    "noise limit '{name}' must be positive, got {limit}"
                )));
            }
        }

        let v = &self.thresholds.volatility;
        if !(v.low.is_finite() && v.medium.is_finite() && 0.0 < v.low && v.low < v.medium) {
            return Err(TrendError::Config(format!(
                "volatility thresholds must satisfy 0 < low < medium, got {} and {}",
                v.low, v.medium
            )));
        }

        if !(self.thresholds.iqr_multiplier.is_finite() && self.thresholds.iqr_multiplier > 0.0) {
            return Err(TrendError::Config(
                "iqr_multiplier must be positive".to_string(),
            ));
        }

        for method in EnsembleMethod::ALL {
            let weight = self.ensemble.weight(method);
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(TrendError::Config(format!(
                    "ensemble weight '{}' must be non-negative, got {weight}",
                    method.as_str()
                )));
            }
        }

        let cp = &self.change_points;
        if cp.merge_window_days < 0 {
            return Err(TrendError::Config(
                "merge_window_days must not be negative".to_string(),
            ));
        }
        if !(cp.cusum_threshold_sigmas.is_finite() && cp.cusum_threshold_sigmas > 0.0) {
            return Err(TrendError::Config(
                "cusum_threshold_sigmas must be positive".to_string(),
            ));
        }
        if !(cp.sliding_window_alpha > 0.0 && cp.sliding_window_alpha < 1.0) {
            return Err(TrendError::Config(
                "sliding_window_alpha must lie in (0, 1)".to_string(),
            ));
        }

        if self.forecast.default_days == 0 {
            return Err(TrendError::Config(
                "forecast.default_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.forecast.default_days, 7);
        assert_eq!(config.ensemble.probabilistic_model, 0.5);
        assert_eq!(config.thresholds.iqr_multiplier, 1.5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json_str(
            r#"{
                "capabilities": { "probabilistic_model": false },
                "change_points": { "merge_window_days": 3 },
                "thresholds": { "noise_limits": { "statistical": 0.25 } }
            }"#,
        )
        .unwrap();

        assert!(!config.capabilities.probabilistic_model);
        assert!(config.capabilities.advanced_decomposition);
        assert_eq!(config.change_points.merge_window_days, 3);
        assert_eq!(config.change_points.cusum_threshold_sigmas, 2.0);
        assert_eq!(config.thresholds.noise_limits.statistical, 0.25);
        assert_eq!(config.thresholds.noise_limits.decomposition, 0.30);
        assert_eq!(config.cache.capacity, 32);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = AnalysisConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = AnalysisConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, TrendError::Config(_)));
    }

    #[test]
    fn test_unordered_thresholds_rejected() {
        let err = AnalysisConfig::from_json_str(
            r#"{ "thresholds": { "classification": { "increase": 0.1, "strong_increase": 0.05 } } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("classification thresholds"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = AnalysisConfig::default();
        config.ensemble.statistical = -0.2;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("statistical"));
    }

    #[test]
    fn test_alpha_bounds() {
        let mut config = AnalysisConfig::default();
        config.change_points.sliding_window_alpha = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = AnalysisConfig::default();
        config.cache.capacity = 4;
        let json = config.to_json_string().unwrap();
        assert_eq!(AnalysisConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_capabilities_conversion() {
        let caps: Capabilities = CapabilityConfig {
            probabilistic_model: false,
            advanced_decomposition: true,
        }
        .into();
        assert!(!caps.probabilistic_model);
        assert!(caps.advanced_decomposition);
    }
}
