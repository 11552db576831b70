//! Engine builder.

use crate::AnalysisConfig;
use chrono::NaiveDateTime;
use tracing::debug;
use trend_core::{Capabilities, EngineOptions, TrendEngine};
use trend_spi::{HealthContext, Result, TimeSeries, TrendAnalysis};

/// Builder for a configured [`TrendEngine`].
#[derive(Debug, Clone, Default)]
pub struct TrendEngineBuilder {
    config: AnalysisConfig,
    reference_time: Option<NaiveDateTime>,
}

impl TrendEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded configuration.
    pub fn from_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            reference_time: None,
        }
    }

    // ========== Capability Methods ==========

    /// Enable or disable the Holt trend model.
    pub fn probabilistic_model(mut self, enabled: bool) -> Self {
        self.config.capabilities.probabilistic_model = enabled;
        self
    }

    /// Enable or disable LOESS decomposition.
    pub fn advanced_decomposition(mut self, enabled: bool) -> Self {
        self.config.capabilities.advanced_decomposition = enabled;
        self
    }

    // ========== Tuning Methods ==========

    pub fn merge_window_days(mut self, days: i64) -> Self {
        self.config.change_points.merge_window_days = days;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache.capacity = capacity;
        self
    }

    /// Measure recency against a fixed instant instead of the clock.
    pub fn reference_time(mut self, reference: NaiveDateTime) -> Self {
        self.reference_time = Some(reference);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    // ========== Build ==========

    /// Engine options for the current configuration, after validation.
    pub fn options(&self) -> Result<EngineOptions> {
        self.config.validate()?;
        let c = &self.config;
        Ok(EngineOptions {
            capabilities: Capabilities::from(c.capabilities),
            thresholds: c.thresholds.classification,
            noise_limits: c.thresholds.noise_limits,
            weights: c.ensemble,
            volatility: c.thresholds.volatility,
            iqr_multiplier: c.thresholds.iqr_multiplier,
            merge_window_days: c.change_points.merge_window_days,
            cusum_threshold_sigmas: c.change_points.cusum_threshold_sigmas,
            sliding_window_alpha: c.change_points.sliding_window_alpha,
            model_cache_capacity: c.cache.capacity,
            reference_time: self.reference_time,
        })
    }

    pub fn build(self) -> Result<TrendEngine> {
        let options = self.options()?;
        debug!(?options, "building trend engine");
        Ok(TrendEngine::new(options))
    }

    /// Build and analyse in one step using the configured forecast horizon.
    pub fn analyze(
        self,
        series: &TimeSeries,
        metric_name: &str,
        context: Option<&HealthContext>,
    ) -> Result<TrendAnalysis> {
        let days = self.config.forecast.default_days;
        self.build()?.analyze(series, metric_name, context, days)
    }
}
