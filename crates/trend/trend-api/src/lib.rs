//! Trend Consumer API
//!
//! Consumer configuration and builder APIs for the health metric trend
//! engine.
//!
//! This crate provides:
//! - `AnalysisConfig`, loadable from JSON
//! - `TrendEngineBuilder` for constructing engines from configuration
//! - The `analyze` entry point with default settings
//! - Re-exports from SPI and core for convenience

pub mod builder;
pub mod config;

// Re-export from core
pub use trend_core::{
    changepoint, classification, decomposition, engine, ensemble, forecast, interpretation,
    preprocess, stats, validators, volatility, Capabilities, ClassificationThresholds,
    EngineOptions, EnsembleWeights, NoiseLimits, PreprocessReport, TrendEngine,
    VolatilityThresholds,
};

// Re-export data model and traits from SPI
pub use trend_spi::{
    ChangePoint, ChangePointDetector, CleanSeries, DataPoint, Decomposer, EnsembleMethod,
    EnsembleResult, EvidenceQuality, FittedTrendModel, GoalValue, HealthContext,
    PredictionPoint, PredictionQuality, Result, SeasonalComponent, SeasonalPeriod,
    ShiftDirection, TimeSeries, TrendAnalysis, TrendClass, TrendDecomposition, TrendDirection,
    TrendError, TrendModelStrategy, TrendValidator, ValidationResult, VolatilityLevel,
    VolatilityTrend,
};

pub use builder::TrendEngineBuilder;
pub use config::{
    AnalysisConfig, CacheConfig, CapabilityConfig, ChangePointConfig, ForecastConfig,
    ThresholdConfig,
};

/// Analyse one metric with the default configuration
///
/// Builds a fresh engine per call; hold a [`TrendEngine`] to reuse the
/// model cache across calls.
pub fn analyze(
    series: &TimeSeries,
    metric_name: &str,
    context: Option<&HealthContext>,
    forecast_days: usize,
) -> Result<TrendAnalysis> {
    TrendEngine::default().analyze(series, metric_name, context, forecast_days)
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{analyze, AnalysisConfig, TrendEngineBuilder};
    pub use trend_core::{Capabilities, EngineOptions, TrendEngine};
    pub use trend_spi::{
        DataPoint, GoalValue, HealthContext, Result, TimeSeries, TrendAnalysis, TrendClass,
        TrendDirection, TrendError,
    };
}
