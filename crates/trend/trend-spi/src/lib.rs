//! Trend Service Provider Interface
//!
//! Defines the data model, error type, and the traits behind every strategy
//! seam of the health metric trend engine: validators, decomposers,
//! change-point detectors and trend models.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{
    ChangePointDetector, Decomposer, FittedTrendModel, TrendModelStrategy, TrendValidator,
};
pub use error::{Result, TrendError};
pub use model::{
    ChangePoint, CleanSeries, DataPoint, DecompositionMethod, EnsembleMethod, EnsembleResult,
    EvidenceQuality, ForecastInterval, GoalValue, HealthContext, PredictionPoint,
    PredictionQuality, SeasonalComponent, SeasonalPeriod, ShiftDirection, TimeSeries,
    TrendAnalysis, TrendClass, TrendDecomposition, TrendDirection, TrendSign, ValidationResult,
    VolatilityLevel, VolatilityProfile, VolatilityTrend,
};
