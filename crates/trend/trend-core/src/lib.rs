//! Trend Core
//!
//! Estimators and the analysis engine for health metric trends:
//! preprocessing, statistical validators, decomposition, change-point
//! detection, ensemble voting, volatility, forecasting and narrative text.
//!
//! The Holt model (`probabilistic-model`) and LOESS decomposition (`stl`)
//! are optional; without them the engine uses linear extrapolation and the
//! moving-average decomposer.

pub mod changepoint;
pub mod classification;
pub mod decomposition;
pub mod engine;
pub mod ensemble;
pub mod forecast;
pub mod interpretation;
#[cfg(feature = "probabilistic-model")]
pub mod model;
pub mod preprocess;
pub mod stats;
#[cfg(feature = "stl")]
pub mod stl;
pub mod validators;
pub mod volatility;

// Re-export SPI traits for implementations
pub use trend_spi::{
    ChangePoint, ChangePointDetector, CleanSeries, Decomposer, FittedTrendModel, Result,
    TimeSeries, TrendAnalysis, TrendError, TrendModelStrategy, TrendValidator,
};

// Re-export main types
pub use changepoint::{ChangePointAnalyzer, CusumDetector, SlidingWindowDetector};
pub use classification::{ClassificationThresholds, NoiseLimits};
pub use decomposition::MovingAverageDecomposer;
pub use engine::{Capabilities, EngineOptions, TrendEngine};
pub use ensemble::EnsembleWeights;
pub use forecast::LinearTrendStrategy;
#[cfg(feature = "probabilistic-model")]
pub use model::{HoltTrendModel, HoltTrendStrategy, ModelCache};
pub use preprocess::{PreprocessReport, Preprocessor};
#[cfg(feature = "stl")]
pub use stl::StlDecomposer;
pub use validators::StatisticalValidators;
pub use volatility::VolatilityThresholds;
