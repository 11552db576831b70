//! Trend Facade
//!
//! High-level API for health metric trend analysis. Re-exports all public
//! types from the trend stack for convenient usage.

// Re-export everything from API (which includes SPI and core)
pub use trend_api::*;

// Explicit re-exports for documentation
pub use trend_api::prelude;

// Re-export core modules for direct access
pub use trend_core::{
    changepoint, classification, decomposition, engine, ensemble, forecast, interpretation,
    preprocess, stats, validators, volatility,
};

// Re-export detector and strategy types at root
pub use trend_core::{
    ChangePointAnalyzer, CusumDetector, LinearTrendStrategy, MovingAverageDecomposer,
    Preprocessor, SlidingWindowDetector, StatisticalValidators,
};
#[cfg(feature = "probabilistic-model")]
pub use trend_core::{HoltTrendModel, HoltTrendStrategy, ModelCache};
#[cfg(feature = "stl")]
pub use trend_core::StlDecomposer;

// Re-export SPI traits
pub use trend_spi::{
    ChangePointDetector, Decomposer, FittedTrendModel, TrendModelStrategy, TrendValidator,
};
