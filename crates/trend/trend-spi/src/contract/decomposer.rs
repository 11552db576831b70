//! Trait for time series decomposition

use crate::error::Result;
use crate::model::{CleanSeries, DecompositionMethod, TrendDecomposition};

/// Splits a series into trend, seasonal and residual components
pub trait Decomposer: Send + Sync {
    /// Tag recorded on every decomposition this implementation produces
    fn method(&self) -> DecompositionMethod;

    /// Minimum number of observations required
    fn min_points(&self) -> usize;

    /// Decompose the series. Output arrays have the input's length.
    fn decompose(&self, series: &CleanSeries) -> Result<TrendDecomposition>;
}
