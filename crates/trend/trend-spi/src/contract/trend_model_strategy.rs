//! Strategy seam for the optional probabilistic trend model

use crate::error::Result;
use crate::model::{CleanSeries, ForecastInterval};
use std::sync::Arc;

/// A fitted model that can describe its trend and forecast natively
pub trait FittedTrendModel: Send + Sync + std::fmt::Debug {
    /// Model identifier
    fn name(&self) -> &str;

    /// Smoothed trend level for every fitted observation
    fn fitted_trend(&self) -> &[f64];

    /// One-step-ahead residuals
    fn residuals(&self) -> &[f64];

    /// Forecast `horizon` steps with 95% bounds
    fn predict(&self, horizon: usize) -> Result<Vec<ForecastInterval>>;
}

/// Selected once at engine construction from capability flags
///
/// The primary strategy returns a fitted model; the fallback returns
/// `Ok(None)` and leaves forecasting to linear extrapolation.
pub trait TrendModelStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this is the richer (primary) strategy
    fn is_primary(&self) -> bool;

    fn fit(&self, series: &CleanSeries) -> Result<Option<Arc<dyn FittedTrendModel>>>;

    /// Drop any memoised fits
    fn clear_cache(&self) {}
}
