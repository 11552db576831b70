//! N-day forecasts with 95% bounds

use crate::stats::OlsFit;
use chrono::Duration;
use std::sync::Arc;
use trend_spi::{
    CleanSeries, FittedTrendModel, PredictionPoint, PredictionQuality, Result, TrendError,
    TrendModelStrategy,
};

pub const LINEAR_EXTRAPOLATION: &str = "linear_extrapolation";

/// Trailing observations used by the linear fallback
pub const LINEAR_WINDOW: usize = 14;

const Z_95: f64 = 1.96;

/// Fallback strategy: no model, forecasts come from linear extrapolation
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTrendStrategy;

impl TrendModelStrategy for LinearTrendStrategy {
    fn name(&self) -> &str {
        LINEAR_EXTRAPOLATION
    }

    fn is_primary(&self) -> bool {
        false
    }

    fn fit(&self, _series: &CleanSeries) -> Result<Option<Arc<dyn FittedTrendModel>>> {
        Ok(None)
    }
}

/// Quality from interval width relative to the predicted value
pub fn quality_from_width(width: f64, predicted: f64) -> PredictionQuality {
    let normalised = if predicted.abs() > f64::EPSILON {
        width / predicted.abs()
    } else if width > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };
    if normalised < 0.10 {
        PredictionQuality::High
    } else if normalised < 0.30 {
        PredictionQuality::Medium
    } else {
        PredictionQuality::Low
    }
}

/// Quality of the linear fallback by distance from the last observation
pub fn quality_from_distance(step: usize) -> PredictionQuality {
    match step {
        0..=3 => PredictionQuality::High,
        4..=7 => PredictionQuality::Medium,
        _ => PredictionQuality::Low,
    }
}

/// Forecast `horizon` days past the last observation
///
/// Uses the model's native intervals when a model is supplied, otherwise
/// an OLS line through the trailing window. Fewer than two observations
/// yield no predictions.
pub fn forecast(
    series: &CleanSeries,
    model: Option<&dyn FittedTrendModel>,
    horizon: usize,
) -> Result<Vec<PredictionPoint>> {
    let Some(last) = series.last_timestamp() else {
        return Ok(Vec::new());
    };
    if series.len() < 2 {
        return Ok(Vec::new());
    }

    if let Some(model) = model {
        let intervals = model.predict(horizon)?;
        return intervals
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let value = TrendError::ensure_finite(step.value, "model forecast")?;
                let lower = TrendError::ensure_finite(step.lower, "model lower bound")?;
                let upper = TrendError::ensure_finite(step.upper, "model upper bound")?;
                Ok(PredictionPoint::new(
                    last + Duration::days(i as i64 + 1),
                    value,
                    lower,
                    upper,
                    quality_from_width(upper - lower, value),
                ))
            })
            .collect();
    }

    let window = series.tail(LINEAR_WINDOW);
    let w = window.len();
    let Some(fit) = OlsFit::fit_index(&window.values) else {
        return Ok(Vec::new());
    };

    (1..=horizon)
        .map(|i| {
            let predicted = TrendError::ensure_finite(
                fit.predict((w + i - 1) as f64),
                "linear forecast",
            )?;
            let uncertainty = fit.residual_se * i as f64 * Z_95;
            Ok(PredictionPoint::new(
                last + Duration::days(i as i64),
                predicted,
                predicted - uncertainty,
                predicted + uncertainty,
                quality_from_distance(i),
            ))
        })
        .collect()
}
