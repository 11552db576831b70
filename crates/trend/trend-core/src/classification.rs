//! Shared trend classification
//!
//! Every ensemble voter reduces its evidence to a [`TrendSignal`] and is
//! classified by the same [`classify`] function and threshold table.

use crate::stats::{self, OlsFit};
use crate::validators::{self, ALPHA};
use serde::{Deserialize, Serialize};
use trend_spi::{CleanSeries, Result, TrendClass, ValidationResult};

/// Daily-change cut-offs, in percent of the mean level per day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    pub strong_increase: f64,
    pub increase: f64,
    pub decrease: f64,
    pub strong_decrease: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            strong_increase: 0.05,
            increase: 0.01,
            decrease: -0.01,
            strong_decrease: -0.05,
        }
    }
}

/// Per-method noise ceilings above which a voter reports `Volatile`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseLimits {
    pub probabilistic_model: f64,
    pub decomposition: f64,
    pub statistical: f64,
    pub quartile_comparison: f64,
}

impl Default for NoiseLimits {
    fn default() -> Self {
        Self {
            probabilistic_model: 0.35,
            decomposition: 0.30,
            statistical: 0.40,
            quartile_comparison: 0.50,
        }
    }
}

/// Evidence from one voter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSignal {
    /// Slope per day as a percentage of the mean level
    pub daily_change: f64,
    pub significant: bool,
    pub noise: f64,
    pub noise_limit: f64,
}

/// Map one voter's evidence to a class
///
/// Rules apply in order: noise above the voter's limit is `Volatile`, an
/// insignificant slope is `Stable` whatever its size, and only then do the
/// daily-change thresholds pick a direction. A steep but insignificant
/// slope therefore never reaches the threshold table.
pub fn classify(signal: &TrendSignal, thresholds: &ClassificationThresholds) -> TrendClass {
    if signal.noise > signal.noise_limit {
        return TrendClass::Volatile;
    }
    if !signal.significant {
        return TrendClass::Stable;
    }
    let change = signal.daily_change;
    if change > thresholds.strong_increase {
        TrendClass::StronglyIncreasing
    } else if change > thresholds.increase {
        TrendClass::Increasing
    } else if change < thresholds.strong_decrease {
        TrendClass::StronglyDecreasing
    } else if change < thresholds.decrease {
        TrendClass::Decreasing
    } else {
        TrendClass::Stable
    }
}

/// Per-day slope as a percentage of `level` (raw slope when the level is 0)
pub fn percent_of_level(slope_per_day: f64, level: f64) -> f64 {
    if level.abs() > f64::EPSILON {
        100.0 * slope_per_day / level.abs()
    } else {
        slope_per_day
    }
}

/// Standard deviation of `spread` relative to the absolute `level`
pub fn relative_dispersion(spread: &[f64], level: f64) -> f64 {
    if level.abs() <= f64::EPSILON {
        return 0.0;
    }
    stats::std_dev(spread) / level.abs()
}

/// Fit a line through `component` and test it against the observed values
///
/// The slope comes from the component; its standard error comes from the
/// observed values' residuals around that line.
pub fn component_signal(
    component: &[f64],
    series: &CleanSeries,
    noise: f64,
    noise_limit: f64,
) -> Result<Option<TrendSignal>> {
    let days = series.day_offsets();
    let Some(fit) = OlsFit::fit(&days, component) else {
        return Ok(None);
    };
    let n = days.len();

    let significant = if n < 3 || fit.slope == 0.0 {
        false
    } else {
        let ssr: f64 = days
            .iter()
            .zip(&series.values)
            .map(|(x, y)| (y - fit.predict(*x)).powi(2))
            .sum();
        let day_mean = stats::mean(&days);
        let sxx: f64 = days.iter().map(|x| (x - day_mean).powi(2)).sum();
        let se = (ssr / (n - 2) as f64 / sxx).sqrt();
        if se <= 0.0 {
            true
        } else {
            stats::t_two_sided_p(fit.slope / se, (n - 2) as f64)? < ALPHA
        }
    };

    Ok(Some(TrendSignal {
        daily_change: percent_of_level(fit.slope, stats::mean(&series.values)),
        significant,
        noise,
        noise_limit,
    }))
}

/// Signal from a fitted model's smoothed path
///
/// The path gives the daily change, but a smoothed path follows noise
/// closely enough to look significant on its own. The vote only counts
/// as significant when a straight line through the observed values is
/// significant too and points the same way.
pub fn model_signal(
    fitted: &[f64],
    series: &CleanSeries,
    noise: f64,
    noise_limit: f64,
) -> Result<Option<TrendSignal>> {
    let Some(mut signal) = component_signal(fitted, series, noise, noise_limit)? else {
        return Ok(None);
    };
    if signal.significant {
        signal.significant = match OlsFit::fit(&series.day_offsets(), &series.values) {
            Some(observed) => {
                observed.slope_p_value()? < ALPHA
                    && observed.slope.signum() == signal.daily_change.signum()
            }
            None => false,
        };
    }
    Ok(Some(signal))
}

/// Signal from the validator results: Sen's slope gated by Mann-Kendall
pub fn statistical_signal(
    results: &[ValidationResult],
    series: &CleanSeries,
    noise_limit: f64,
) -> Option<TrendSignal> {
    let mann_kendall = validators::result_named(results, validators::MANN_KENDALL)?;
    let sens = validators::result_named(results, validators::SENS_SLOPE)?;
    let regression = validators::result_named(results, validators::LINEAR_REGRESSION)?;
    if series.len() < 3 {
        return None;
    }

    let level = stats::mean(&series.values);
    let noise = match OlsFit::fit_index(&series.values) {
        Some(fit) => {
            let residuals: Vec<f64> = series
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| v - fit.predict(i as f64))
                .collect();
            relative_dispersion(&residuals, level)
        }
        None => 0.0,
    };

    Some(TrendSignal {
        daily_change: percent_of_level(sens.statistic / series.mean_step_days(), level),
        significant: mann_kendall.trend_detected
            && (sens.trend_detected || regression.trend_detected),
        noise,
        noise_limit,
    })
}

pub const MIN_QUARTILE_POINTS: usize = 4;

/// Compare the last quarter of the series with the first
pub fn quartile_signal(series: &CleanSeries, noise_limit: f64) -> Result<Option<TrendSignal>> {
    let n = series.len();
    if n < MIN_QUARTILE_POINTS {
        return Ok(None);
    }
    let q = n / 4;
    let first = &series.values[..q];
    let last = &series.values[n - q..];
    let p_value = stats::welch_t_test(first, last)?;

    let elapsed_days = (n - q) as f64 * series.mean_step_days();
    let slope = (stats::mean(last) - stats::mean(first)) / elapsed_days;
    let level = stats::mean(&series.values);

    Ok(Some(TrendSignal {
        daily_change: percent_of_level(slope, level),
        significant: p_value < ALPHA,
        noise: stats::coefficient_of_variation(&series.values),
        noise_limit,
    }))
}
