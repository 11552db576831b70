//! Trend/seasonal/residual decomposition
//!
//! The moving-average `MovingAverageDecomposer` is always available; the
//! LOESS-based primary method lives in [`crate::stl`] behind the `stl`
//! feature. Seasonal strength and calendar patterns work on either output.

use crate::stats::{self, Anova};
use chrono::{Datelike, Weekday};
use std::collections::BTreeMap;
use trend_spi::{
    CleanSeries, Decomposer, DecompositionMethod, Result, SeasonalComponent, SeasonalPeriod,
    TrendDecomposition, TrendError,
};

/// Minimum series length for any decomposition
pub const MIN_DECOMPOSITION_POINTS: usize = 14;

/// Seasonal/observed variance ratio above which seasonality is significant
pub const SEASONALITY_THRESHOLD: f64 = 0.10;

pub(crate) const WEEKLY_PERIOD: usize = 7;
const MONTHLY_MIN_POINTS: usize = 60;
const MONTHLY_MIN_GROUPS: usize = 20;

pub(crate) fn ensure_decomposable(series: &CleanSeries) -> Result<()> {
    if series.len() < MIN_DECOMPOSITION_POINTS {
        return Err(TrendError::InsufficientData {
            required: MIN_DECOMPOSITION_POINTS,
            actual: series.len(),
        });
    }
    if series.values.iter().any(|v| !v.is_finite()) {
        return Err(TrendError::Decomposition(
            "series contains non-finite values".to_string(),
        ));
    }
    Ok(())
}

/// Centered moving-average trend with day-of-week seasonal means
#[derive(Debug, Clone, Copy, Default)]
pub struct MovingAverageDecomposer;

impl MovingAverageDecomposer {
    pub fn new() -> Self {
        Self
    }

    pub fn window_for(n: usize) -> usize {
        WEEKLY_PERIOD.min(n / 3).max(1)
    }
}

impl Decomposer for MovingAverageDecomposer {
    fn method(&self) -> DecompositionMethod {
        DecompositionMethod::Fallback
    }

    fn min_points(&self) -> usize {
        MIN_DECOMPOSITION_POINTS
    }

    fn decompose(&self, series: &CleanSeries) -> Result<TrendDecomposition> {
        ensure_decomposable(series)?;
        let y = &series.values;
        let n = y.len();
        let window = Self::window_for(n);
        let left = window / 2;
        let right = (window - 1) / 2;

        let mut trend = vec![f64::NAN; n];
        for i in left..n.saturating_sub(right) {
            trend[i] = y[i - left..=i + right].iter().sum::<f64>() / window as f64;
        }
        // Fill edges from the nearest computed value
        let first = left;
        let last = n - right - 1;
        for i in 0..first {
            trend[i] = trend[first];
        }
        for i in (last + 1)..n {
            trend[i] = trend[last];
        }

        let mut by_weekday: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for (i, ts) in series.timestamps.iter().enumerate() {
            by_weekday
                .entry(ts.weekday().num_days_from_monday())
                .or_default()
                .push(y[i] - trend[i]);
        }
        let weekday_means: BTreeMap<u32, f64> = by_weekday
            .into_iter()
            .map(|(day, values)| (day, stats::mean(&values)))
            .collect();

        let seasonal: Vec<f64> = series
            .timestamps
            .iter()
            .map(|ts| {
                weekday_means
                    .get(&ts.weekday().num_days_from_monday())
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect();
        let residual: Vec<f64> = (0..n).map(|i| y[i] - trend[i] - seasonal[i]).collect();

        Ok(TrendDecomposition {
            timestamps: series.timestamps.clone(),
            observed: y.clone(),
            trend,
            seasonal,
            residual,
            method: self.method(),
        })
    }
}

/// Seasonal share of the observed variance, in [0, 1]
pub fn seasonal_strength(decomposition: &TrendDecomposition) -> f64 {
    let observed = stats::population_variance(&decomposition.observed);
    if observed <= f64::EPSILON {
        return 0.0;
    }
    (stats::population_variance(&decomposition.seasonal) / observed).clamp(0.0, 1.0)
}

pub fn has_significant_seasonality(decomposition: &TrendDecomposition) -> bool {
    seasonal_strength(decomposition) > SEASONALITY_THRESHOLD
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Group detrended values and seasonal means by a calendar key, then test
fn grouped_pattern<K, F>(
    decomposition: &TrendDecomposition,
    period: SeasonalPeriod,
    min_groups: usize,
    key: F,
) -> Result<Option<SeasonalComponent>>
where
    K: Ord,
    F: Fn(usize) -> (K, String),
{
    let detrended = decomposition.detrended();
    let mut groups: BTreeMap<K, (String, Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for i in 0..decomposition.len() {
        let (k, label) = key(i);
        let entry = groups
            .entry(k)
            .or_insert_with(|| (label, Vec::new(), Vec::new()));
        entry.1.push(detrended[i]);
        entry.2.push(decomposition.seasonal[i]);
    }
    if groups.len() < min_groups {
        return Ok(None);
    }

    let samples: Vec<Vec<f64>> = groups.values().map(|(_, d, _)| d.clone()).collect();
    let Some(Anova {
        p_value,
        eta_squared,
        ..
    }) = stats::one_way_anova(&samples)?
    else {
        return Ok(None);
    };

    let pattern = groups
        .into_values()
        .map(|(label, _, seasonal)| (label, stats::mean(&seasonal)))
        .collect();

    Ok(Some(SeasonalComponent {
        period,
        strength: eta_squared.clamp(0.0, 1.0),
        pattern,
        significance: p_value,
    }))
}

/// Day-of-week pattern; requires at least two weeks of data
pub fn weekly_pattern(decomposition: &TrendDecomposition) -> Result<Option<SeasonalComponent>> {
    if decomposition.len() < MIN_DECOMPOSITION_POINTS {
        return Ok(None);
    }
    grouped_pattern(decomposition, SeasonalPeriod::Weekly, 2, |i| {
        let day = decomposition.timestamps[i].weekday();
        (day.num_days_from_monday(), weekday_name(day).to_string())
    })
}

/// Day-of-month pattern; requires 60 points spread over 20 distinct days
pub fn monthly_pattern(decomposition: &TrendDecomposition) -> Result<Option<SeasonalComponent>> {
    if decomposition.len() < MONTHLY_MIN_POINTS {
        return Ok(None);
    }
    grouped_pattern(
        decomposition,
        SeasonalPeriod::Monthly,
        MONTHLY_MIN_GROUPS,
        |i| {
            let day = decomposition.timestamps[i].day();
            (day, format!("{day:02}"))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn monday() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn daily(values: Vec<f64>) -> CleanSeries {
        let timestamps = (0..values.len())
            .map(|i| monday() + Duration::days(i as i64))
            .collect();
        CleanSeries::new(timestamps, values)
    }

    fn weekly_series(weeks: usize) -> CleanSeries {
        let pattern = [0.0, 1.0, 2.0, 3.0, 2.0, -4.0, -4.0];
        daily(
            (0..weeks * 7)
                .map(|i| 100.0 + 0.1 * i as f64 + 3.0 * pattern[i % 7])
                .collect(),
        )
    }

    #[test]
    fn test_moving_average_fallback() {
        let series = weekly_series(4);
        let d = MovingAverageDecomposer::new().decompose(&series).unwrap();
        assert_eq!(d.method, DecompositionMethod::Fallback);
        assert_eq!(d.len(), series.len());
        assert!(d.trend.iter().all(|v| v.is_finite()));
        for i in 0..d.len() {
            let sum = d.trend[i] + d.seasonal[i] + d.residual[i];
            assert!((sum - d.observed[i]).abs() < 1e-9);
        }
        assert!(has_significant_seasonality(&d));
    }

    #[test]
    fn test_moving_average_rejects_short_series() {
        let result = MovingAverageDecomposer::new().decompose(&daily(vec![1.0; 10]));
        assert!(matches!(
            result,
            Err(TrendError::InsufficientData {
                required: 14,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_moving_average_window() {
        assert_eq!(MovingAverageDecomposer::window_for(14), 4);
        assert_eq!(MovingAverageDecomposer::window_for(60), 7);
    }

    #[test]
    fn test_seasonal_strength_zero_variance() {
        let d = MovingAverageDecomposer::new()
            .decompose(&daily(vec![5.0; 21]))
            .unwrap();
        assert_eq!(seasonal_strength(&d), 0.0);
        assert!(!has_significant_seasonality(&d));
    }

    #[test]
    fn test_weekly_pattern_peak() {
        let d = MovingAverageDecomposer::new()
            .decompose(&weekly_series(8))
            .unwrap();
        let weekly = weekly_pattern(&d).unwrap().unwrap();
        assert_eq!(weekly.period, SeasonalPeriod::Weekly);
        assert!(weekly.is_significant());
        assert!(weekly.strength > 0.9);
        assert_eq!(weekly.pattern.len(), 7);
        assert_eq!(weekly.peak().map(|(day, _)| day), Some("Thursday"));
    }

    #[test]
    fn test_monthly_pattern_requirements() {
        let short = MovingAverageDecomposer::new()
            .decompose(&weekly_series(8))
            .unwrap();
        assert!(monthly_pattern(&short).unwrap().is_none());

        let long = MovingAverageDecomposer::new()
            .decompose(&weekly_series(10))
            .unwrap();
        let monthly = monthly_pattern(&long).unwrap().unwrap();
        assert_eq!(monthly.period, SeasonalPeriod::Monthly);
        assert!(monthly.pattern.contains_key("01"));
        assert!(monthly.pattern.contains_key("31"));
    }
}
