//! Series cleaning and data-quality scoring

use crate::stats;
use chrono::NaiveDateTime;
use trend_spi::{CleanSeries, EvidenceQuality, TimeSeries};

/// Days over which recency decays linearly to zero
pub const RECENCY_HORIZON_DAYS: f64 = 30.0;

/// What the preprocessor changed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PreprocessReport {
    pub input_points: usize,
    pub dropped_nulls: usize,
    pub dropped_duplicates: usize,
    pub clipped: usize,
    pub lower_fence: f64,
    pub upper_fence: f64,
}

/// Cleans raw series: drops nulls and duplicate timestamps, clips outliers
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    iqr_multiplier: f64,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            iqr_multiplier: 1.5,
        }
    }

    pub fn with_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = multiplier;
        self
    }

    /// Clean a copy of `series`; the input is never modified
    pub fn clean(&self, series: &TimeSeries) -> (CleanSeries, PreprocessReport) {
        let mut report = PreprocessReport {
            input_points: series.len(),
            ..Default::default()
        };

        let mut pairs: Vec<(NaiveDateTime, f64)> = series
            .points
            .iter()
            .filter_map(|p| p.usable_value().map(|v| (p.timestamp, v)))
            .collect();
        report.dropped_nulls = series.len() - pairs.len();

        // Stable sort keeps the first of any duplicate timestamps in front
        pairs.sort_by_key(|(ts, _)| *ts);
        let before = pairs.len();
        pairs.dedup_by_key(|(ts, _)| *ts);
        report.dropped_duplicates = before - pairs.len();

        let (timestamps, mut values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();

        if !values.is_empty() {
            let sorted = stats::sorted(&values);
            let q1 = stats::quantile_sorted(&sorted, 0.25);
            let q3 = stats::quantile_sorted(&sorted, 0.75);
            let iqr = q3 - q1;
            report.lower_fence = q1 - self.iqr_multiplier * iqr;
            report.upper_fence = q3 + self.iqr_multiplier * iqr;
            for v in values.iter_mut() {
                if *v < report.lower_fence || *v > report.upper_fence {
                    *v = v.clamp(report.lower_fence, report.upper_fence);
                    report.clipped += 1;
                }
            }
        }

        (CleanSeries::new(timestamps, values), report)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Observed points relative to the expected daily count
pub fn completeness(series: &CleanSeries) -> f64 {
    match series.len() {
        0 => 0.0,
        1 => 1.0,
        n => (n as f64 / (series.span_days() + 1.0)).clamp(0.0, 1.0),
    }
}

/// One minus the coefficient of variation, floored at zero
pub fn consistency(series: &CleanSeries) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    1.0 - stats::coefficient_of_variation(&series.values).min(1.0)
}

/// Linear decay over [`RECENCY_HORIZON_DAYS`] since the last observation
pub fn recency(series: &CleanSeries, reference: NaiveDateTime) -> f64 {
    match series.last_timestamp() {
        Some(last) => {
            let days = (reference - last).num_days().max(0) as f64;
            (1.0 - days / RECENCY_HORIZON_DAYS).max(0.0)
        }
        None => 0.0,
    }
}

/// Mean of completeness, consistency and recency, in [0, 1]
pub fn data_quality_score(series: &CleanSeries, reference: NaiveDateTime) -> f64 {
    let score = (completeness(series) + consistency(series) + recency(series, reference)) / 3.0;
    score.clamp(0.0, 1.0)
}

pub fn evidence_quality(series: &CleanSeries) -> EvidenceQuality {
    EvidenceQuality::from_count(series.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use trend_spi::DataPoint;

    fn day(d: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(d)
    }

    #[test]
    fn test_drops_nulls_and_non_finite() {
        let series = TimeSeries::new(vec![
            DataPoint::new(day(0), 1.0),
            DataPoint::missing(day(1)),
            DataPoint::new(day(2), f64::NAN),
            DataPoint::new(day(3), 2.0),
        ]);
        let (clean, report) = Preprocessor::new().clean(&series);
        assert_eq!(clean.values, vec![1.0, 2.0]);
        assert_eq!(report.dropped_nulls, 2);
    }

    #[test]
    fn test_sorts_and_keeps_first_duplicate() {
        let series = TimeSeries::from_pairs(vec![
            (day(2), 3.0),
            (day(0), 1.0),
            (day(2), 99.0),
            (day(1), 2.0),
        ]);
        let (clean, report) = Preprocessor::new().clean(&series);
        assert_eq!(clean.timestamps, vec![day(0), day(1), day(2)]);
        assert_eq!(clean.values, vec![1.0, 2.0, 3.0]);
        assert_eq!(report.dropped_duplicates, 1);
    }

    #[test]
    fn test_clips_outliers_without_removing() {
        let mut values: Vec<f64> = (0..23).map(|i| 10.0 + (i % 5) as f64).collect();
        values.push(1000.0);
        let series = TimeSeries::from_values(day(0), &values);
        let (clean, report) = Preprocessor::new().clean(&series);
        assert_eq!(clean.len(), values.len());
        assert_eq!(report.clipped, 1);
        assert!(clean.values.iter().all(|v| *v <= report.upper_fence));
        // caller's series untouched
        assert_eq!(series.points.last().unwrap().value, Some(1000.0));
    }

    #[test]
    fn test_quality_components() {
        let series = TimeSeries::from_values(day(0), &[5.0; 10]);
        let (clean, _) = Preprocessor::new().clean(&series);
        assert_eq!(completeness(&clean), 1.0);
        assert_eq!(consistency(&clean), 1.0);
        assert_eq!(recency(&clean, day(9)), 1.0);
        assert!((recency(&clean, day(24)) - 0.5).abs() < 1e-12);
        assert_eq!(recency(&clean, day(100)), 0.0);
        assert!((data_quality_score(&clean, day(24)) - 2.5 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_completeness_with_gaps() {
        let clean = CleanSeries::new(vec![day(0), day(9)], vec![1.0, 2.0]);
        assert!((completeness(&clean) - 0.2).abs() < 1e-12);
        assert_eq!(completeness(&CleanSeries::default()), 0.0);
        assert_eq!(data_quality_score(&CleanSeries::default(), day(0)), 0.0);
    }

    #[test]
    fn test_evidence_quality_thresholds() {
        let make = |n: usize| {
            let (clean, _) =
                Preprocessor::new().clean(&TimeSeries::from_values(day(0), &vec![1.0; n]));
            evidence_quality(&clean)
        };
        assert_eq!(make(30), EvidenceQuality::Strong);
        assert_eq!(make(14), EvidenceQuality::Moderate);
        assert_eq!(make(13), EvidenceQuality::Weak);
    }
}
