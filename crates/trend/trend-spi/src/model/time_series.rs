//! Raw and cleaned time series

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A single raw observation; `None` marks a missing value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

impl DataPoint {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }

    pub fn missing(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            value: None,
        }
    }

    /// The value if it is present and finite
    pub fn usable_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

/// Caller-owned raw series. May be unsorted and contain gaps or duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub points: Vec<DataPoint>,
}

impl TimeSeries {
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self { points }
    }

    /// Build from `(timestamp, value)` pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDateTime, f64)>,
    {
        Self {
            points: pairs
                .into_iter()
                .map(|(timestamp, value)| DataPoint::new(timestamp, value))
                .collect(),
        }
    }

    /// Build a daily series starting at `start`
    pub fn from_values(start: NaiveDateTime, values: &[f64]) -> Self {
        Self::from_pairs(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (start + Duration::days(i as i64), v)),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Preprocessed series: strictly increasing timestamps, no missing values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanSeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub values: Vec<f64>,
}

impl CleanSeries {
    /// Create from parallel vectors. Callers must uphold the ordering invariant.
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        Self { timestamps, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    /// Fractional days elapsed since the first observation
    pub fn day_offsets(&self) -> Vec<f64> {
        match self.first_timestamp() {
            Some(first) => self
                .timestamps
                .iter()
                .map(|&t| (t - first).num_seconds() as f64 / SECONDS_PER_DAY)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Days between the first and last observation
    pub fn span_days(&self) -> f64 {
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => (last - first).num_seconds() as f64 / SECONDS_PER_DAY,
            _ => 0.0,
        }
    }

    /// Average spacing between observations in days (1.0 when undefined)
    pub fn mean_step_days(&self) -> f64 {
        if self.len() < 2 {
            return 1.0;
        }
        let step = self.span_days() / (self.len() - 1) as f64;
        if step > 0.0 {
            step
        } else {
            1.0
        }
    }

    /// Sub-series of the last `count` observations
    pub fn tail(&self, count: usize) -> CleanSeries {
        let start = self.len().saturating_sub(count);
        CleanSeries {
            timestamps: self.timestamps[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_from_values_is_daily() {
        let series = TimeSeries::from_values(start(), &[1.0, 2.0, 3.0]);
        assert_eq!(series.len(), 3);
        assert_eq!(
            series.points[2].timestamp - series.points[0].timestamp,
            Duration::days(2)
        );
    }

    #[test]
    fn test_usable_value_filters_nan() {
        let t = start();
        assert_eq!(DataPoint::new(t, 4.0).usable_value(), Some(4.0));
        assert_eq!(DataPoint::new(t, f64::NAN).usable_value(), None);
        assert_eq!(DataPoint::missing(t).usable_value(), None);
    }

    #[test]
    fn test_day_offsets_and_span() {
        let t = start();
        let series = CleanSeries::new(
            vec![t, t + Duration::hours(12), t + Duration::days(3)],
            vec![1.0, 2.0, 3.0],
        );
        assert_eq!(series.day_offsets(), vec![0.0, 0.5, 3.0]);
        assert_eq!(series.span_days(), 3.0);
        assert_eq!(series.mean_step_days(), 1.5);
    }

    #[test]
    fn test_mean_step_days_degenerate() {
        let series = CleanSeries::new(vec![start()], vec![1.0]);
        assert_eq!(series.mean_step_days(), 1.0);
        assert!(CleanSeries::default().day_offsets().is_empty());
    }

    #[test]
    fn test_tail() {
        let series = TimeSeries::from_values(start(), &[1.0, 2.0, 3.0, 4.0]);
        let clean = CleanSeries::new(
            series.points.iter().map(|p| p.timestamp).collect(),
            vec![1.0, 2.0, 3.0, 4.0],
        );
        let tail = clean.tail(2);
        assert_eq!(tail.values, vec![3.0, 4.0]);
        assert_eq!(clean.tail(10).len(), 4);
    }
}
