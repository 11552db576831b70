//! Change-point detection and merging

use crate::stats;
use chrono::{Duration, NaiveDateTime};
use trend_spi::{ChangePoint, ChangePointDetector, CleanSeries, Result, ShiftDirection};
use tracing::debug;

pub const CUSUM: &str = "cusum";
pub const SLIDING_WINDOW: &str = "sliding_window";

/// Default grouping distance for [`merge_change_points`]
pub const DEFAULT_MERGE_WINDOW_DAYS: i64 = 7;

/// Shift from `before` to `after` relative to `|before|` (absolute if zero)
pub fn relative_shift(before: f64, after: f64) -> f64 {
    let delta = after - before;
    if before.abs() > f64::EPSILON {
        delta / before.abs()
    } else {
        delta
    }
}

/// Peaks of the cumulative deviation from the mean
#[derive(Debug, Clone, Copy)]
pub struct CusumDetector {
    threshold_sigmas: f64,
    window: usize,
}

impl CusumDetector {
    pub fn new() -> Self {
        Self {
            threshold_sigmas: 2.0,
            window: 5,
        }
    }

    pub fn with_threshold_sigmas(mut self, sigmas: f64) -> Self {
        self.threshold_sigmas = sigmas;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(2);
        self
    }
}

impl Default for CusumDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangePointDetector for CusumDetector {
    fn name(&self) -> &str {
        CUSUM
    }

    fn min_points(&self) -> usize {
        10
    }

    fn detect(&self, series: &CleanSeries) -> Result<Vec<ChangePoint>> {
        let values = &series.values;
        let n = values.len();
        if n < self.min_points() {
            return Ok(Vec::new());
        }
        let std = stats::std_dev(values);
        if std <= f64::EPSILON {
            return Ok(Vec::new());
        }
        let mean = stats::mean(values);
        let magnitude: Vec<f64> = values
            .iter()
            .scan(0.0, |acc, v| {
                *acc += v - mean;
                Some(acc.abs())
            })
            .collect();
        let threshold = self.threshold_sigmas * std;

        let mut points = Vec::new();
        for peak in 1..n - 1 {
            let m = magnitude[peak];
            if m <= threshold || m <= magnitude[peak - 1] || m < magnitude[peak + 1] {
                continue;
            }
            let idx = peak + 1;
            let before = &values[idx.saturating_sub(self.window)..idx];
            let after = &values[idx..(idx + self.window).min(n)];
            if before.is_empty() || after.is_empty() {
                continue;
            }
            let (mean_before, mean_after) = (stats::mean(before), stats::mean(after));
            let spread = stats::std_dev(before) + stats::std_dev(after) + 1.0;
            let confidence = (100.0 * (mean_after - mean_before).abs() / spread).min(100.0);
            points.push(ChangePoint::new(
                series.timestamps[idx],
                confidence,
                relative_shift(mean_before, mean_after),
                self.name(),
            ));
        }
        Ok(points)
    }
}

/// Two-sample Welch test between adjacent sliding windows
#[derive(Debug, Clone, Copy)]
pub struct SlidingWindowDetector {
    min_window: usize,
    alpha: f64,
}

impl SlidingWindowDetector {
    pub fn new() -> Self {
        Self {
            min_window: 5,
            alpha: 0.01,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn window_for(&self, n: usize) -> usize {
        self.min_window.max(n / 10)
    }
}

impl Default for SlidingWindowDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangePointDetector for SlidingWindowDetector {
    fn name(&self) -> &str {
        SLIDING_WINDOW
    }

    fn min_points(&self) -> usize {
        20
    }

    fn detect(&self, series: &CleanSeries) -> Result<Vec<ChangePoint>> {
        let values = &series.values;
        let n = values.len();
        if n < self.min_points() {
            return Ok(Vec::new());
        }
        let w = self.window_for(n);
        let mut points = Vec::new();
        for i in w..=(n - w) {
            let before = &values[i - w..i];
            let after = &values[i..i + w];
            let p = stats::ensure_probability(stats::welch_t_test(before, after)?, "Welch p-value")?;
            if p < self.alpha {
                points.push(ChangePoint::new(
                    series.timestamps[i],
                    (1.0 - p) * 100.0,
                    relative_shift(stats::mean(before), stats::mean(after)),
                    self.name(),
                ));
            }
        }
        Ok(points)
    }
}

/// Collapse a group of nearby candidates into one change point
fn merge_group(group: &[ChangePoint]) -> ChangePoint {
    let mut best = &group[0];
    for point in &group[1..] {
        if point.confidence > best.confidence {
            best = point;
        }
    }

    let total_confidence: f64 = group.iter().map(|p| p.confidence).sum();
    let magnitude = if total_confidence > 0.0 {
        group.iter().map(|p| p.magnitude * p.confidence).sum::<f64>() / total_confidence
    } else {
        group.iter().map(|p| p.magnitude).sum::<f64>() / group.len() as f64
    };

    let increases = group
        .iter()
        .filter(|p| p.direction == ShiftDirection::Increase)
        .count();
    let decreases = group.len() - increases;
    let direction = match increases.cmp(&decreases) {
        std::cmp::Ordering::Greater => ShiftDirection::Increase,
        std::cmp::Ordering::Less => ShiftDirection::Decrease,
        std::cmp::Ordering::Equal => ShiftDirection::from_magnitude(magnitude),
    };

    let mut methods: Vec<&str> = group.iter().flat_map(|p| p.methods()).collect();
    methods.sort_unstable();
    methods.dedup();

    ChangePoint {
        timestamp: best.timestamp,
        confidence: group
            .iter()
            .map(|p| p.confidence)
            .fold(0.0, f64::max)
            .clamp(0.0, 100.0),
        magnitude,
        direction,
        method: methods.join("+"),
    }
}

/// Merge candidates closer than `window_days` to their group's last member
///
/// The output is sorted by timestamp and no two points lie within the window.
pub fn merge_change_points(mut points: Vec<ChangePoint>, window_days: i64) -> Vec<ChangePoint> {
    if points.is_empty() {
        return points;
    }
    points.sort_by_key(|p| p.timestamp);
    let window = Duration::days(window_days);

    let mut merged = Vec::new();
    let mut group: Vec<ChangePoint> = Vec::new();
    for point in points {
        if let Some(last) = group.last() {
            if point.timestamp - last.timestamp > window {
                merged.push(merge_group(&group));
                group.clear();
            }
        }
        group.push(point);
    }
    if !group.is_empty() {
        merged.push(merge_group(&group));
    }
    merged
}

/// Timestamps of confident, large (over 20%) shifts
pub fn structural_breaks(points: &[ChangePoint]) -> Vec<NaiveDateTime> {
    points
        .iter()
        .filter(|p| p.confidence > 80.0 && p.magnitude.abs() > 0.2)
        .map(|p| p.timestamp)
        .collect()
}

/// Runs all detectors and merges their output
pub struct ChangePointAnalyzer {
    detectors: Vec<Box<dyn ChangePointDetector>>,
    merge_window_days: i64,
}

impl ChangePointAnalyzer {
    pub fn new(detectors: Vec<Box<dyn ChangePointDetector>>, merge_window_days: i64) -> Self {
        Self {
            detectors,
            merge_window_days,
        }
    }

    pub fn detect(&self, series: &CleanSeries) -> Result<Vec<ChangePoint>> {
        let mut candidates = Vec::new();
        for detector in &self.detectors {
            let found = detector.detect(series)?;
            debug!(detector = detector.name(), count = found.len(), "change-point candidates");
            candidates.extend(found);
        }
        Ok(merge_change_points(candidates, self.merge_window_days))
    }
}

impl Default for ChangePointAnalyzer {
    fn default() -> Self {
        Self::new(
            vec![
                Box::new(CusumDetector::new()),
                Box::new(SlidingWindowDetector::new()),
            ],
            DEFAULT_MERGE_WINDOW_DAYS,
        )
    }
}
