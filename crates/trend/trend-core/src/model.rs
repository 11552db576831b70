//! Probabilistic trend model
//!
//! Holt's linear exponential smoothing with analytical ETS(A,A,N)
//! prediction intervals, memoised per engine in a bounded [`ModelCache`].

use crate::stats::OlsFit;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use tracing::debug;
use trend_spi::{
    CleanSeries, FittedTrendModel, ForecastInterval, Result, TrendError, TrendModelStrategy,
};

pub const HOLT_LINEAR: &str = "holt_linear";

/// Minimum observations for a Holt fit
pub const MIN_MODEL_POINTS: usize = 5;

/// 97.5% standard normal quantile
const Z_95: f64 = 1.959_963_984_540_054;

const GRID_STEPS: usize = 20;

/// Leading observations used to seed the initial trend
const SEED_POINTS: usize = 7;

/// Holt's linear trend model fitted to a cleaned series
#[derive(Debug, Clone)]
pub struct HoltTrendModel {
    alpha: f64,
    beta: f64,
    level: f64,
    trend: f64,
    sigma2: f64,
    step_days: f64,
    levels: Vec<f64>,
    residuals: Vec<f64>,
}

struct HoltPass {
    level: f64,
    trend: f64,
    sse: f64,
    levels: Vec<f64>,
    residuals: Vec<f64>,
}

/// Least-squares slope over the first few observations
fn initial_trend(data: &[f64]) -> f64 {
    let seed = &data[..data.len().min(SEED_POINTS)];
    OlsFit::fit_index(seed).map_or(data[1] - data[0], |fit| fit.slope)
}

fn holt_pass(data: &[f64], initial_trend: f64, alpha: f64, beta: f64) -> HoltPass {
    let mut level = data[0];
    let mut trend = initial_trend;
    let mut levels = Vec::with_capacity(data.len());
    let mut residuals = Vec::with_capacity(data.len() - 1);
    let mut sse = 0.0;
    levels.push(level);

    for &value in &data[1..] {
        let error = value - (level + trend);
        sse += error * error;
        residuals.push(error);

        let prev_level = level;
        level = alpha * value + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        levels.push(level);
    }

    HoltPass {
        level,
        trend,
        sse,
        levels,
        residuals,
    }
}

impl HoltTrendModel {
    /// Fit with (alpha, beta) chosen by grid search over one-step SSE
    pub fn fit(series: &CleanSeries) -> Result<Self> {
        let data = &series.values;
        if data.len() < MIN_MODEL_POINTS {
            return Err(TrendError::InsufficientData {
                required: MIN_MODEL_POINTS,
                actual: data.len(),
            });
        }

        let seed_trend = initial_trend(data);
        let mut best: Option<(f64, f64, HoltPass)> = None;
        for a in 1..GRID_STEPS {
            for b in 1..GRID_STEPS {
                let alpha = a as f64 / GRID_STEPS as f64;
                let beta = b as f64 / GRID_STEPS as f64;
                let pass = holt_pass(data, seed_trend, alpha, beta);
                if !pass.sse.is_finite() {
                    continue;
                }
                if best.as_ref().map_or(true, |(_, _, p)| pass.sse < p.sse) {
                    best = Some((alpha, beta, pass));
                }
            }
        }
        let Some((alpha, beta, pass)) = best else {
            return Err(TrendError::ModelFit(
                "no smoothing parameters produced a finite error".to_string(),
            ));
        };

        // n - 1 one-step errors less the two smoothing parameters
        let dof = data.len().saturating_sub(3).max(1);
        let sigma2 = pass.sse / dof as f64;
        TrendError::ensure_finite(sigma2, "residual variance")?;

        Ok(Self {
            alpha,
            beta,
            level: pass.level,
            trend: pass.trend,
            sigma2,
            step_days: series.mean_step_days(),
            levels: pass.levels,
            residuals: pass.residuals,
        })
    }

    pub fn parameters(&self) -> (f64, f64) {
        (self.alpha, self.beta)
    }

    /// Final level and per-observation trend
    pub fn components(&self) -> (f64, f64) {
        (self.level, self.trend)
    }

    /// ETS(A,A,N) forecast variance `h` steps ahead
    fn forecast_variance(&self, h: f64) -> f64 {
        let (a, b) = (self.alpha, self.beta);
        self.sigma2 * (1.0 + (h - 1.0) * (a * a + a * b * h + b * b * h * (2.0 * h - 1.0) / 6.0))
    }
}

impl FittedTrendModel for HoltTrendModel {
    fn name(&self) -> &str {
        HOLT_LINEAR
    }

    fn fitted_trend(&self) -> &[f64] {
        &self.levels
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// `horizon` daily steps; irregular series are rescaled to observation steps
    fn predict(&self, horizon: usize) -> Result<Vec<ForecastInterval>> {
        (1..=horizon)
            .map(|day| {
                let h = day as f64 / self.step_days;
                let value = self.level + h * self.trend;
                let half = Z_95 * self.forecast_variance(h.max(1.0)).max(0.0).sqrt();
                Ok(ForecastInterval {
                    value: TrendError::ensure_finite(value, "forecast")?,
                    lower: value - half,
                    upper: value + half,
                })
            })
            .collect()
    }
}

/// Hash of a series' timestamps and exact value bits
pub fn series_key(series: &CleanSeries) -> u64 {
    let mut hasher = DefaultHasher::new();
    series.len().hash(&mut hasher);
    for (ts, value) in series.timestamps.iter().zip(&series.values) {
        ts.hash(&mut hasher);
        value.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Timestamps equal and values bit-for-bit equal
fn same_series(a: &CleanSeries, b: &CleanSeries) -> bool {
    a.timestamps == b.timestamps
        && a.values.len() == b.values.len()
        && a.values
            .iter()
            .zip(&b.values)
            .all(|(x, y)| x.to_bits() == y.to_bits())
}

struct CachedFit {
    series: CleanSeries,
    model: Arc<dyn FittedTrendModel>,
}

#[derive(Default)]
struct CacheEntries {
    order: VecDeque<u64>,
    fits: HashMap<u64, CachedFit>,
}

/// Bounded FIFO memo of fitted models, owned by one engine
///
/// Entries are keyed by [`series_key`] but keep the series they were fitted
/// on, so a hash collision reads as a miss.
pub struct ModelCache {
    capacity: usize,
    entries: Mutex<CacheEntries>,
}

impl ModelCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(CacheEntries::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheEntries> {
        // Recover the guard if a previous holder panicked
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: u64, series: &CleanSeries) -> Option<Arc<dyn FittedTrendModel>> {
        self.lock()
            .fits
            .get(&key)
            .filter(|fit| same_series(&fit.series, series))
            .map(|fit| Arc::clone(&fit.model))
    }

    /// Store a fit; a colliding key is overwritten in place
    pub fn insert(&self, key: u64, series: &CleanSeries, model: Arc<dyn FittedTrendModel>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        let fit = CachedFit {
            series: series.clone(),
            model,
        };
        if entries.fits.insert(key, fit).is_some() {
            return;
        }
        entries.order.push_back(key);
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.fits.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().fits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.order.clear();
        entries.fits.clear();
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(32)
    }
}

/// Primary strategy: memoised Holt fits
pub struct HoltTrendStrategy {
    cache: ModelCache,
}

impl HoltTrendStrategy {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: ModelCache::new(cache_capacity),
        }
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }
}

impl Default for HoltTrendStrategy {
    fn default() -> Self {
        Self {
            cache: ModelCache::default(),
        }
    }
}

impl TrendModelStrategy for HoltTrendStrategy {
    fn name(&self) -> &str {
        HOLT_LINEAR
    }

    fn is_primary(&self) -> bool {
        true
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn fit(&self, series: &CleanSeries) -> Result<Option<Arc<dyn FittedTrendModel>>> {
        if series.len() < MIN_MODEL_POINTS {
            return Ok(None);
        }
        let key = series_key(series);
        if let Some(model) = self.cache.get(key, series) {
            debug!(key, "model cache hit");
            return Ok(Some(model));
        }
        let model: Arc<dyn FittedTrendModel> = Arc::new(HoltTrendModel::fit(series)?);
        self.cache.insert(key, series, Arc::clone(&model));
        Ok(Some(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn daily(values: Vec<f64>) -> CleanSeries {
        let timestamps = (0..values.len() as i64)
            .map(|i| start() + Duration::days(i))
            .collect();
        CleanSeries::new(timestamps, values)
    }

    #[test]
    fn test_holt_tracks_exact_line() {
        let series = daily((0..20).map(|i| 10.0 + 2.0 * i as f64).collect());
        let model = HoltTrendModel::fit(&series).unwrap();
        assert_eq!(model.fitted_trend().len(), 20);
        assert_eq!(model.residuals().len(), 19);
        let forecast = model.predict(3).unwrap();
        assert!((forecast[0].value - 50.0).abs() < 1e-9);
        assert!((forecast[2].value - 54.0).abs() < 1e-9);
        assert!((forecast[2].upper - forecast[2].lower).abs() < 1e-9);
    }

    #[test]
    fn test_holt_intervals_widen() {
        let series = daily(
            (0..30)
                .map(|i| 50.0 + 0.5 * i as f64 + if i % 3 == 0 { 1.5 } else { -0.7 })
                .collect(),
        );
        let model = HoltTrendModel::fit(&series).unwrap();
        let forecast = model.predict(7).unwrap();
        for step in &forecast {
            assert!(step.lower < step.value && step.value < step.upper);
        }
        let first = forecast[0].upper - forecast[0].lower;
        let last = forecast[6].upper - forecast[6].lower;
        assert!(last > first);
    }

    #[test]
    fn test_holt_requires_five_points() {
        let result = HoltTrendModel::fit(&daily(vec![1.0, 2.0, 3.0, 4.0]));
        assert!(matches!(
            result,
            Err(TrendError::InsufficientData {
                required: 5,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_series_key_depends_on_values() {
        let a = daily(vec![1.0, 2.0, 3.0]);
        let b = daily(vec![1.0, 2.0, 3.5]);
        assert_eq!(series_key(&a), series_key(&a.clone()));
        assert_ne!(series_key(&a), series_key(&b));
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let cache = ModelCache::new(2);
        let series = daily(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let model: Arc<dyn FittedTrendModel> = Arc::new(HoltTrendModel::fit(&series).unwrap());
        cache.insert(1, &series, Arc::clone(&model));
        cache.insert(2, &series, Arc::clone(&model));
        cache.insert(3, &series, Arc::clone(&model));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(1, &series).is_none());
        assert!(cache.get(3, &series).is_some());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_key_collision_is_a_miss() {
        let cache = ModelCache::new(4);
        let fitted = daily(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let other = daily(vec![1.0, 2.0, 3.0, 4.0, 6.0]);
        let model: Arc<dyn FittedTrendModel> = Arc::new(HoltTrendModel::fit(&fitted).unwrap());
        cache.insert(42, &fitted, Arc::clone(&model));

        assert!(cache.get(42, &other).is_none());
        assert!(cache.get(42, &fitted).is_some());

        let shifted = CleanSeries::new(
            fitted.timestamps.iter().map(|t| *t + Duration::hours(1)).collect(),
            fitted.values.clone(),
        );
        assert!(cache.get(42, &shifted).is_none());
    }

    #[test]
    fn test_holt_seed_ignores_first_step_noise() {
        let mut values: Vec<f64> = (0..20).map(|i| 50.0 + (i % 2) as f64).collect();
        values[1] = 60.0;
        assert!(initial_trend(&values).abs() < 1.5);

        let line: Vec<f64> = (0..20).map(|i| 3.0 * i as f64).collect();
        assert!((initial_trend(&line) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_strategy_memoises_fit() {
        let strategy = HoltTrendStrategy::new(4);
        let series = daily((0..12).map(|i| i as f64 * 1.5).collect());
        let first = strategy.fit(&series).unwrap().unwrap();
        let second = strategy.fit(&series).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(strategy.cache().len(), 1);
    }

    #[test]
    fn test_strategy_skips_short_series() {
        let strategy = HoltTrendStrategy::default();
        assert!(strategy.is_primary());
        assert!(strategy.fit(&daily(vec![1.0, 2.0])).unwrap().is_none());
    }

    #[test]
    fn test_strategy_cache_invalidation() {
        let strategy = HoltTrendStrategy::new(4);
        strategy
            .fit(&daily((0..12).map(|i| i as f64).collect()))
            .unwrap();
        assert_eq!(strategy.cache().len(), 1);
        strategy.clear_cache();
        assert!(strategy.cache().is_empty());
    }
}
