//! Seasonal-trend decomposition by LOESS
//!
//! Local linear LOESS with tricube weights, a weekly period and two inner
//! passes without robustness iterations.

use crate::decomposition::{ensure_decomposable, MIN_DECOMPOSITION_POINTS, WEEKLY_PERIOD};
use trend_spi::{CleanSeries, Decomposer, DecompositionMethod, Result, TrendDecomposition, TrendError};

fn next_odd(x: f64) -> usize {
    let n = x.ceil().max(1.0) as usize;
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

fn tricube(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        (1.0 - u.powi(3)).powi(3)
    }
}

/// Local linear LOESS estimate at position `x0` over `ys` observed at 0..n
fn loess_at(ys: &[f64], window: usize, x0: f64) -> f64 {
    let n = ys.len();
    if n == 1 {
        return ys[0];
    }
    let q = window.clamp(2, n);
    let centre = x0.round().clamp(0.0, (n - 1) as f64) as usize;
    let lo = centre.saturating_sub(q / 2).min(n - q);
    let hi = lo + q - 1;

    let mut h = (x0 - lo as f64).abs().max((hi as f64 - x0).abs());
    if window > n {
        h += (window - n) as f64 / 2.0;
    }
    // Keep the outermost neighbour in the fit
    let h = h * 1.001 + f64::EPSILON;

    let mut sw = 0.0;
    let mut swx = 0.0;
    let mut swy = 0.0;
    let weights: Vec<(f64, f64, f64)> = (lo..=hi)
        .map(|i| {
            let x = i as f64;
            let w = tricube((x - x0).abs() / h);
            sw += w;
            swx += w * x;
            swy += w * ys[i];
            (w, x, ys[i])
        })
        .collect();
    if sw <= 0.0 {
        return ys[centre];
    }
    let x_bar = swx / sw;
    let y_bar = swy / sw;
    let (sxx, sxy) = weights.iter().fold((0.0, 0.0), |(sxx, sxy), (w, x, y)| {
        (sxx + w * (x - x_bar).powi(2), sxy + w * (x - x_bar) * (y - y_bar))
    });
    if sxx <= f64::EPSILON {
        return y_bar;
    }
    y_bar + sxy / sxx * (x0 - x_bar)
}

fn loess(ys: &[f64], window: usize) -> Vec<f64> {
    (0..ys.len()).map(|i| loess_at(ys, window, i as f64)).collect()
}

fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Seasonal-trend decomposition by LOESS
#[derive(Debug, Clone)]
pub struct StlDecomposer {
    period: usize,
    seasonal_window: Option<usize>,
    inner_passes: usize,
}

impl StlDecomposer {
    pub fn new() -> Self {
        Self {
            period: WEEKLY_PERIOD,
            seasonal_window: None,
            inner_passes: 2,
        }
    }

    pub fn with_seasonal_window(mut self, window: usize) -> Self {
        self.seasonal_window = Some(window);
        self
    }

    /// 13 for sub-annual series, 365 for a year or more of data
    pub fn seasonal_window_for(&self, n: usize) -> usize {
        match self.seasonal_window {
            Some(w) => w.max(3) | 1,
            None if n >= 365 => 365,
            None => 13,
        }
    }

    fn trend_window(&self, seasonal_window: usize) -> usize {
        let p = self.period as f64;
        next_odd(1.5 * p / (1.0 - 1.5 / seasonal_window as f64))
    }

    /// Smooth each cycle-subseries, extended one period at both ends
    fn cycle_subseries(&self, detrended: &[f64], window: usize) -> Vec<f64> {
        let n = detrended.len();
        let p = self.period;
        let mut extended = vec![0.0; n + 2 * p];
        for phase in 0..p {
            let sub: Vec<f64> = detrended.iter().skip(phase).step_by(p).copied().collect();
            if sub.is_empty() {
                continue;
            }
            let m = sub.len();
            for k in 0..(m + 2) {
                let idx = k * p + phase;
                if idx < extended.len() {
                    extended[idx] = loess_at(&sub, window, k as f64 - 1.0);
                }
            }
        }
        extended
    }

    fn low_pass(&self, cycle: &[f64], n: usize) -> Vec<f64> {
        let p = self.period;
        let smoothed = moving_average(&moving_average(&moving_average(cycle, p), p), 3);
        debug_assert_eq!(smoothed.len(), n);
        loess(&smoothed, next_odd(p as f64))
    }
}

impl Default for StlDecomposer {
    fn default() -> Self {
        Self::new()
    }
}

impl Decomposer for StlDecomposer {
    fn method(&self) -> DecompositionMethod {
        DecompositionMethod::Primary
    }

    fn min_points(&self) -> usize {
        MIN_DECOMPOSITION_POINTS.max(2 * self.period)
    }

    fn decompose(&self, series: &CleanSeries) -> Result<TrendDecomposition> {
        ensure_decomposable(series)?;
        let y = &series.values;
        let n = y.len();
        if n < self.min_points() {
            return Err(TrendError::InsufficientData {
                required: self.min_points(),
                actual: n,
            });
        }

        let ns = self.seasonal_window_for(n);
        let nt = self.trend_window(ns);
        let p = self.period;

        let mut trend = vec![0.0; n];
        let mut seasonal = vec![0.0; n];
        for _ in 0..self.inner_passes {
            let detrended: Vec<f64> = y.iter().zip(&trend).map(|(v, t)| v - t).collect();
            let cycle = self.cycle_subseries(&detrended, ns);
            let low = self.low_pass(&cycle, n);
            seasonal = (0..n).map(|i| cycle[i + p] - low[i]).collect();
            let deseasonalised: Vec<f64> = y.iter().zip(&seasonal).map(|(v, s)| v - s).collect();
            trend = loess(&deseasonalised, nt);
        }

        let residual: Vec<f64> = (0..n).map(|i| y[i] - trend[i] - seasonal[i]).collect();
        if trend.iter().chain(&seasonal).any(|v| !v.is_finite()) {
            return Err(TrendError::Decomposition(
                "LOESS produced non-finite components".to_string(),
            ));
        }

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
