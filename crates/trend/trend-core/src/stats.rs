//! Shared statistical helpers
//!
//! Descriptive statistics, ordinary least squares and the distribution
//! functions (via `statrs`) used by the validators and detectors.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};
use trend_spi::{Result, TrendError};

/// Relative tolerance below which a sum of squares counts as zero
const FLAT_TOLERANCE: f64 = 1e-12;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator); 0 for fewer than two values
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Population variance (n denominator)
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Standard deviation over absolute mean; 0 when the mean is 0
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m.abs() < f64::EPSILON {
        return 0.0;
    }
    std_dev(values) / m.abs()
}

/// True when every value equals the first within floating tolerance
pub fn is_constant(values: &[f64]) -> bool {
    let Some(&first) = values.first() else {
        return true;
    };
    let scale = first.abs().max(1.0);
    values
        .iter()
        .all(|v| (v - first).abs() <= FLAT_TOLERANCE * scale)
}

/// Linearly interpolated quantile of already sorted values
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

pub fn median(values: &[f64]) -> f64 {
    quantile_sorted(&sorted(values), 0.5)
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| TrendError::Numerical(e.to_string()))
}

fn students_t(df: f64) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, df).map_err(|e| TrendError::Numerical(e.to_string()))
}

pub fn normal_cdf(x: f64) -> Result<f64> {
    Ok(standard_normal()?.cdf(x))
}

pub fn normal_quantile(p: f64) -> Result<f64> {
    Ok(standard_normal()?.inverse_cdf(p))
}

/// Two-sided p-value of a standard normal statistic
pub fn normal_two_sided_p(z: f64) -> Result<f64> {
    let z = TrendError::ensure_finite(z, "z statistic")?;
    Ok((2.0 * (1.0 - normal_cdf(z.abs())?)).clamp(0.0, 1.0))
}

/// Two-sided p-value of a Student-t statistic
pub fn t_two_sided_p(t: f64, df: f64) -> Result<f64> {
    if t.is_infinite() {
        return Ok(0.0);
    }
    let t = TrendError::ensure_finite(t, "t statistic")?;
    let dist = students_t(df)?;
    Ok((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

pub fn t_quantile(p: f64, df: f64) -> Result<f64> {
    Ok(students_t(df)?.inverse_cdf(p))
}

/// Upper-tail p-value of an F statistic
pub fn f_upper_p(f: f64, df_between: f64, df_within: f64) -> Result<f64> {
    let f = TrendError::ensure_finite(f, "F statistic")?;
    let dist = FisherSnedecor::new(df_between, df_within)
        .map_err(|e| TrendError::Numerical(e.to_string()))?;
    Ok((1.0 - dist.cdf(f.max(0.0))).clamp(0.0, 1.0))
}

/// Fail with `Numerical` unless `p` is a finite probability; clamps rounding spill
pub fn ensure_probability(p: f64, what: &str) -> Result<f64> {
    Ok(TrendError::ensure_finite(p, what)?.clamp(0.0, 1.0))
}

/// Ordinary least squares fit of `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OlsFit {
    pub slope: f64,
    pub intercept: f64,
    /// Standard error of the slope
    pub slope_se: f64,
    /// Residual standard error, sqrt(SSE / (n - 2)); 0 for n <= 2
    pub residual_se: f64,
    pub r_squared: f64,
    pub n: usize,
    flat: bool,
}

impl OlsFit {
    /// Fit against explicit regressors. `None` when x has no spread.
    pub fn fit(x: &[f64], y: &[f64]) -> Option<Self> {
        let n = x.len().min(y.len());
        if n < 2 {
            return None;
        }
        let (x, y) = (&x[..n], &y[..n]);
        let x_mean = mean(x);
        let y_mean = mean(y);
        let sxx: f64 = x.iter().map(|xi| (xi - x_mean).powi(2)).sum();
        if sxx <= f64::EPSILON {
            return None;
        }
        let sxy: f64 = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
            .sum();
        let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
        let flat = ss_tot <= FLAT_TOLERANCE * (1.0 + y_mean * y_mean) * n as f64;

        let slope = if flat { 0.0 } else { sxy / sxx };
        let intercept = y_mean - slope * x_mean;
        let ss_res: f64 = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (yi - (intercept + slope * xi)).powi(2))
            .sum();

        let residual_se = if n > 2 {
            (ss_res / (n - 2) as f64).sqrt()
        } else {
            0.0
        };
        let slope_se = residual_se / sxx.sqrt();
        let r_squared = if flat || ss_tot <= 0.0 {
            1.0
        } else {
            (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
        };

        Some(Self {
            slope,
            intercept,
            slope_se,
            residual_se,
            r_squared,
            n,
            flat,
        })
    }

    /// Fit against the positions 0, 1, 2, ...
    pub fn fit_index(y: &[f64]) -> Option<Self> {
        let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
        Self::fit(&x, y)
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// True when the response had no variation
    pub fn is_flat(&self) -> bool {
        self.flat
    }

    /// Two-sided p-value for H0: slope = 0
    pub fn slope_p_value(&self) -> Result<f64> {
        if self.n < 3 || self.flat {
            return Ok(1.0);
        }
        if self.slope_se <= 0.0 {
            // Exact fit of a non-constant response
            return Ok(0.0);
        }
        t_two_sided_p(self.slope / self.slope_se, (self.n - 2) as f64)
    }

    /// Student-t confidence interval for the slope
    pub fn slope_confidence_interval(&self, level: f64) -> Result<(f64, f64)> {
        if self.n < 3 {
            return Ok((f64::NEG_INFINITY, f64::INFINITY));
        }
        let t = t_quantile(1.0 - (1.0 - level) / 2.0, (self.n - 2) as f64)?;
        let half = t * self.slope_se;
        Ok((self.slope - half, self.slope + half))
    }
}

/// Welch two-sample t-test; returns the two-sided p-value
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() < 2 || b.len() < 2 {
        return Ok(1.0);
    }
    let (ma, mb) = (mean(a), mean(b));
    let (va, vb) = (variance(a) / a.len() as f64, variance(b) / b.len() as f64);
    let se2 = va + vb;
    let scale = ma.abs().max(mb.abs()).max(1.0);
    if se2 <= FLAT_TOLERANCE * scale * scale {
        // Both samples constant: any difference in level is certain
        return Ok(if (ma - mb).abs() > FLAT_TOLERANCE * scale {
            0.0
        } else {
            1.0
        });
    }
    let t = (mb - ma) / se2.sqrt();
    let df_den = va * va / (a.len() - 1) as f64 + vb * vb / (b.len() - 1) as f64;
    let df = if df_den > 0.0 {
        se2 * se2 / df_den
    } else {
        (a.len() + b.len() - 2) as f64
    };
    t_two_sided_p(t, df.max(1.0))
}

/// Result of a one-way ANOVA
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anova {
    pub f_statistic: f64,
    pub p_value: f64,
    /// Between-group share of the total sum of squares
    pub eta_squared: f64,
}

/// One-way ANOVA across non-empty groups. `None` when it cannot be computed.
pub fn one_way_anova(groups: &[Vec<f64>]) -> Result<Option<Anova>> {
    let groups: Vec<&Vec<f64>> = groups.iter().filter(|g| !g.is_empty()).collect();
    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || total <= k {
        return Ok(None);
    }
    let all: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let grand = mean(&all);
    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();
    let ss_total = ss_between + ss_within;
    if ss_total <= FLAT_TOLERANCE * (1.0 + grand * grand) * total as f64 {
        return Ok(Some(Anova {
            f_statistic: 0.0,
            p_value: 1.0,
            eta_squared: 0.0,
        }));
    }
    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let eta_squared = (ss_between / ss_total).clamp(0.0, 1.0);
    if ss_within <= 0.0 {
        return Ok(Some(Anova {
            f_statistic: f64::INFINITY,
            p_value: 0.0,
            eta_squared,
        }));
    }
    let f_statistic = (ss_between / df_between) / (ss_within / df_within);
    let p_value = f_upper_p(f_statistic, df_between, df_within)?;
    Ok(Some(Anova {
        f_statistic,
        p_value,
        eta_squared,
    }))
}

/// Solve `a x = b` by Gaussian elimination with partial pivoting.
/// `None` when the system is singular relative to its largest entry.
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(f64::MIN_POSITIVE);
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-10 * scale {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptive() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&data), 5.0);
        assert!((population_variance(&data) - 4.0).abs() < 1e-12);
        assert!((variance(&data) - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(median(&data), 4.5);
    }

    #[test]
    fn test_quantile_interpolates() {
        let data = sorted(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(quantile_sorted(&data, 0.0), 1.0);
        assert_eq!(quantile_sorted(&data, 1.0), 4.0);
        assert!((quantile_sorted(&data, 0.25) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_cv_zero_mean() {
        assert_eq!(coefficient_of_variation(&[-1.0, 1.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_is_constant() {
        assert!(is_constant(&[50.0; 10]));
        assert!(!is_constant(&[50.0, 50.0, 50.1]));
        assert!(is_constant(&[]));
    }

    #[test]
    fn test_ols_exact_line() {
        let y: Vec<f64> = (0..10).map(|i| 3.0 + 2.0 * i as f64).collect();
        let fit = OlsFit::fit_index(&y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-10);
        assert!((fit.intercept - 3.0).abs() < 1e-10);
        assert!((fit.r_squared - 1.0).abs() < 1e-10);
        assert!(fit.slope_p_value().unwrap() < 1e-6);
    }

    #[test]
    fn test_ols_constant_response() {
        let fit = OlsFit::fit_index(&[7.0; 12]).unwrap();
        assert!(fit.is_flat());
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.slope_p_value().unwrap(), 1.0);
    }

    #[test]
    fn test_ols_needs_spread() {
        assert!(OlsFit::fit(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(OlsFit::fit_index(&[1.0]).is_none());
    }

    #[test]
    fn test_ols_confidence_interval_contains_slope() {
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0, 8.0, 7.0];
        let fit = OlsFit::fit_index(&y).unwrap();
        let (lo, hi) = fit.slope_confidence_interval(0.95).unwrap();
        assert!(lo < fit.slope && fit.slope < hi);
    }

    #[test]
    fn test_normal_two_sided() {
        let p = normal_two_sided_p(1.959964).unwrap();
        assert!((p - 0.05).abs() < 1e-4);
        assert_eq!(normal_two_sided_p(0.0).unwrap(), 1.0);
        assert!(normal_two_sided_p(f64::NAN).is_err());
    }

    #[test]
    fn test_welch_identical_samples() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        assert!((welch_t_test(&a, &a).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_welch_constant_samples() {
        assert_eq!(welch_t_test(&[100.0; 5], &[130.0; 5]).unwrap(), 0.0);
        assert_eq!(welch_t_test(&[100.0; 5], &[100.0; 5]).unwrap(), 1.0);
    }

    #[test]
    fn test_welch_shifted_samples() {
        let a = vec![10.0, 11.0, 9.0, 10.5, 9.5, 10.0];
        let b = vec![20.0, 21.0, 19.0, 20.5, 19.5, 20.0];
        assert!(welch_t_test(&a, &b).unwrap() < 0.001);
    }

    #[test]
    fn test_anova_detects_group_difference() {
        let groups = vec![
            vec![1.0, 1.1, 0.9, 1.0],
            vec![5.0, 5.1, 4.9, 5.0],
            vec![1.0, 0.9, 1.1, 1.0],
        ];
        let anova = one_way_anova(&groups).unwrap().unwrap();
        assert!(anova.p_value < 0.001);
        assert!(anova.eta_squared > 0.9);
    }

    #[test]
    fn test_anova_requires_two_groups() {
        assert!(one_way_anova(&[vec![1.0, 2.0]]).unwrap().is_none());
    }

    #[test]
    fn test_solve_linear_system() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let x = solve_linear_system(a, vec![3.0, 5.0]).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
        assert!(solve_linear_system(vec![vec![1.0, 2.0], vec![2.0, 4.0]], vec![1.0, 2.0]).is_none());
    }
}
