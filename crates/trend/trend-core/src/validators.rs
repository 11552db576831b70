//! Statistical trend tests
//!
//! Four independent validators over the cleaned values: Mann-Kendall,
//! Sen's slope, OLS regression and an augmented Dickey-Fuller
//! stationarity test. Each fails closed below its minimum length.

use crate::stats::{self, OlsFit};
use trend_spi::{Result, TrendError, TrendSign, TrendValidator, ValidationResult};

pub const MANN_KENDALL: &str = "mann_kendall";
pub const SENS_SLOPE: &str = "sens_slope";
pub const LINEAR_REGRESSION: &str = "linear_regression";
pub const AUGMENTED_DICKEY_FULLER: &str = "augmented_dickey_fuller";

/// Significance level shared by the validators
pub const ALPHA: f64 = 0.05;

/// Mann-Kendall S statistic
fn mann_kendall_s(values: &[f64]) -> f64 {
    let mut s = 0i64;
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            let d = values[j] - values[i];
            if d > 0.0 {
                s += 1;
            } else if d < 0.0 {
                s -= 1;
            }
        }
    }
    s as f64
}

fn mann_kendall_variance(n: usize) -> f64 {
    let n = n as f64;
    n * (n - 1.0) * (2.0 * n + 5.0) / 18.0
}

/// S and its continuity-corrected normal score
fn mann_kendall_z(values: &[f64]) -> (f64, f64) {
    let s = mann_kendall_s(values);
    let sd = mann_kendall_variance(values.len()).sqrt();
    let z = if s > 0.0 {
        (s - 1.0) / sd
    } else if s < 0.0 {
        (s + 1.0) / sd
    } else {
        0.0
    };
    (s, z)
}

/// Kendall's tau against time; 0 for fewer than two values
pub fn kendall_tau(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let pairs = (n * (n - 1)) as f64 / 2.0;
    (mann_kendall_s(values) / pairs).clamp(-1.0, 1.0)
}

/// Non-parametric monotonic trend test
#[derive(Debug, Clone, Copy, Default)]
pub struct MannKendall;

impl TrendValidator for MannKendall {
    fn name(&self) -> &str {
        MANN_KENDALL
    }

    fn min_points(&self) -> usize {
        3
    }

    fn validate(&self, values: &[f64]) -> Result<ValidationResult> {
        let n = values.len();
        if n < self.min_points() {
            return Ok(ValidationResult::insufficient(self.name(), self.min_points(), n));
        }

        let (s, z) = mann_kendall_z(values);
        let p_value = stats::normal_two_sided_p(z)?;
        let tau = kendall_tau(values);

        Ok(ValidationResult {
            test_name: self.name().to_string(),
            statistic: s,
            p_value,
            trend_detected: p_value < ALPHA,
            direction: TrendSign::of(s),
            confidence_interval: None,
            description: Some(format!("S = {s:.0}, z = {z:.3}, Kendall's tau = {tau:.3}")),
        })
    }
}

/// Median pairwise slope with a rank-based 95% interval
#[derive(Debug, Clone, Copy, Default)]
pub struct SensSlope;

impl SensSlope {
    /// All pairwise slopes `(v_j - v_i) / (j - i)`, sorted ascending
    pub fn pairwise_slopes(values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut slopes = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                slopes.push((values[j] - values[i]) / (j - i) as f64);
            }
        }
        slopes.sort_by(|a, b| a.total_cmp(b));
        slopes
    }
}

impl TrendValidator for SensSlope {
    fn name(&self) -> &str {
        SENS_SLOPE
    }

    fn min_points(&self) -> usize {
        3
    }

    fn validate(&self, values: &[f64]) -> Result<ValidationResult> {
        let n = values.len();
        if n < self.min_points() {
            return Ok(ValidationResult::insufficient(self.name(), self.min_points(), n));
        }

        let slopes = Self::pairwise_slopes(values);
        let slope = stats::quantile_sorted(&slopes, 0.5);

        let count = slopes.len() as f64;
        let c = stats::normal_quantile(1.0 - ALPHA / 2.0)? * mann_kendall_variance(n).sqrt();
        let last = slopes.len() - 1;
        let lower_rank = ((count - c) / 2.0).floor().max(0.0) as usize;
        let upper_rank = ((count + c) / 2.0).ceil().max(0.0) as usize;
        let lower = slopes[lower_rank.min(last)];
        let upper = slopes[upper_rank.min(last)];
        let detected = lower > 0.0 || upper < 0.0;
        // The interval inverts the Mann-Kendall test, so its z carries the p-value
        let (_, z) = mann_kendall_z(values);
        let p_value = stats::normal_two_sided_p(z)?;

        Ok(ValidationResult {
            test_name: self.name().to_string(),
            statistic: slope,
            p_value,
            trend_detected: detected,
            direction: TrendSign::of(slope),
            confidence_interval: Some((lower, upper)),
            description: Some(format!(
                "median slope {slope:.4} per step, 95% CI [{lower:.4}, {upper:.4}]"
            )),
        })
    }
}

/// OLS of value against index with a slope t-test
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRegressionTest;

impl TrendValidator for LinearRegressionTest {
    fn name(&self) -> &str {
        LINEAR_REGRESSION
    }

    fn min_points(&self) -> usize {
        3
    }

    fn validate(&self, values: &[f64]) -> Result<ValidationResult> {
        let n = values.len();
        if n < self.min_points() {
            return Ok(ValidationResult::insufficient(self.name(), self.min_points(), n));
        }
        let Some(fit) = OlsFit::fit_index(values) else {
            return Ok(ValidationResult::insufficient(self.name(), self.min_points(), n));
        };

        let p_value = stats::ensure_probability(fit.slope_p_value()?, "regression p-value")?;
        let ci = fit.slope_confidence_interval(1.0 - ALPHA)?;
        let detected = p_value < ALPHA;

        Ok(ValidationResult {
            test_name: self.name().to_string(),
            statistic: fit.slope,
            p_value,
            trend_detected: detected,
            direction: TrendSign::of(fit.slope),
            confidence_interval: Some(ci),
            description: Some(format!(
                "slope {:.4} per step, R² = {:.3}",
                fit.slope, fit.r_squared
            )),
        })
    }
}

/// Augmented Dickey-Fuller test with a constant and one lagged difference
///
/// A non-stationary series (unit root not rejected) counts as evidence
/// of a trend.
#[derive(Debug, Clone, Copy, Default)]
pub struct AugmentedDickeyFuller;

/// MacKinnon (1994) response surface, constant-only regression
const ADF_TAU_MAX: f64 = 2.74;
const ADF_TAU_MIN: f64 = -18.83;
const ADF_TAU_STAR: f64 = -1.61;
const ADF_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const ADF_LARGE_P: [f64; 4] = [1.7339, 0.093202, -0.012745, -0.00010368];

fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Approximate p-value of an ADF tau statistic
pub fn mackinnon_p_value(tau: f64) -> Result<f64> {
    if tau > ADF_TAU_MAX {
        return Ok(1.0);
    }
    if tau < ADF_TAU_MIN {
        return Ok(0.0);
    }
    let z = if tau <= ADF_TAU_STAR {
        polyval(&ADF_SMALL_P, tau)
    } else {
        polyval(&ADF_LARGE_P, tau)
    };
    stats::normal_cdf(z)
}

impl AugmentedDickeyFuller {
    /// Level coefficient and its standard error, or `None` if singular.
    /// The third field is true when the regression fits exactly.
    fn regress(values: &[f64], lagged: bool) -> Option<(f64, f64, bool)> {
        let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
        let start = usize::from(lagged);
        let rows: Vec<(Vec<f64>, f64)> = (start..diffs.len())
            .map(|t| {
                let mut x = vec![1.0, values[t]];
                if lagged {
                    x.push(diffs[t - 1]);
                }
                (x, diffs[t])
            })
            .collect();

        let k = if lagged { 3 } else { 2 };
        let m = rows.len();
        if m <= k {
            return None;
        }

        let mut xtx = vec![vec![0.0; k]; k];
        let mut xty = vec![0.0; k];
        for (x, y) in &rows {
            for i in 0..k {
                xty[i] += x[i] * y;
                for j in 0..k {
                    xtx[i][j] += x[i] * x[j];
                }
            }
        }

        let coefficients = stats::solve_linear_system(xtx.clone(), xty)?;
        let mut unit = vec![0.0; k];
        unit[1] = 1.0;
        let inverse_column = stats::solve_linear_system(xtx, unit)?;

        let ssr: f64 = rows
            .iter()
            .map(|(x, y)| {
                let fitted: f64 = x.iter().zip(&coefficients).map(|(a, b)| a * b).sum();
                (y - fitted).powi(2)
            })
            .sum();
        let response_ss: f64 = rows.iter().map(|(_, y)| y * y).sum();
        let exact = ssr <= 1e-10 * response_ss.max(f64::MIN_POSITIVE);
        let sigma2 = ssr / (m - k) as f64;
        let se = (sigma2 * inverse_column[1]).max(0.0).sqrt();
        Some((coefficients[1], se, exact))
    }
}

impl TrendValidator for AugmentedDickeyFuller {
    fn name(&self) -> &str {
        AUGMENTED_DICKEY_FULLER
    }

    fn min_points(&self) -> usize {
        10
    }

    fn validate(&self, values: &[f64]) -> Result<ValidationResult> {
        let n = values.len();
        if n < self.min_points() {
            return Ok(ValidationResult::insufficient(self.name(), self.min_points(), n));
        }
        if stats::is_constant(values) {
            return Ok(ValidationResult::not_applicable(
                self.name(),
                "no variation",
            ));
        }

        let Some((beta, se, exact)) =
            Self::regress(values, true).or_else(|| Self::regress(values, false))
        else {
            return Ok(ValidationResult::not_applicable(
                self.name(),
                "singular design",
            ));
        };

        // A perfect fit leaves no evidence against the unit root
        let (tau, p_value) = if exact || se <= 0.0 {
            (0.0, 1.0)
        } else {
            let tau = TrendError::ensure_finite(beta / se, "ADF statistic")?;
            (tau, mackinnon_p_value(tau)?)
        };
        let non_stationary = p_value > ALPHA;

        Ok(ValidationResult {
            test_name: self.name().to_string(),
            statistic: tau,
            p_value,
            trend_detected: non_stationary,
            direction: None,
            confidence_interval: None,
            description: Some(if non_stationary {
                format!("non-stationary (tau = {tau:.3})")
            } else {
                format!("stationary (tau = {tau:.3})")
            }),
        })
    }
}

/// Runs every validator in a fixed order
pub struct StatisticalValidators {
    validators: Vec<Box<dyn TrendValidator>>,
}

impl StatisticalValidators {
    pub fn new() -> Self {
        Self {
            validators: vec![
                Box::new(MannKendall),
                Box::new(SensSlope),
                Box::new(LinearRegressionTest),
                Box::new(AugmentedDickeyFuller),
            ],
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    pub fn run_all(&self, values: &[f64]) -> Result<Vec<ValidationResult>> {
        self.validators.iter().map(|v| v.validate(values)).collect()
    }
}

impl Default for StatisticalValidators {
    fn default() -> Self {
        Self::new()
    }
}

/// Find a result by test name
pub fn result_named<'a>(results: &'a [ValidationResult], name: &str) -> Option<&'a ValidationResult> {
    results.iter().find(|r| r.test_name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    fn periodic_noise(n: usize) -> Vec<f64> {
        (0..n).map(|i| 45.0 + ((i * 7) % 11) as f64).collect()
    }

    #[test]
    fn test_mann_kendall_detects_ramp() {
        let result = MannKendall.validate(&ramp(30)).unwrap();
        assert!(result.trend_detected);
        assert!(result.p_value < 0.05);
        assert_eq!(result.statistic, 435.0);
        assert_eq!(result.direction, Some(TrendSign::Increasing));
        assert!((kendall_tau(&ramp(30)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mann_kendall_noise() {
        let result = MannKendall.validate(&periodic_noise(30)).unwrap();
        assert!(!result.trend_detected);
        assert!(result.p_value >= 0.05);
    }

    #[test]
    fn test_validators_fail_closed() {
        let short = [1.0, 2.0];
        for validator in StatisticalValidators::new().validators.iter() {
            let result = validator.validate(&short).unwrap();
            assert!(!result.trend_detected, "{}", validator.name());
            assert_eq!(result.p_value, 1.0);
        }
    }

    #[test]
    fn test_sens_slope_ramp() {
        let result = SensSlope.validate(&ramp(20)).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-12);
        assert!(result.trend_detected);
        let (lo, hi) = result.confidence_interval.unwrap();
        assert!(lo <= 1.0 && 1.0 <= hi);
    }

    #[test]
    fn test_sens_slope_p_value_follows_mann_kendall() {
        for values in [ramp(20), periodic_noise(30)] {
            let sens = SensSlope.validate(&values).unwrap();
            let mk = MannKendall.validate(&values).unwrap();
            assert!((sens.p_value - mk.p_value).abs() < 1e-12);
        }
        let noise = SensSlope.validate(&periodic_noise(30)).unwrap();
        assert!(noise.p_value > ALPHA && noise.p_value < 1.0);
        assert!(!noise.trend_detected);
    }

    #[test]
    fn test_sens_slope_robust_to_outlier() {
        let mut values = ramp(15);
        values[7] = 1000.0;
        let result = SensSlope.validate(&values).unwrap();
        assert!((result.statistic - 1.0).abs() < 0.2);
    }

    #[test]
    fn test_regression_constant_series() {
        let result = LinearRegressionTest.validate(&[5.0; 12]).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert!(!result.trend_detected);
    }

    #[test]
    fn test_regression_decreasing() {
        let values: Vec<f64> = (0..20)
            .map(|i| 80.0 - 0.5 * i as f64 + if i % 2 == 0 { 0.3 } else { -0.3 })
            .collect();
        let result = LinearRegressionTest.validate(&values).unwrap();
        assert!(result.trend_detected);
        assert_eq!(result.direction, Some(TrendSign::Decreasing));
        let (lo, hi) = result.confidence_interval.unwrap();
        assert!(hi < 0.0 && lo < hi);
    }

    #[test]
    fn test_adf_constant_short_circuit() {
        let result = AugmentedDickeyFuller.validate(&[3.0; 15]).unwrap();
        assert!(!result.trend_detected);
        assert_eq!(result.description.as_deref(), Some("no variation"));
    }

    #[test]
    fn test_adf_ramp_is_non_stationary() {
        let result = AugmentedDickeyFuller.validate(&ramp(30)).unwrap();
        assert!(result.trend_detected);
    }

    #[test]
    fn test_adf_alternating_is_stationary() {
        let values: Vec<f64> = (0..40)
            .map(|i| 50.0 + if i % 2 == 0 { 2.0 } else { -2.0 } + (i % 3) as f64 * 0.1)
            .collect();
        let result = AugmentedDickeyFuller.validate(&values).unwrap();
        assert!(!result.trend_detected);
        assert!(result.p_value < 0.05);
    }

    #[test]
    fn test_mackinnon_bounds() {
        assert_eq!(mackinnon_p_value(3.0).unwrap(), 1.0);
        assert_eq!(mackinnon_p_value(-20.0).unwrap(), 0.0);
        // 5% critical value for the constant-only case is about -2.86
        let p = mackinnon_p_value(-2.86).unwrap();
        assert!((p - 0.05).abs() < 0.01);
    }

    #[test]
    fn test_run_all_fixed_order() {
        let results = StatisticalValidators::new().run_all(&ramp(30)).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.test_name.as_str()).collect();
        assert_eq!(
            names,
            vec![MANN_KENDALL, SENS_SLOPE, LINEAR_REGRESSION, AUGMENTED_DICKEY_FULLER]
        );
        assert!(result_named(&results, SENS_SLOPE).is_some());
    }
}
