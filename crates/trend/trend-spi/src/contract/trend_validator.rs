//! Trait for statistical trend tests

use crate::error::Result;
use crate::model::ValidationResult;

/// A statistical test for the presence of a trend
///
/// Implementations must fail closed: below [`TrendValidator::min_points`]
/// they return a neutral result (`trend_detected = false`, `p_value = 1.0`)
/// instead of an error. Errors are reserved for numerical failures.
pub trait TrendValidator: Send + Sync {
    /// Stable identifier of the test
    fn name(&self) -> &str;

    /// Minimum number of observations the test needs
    fn min_points(&self) -> usize;

    /// Run the test on the cleaned values
    fn validate(&self, values: &[f64]) -> Result<ValidationResult>;
}
