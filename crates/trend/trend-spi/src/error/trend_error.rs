//! Trend analysis error types

use thiserror::Error;

/// Errors that can abort a trend analysis
///
/// Estimators that simply lack data return neutral results instead of
/// `InsufficientData`; the variant is reserved for components that cannot
/// produce any meaningful output at all (model fits, decompositions).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrendError {
    /// Insufficient data points for the operation
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Numerical computation produced an unusable value
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// Trend model could not be fitted
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    /// Decomposition could not be computed
    #[error("Decomposition failed: {0}")]
    Decomposition(String),

    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TrendError {
    /// Shorthand for an `InvalidParameter` error
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Fail with `Numerical` unless `value` is finite
    pub fn ensure_finite(value: f64, what: &str) -> Result<f64, TrendError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::Numerical(format!("{what} is not finite ({value})")))
        }
    }
}
