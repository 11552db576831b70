//! Error module containing error types and result aliases

mod trend_error;

pub use trend_error::TrendError;

/// Result type for trend analysis operations
pub type Result<T> = std::result::Result<T, TrendError>;
