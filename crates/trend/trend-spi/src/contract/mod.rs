//! Contract module containing trait definitions for trend analysis

mod change_point_detector;
mod decomposer;
mod trend_model_strategy;
mod trend_validator;

pub use change_point_detector::ChangePointDetector;
pub use decomposer::Decomposer;
pub use trend_model_strategy::{FittedTrendModel, TrendModelStrategy};
pub use trend_validator::TrendValidator;
