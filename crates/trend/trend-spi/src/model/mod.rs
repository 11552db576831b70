//! Model module containing data structures

mod change_point;
mod decomposition;
mod ensemble_result;
mod health_context;
mod prediction_point;
mod seasonal_component;
mod time_series;
mod trend_analysis;
mod trend_class;
mod validation_result;
mod volatility;

pub use change_point::{ChangePoint, ShiftDirection};
pub use decomposition::{DecompositionMethod, TrendDecomposition};
pub use ensemble_result::{EnsembleMethod, EnsembleResult};
pub use health_context::{GoalValue, HealthContext};
pub use prediction_point::{ForecastInterval, PredictionPoint, PredictionQuality};
pub use seasonal_component::{SeasonalComponent, SeasonalPeriod};
pub use time_series::{CleanSeries, DataPoint, TimeSeries};
pub use trend_analysis::{EvidenceQuality, TrendAnalysis};
pub use trend_class::{TrendClass, TrendDirection};
pub use validation_result::{TrendSign, ValidationResult};
pub use volatility::{VolatilityLevel, VolatilityProfile, VolatilityTrend};
