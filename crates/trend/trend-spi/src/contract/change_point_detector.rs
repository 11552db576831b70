//! Trait for change-point detection

use crate::error::Result;
use crate::model::{ChangePoint, CleanSeries};

/// Detects shifts in the level of a series
pub trait ChangePointDetector: Send + Sync {
    /// Detector name recorded on the change points it produces
    fn name(&self) -> &str;

    /// Below this length `detect` returns an empty list
    fn min_points(&self) -> usize;

    /// Candidate change points in timestamp order
    fn detect(&self, series: &CleanSeries) -> Result<Vec<ChangePoint>>;
}
