//! Closed trend classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trend classification produced by every ensemble voter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendClass {
    StronglyIncreasing,
    Increasing,
    Stable,
    Decreasing,
    StronglyDecreasing,
    Volatile,
    InsufficientData,
}

impl TrendClass {
    pub const ALL: [TrendClass; 7] = [
        TrendClass::StronglyIncreasing,
        TrendClass::Increasing,
        TrendClass::Stable,
        TrendClass::Decreasing,
        TrendClass::StronglyDecreasing,
        TrendClass::Volatile,
        TrendClass::InsufficientData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendClass::StronglyIncreasing => "strongly_increasing",
            TrendClass::Increasing => "increasing",
            TrendClass::Stable => "stable",
            TrendClass::Decreasing => "decreasing",
            TrendClass::StronglyDecreasing => "strongly_decreasing",
            TrendClass::Volatile => "volatile",
            TrendClass::InsufficientData => "insufficient_data",
        }
    }

    /// Public direction. Insufficient data is reported as stable.
    pub fn direction(&self) -> TrendDirection {
        match self {
            TrendClass::StronglyIncreasing | TrendClass::Increasing => TrendDirection::Increasing,
            TrendClass::StronglyDecreasing | TrendClass::Decreasing => TrendDirection::Decreasing,
            TrendClass::Volatile => TrendDirection::Volatile,
            TrendClass::Stable | TrendClass::InsufficientData => TrendDirection::Stable,
        }
    }

    pub fn is_declining(&self) -> bool {
        match self {
            TrendClass::Decreasing | TrendClass::StronglyDecreasing => true,
            TrendClass::StronglyIncreasing
            | TrendClass::Increasing
            | TrendClass::Stable
            | TrendClass::Volatile
            | TrendClass::InsufficientData => false,
        }
    }

    pub fn is_strong(&self) -> bool {
        match self {
            TrendClass::StronglyIncreasing | TrendClass::StronglyDecreasing => true,
            TrendClass::Increasing
            | TrendClass::Stable
            | TrendClass::Decreasing
            | TrendClass::Volatile
            | TrendClass::InsufficientData => false,
        }
    }
}

impl fmt::Display for TrendClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction as exposed on [`crate::TrendAnalysis`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Volatile,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::Volatile => "volatile",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_maps_to_stable() {
        assert_eq!(
            TrendClass::InsufficientData.direction(),
            TrendDirection::Stable
        );
    }

    #[test]
    fn test_strong_classes_collapse() {
        assert_eq!(
            TrendClass::StronglyIncreasing.direction(),
            TrendDirection::Increasing
        );
        assert_eq!(
            TrendClass::StronglyDecreasing.direction(),
            TrendDirection::Decreasing
        );
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&TrendClass::StronglyIncreasing).unwrap();
        assert_eq!(json, "\"strongly_increasing\"");
        let back: TrendClass = serde_json::from_str("\"insufficient_data\"").unwrap();
        assert_eq!(back, TrendClass::InsufficientData);
    }

    #[test]
    fn test_as_str_matches_serde() {
        for class in TrendClass::ALL {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class.as_str()));
        }
    }

    #[test]
    fn test_unknown_class_rejected() {
        assert!(serde_json::from_str::<TrendClass>("\"sideways\"").is_err());
    }

    #[test]
    fn test_declining() {
        assert!(TrendClass::Decreasing.is_declining());
        assert!(TrendClass::StronglyDecreasing.is_declining());
        assert!(!TrendClass::Volatile.is_declining());
    }
}
