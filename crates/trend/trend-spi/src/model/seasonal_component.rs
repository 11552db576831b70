//! Seasonal pattern model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalPeriod {
    Weekly,
    Monthly,
}

impl SeasonalPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonalPeriod::Weekly => "weekly",
            SeasonalPeriod::Monthly => "monthly",
        }
    }
}

/// A recurring pattern extracted from the seasonal component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalComponent {
    pub period: SeasonalPeriod,
    /// Between-group share of the detrended variance, in [0, 1]
    pub strength: f64,
    /// Mean seasonal value per sub-period (weekday name or day of month)
    pub pattern: BTreeMap<String, f64>,
    /// ANOVA p-value for differences between sub-periods
    pub significance: f64,
}

impl SeasonalComponent {
    pub fn is_significant(&self) -> bool {
        self.significance < 0.05
    }

    /// Sub-period with the largest mean seasonal value
    pub fn peak(&self) -> Option<(&str, f64)> {
        self.pattern
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak() {
        let mut pattern = BTreeMap::new();
        pattern.insert("Monday".to_string(), -2.0);
        pattern.insert("Saturday".to_string(), 5.0);
        pattern.insert("Sunday".to_string(), 3.0);
        let component = SeasonalComponent {
            period: SeasonalPeriod::Weekly,
            strength: 0.4,
            pattern,
            significance: 0.01,
        };
        assert_eq!(component.peak(), Some(("Saturday", 5.0)));
        assert!(component.is_significant());
    }
}
