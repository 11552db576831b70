//! Optional caller context consumed by the text generators

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A user goal: either a numeric target or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GoalValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for GoalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalValue::Number(n) if n.fract() == 0.0 => write!(f, "{n:.0}"),
            GoalValue::Number(n) => write!(f, "{n:.1}"),
            GoalValue::Text(s) => f.write_str(s),
        }
    }
}

/// Health context supplied alongside a series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthContext {
    #[serde(default)]
    pub user_goals: BTreeMap<String, GoalValue>,
}

impl HealthContext {
    pub fn with_goal(mut self, metric: impl Into<String>, goal: GoalValue) -> Self {
        self.user_goals.insert(metric.into(), goal);
        self
    }

    pub fn goal_for(&self, metric: &str) -> Option<&GoalValue> {
        self.user_goals.get(metric)
    }
}
