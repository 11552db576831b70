//! Template-driven summary, interpretation and recommendation text

use trend_spi::{GoalValue, TrendClass};

/// Maximum number of recommendations returned
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Metrics with bespoke phrasing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Steps,
    RestingHeartRate,
    SleepHours,
    Other,
}

impl MetricKind {
    pub fn parse(metric_name: &str) -> Self {
        let normalised = metric_name.trim().to_lowercase().replace([' ', '-'], "_");
        match normalised.as_str() {
            "steps" | "step_count" | "daily_steps" | "stepcount" => MetricKind::Steps,
            "resting_heart_rate" | "resting_hr" | "rhr" | "heart_rate_resting"
            | "restingheartrate" => MetricKind::RestingHeartRate,
            "sleep" | "sleep_hours" | "sleep_duration" | "hours_slept" | "sleep_time" => {
                MetricKind::SleepHours
            }
            _ => MetricKind::Other,
        }
    }
}

/// Human name of the metric as used mid-sentence
pub fn display_name(metric_name: &str) -> String {
    match MetricKind::parse(metric_name) {
        MetricKind::Steps => "daily step count".to_string(),
        MetricKind::RestingHeartRate => "resting heart rate".to_string(),
        MetricKind::SleepHours => "sleep duration".to_string(),
        MetricKind::Other => metric_name.trim().replace('_', " "),
    }
}

/// Generated text for one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    pub summary: String,
    pub interpretation: String,
    pub recommendations: Vec<String>,
}

/// Inputs for the regular (non-degenerate) narrative
#[derive(Debug, Clone, Copy)]
pub struct NarrativeInput<'a> {
    pub metric_name: &'a str,
    pub class: TrendClass,
    pub confidence: f64,
    pub span_days: f64,
    /// First-to-last change in percent, when the first value is non-zero
    pub change_percent: Option<f64>,
    pub goal: Option<&'a GoalValue>,
}

pub fn certainty_qualifier(confidence: f64) -> &'static str {
    if confidence > 80.0 {
        "clearly"
    } else if confidence > 60.0 {
        "generally"
    } else {
        "appears to be"
    }
}

pub fn confidence_caveat(confidence: f64) -> Option<&'static str> {
    if confidence <= 40.0 {
        Some("low confidence")
    } else if confidence <= 60.0 {
        Some("moderate confidence")
    } else {
        None
    }
}

fn direction_phrase(class: TrendClass) -> &'static str {
    match class {
        TrendClass::StronglyIncreasing => "rising sharply",
        TrendClass::Increasing => "increasing",
        TrendClass::Stable => "stable",
        TrendClass::Decreasing => "decreasing",
        TrendClass::StronglyDecreasing => "falling sharply",
        TrendClass::Volatile => "fluctuating",
        TrendClass::InsufficientData => "undetermined",
    }
}

fn observation_days(span_days: f64) -> i64 {
    span_days.max(0.0).round() as i64 + 1
}

fn day_label(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

pub fn summary(input: &NarrativeInput<'_>) -> String {
    let subject = display_name(input.metric_name);
    let qualifier = certainty_qualifier(input.confidence);
    let verb = if qualifier == "appears to be" {
        format!("appears to be {}", direction_phrase(input.class))
    } else {
        format!("is {qualifier} {}", direction_phrase(input.class))
    };
    let mut text = format!(
        "Your {subject} {verb} over the last {}",
        day_label(observation_days(input.span_days))
    );
    if let Some(change) = input.change_percent {
        text.push_str(&format!(" ({change:+.1}%)"));
    }
    if let Some(caveat) = confidence_caveat(input.confidence) {
        text.push_str(&format!(", with {caveat}"));
    }
    text.push('.');
    text
}

fn steps_phrase(class: TrendClass) -> &'static str {
    match class {
        TrendClass::StronglyIncreasing => {
            "Your daily step count is climbing quickly, a strong sign of rising activity."
        }
        TrendClass::Increasing => "Your daily step count is gradually increasing.",
        TrendClass::Stable => "Your daily step count is holding steady.",
        TrendClass::Decreasing => "Your daily step count is gradually declining.",
        TrendClass::StronglyDecreasing => "Your daily step count has dropped sharply.",
        TrendClass::Volatile => "Your daily step count varies a lot from day to day.",
        TrendClass::InsufficientData => "There is not enough step data to identify a trend.",
    }
}

fn resting_heart_rate_phrase(class: TrendClass) -> &'static str {
    match class {
        TrendClass::StronglyIncreasing => {
            "Your resting heart rate is rising noticeably; illness, stress or poor recovery can cause this."
        }
        TrendClass::Increasing => "Your resting heart rate is creeping upward.",
        TrendClass::Stable => "Your resting heart rate is stable.",
        TrendClass::Decreasing => {
            "Your resting heart rate is gradually decreasing, which often reflects improving fitness."
        }
        TrendClass::StronglyDecreasing => {
            "Your resting heart rate is falling markedly, a typical sign of improved cardiovascular fitness."
        }
        TrendClass::Volatile => "Your resting heart rate is fluctuating more than usual.",
        TrendClass::InsufficientData => {
            "There is not enough resting heart rate data to identify a trend."
        }
    }
}

fn sleep_phrase(class: TrendClass) -> &'static str {
    match class {
        TrendClass::StronglyIncreasing => "You are sleeping considerably longer than before.",
        TrendClass::Increasing => "Your sleep duration is gradually increasing.",
        TrendClass::Stable => "Your sleep duration is consistent.",
        TrendClass::Decreasing => "Your sleep duration is gradually shrinking.",
        TrendClass::StronglyDecreasing => "You are sleeping much less than before.",
        TrendClass::Volatile => "Your sleep duration is irregular from night to night.",
        TrendClass::InsufficientData => "There is not enough sleep data to identify a trend.",
    }
}

fn generic_phrase(class: TrendClass, name: &str) -> String {
    match class {
        TrendClass::StronglyIncreasing => format!("Your {name} is increasing rapidly."),
        TrendClass::Increasing => format!("Your {name} is trending upward."),
        TrendClass::Stable => format!("Your {name} is stable."),
        TrendClass::Decreasing => format!("Your {name} is trending downward."),
        TrendClass::StronglyDecreasing => format!("Your {name} is decreasing rapidly."),
        TrendClass::Volatile => format!("Your {name} is highly variable."),
        TrendClass::InsufficientData => {
            format!("There is not enough {name} data to identify a trend.")
        }
    }
}

fn with_goal(mut text: String, goal: Option<&GoalValue>) -> String {
    if let Some(goal) = goal {
        text.push_str(&format!(" Your goal is {goal}."));
    }
    text
}

pub fn interpretation(metric_name: &str, class: TrendClass, goal: Option<&GoalValue>) -> String {
    let text = match MetricKind::parse(metric_name) {
        MetricKind::Steps => steps_phrase(class).to_string(),
        MetricKind::RestingHeartRate => resting_heart_rate_phrase(class).to_string(),
        MetricKind::SleepHours => sleep_phrase(class).to_string(),
        MetricKind::Other => generic_phrase(class, &display_name(metric_name)),
    };
    with_goal(text, goal)
}

fn fixed(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn candidates(kind: MetricKind, class: TrendClass, name: &str) -> Vec<String> {
    match (kind, class) {
        (MetricKind::Steps, TrendClass::Decreasing | TrendClass::StronglyDecreasing) => fixed(&[
            "Schedule a short walk after meals to rebuild daily movement.",
            "Set an hourly reminder to stand up and move.",
            "Take the stairs instead of the elevator when you can.",
            "Pair walking with a podcast or a call to make it habitual.",
        ]),
        (MetricKind::Steps, TrendClass::Increasing | TrendClass::StronglyIncreasing) => fixed(&[
            "Keep up the momentum; your activity is trending in the right direction.",
            "Increase intensity gradually to avoid overuse injuries.",
            "Plan rest days so the new activity level is sustainable.",
        ]),
        (MetricKind::RestingHeartRate, TrendClass::Increasing | TrendClass::StronglyIncreasing) => {
            fixed(&[
                "Prioritise sleep and recovery for the next few days.",
                "Watch for signs of illness or overtraining.",
                "Limit caffeine and alcohol, which can raise resting heart rate.",
                "Consult a healthcare professional if the increase persists.",
            ])
        }
        (MetricKind::RestingHeartRate, TrendClass::Decreasing | TrendClass::StronglyDecreasing) => {
            fixed(&[
                "Your cardiovascular fitness appears to be improving; keep your routine.",
                "Continue regular aerobic exercise to maintain the benefit.",
            ])
        }
        (MetricKind::SleepHours, TrendClass::Decreasing | TrendClass::StronglyDecreasing) => fixed(&[
            "Keep a consistent bedtime, including on weekends.",
            "Avoid screens for an hour before bed.",
            "Limit caffeine after early afternoon.",
            "Keep your bedroom cool and dark.",
        ]),
        (MetricKind::SleepHours, TrendClass::Volatile) => fixed(&[
            "Aim for the same sleep and wake times every day.",
            "Build a short wind-down routine before bed.",
        ]),
        (_, TrendClass::Volatile) => vec![
            format!("Look for routines or events that coincide with swings in your {name}."),
            format!("Measure your {name} at a consistent time of day."),
        ],
        (_, TrendClass::Stable) => vec![
            format!("Your {name} is steady; keep your current routine."),
            format!("Consider a small, specific goal if you want to improve your {name}."),
        ],
        (_, TrendClass::InsufficientData) => vec![format!(
            "Record your {name} daily for at least two weeks to enable trend analysis."
        )],
        (_, TrendClass::Increasing | TrendClass::StronglyIncreasing) => vec![
            format!("Your {name} is rising; check that this matches your intentions."),
            format!("Keep tracking your {name} to confirm the trend."),
        ],
        (_, TrendClass::Decreasing | TrendClass::StronglyDecreasing) => vec![
            format!("Your {name} is falling; check that this matches your intentions."),
            format!("Keep tracking your {name} to confirm the trend."),
        ],
    }
}

pub fn recommendations(metric_name: &str, class: TrendClass, goal: Option<&GoalValue>) -> Vec<String> {
    let kind = MetricKind::parse(metric_name);
    let name = display_name(metric_name);
    let mut items = candidates(kind, class, &name);
    match goal.filter(|_| class.is_declining()) {
        Some(goal) => {
            items.truncate(MAX_RECOMMENDATIONS - 1);
            items.push(format!(
                "Revisit your {name} goal of {goal} and set a smaller weekly target to get back on track."
            ));
        }
        None => items.truncate(MAX_RECOMMENDATIONS),
    }
    items
}

pub fn narrate(input: &NarrativeInput<'_>) -> Narrative {
    Narrative {
        summary: summary(input),
        interpretation: interpretation(input.metric_name, input.class, input.goal),
        recommendations: recommendations(input.metric_name, input.class, input.goal),
    }
}

/// Text for a zero-variance series
pub fn constant_narrative(
    metric_name: &str,
    value: f64,
    span_days: f64,
    goal: Option<&GoalValue>,
) -> Narrative {
    let name = display_name(metric_name);
    let days = day_label(observation_days(span_days));
    Narrative {
        summary: format!("Your {name} has remained constant at {value} over the last {days}."),
        interpretation: with_goal(
            format!("Your {name} shows no variation, so no trend can be measured."),
            goal,
        ),
        recommendations: vec![
            format!("Check that your {name} is being recorded correctly; identical readings are unusual."),
            format!("Keep logging your {name} to detect future changes."),
        ],
    }
}

/// Text when fewer than two usable observations remain
pub fn insufficient_narrative(
    metric_name: &str,
    points: usize,
    goal: Option<&GoalValue>,
) -> Narrative {
    let name = display_name(metric_name);
    Narrative {
        summary: format!(
            "Not enough {name} data to determine a trend (need at least 2 points, have {points})."
        ),
        interpretation: interpretation(metric_name, TrendClass::InsufficientData, goal),
        recommendations: recommendations(metric_name, TrendClass::InsufficientData, goal),
    }
}
