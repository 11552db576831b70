//! Basic example analysing a synthetic step-count history
//!
//! Run with: cargo run --example basic -p trend-facade
//! Set RUST_LOG=trend_core=debug to see per-stage logs.

use chrono::{Duration, NaiveDate};
use trend_facade::{AnalysisConfig, GoalValue, HealthContext, TimeSeries, TrendEngineBuilder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trend_core=info".into()),
        )
        .init();

    println!("=== Trend Analysis Example ===\n");

    // Eight weeks of steps: weekday/weekend rhythm, slow decline, one missing day
    let start = NaiveDate::from_ymd_opt(2024, 4, 1)
        .and_then(|d| d.and_hms_opt(21, 0, 0))
        .ok_or("invalid start date")?;
    let values: Vec<f64> = (0..56)
        .map(|i| {
            let weekend = if i % 7 >= 5 { -1500.0 } else { 0.0 };
            9000.0 - 25.0 * i as f64 + weekend + ((i * 37) % 11) as f64 * 40.0
        })
        .collect();
    let mut series = TimeSeries::from_values(start, &values);
    series.points[20].value = None;

    let config = AnalysisConfig::from_json_str(r#"{ "forecast": { "default_days": 5 } }"#)?;
    let context = HealthContext::default().with_goal("steps", GoalValue::Number(10000.0));

    let analysis = TrendEngineBuilder::from_config(config)
        .reference_time(start + Duration::days(56))
        .analyze(&series, "steps", Some(&context))?;

    println!("Summary: {}", analysis.summary);
    println!("Interpretation: {}", analysis.interpretation);
    println!(
        "Classification: {} ({:.1}% confidence, agreement {:.2})",
        analysis.trend_classification, analysis.confidence, analysis.ensemble_agreement
    );
    println!(
        "Mann-Kendall p = {:.4}, strength = {:.2}",
        analysis.statistical_significance, analysis.trend_strength
    );
    println!(
        "Seasonality: {} (strength {:.2})",
        analysis.has_seasonality, analysis.seasonal_strength
    );
    println!(
        "Volatility: {} ({:.3}, {})",
        analysis.volatility_level.as_str(),
        analysis.volatility_score,
        analysis.volatility_trend.as_str()
    );

    println!("\nChange points:");
    for cp in &analysis.change_points {
        println!(
            "   {} {:+.1}% ({:.0}% confidence, {})",
            cp.timestamp.date(),
            cp.magnitude * 100.0,
            cp.confidence,
            cp.method
        );
    }

    println!("\nForecast:");
    for p in &analysis.predictions {
        println!(
            "   {} {:.0} [{:.0}, {:.0}] {}",
            p.timestamp.date(),
            p.predicted_value,
            p.lower_bound,
            p.upper_bound,
            p.quality.as_str()
        );
    }

    println!("\nRecommendations:");
    for r in &analysis.recommendations {
        println!("   - {r}");
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
