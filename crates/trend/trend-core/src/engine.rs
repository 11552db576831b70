//! Trend analysis engine
//!
//! Wires preprocessing, validators, decomposition, the optional trend
//! model, ensemble voting, change-point detection, volatility, forecasting
//! and text generation into one all-or-nothing `analyze` call.

use crate::changepoint::{
    self, ChangePointAnalyzer, CusumDetector, SlidingWindowDetector, DEFAULT_MERGE_WINDOW_DAYS,
};
use crate::classification::{
    self, classify, ClassificationThresholds, NoiseLimits, TrendSignal,
};
use crate::decomposition::{self, MovingAverageDecomposer, MIN_DECOMPOSITION_POINTS};
use crate::ensemble::{self, EnsembleWeights};
use crate::forecast::{self, LinearTrendStrategy};
use crate::interpretation::{self, Narrative, NarrativeInput};
use crate::preprocess::{self, PreprocessReport, Preprocessor};
use crate::stats;
use crate::validators::{self, StatisticalValidators};
use crate::volatility::{self, VolatilityThresholds};
use chrono::{NaiveDateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use trend_spi::{
    CleanSeries, Decomposer, EnsembleMethod, EnsembleResult, EvidenceQuality, FittedTrendModel,
    HealthContext, Result, TimeSeries, TrendAnalysis, TrendClass, TrendDecomposition, TrendError,
    TrendModelStrategy, ValidationResult, VolatilityLevel, VolatilityProfile, VolatilityTrend,
};

/// Optional capabilities of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Holt trend model with native prediction intervals
    pub probabilistic_model: bool,
    /// LOESS seasonal-trend decomposition
    pub advanced_decomposition: bool,
}

impl Capabilities {
    /// What this build was compiled with
    pub const fn available() -> Self {
        Self {
            probabilistic_model: cfg!(feature = "probabilistic-model"),
            advanced_decomposition: cfg!(feature = "stl"),
        }
    }

    /// Baseline methods only
    pub const fn baseline() -> Self {
        Self {
            probabilistic_model: false,
            advanced_decomposition: false,
        }
    }

    /// Requested capabilities restricted to what is compiled in
    pub fn restrict_to_available(self) -> Self {
        let available = Self::available();
        Self {
            probabilistic_model: self.probabilistic_model && available.probabilistic_model,
            advanced_decomposition: self.advanced_decomposition && available.advanced_decomposition,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::available()
    }
}

/// Engine tuning; every field has a documented default
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub capabilities: Capabilities,
    pub thresholds: ClassificationThresholds,
    pub noise_limits: NoiseLimits,
    pub weights: EnsembleWeights,
    pub volatility: VolatilityThresholds,
    pub iqr_multiplier: f64,
    pub merge_window_days: i64,
    pub cusum_threshold_sigmas: f64,
    pub sliding_window_alpha: f64,
    pub model_cache_capacity: usize,
    /// Time that recency is measured against; `None` means now
    pub reference_time: Option<NaiveDateTime>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            thresholds: ClassificationThresholds::default(),
            noise_limits: NoiseLimits::default(),
            weights: EnsembleWeights::default(),
            volatility: VolatilityThresholds::default(),
            iqr_multiplier: 1.5,
            merge_window_days: DEFAULT_MERGE_WINDOW_DAYS,
            cusum_threshold_sigmas: 2.0,
            sliding_window_alpha: 0.01,
            model_cache_capacity: 32,
            reference_time: None,
        }
    }
}

#[cfg(feature = "probabilistic-model")]
fn primary_model_strategy(cache_capacity: usize) -> Option<Box<dyn TrendModelStrategy>> {
    Some(Box::new(crate::model::HoltTrendStrategy::new(cache_capacity)))
}

#[cfg(not(feature = "probabilistic-model"))]
fn primary_model_strategy(_cache_capacity: usize) -> Option<Box<dyn TrendModelStrategy>> {
    None
}

#[cfg(feature = "stl")]
fn primary_decomposer() -> Option<Box<dyn Decomposer>> {
    Some(Box::new(crate::stl::StlDecomposer::new()))
}

#[cfg(not(feature = "stl"))]
fn primary_decomposer() -> Option<Box<dyn Decomposer>> {
    None
}

/// Health metric trend engine
///
/// Strategies are chosen once in [`TrendEngine::new`]. The engine is
/// `Send + Sync`; the only shared state is the model cache.
pub struct TrendEngine {
    options: EngineOptions,
    capabilities: Capabilities,
    preprocessor: Preprocessor,
    validators: StatisticalValidators,
    decomposers: Vec<Box<dyn Decomposer>>,
    model_strategy: Box<dyn TrendModelStrategy>,
    change_points: ChangePointAnalyzer,
}

impl TrendEngine {
    pub fn new(options: EngineOptions) -> Self {
        let requested = options.capabilities;
        let capabilities = requested.restrict_to_available();
        if capabilities != requested {
            warn!(
                ?requested,
                ?capabilities,
                "requested capabilities not compiled in, using fallbacks"
            );
        }

        let model_strategy: Box<dyn TrendModelStrategy> = if capabilities.probabilistic_model {
            primary_model_strategy(options.model_cache_capacity)
                .unwrap_or_else(|| Box::new(LinearTrendStrategy))
        } else {
            Box::new(LinearTrendStrategy)
        };

        let mut decomposers: Vec<Box<dyn Decomposer>> = Vec::new();
        if capabilities.advanced_decomposition {
            decomposers.extend(primary_decomposer());
        }
        decomposers.push(Box::new(MovingAverageDecomposer::new()));

        let change_points = ChangePointAnalyzer::new(
            vec![
                Box::new(CusumDetector::new().with_threshold_sigmas(options.cusum_threshold_sigmas)),
                Box::new(SlidingWindowDetector::new().with_alpha(options.sliding_window_alpha)),
            ],
            options.merge_window_days,
        );

        debug!(
            model = model_strategy.name(),
            decomposers = decomposers.len(),
            "trend engine constructed"
        );

        Self {
            preprocessor: Preprocessor::new().with_iqr_multiplier(options.iqr_multiplier),
            validators: StatisticalValidators::new(),
            decomposers,
            model_strategy,
            change_points,
            capabilities,
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Capabilities in effect after restricting to the compiled features
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn model_strategy_name(&self) -> &str {
        self.model_strategy.name()
    }

    /// Drop memoised model fits
    pub fn clear_cache(&self) {
        self.model_strategy.clear_cache();
    }

    /// Clean a copy of the series without analysing it
    pub fn preprocess(&self, series: &TimeSeries) -> (CleanSeries, PreprocessReport) {
        self.preprocessor.clean(series)
    }

    /// Analyse one metric's history
    ///
    /// Returns `InvalidParameter` for a zero horizon and `Numerical` when an
    /// intermediate statistic is not finite. Sparse or constant input is
    /// not an error.
    pub fn analyze(
        &self,
        series: &TimeSeries,
        metric_name: &str,
        context: Option<&HealthContext>,
        forecast_days: usize,
    ) -> Result<TrendAnalysis> {
        if forecast_days == 0 {
            return Err(TrendError::invalid_parameter(
                "forecast_days",
                "must be positive",
            ));
        }
        info!(
            metric = metric_name,
            points = series.len(),
            forecast_days,
            "starting trend analysis"
        );

        let (clean, report) = self.preprocessor.clean(series);
        debug!(
            kept = clean.len(),
            dropped_nulls = report.dropped_nulls,
            dropped_duplicates = report.dropped_duplicates,
            clipped = report.clipped,
            "series preprocessed"
        );

        let reference = self
            .options
            .reference_time
            .unwrap_or_else(|| Utc::now().naive_utc());
        let ctx = AnalysisContext {
            metric_name,
            goal: context.and_then(|c| c.goal_for(metric_name)),
            forecast_days,
            data_quality: preprocess::data_quality_score(&clean, reference),
            evidence: preprocess::evidence_quality(&clean),
        };

        let analysis = if clean.len() < 2 {
            self.insufficient_analysis(&clean, &ctx)?
        } else if stats::is_constant(&clean.values) {
            self.constant_analysis(&clean, &ctx)?
        } else {
            self.full_analysis(&clean, &ctx)?
        };

        info!(
            metric = metric_name,
            direction = %analysis.trend_direction,
            classification = %analysis.trend_classification,
            confidence = analysis.confidence,
            change_points = analysis.change_points.len(),
            "trend analysis complete"
        );
        Ok(analysis)
    }

    fn insufficient_analysis(
        &self,
        clean: &CleanSeries,
        ctx: &AnalysisContext<'_>,
    ) -> Result<TrendAnalysis> {
        debug!(points = clean.len(), "insufficient data for trend analysis");
        let validation_results = self.validators.run_all(&clean.values)?;
        let narrative = interpretation::insufficient_narrative(ctx.metric_name, clean.len(), ctx.goal);
        Ok(ctx.build(Verdict {
            ensemble: EnsembleResult::insufficient(),
            trend_strength: 0.0,
            statistical_significance: 1.0,
            seasonal_strength: 0.0,
            has_seasonality: false,
            seasonal_components: Vec::new(),
            volatility: VolatilityProfile::unknown(),
            predictions: Vec::new(),
            change_points: Vec::new(),
            narrative,
            methods_used: Vec::new(),
            validation_results,
            decomposition: None,
        }))
    }

    fn constant_analysis(
        &self,
        clean: &CleanSeries,
        ctx: &AnalysisContext<'_>,
    ) -> Result<TrendAnalysis> {
        debug!(points = clean.len(), "constant series short-circuit");
        let validation_results = self.validators.run_all(&clean.values)?;
        let votes = BTreeMap::from([(EnsembleMethod::Statistical, TrendClass::Stable)]);
        let ensemble = ensemble::aggregate(&votes, &EnsembleWeights::default());

        let volatility = if clean.len() >= volatility::MIN_VOLATILITY_POINTS {
            VolatilityProfile {
                level: VolatilityLevel::Low,
                score: 0.0,
                trend: VolatilityTrend::Stable,
            }
        } else {
            VolatilityProfile::unknown()
        };
        let predictions = forecast::forecast(clean, None, ctx.forecast_days)?;
        let value = clean.values[0];
        let narrative =
            interpretation::constant_narrative(ctx.metric_name, value, clean.span_days(), ctx.goal);

        Ok(ctx.build(Verdict {
            ensemble,
            trend_strength: 0.0,
            statistical_significance: mann_kendall_p(&validation_results),
            seasonal_strength: 0.0,
            has_seasonality: false,
            seasonal_components: Vec::new(),
            volatility,
            predictions,
            change_points: Vec::new(),
            narrative,
            methods_used: self.validators.names().iter().map(|s| s.to_string()).collect(),
            validation_results,
            decomposition: None,
        }))
    }

    fn decompose(&self, clean: &CleanSeries) -> Result<Option<TrendDecomposition>> {
        if clean.len() < MIN_DECOMPOSITION_POINTS {
            return Ok(None);
        }
        let mut last_error = None;
        for decomposer in &self.decomposers {
            match decomposer.decompose(clean) {
                Ok(decomposition) => return Ok(Some(decomposition)),
                Err(e) => {
                    warn!(
                        error = %e,
                        method = decomposer.method().as_str(),
                        "decomposition failed, trying next method"
                    );
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    fn fit_model(&self, clean: &CleanSeries) -> Option<Arc<dyn FittedTrendModel>> {
        match self.model_strategy.fit(clean) {
            Ok(model) => model,
            Err(e) => {
                warn!(
                    error = %e,
                    strategy = self.model_strategy.name(),
                    "model fit failed, using linear extrapolation"
                );
                None
            }
        }
    }

    fn collect_votes(
        &self,
        clean: &CleanSeries,
        validation: &[ValidationResult],
        decomposition: Option<&TrendDecomposition>,
        model: Option<&dyn FittedTrendModel>,
    ) -> Result<BTreeMap<EnsembleMethod, TrendClass>> {
        let limits = &self.options.noise_limits;
        let level = stats::mean(&clean.values);
        let mut signals: Vec<(EnsembleMethod, TrendSignal)> = Vec::new();

        if let Some(model) = model {
            if model.fitted_trend().len() == clean.len() {
                let noise = classification::relative_dispersion(model.residuals(), level);
                if let Some(signal) = classification::model_signal(
                    model.fitted_trend(),
                    clean,
                    noise,
                    limits.probabilistic_model,
                )? {
                    signals.push((EnsembleMethod::ProbabilisticModel, signal));
                }
            } else {
                warn!(
                    model = model.name(),
                    fitted = model.fitted_trend().len(),
                    expected = clean.len(),
                    "fitted trend length mismatch, model does not vote"
                );
            }
        }

        if let Some(d) = decomposition {
            let noise = classification::relative_dispersion(&d.residual, level);
            if let Some(signal) =
                classification::component_signal(&d.trend, clean, noise, limits.decomposition)?
            {
                signals.push((EnsembleMethod::Decomposition, signal));
            }
        }

        if let Some(signal) = classification::statistical_signal(validation, clean, limits.statistical) {
            signals.push((EnsembleMethod::Statistical, signal));
        }

        if let Some(signal) = classification::quartile_signal(clean, limits.quartile_comparison)? {
            signals.push((EnsembleMethod::QuartileComparison, signal));
        }

        let mut votes = BTreeMap::new();
        for (method, signal) in signals {
            TrendError::ensure_finite(signal.daily_change, "daily change")?;
            TrendError::ensure_finite(signal.noise, "noise indicator")?;
            let class = classify(&signal, &self.options.thresholds);
            debug!(
                method = method.as_str(),
                daily_change = signal.daily_change,
                significant = signal.significant,
                noise = signal.noise,
                class = %class,
                "method vote"
            );
            votes.insert(method, class);
        }
        Ok(votes)
    }

    fn full_analysis(&self, clean: &CleanSeries, ctx: &AnalysisContext<'_>) -> Result<TrendAnalysis> {
        let validation_results = self.validators.run_all(&clean.values)?;
        for result in &validation_results {
            TrendError::ensure_finite(result.statistic, &result.test_name)?;
            stats::ensure_probability(result.p_value, &result.test_name)?;
        }

        let decomposition = self.decompose(clean)?;
        let model = self.fit_model(clean);

        let votes = self.collect_votes(
            clean,
            &validation_results,
            decomposition.as_ref(),
            model.as_deref(),
        )?;
        let ensemble = ensemble::aggregate(&votes, &self.options.weights);
        debug!(
            primary = %ensemble.primary,
            confidence = ensemble.confidence,
            agreement = ensemble.agreement_score,
            "ensemble vote"
        );

        let change_points = self.change_points.detect(clean)?;
        let volatility = volatility::analyze_volatility(&clean.values, &self.options.volatility)?;
        let predictions = forecast::forecast(clean, model.as_deref(), ctx.forecast_days)?;

        let (seasonal_strength, seasonal_components) = match &decomposition {
            Some(d) => {
                let mut components = Vec::new();
                components.extend(decomposition::weekly_pattern(d)?);
                components.extend(decomposition::monthly_pattern(d)?);
                (decomposition::seasonal_strength(d), components)
            }
            None => (0.0, Vec::new()),
        };

        let first = clean.values[0];
        let last = clean.values[clean.len() - 1];
        let change_percent =
            (first.abs() > f64::EPSILON).then(|| (last - first) / first.abs() * 100.0);
        let narrative = interpretation::narrate(&NarrativeInput {
            metric_name: ctx.metric_name,
            class: ensemble.primary,
            confidence: ensemble.confidence,
            span_days: clean.span_days(),
            change_percent,
            goal: ctx.goal,
        });

        let mut methods_used: Vec<String> = self
            .validators
            .names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Some(d) = &decomposition {
            methods_used.push(format!("decomposition_{}", d.method.as_str()));
        }
        methods_used.push(
            model
                .as_ref()
                .map(|m| m.name().to_string())
                .unwrap_or_else(|| forecast::LINEAR_EXTRAPOLATION.to_string()),
        );
        methods_used.push(changepoint::CUSUM.to_string());
        methods_used.push(changepoint::SLIDING_WINDOW.to_string());

        Ok(ctx.build(Verdict {
            trend_strength: validators::kendall_tau(&clean.values).abs(),
            statistical_significance: mann_kendall_p(&validation_results),
            has_seasonality: seasonal_strength > decomposition::SEASONALITY_THRESHOLD,
            seasonal_strength,
            seasonal_components,
            volatility,
            predictions,
            change_points,
            narrative,
            methods_used,
            validation_results,
            decomposition,
            ensemble,
        }))
    }
}

impl Default for TrendEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

fn mann_kendall_p(results: &[ValidationResult]) -> f64 {
    validators::result_named(results, validators::MANN_KENDALL)
        .map(|r| r.p_value)
        .unwrap_or(1.0)
}

/// Per-call values shared by every analysis path
struct AnalysisContext<'a> {
    metric_name: &'a str,
    goal: Option<&'a trend_spi::GoalValue>,
    forecast_days: usize,
    data_quality: f64,
    evidence: EvidenceQuality,
}

/// Path-specific results assembled into a [`TrendAnalysis`]
struct Verdict {
    ensemble: EnsembleResult,
    trend_strength: f64,
    statistical_significance: f64,
    seasonal_strength: f64,
    has_seasonality: bool,
    seasonal_components: Vec<trend_spi::SeasonalComponent>,
    volatility: VolatilityProfile,
    predictions: Vec<trend_spi::PredictionPoint>,
    change_points: Vec<trend_spi::ChangePoint>,
    narrative: Narrative,
    methods_used: Vec<String>,
    validation_results: Vec<ValidationResult>,
    decomposition: Option<TrendDecomposition>,
}

impl AnalysisContext<'_> {
    fn build(&self, verdict: Verdict) -> TrendAnalysis {
        let structural_breaks = changepoint::structural_breaks(&verdict.change_points);
        TrendAnalysis {
            metric_name: self.metric_name.to_string(),
            trend_direction: verdict.ensemble.primary.direction(),
            trend_classification: verdict.ensemble.primary,
            trend_strength: verdict.trend_strength.clamp(0.0, 1.0),
            confidence: verdict.ensemble.confidence.clamp(0.0, 100.0),
            statistical_significance: verdict.statistical_significance.clamp(0.0, 1.0),
            has_seasonality: verdict.has_seasonality,
            seasonal_strength: verdict.seasonal_strength.clamp(0.0, 1.0),
            volatility_level: verdict.volatility.level,
            volatility_score: verdict.volatility.score,
            volatility_trend: verdict.volatility.trend,
            predictions: verdict.predictions,
            change_points: verdict.change_points,
            summary: verdict.narrative.summary,
            evidence_quality: self.evidence,
            interpretation: verdict.narrative.interpretation,
            seasonal_components: verdict.seasonal_components,
            methods_used: verdict.methods_used,
            ensemble_agreement: verdict.ensemble.agreement_score.clamp(0.0, 1.0),
            data_quality_score: self.data_quality.clamp(0.0, 1.0),
            recommendations: verdict.narrative.recommendations,
            forecast_horizon: self.forecast_days,
            structural_breaks,
            validation_results: verdict.validation_results,
            ensemble: verdict.ensemble,
            decomposition: verdict.decomposition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use trend_spi::{GoalValue, TrendDirection};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn engine() -> TrendEngine {
        TrendEngine::new(EngineOptions {
            reference_time: Some(start() + Duration::days(60)),
            ..EngineOptions::default()
        })
    }

    fn series(values: &[f64]) -> TimeSeries {
        TimeSeries::from_values(start(), values)
    }

    fn ramp() -> Vec<f64> {
        (0..30).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrendEngine>();
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let result = engine().analyze(&series(&ramp()), "steps", None, 0);
        assert!(matches!(
            result,
            Err(TrendError::InvalidParameter { ref name, .. }) if name == "forecast_days"
        ));
    }

    #[test]
    fn test_ramp_is_increasing() {
        let analysis = engine().analyze(&series(&ramp()), "steps", None, 7).unwrap();
        assert_eq!(analysis.trend_direction, TrendDirection::Increasing);
        assert!(analysis.statistical_significance < 0.05);
        assert_eq!(analysis.evidence_quality, EvidenceQuality::Strong);
        assert_eq!(analysis.predictions.len(), 7);
        assert!((analysis.trend_strength - 1.0).abs() < 1e-12);
        assert!(analysis.decomposition.is_some());
        assert_eq!(analysis.validation_results.len(), 4);
    }

    #[test]
    fn test_all_four_methods_vote() {
        let analysis = engine().analyze(&series(&ramp()), "steps", None, 7).unwrap();
        let votes = &analysis.ensemble.method_classifications;
        assert_eq!(votes.len(), 4);
        assert!(votes
            .values()
            .all(|class| *class == TrendClass::StronglyIncreasing));
        let weights = &analysis.ensemble.weights;
        assert!(
            (weights[&EnsembleMethod::QuartileComparison] - weights[&EnsembleMethod::Statistical])
                .abs()
                < 1e-12
        );
        assert_eq!(analysis.ensemble_agreement, 1.0);
    }

    #[test]
    fn test_single_point_is_insufficient() {
        let analysis = engine().analyze(&series(&[42.0]), "steps", None, 7).unwrap();
        assert_eq!(analysis.trend_classification, TrendClass::InsufficientData);
        assert_eq!(analysis.trend_direction, TrendDirection::Stable);
        assert!(analysis.predictions.is_empty());
        assert!(analysis.change_points.is_empty());
        assert_eq!(analysis.evidence_quality, EvidenceQuality::Weak);
        assert_eq!(analysis.confidence, 0.0);
    }

    #[test]
    fn test_constant_series_short_circuit() {
        let analysis = engine().analyze(&series(&[50.0; 20]), "steps", None, 5).unwrap();
        assert_eq!(analysis.trend_direction, TrendDirection::Stable);
        assert_eq!(analysis.volatility_level, VolatilityLevel::Low);
        assert!(analysis.change_points.is_empty());
        assert_eq!(analysis.predictions.len(), 5);
        assert!(analysis
            .predictions
            .iter()
            .all(|p| p.predicted_value == 50.0 && p.interval_width() == 0.0));
        assert!(analysis.summary.contains("constant"));
    }

    #[test]
    fn test_baseline_capabilities_fall_back() {
        let engine = TrendEngine::new(EngineOptions {
            capabilities: Capabilities::baseline(),
            reference_time: Some(start()),
            ..EngineOptions::default()
        });
        assert_eq!(engine.model_strategy_name(), forecast::LINEAR_EXTRAPOLATION);
        let analysis = engine.analyze(&series(&ramp()), "steps", None, 7).unwrap();
        assert_eq!(analysis.trend_direction, TrendDirection::Increasing);
        assert_eq!(
            analysis.decomposition.map(|d| d.method),
            Some(trend_spi::DecompositionMethod::Fallback)
        );
        assert!(!analysis
            .ensemble
            .weights
            .contains_key(&EnsembleMethod::ProbabilisticModel));
    }

    #[test]
    fn test_goal_in_declining_recommendations() {
        let values: Vec<f64> = (0..30).map(|i| 9000.0 - 100.0 * i as f64).collect();
        let context = HealthContext::default().with_goal("steps", GoalValue::Number(10000.0));
        let analysis = engine()
            .analyze(&series(&values), "steps", Some(&context), 7)
            .unwrap();
        assert_eq!(analysis.trend_direction, TrendDirection::Decreasing);
        assert!(analysis.recommendations.iter().any(|r| r.contains("10000")));
        assert!(analysis.interpretation.contains("10000"));
    }

    #[test]
    fn test_cache_reuse_is_idempotent() {
        let engine = engine();
        let input = series(&ramp());
        let first = engine.analyze(&input, "steps", None, 7).unwrap();
        let second = engine.analyze(&input, "steps", None, 7).unwrap();
        assert_eq!(first, second);
        engine.clear_cache();
        let third = engine.analyze(&input, "steps", None, 7).unwrap();
        assert_eq!(first, third);
    }
}
