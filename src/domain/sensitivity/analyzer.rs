//! One-at-a-time sensitivity analysis over the simulation pipeline.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::foundation::DomainError;
use crate::domain::simulation::{AlternativeSimulation, RunContext, SimulationEngine};

use super::state::{BaseState, Parameter, PerturbationFraction};

/// Stream every trial and the baseline draw from.
const SENSITIVITY_STREAM: u64 = 0;

/// Output metric the analysis tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "metric", content = "category", rename_all = "snake_case")]
pub enum SensitivityTarget {
    /// Mean Row Total over every draw and category.
    #[default]
    MeanRowTotal,
    /// Mean Row Total of one impact category.
    Category(String),
}

/// Influence of one parameter on the output metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRecord {
    #[serde(rename = "Parameter")]
    pub parameter: String,
    #[serde(rename = "Baseline Value")]
    pub baseline_value: f64,
    #[serde(rename = "Perturbed Value")]
    pub perturbed_value: f64,
    #[serde(rename = "Perturbed Mean")]
    pub perturbed_mean: f64,
    #[serde(rename = "Delta(%)")]
    pub delta_percent: f64,
    #[serde(rename = "Sensitivity Index")]
    pub sensitivity_index: f64,
    #[serde(rename = "Relative Influence(%)")]
    pub relative_influence_percent: f64,
}

impl SensitivityRecord {
    /// Relative influence as a fraction.
    pub fn relative_influence(&self) -> f64 {
        self.relative_influence_percent / 100.0
    }
}

/// Records ranked by relative influence, most influential first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub alternative: String,
    pub target: SensitivityTarget,
    pub baseline: f64,
    /// The perturbation fraction (0.1 for ten percent).
    pub perturbation_percent: f64,
    pub records: Vec<SensitivityRecord>,
}

impl SensitivityReport {
    /// The `n` most influential records.
    pub fn top(&self, n: usize) -> &[SensitivityRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Record for a parameter by display name.
    pub fn record(&self, parameter: &str) -> Option<&SensitivityRecord> {
        self.records.iter().find(|r| r.parameter == parameter)
    }
}

/// Perturbs each parameter of a base state and measures the effect.
///
/// The baseline and every trial use the same seed and random stream, so
/// differences reflect the parameter change rather than sampling noise.
pub struct SensitivityAnalyzer<'a> {
    engine: &'a SimulationEngine,
    target: SensitivityTarget,
}

impl<'a> SensitivityAnalyzer<'a> {
    pub fn new(engine: &'a SimulationEngine, target: SensitivityTarget) -> Self {
        Self { engine, target }
    }

    pub fn target(&self) -> &SensitivityTarget {
        &self.target
    }

    /// Runs the baseline and one trial per parameter.
    ///
    /// # Errors
    /// - `InvalidParameter` when the baseline metric is 0 or the target category is unknown
    /// - any error of the simulation pipeline, tagged with the parameter for trials
    pub fn run(
        &self,
        base: &BaseState,
        fraction: PerturbationFraction,
        ctx: &RunContext,
    ) -> Result<SensitivityReport, DomainError> {
        let baseline = self.metric(base, ctx)?;
        if baseline == 0.0 {
            return Err(DomainError::invalid_parameter(
                "baseline",
                "Baseline metric is zero; relative changes are undefined",
            )
            .with_detail("alternative", base.alternative().name.as_str()));
        }

        let parameters = base.parameters();
        debug!(
            alternative = %base.alternative().name,
            parameters = parameters.len(),
            fraction = fraction.value(),
            baseline,
            "Running sensitivity trials"
        );

        let trial = |parameter: &Parameter| self.trial(base, parameter, fraction, baseline, ctx);
        let trials: Result<Vec<SensitivityRecord>, DomainError> = if ctx.parallel {
            parameters.par_iter().map(trial).collect()
        } else {
            parameters.iter().map(trial).collect()
        };
        let mut records = trials?;

        let total: f64 = records.iter().map(|r| r.sensitivity_index.abs()).sum();
        if total > 0.0 {
            for record in &mut records {
                record.relative_influence_percent = record.sensitivity_index.abs() / total * 100.0;
            }
        } else {
            warn!(
                alternative = %base.alternative().name,
                "No parameter changed the output; relative influences are zero"
            );
        }
        records.sort_by(|a, b| {
            b.relative_influence_percent
                .total_cmp(&a.relative_influence_percent)
        });

        Ok(SensitivityReport {
            alternative: base.alternative().name.clone(),
            target: self.target.clone(),
            baseline,
            perturbation_percent: fraction.value(),
            records,
        })
    }

    fn trial(
        &self,
        base: &BaseState,
        parameter: &Parameter,
        fraction: PerturbationFraction,
        baseline: f64,
        ctx: &RunContext,
    ) -> Result<SensitivityRecord, DomainError> {
        let tag = |e: DomainError| e.with_detail("parameter", parameter.to_string());

        let change = base.perturbation(parameter, fraction).map_err(tag)?;
        let baseline_value = base.value_of(parameter).unwrap_or_default();
        let state = base.apply(&change).map_err(tag)?;
        let perturbed_mean = self.metric(&state, ctx).map_err(tag)?;

        let relative_change = (perturbed_mean - baseline) / baseline;
        Ok(SensitivityRecord {
            parameter: parameter.to_string(),
            baseline_value,
            perturbed_value: change.value,
            perturbed_mean,
            delta_percent: relative_change * 100.0,
            sensitivity_index: relative_change / fraction.value(),
            relative_influence_percent: 0.0,
        })
    }

    fn metric(&self, state: &BaseState, ctx: &RunContext) -> Result<f64, DomainError> {
        let simulation = self.engine.simulate(
            state.alternative(),
            state.service_life(),
            ctx,
            SENSITIVITY_STREAM,
        )?;
        self.measure(&simulation)
    }

    fn measure(&self, simulation: &AlternativeSimulation) -> Result<f64, DomainError> {
        match &self.target {
            SensitivityTarget::MeanRowTotal => Ok(simulation.mean_row_total()),
            SensitivityTarget::Category(name) => {
                simulation.mean_row_total_for(name).ok_or_else(|| {
                    DomainError::invalid_parameter(
                        "category",
                        format!("Unknown sensitivity category '{}'", name),
                    )
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::profile::{FallbackPolicy, ImpactProfileStore};
    use crate::domain::simulation::{
        AlternativeSpec, ComponentQuantities, EngineSettings, LifeDrawPolicy, RenewalModel,
        ServiceLifeParams, ServiceLifeTable,
    };

    fn engine(hemp_std: f64) -> SimulationEngine {
        let store = ImpactProfileStore::builder()
            .categories(vec!["Climate change", "Water use"])
            .profile("Hemp", "Climate change", 5.0, hemp_std)
            .profile("Hemp", "Water use", 2.0, 0.0)
            .profile("Concrete", "Climate change", 3.0, 0.0)
            .profile("Concrete", "Water use", 1.0, 0.0)
            .fallback(FallbackPolicy::Disabled)
            .build()
            .unwrap();
        let settings = EngineSettings {
            renewal: RenewalModel::new(ServiceLifeTable::default(), 0.0, LifeDrawPolicy::default())
                .unwrap(),
            ..EngineSettings::default()
        };
        SimulationEngine::new(store, settings)
    }

    fn base(hemp: f64, concrete: f64) -> BaseState {
        BaseState::new(
            AlternativeSpec::new(
                "House",
                ComponentQuantities::from_pairs(&[("Hemp", hemp), ("Concrete", concrete)]).unwrap(),
            )
            .unwrap(),
            ServiceLifeParams::new(50.0, 0.0).unwrap(),
        )
        .unwrap()
    }

    fn ctx() -> RunContext {
        RunContext::new(20, Some(7)).unwrap()
    }

    #[test]
    fn deterministic_pipeline_gives_exact_indices() {
        let engine = engine(0.0);
        let report = SensitivityAnalyzer::new(&engine, SensitivityTarget::MeanRowTotal)
            .run(&base(10.0, 4.0), PerturbationFraction::default(), &ctx())
            .unwrap();

        // Row Totals: climate 50 + 12, water 20 + 4; grand mean 43.
        assert!((report.baseline - 43.0).abs() < 1e-9);

        let hemp = report.record("Hemp").unwrap();
        assert!((hemp.sensitivity_index - 35.0 / 43.0).abs() < 1e-9);
        assert!((hemp.perturbed_value - 11.0).abs() < 1e-12);

        // Building life 55 against material lives of 50 scales every quantity by 1.1.
        let life = report.record("Service life mean").unwrap();
        assert!((life.sensitivity_index - 1.0).abs() < 1e-9);
        assert!((life.delta_percent - 10.0).abs() < 1e-9);

        let std = report.record("Service life std").unwrap();
        assert_eq!(std.sensitivity_index, 0.0);

        assert_eq!(report.records[0].parameter, "Service life mean");
        assert!((life.relative_influence_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn relative_influence_sums_to_one_hundred() {
        let engine = engine(1.5);
        let report = SensitivityAnalyzer::new(&engine, SensitivityTarget::MeanRowTotal)
            .run(&base(10.0, 4.0), PerturbationFraction::new(0.2).unwrap(), &ctx())
            .unwrap();

        let sum: f64 = report.records.iter().map(|r| r.relative_influence_percent).sum();
        assert!((sum - 100.0).abs() < 1e-6);
        for pair in report.records.windows(2) {
            assert!(pair[0].relative_influence_percent >= pair[1].relative_influence_percent);
        }
        assert_eq!(report.perturbation_percent, 0.2);
    }

    #[test]
    fn base_state_is_unchanged_after_run() {
        let engine = engine(1.0);
        let state = base(10.0, 4.0);
        let snapshot = state.clone();
        SensitivityAnalyzer::new(&engine, SensitivityTarget::MeanRowTotal)
            .run(&state, PerturbationFraction::default(), &ctx())
            .unwrap();
        assert_eq!(state, snapshot);
    }

    #[test]
    fn parallel_and_sequential_trials_agree() {
        let engine = engine(1.0);
        let analyzer = SensitivityAnalyzer::new(&engine, SensitivityTarget::MeanRowTotal);
        let state = base(10.0, 4.0);
        let parallel = analyzer
            .run(&state, PerturbationFraction::default(), &ctx())
            .unwrap();
        let sequential = analyzer
            .run(&state, PerturbationFraction::default(), &ctx().with_parallel(false))
            .unwrap();
        assert_eq!(parallel.records, sequential.records);
    }

    #[test]
    fn zero_baseline_is_rejected() {
        let engine = engine(0.0);
        let err = SensitivityAnalyzer::new(&engine, SensitivityTarget::MeanRowTotal)
            .run(&base(0.0, 0.0), PerturbationFraction::default(), &ctx())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
    }

    #[test]
    fn category_target_tracks_one_column() {
        let engine = engine(0.0);
        let report = SensitivityAnalyzer::new(&engine, SensitivityTarget::Category("Water use".into()))
            .run(&base(10.0, 4.0), PerturbationFraction::default(), &ctx())
            .unwrap();
        assert!((report.baseline - 24.0).abs() < 1e-9);

        let unknown = SensitivityAnalyzer::new(&engine, SensitivityTarget::Category("Nope".into()))
            .run(&base(10.0, 4.0), PerturbationFraction::default(), &ctx());
        assert!(unknown.is_err());
    }

    #[test]
    fn top_is_bounded_by_record_count() {
        let engine = engine(0.0);
        let report = SensitivityAnalyzer::new(&engine, SensitivityTarget::MeanRowTotal)
            .run(&base(10.0, 4.0), PerturbationFraction::default(), &ctx())
            .unwrap();
        assert_eq!(report.top(2).len(), 2);
        assert_eq!(report.top(10).len(), 4);
    }

    #[test]
    fn records_serialize_with_column_names() {
        let engine = engine(0.0);
        let report = SensitivityAnalyzer::new(&engine, SensitivityTarget::MeanRowTotal)
            .run(&base(10.0, 4.0), PerturbationFraction::default(), &ctx())
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let first = &json["records"][0];
        assert!(first.get("Relative Influence(%)").is_some());
        assert!(first.get("Delta(%)").is_some());
        assert_eq!(json["target"]["metric"], "mean_row_total");
    }
}
