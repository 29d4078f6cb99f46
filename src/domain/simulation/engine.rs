//! Simulation Engine - Monte Carlo driver for one alternative.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::domain::foundation::{DomainError, MaterialName, ValidationError};
use crate::domain::profile::ImpactProfileStore;

use super::aggregator::{ImpactAggregator, ModuleTotals, ResolvedProfiles};
use super::components::{
    EnergySystemCatalog, ExogenousComponent, ModuleCatalog, ModulePlan, ProductionVariant,
};
use super::context::RunContext;
use super::matrix::SimulationMatrix;
use super::quantities::{BreakdownAccumulator, ComponentQuantities, QuantityBreakdown, ScaledQuantities};
use super::renewal::{RenewalFactors, RenewalModel, ServiceLifeParams};
use super::sampler::{LognormalSampler, SamplerConfig, SamplingDiagnostics};

/// A named alternative and its component quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeSpec {
    pub name: String,
    pub quantities: ComponentQuantities,
}

impl AlternativeSpec {
    /// Creates a validated alternative.
    pub fn new(name: impl Into<String>, quantities: ComponentQuantities) -> Result<Self, DomainError> {
        let spec = Self {
            name: name.into(),
            quantities,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Checks the name and quantities.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("alternative").into());
        }
        self.quantities
            .validate()
            .map_err(|e| e.with_detail("alternative", self.name.as_str()))
    }

    /// Production module variant implied by the battery quantity.
    pub fn production_variant(&self) -> ProductionVariant {
        let battery = MaterialName::new("Battery")
            .map(|b| self.quantities.get(&b))
            .unwrap_or(0.0);
        ProductionVariant::from_battery_quantity(battery)
    }
}

/// Run-independent engine configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineSettings {
    pub sampler: SamplerConfig,
    pub renewal: RenewalModel,
    pub energy: EnergySystemCatalog,
    pub exogenous: Vec<ExogenousComponent>,
    pub modules: ModuleCatalog,
}

impl EngineSettings {
    /// Defaults including the standard exogenous transport leg.
    pub fn standard() -> Self {
        Self {
            exogenous: ExogenousComponent::defaults(),
            ..Self::default()
        }
    }
}

/// Outcome of simulating one alternative.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "SimulationReport")]
pub struct AlternativeSimulation {
    pub alternative: String,
    /// Draws × impact categories.
    pub row_total: SimulationMatrix,
    /// Draws × impact categories per module, when requested.
    pub modules: Option<BTreeMap<String, SimulationMatrix>>,
    pub quantities: QuantityBreakdown,
    pub synthetic_materials: Vec<MaterialName>,
    pub diagnostics: SamplingDiagnostics,
    pub production_variant: ProductionVariant,
    /// Columns outside every module, excluded from the Row Total.
    pub unassigned_columns: Vec<String>,
    /// Counting modules that had no column and contributed zero.
    pub empty_modules: Vec<String>,
}

impl AlternativeSimulation {
    /// Category names in column order.
    pub fn categories(&self) -> &[String] {
        self.row_total.factors()
    }

    /// Number of draws.
    pub fn draws(&self) -> usize {
        self.row_total.draws()
    }

    /// Row Total draws of one category.
    pub fn row_total_for(&self, category: &str) -> Option<&[f64]> {
        self.row_total.column_by_name(category)
    }

    /// Mean Row Total over every draw and category.
    pub fn mean_row_total(&self) -> f64 {
        self.row_total.grand_mean()
    }

    /// Mean Row Total of one category.
    pub fn mean_row_total_for(&self, category: &str) -> Option<f64> {
        self.row_total
            .factor_index(category)
            .map(|j| self.row_total.column_mean(j))
    }
}

/// Serialized result shape.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub alternative: String,
    pub categories: BTreeMap<String, CategorySeries>,
    pub synthetic_materials: Vec<MaterialName>,
    pub diagnostics: SamplingDiagnostics,
    pub quantities: QuantityBreakdown,
    pub production_variant: ProductionVariant,
    pub unassigned_columns: Vec<String>,
    pub empty_modules: Vec<String>,
}

/// Draws of one impact category.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySeries {
    #[serde(rename = "Row Total")]
    pub row_total: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<BTreeMap<String, Vec<f64>>>,
}

impl From<AlternativeSimulation> for SimulationReport {
    fn from(sim: AlternativeSimulation) -> Self {
        let categories = sim
            .row_total
            .factors()
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let modules = sim.modules.as_ref().map(|modules| {
                    modules
                        .iter()
                        .map(|(module, matrix)| (module.clone(), matrix.column(j).to_vec()))
                        .collect()
                });
                (
                    name.clone(),
                    CategorySeries {
                        row_total: sim.row_total.column(j).to_vec(),
                        modules,
                    },
                )
            })
            .collect();

        SimulationReport {
            alternative: sim.alternative,
            categories,
            synthetic_materials: sim.synthetic_materials,
            diagnostics: sim.diagnostics,
            quantities: sim.quantities,
            production_variant: sim.production_variant,
            unassigned_columns: sim.unassigned_columns,
            empty_modules: sim.empty_modules,
        }
    }
}

/// Everything resolved once per alternative before the draws start.
struct PreparedAlternative<'a> {
    spec: &'a AlternativeSpec,
    resolved: ResolvedProfiles,
    plan: ModulePlan,
}

struct DrawOutcome {
    totals: ModuleTotals,
    scaled: ScaledQuantities,
    factors: RenewalFactors,
    diagnostics: SamplingDiagnostics,
}

/// Runs the full pipeline for alternatives against one profile store.
///
/// The engine is immutable and shared by reference across draws; each draw
/// owns its random generator.
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    profiles: ImpactProfileStore,
    sampler: LognormalSampler,
    settings: EngineSettings,
}

impl SimulationEngine {
    /// Creates an engine for one run.
    pub fn new(profiles: ImpactProfileStore, settings: EngineSettings) -> Self {
        Self {
            profiles,
            sampler: LognormalSampler::new(settings.sampler),
            settings,
        }
    }

    /// The profile store.
    pub fn profiles(&self) -> &ImpactProfileStore {
        &self.profiles
    }

    /// The engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Module assignment of an alternative's columns, including exogenous ones.
    pub fn module_plan(&self, alternative: &AlternativeSpec) -> ModulePlan {
        let columns = self.aggregator().column_names(alternative.quantities.materials());
        self.settings
            .modules
            .resolve(&columns, alternative.production_variant())
    }

    fn aggregator(&self) -> ImpactAggregator<'_> {
        ImpactAggregator::new(
            &self.profiles,
            &self.sampler,
            &self.settings.energy,
            &self.settings.exogenous,
        )
    }

    /// Simulates `ctx.draws` independent draws of one alternative.
    ///
    /// `stream` selects the random stream; different alternatives in one run
    /// use different streams.
    ///
    /// # Errors
    /// - `InvalidParameter` for invalid quantities or service-life parameters
    /// - `ProfileNotFound` when a profile is missing and fallback is disabled
    /// - `DegenerateDistribution` when a life draw cannot be made positive
    pub fn simulate(
        &self,
        alternative: &AlternativeSpec,
        service_life: &ServiceLifeParams,
        ctx: &RunContext,
        stream: u64,
    ) -> Result<AlternativeSimulation, DomainError> {
        let tag = |e: DomainError| e.with_detail("alternative", alternative.name.as_str());

        alternative.validate()?;
        service_life.validate().map_err(tag)?;
        if ctx.draws == 0 {
            return Err(DomainError::invalid_parameter("draws", "Draw count must be positive"));
        }

        let aggregator = self.aggregator();
        let resolved = aggregator
            .resolve_profiles(alternative.quantities.materials())
            .map_err(tag)?;
        let variant = alternative.production_variant();
        let plan = self.module_plan(alternative);

        debug!(
            alternative = %alternative.name,
            draws = ctx.draws,
            materials = alternative.quantities.len(),
            synthetic = resolved.synthetic_materials().len(),
            parallel = ctx.parallel,
            "Simulating alternative"
        );

        let prepared = PreparedAlternative {
            spec: alternative,
            resolved,
            plan,
        };

        let run = |draw: usize| self.run_draw(&prepared, service_life, ctx.stream_seed(stream, draw as u64));
        let outcomes: Result<Vec<DrawOutcome>, DomainError> = if ctx.parallel {
            (0..ctx.draws).into_par_iter().map(run).collect()
        } else {
            (0..ctx.draws).map(run).collect()
        };
        let outcomes = outcomes.map_err(tag)?;

        let simulation = self.assemble(prepared, outcomes, ctx.include_modules, variant)?;
        if simulation.diagnostics.substituted() > 0 {
            info!(
                alternative = %simulation.alternative,
                substituted = simulation.diagnostics.substituted(),
                "Sentinel values substituted during sampling"
            );
        }
        Ok(simulation)
    }

    fn run_draw(
        &self,
        prepared: &PreparedAlternative<'_>,
        service_life: &ServiceLifeParams,
        seed: u64,
    ) -> Result<DrawOutcome, DomainError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let aggregator = self.aggregator();
        let quantities = &prepared.spec.quantities;

        let factors = self
            .settings
            .renewal
            .compute(service_life, quantities.materials(), &mut rng)?;
        let scaled = aggregator.scale_quantities(quantities, &factors);

        let mut diagnostics = SamplingDiagnostics::default();
        let mut table = aggregator.sample_unit_impacts(&prepared.resolved, &mut rng, &mut diagnostics)?;
        aggregator.inject_exogenous(&mut table, &mut rng)?;
        let weighted = aggregator.apply_quantities(&table, &scaled);
        let totals = aggregator.aggregate_modules(&weighted, &prepared.plan);

        Ok(DrawOutcome {
            totals,
            scaled,
            factors,
            diagnostics,
        })
    }

    fn assemble(
        &self,
        prepared: PreparedAlternative<'_>,
        outcomes: Vec<DrawOutcome>,
        include_modules: bool,
        production_variant: ProductionVariant,
    ) -> Result<AlternativeSimulation, DomainError> {
        let categories: Vec<String> = prepared
            .resolved
            .categories()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();

        let mut diagnostics = SamplingDiagnostics::default();
        let mut breakdown = BreakdownAccumulator::default();
        for outcome in &outcomes {
            diagnostics.merge(&outcome.diagnostics);
            breakdown.add(&outcome.scaled, outcome.factors.iter());
        }

        let modules = if include_modules {
            let mut by_module = BTreeMap::new();
            for (k, planned) in prepared.plan.modules.iter().enumerate() {
                let rows = outcomes
                    .iter()
                    .map(|o| o.totals.modules[k].1.clone())
                    .collect();
                by_module.insert(
                    planned.name.clone(),
                    SimulationMatrix::from_rows(categories.clone(), rows)?,
                );
            }
            Some(by_module)
        } else {
            None
        };

        let rows = outcomes.into_iter().map(|o| o.totals.row_total).collect();
        let row_total = SimulationMatrix::from_rows(categories, rows)?;

        Ok(AlternativeSimulation {
            alternative: prepared.spec.name.clone(),
            row_total,
            modules,
            quantities: breakdown.finish(),
            synthetic_materials: prepared.resolved.synthetic_materials().to_vec(),
            diagnostics,
            production_variant,
            unassigned_columns: prepared.plan.unassigned,
            empty_modules: prepared.plan.empty_modules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::profile::FallbackPolicy;
    use crate::domain::simulation::renewal::{LifeDrawPolicy, ServiceLifeTable};

    fn store() -> ImpactProfileStore {
        ImpactProfileStore::builder()
            .categories(vec!["Climate change", "Water use"])
            .profile("Hemp", "Climate change", 5.0, 0.0)
            .profile("Hemp", "Water use", 2.0, 0.5)
            .profile("Concrete", "Climate change", 3.0, 0.3)
            .profile("Concrete", "Water use", 1.0, 0.2)
            .fallback(FallbackPolicy::Disabled)
            .build()
            .unwrap()
    }

    fn deterministic_settings() -> EngineSettings {
        EngineSettings {
            renewal: RenewalModel::new(ServiceLifeTable::default(), 0.0, LifeDrawPolicy::default())
                .unwrap(),
            ..EngineSettings::default()
        }
    }

    fn hemp(quantity: f64) -> AlternativeSpec {
        AlternativeSpec::new(
            "Hemp house",
            ComponentQuantities::from_pairs(&[("Hemp", quantity)]).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn point_mass_profile_gives_exact_row_total() {
        let engine = SimulationEngine::new(store(), deterministic_settings());
        let ctx = RunContext::new(20, Some(1)).unwrap();
        let life = ServiceLifeParams::new(50.0, 0.0).unwrap();

        let sim = engine.simulate(&hemp(10.0), &life, &ctx, 0).unwrap();

        assert_eq!(sim.draws(), 20);
        assert!(sim.row_total_for("Climate change").unwrap().iter().all(|v| *v == 50.0));
        assert_eq!(sim.mean_row_total_for("Climate change"), Some(50.0));
        assert!(sim.modules.is_none());
    }

    #[test]
    fn parallel_and_sequential_runs_match() {
        let engine = SimulationEngine::new(store(), EngineSettings::standard());
        let life = ServiceLifeParams::new(50.0, 5.0).unwrap();
        let alt = AlternativeSpec::new(
            "Mixed",
            ComponentQuantities::from_pairs(&[("Hemp", 3.0), ("Concrete", 8.0)]).unwrap(),
        )
        .unwrap();

        let par = RunContext::new(50, Some(9)).unwrap();
        let seq = par.clone().with_parallel(false);

        let a = engine.simulate(&alt, &life, &par, 0).unwrap();
        let b = engine.simulate(&alt, &life, &seq, 0).unwrap();
        assert_eq!(a.row_total, b.row_total);
    }

    #[test]
    fn module_breakdown_is_included_on_request() {
        let engine = SimulationEngine::new(store(), EngineSettings::standard());
        let ctx = RunContext::new(5, Some(2)).unwrap().with_modules(true);
        let life = ServiceLifeParams::new(50.0, 0.0).unwrap();

        let sim = engine.simulate(&hemp(1.0), &life, &ctx, 0).unwrap();
        let modules = sim.modules.as_ref().unwrap();
        assert!(modules.contains_key("Module A Envelope"));
        assert!(modules.contains_key("Module C2 Transportation End Of Life"));

        let json = serde_json::to_value(&sim).unwrap();
        let series = &json["categories"]["Climate change"];
        assert_eq!(series["Row Total"].as_array().unwrap().len(), 5);
        assert!(series["modules"]["Module A Envelope"].is_array());
    }

    #[test]
    fn report_omits_modules_by_default() {
        let engine = SimulationEngine::new(store(), deterministic_settings());
        let ctx = RunContext::new(3, Some(2)).unwrap();
        let life = ServiceLifeParams::new(50.0, 0.0).unwrap();

        let json = serde_json::to_value(engine.simulate(&hemp(1.0), &life, &ctx, 0).unwrap()).unwrap();
        assert!(json["categories"]["Water use"].get("modules").is_none());
        assert_eq!(json["alternative"], "Hemp house");
    }

    #[test]
    fn missing_profile_error_names_alternative() {
        let engine = SimulationEngine::new(store(), deterministic_settings());
        let ctx = RunContext::new(3, Some(2)).unwrap();
        let life = ServiceLifeParams::new(50.0, 0.0).unwrap();
        let alt = AlternativeSpec::new(
            "Steel frame",
            ComponentQuantities::from_pairs(&[("Steel", 1.0)]).unwrap(),
        )
        .unwrap();

        let err = engine.simulate(&alt, &life, &ctx, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProfileNotFound);
        assert_eq!(err.detail("alternative"), Some("Steel frame"));
        assert_eq!(err.detail("material"), Some("Steel"));
    }

    #[test]
    fn battery_selects_storage_variant() {
        let alt = AlternativeSpec::new(
            "Solar",
            ComponentQuantities::from_pairs(&[("PV Systems", 1.0), ("Battery", 1.0)]).unwrap(),
        )
        .unwrap();
        assert_eq!(alt.production_variant(), ProductionVariant::PvWithStorage);
    }

    #[test]
    fn blank_alternative_name_is_rejected() {
        assert!(AlternativeSpec::new(" ", ComponentQuantities::default()).is_err());
    }

    #[test]
    fn legacy_transport_spelling_counts_toward_row_total() {
        let store = ImpactProfileStore::builder()
            .categories(vec!["Climate change"])
            .profile("Hemp", "Climate change", 5.0, 0.0)
            .profile("Transportation marine", "Climate change", 2.0, 0.0)
            .fallback(FallbackPolicy::Disabled)
            .build()
            .unwrap();
        let settings = EngineSettings {
            renewal: RenewalModel::new(ServiceLifeTable::empty(), 0.0, LifeDrawPolicy::default())
                .unwrap(),
            ..EngineSettings::default()
        };
        let engine = SimulationEngine::new(store, settings);
        let alt = AlternativeSpec::new(
            "Shipped hemp",
            ComponentQuantities::from_pairs(&[("Hemp", 10.0), ("Transportation marine", 10.0)])
                .unwrap(),
        )
        .unwrap();
        let ctx = RunContext::new(8, Some(4)).unwrap();
        let life = ServiceLifeParams::new(50.0, 0.0).unwrap();

        assert!(engine.module_plan(&alt).unassigned.is_empty());
        let sim = engine.simulate(&alt, &life, &ctx, 0).unwrap();

        assert!(sim
            .row_total_for("Climate change")
            .unwrap()
            .iter()
            .all(|v| (v - 70.0).abs() < 1e-9));
        let report = SimulationReport::from(sim);
        assert!(report.unassigned_columns.is_empty());
    }

    #[test]
    fn dropped_columns_are_reported() {
        let store = ImpactProfileStore::builder()
            .categories(vec!["Climate change"])
            .profile("Hemp", "Climate change", 5.0, 0.0)
            .profile("Transport by barge", "Climate change", 2.0, 0.0)
            .fallback(FallbackPolicy::Disabled)
            .build()
            .unwrap();
        let engine = SimulationEngine::new(store, deterministic_settings());
        let alt = AlternativeSpec::new(
            "Barged hemp",
            ComponentQuantities::from_pairs(&[("Hemp", 1.0), ("Transport by barge", 1.0)]).unwrap(),
        )
        .unwrap();
        let ctx = RunContext::new(2, Some(4)).unwrap();
        let life = ServiceLifeParams::new(50.0, 0.0).unwrap();

        let report = SimulationReport::from(engine.simulate(&alt, &life, &ctx, 0).unwrap());

        assert_eq!(report.unassigned_columns, vec!["Transport by barge"]);
        assert!(report.empty_modules.contains(&"Module A Demand Side".to_string()));
    }
}
