//! Simulation Module - Monte Carlo pipeline from quantities to Row Totals.
//!
//! # Components
//!
//! - `LognormalSampler` - moment-matched draws with tagged fallback outcomes
//! - `RenewalModel` - replacement factors from sampled service lives
//! - `ImpactAggregator` - the four aggregation stages of one draw
//! - `SimulationEngine` - runs independent, seedable draws per alternative
//!
//! # Design
//!
//! Every draw owns its random generator, seeded from the run seed, the
//! alternative's stream and the draw index. Draws are independent and run in
//! parallel without shared mutable state.

mod aggregator;
mod components;
mod context;
mod engine;
mod matrix;
mod quantities;
mod renewal;
mod sampler;
mod table;

pub use aggregator::{ImpactAggregator, ModuleTotals, ResolvedProfiles};
pub use components::{
    EnergySystemCatalog, EnergySystemComponent, ExogenousComponent, ModuleCatalog,
    ModuleDefinition, ModulePlan, ModuleRole, PlannedModule, ProductionVariant,
};
pub use context::RunContext;
pub use engine::{
    AlternativeSimulation, AlternativeSpec, CategorySeries, EngineSettings, SimulationEngine,
    SimulationReport,
};
pub use matrix::SimulationMatrix;
pub use quantities::{ComponentQuantities, QuantityBreakdown, ScaledQuantities};
pub use renewal::{LifeDrawPolicy, RenewalFactors, RenewalModel, ServiceLifeParams, ServiceLifeTable};
pub use sampler::{
    LognormalParams, LognormalSampler, SampleOutcome, SamplerConfig, SamplingDiagnostics,
    SubstitutionReason,
};
pub use table::{Column, ColumnData, ColumnKind, ImpactTable, CATEGORY_COLUMN};
