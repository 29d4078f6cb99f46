//! Application handlers.
//!
//! Command handlers that orchestrate domain operations. Every handler takes a
//! command plus a caller-owned `RunContext`; nothing is kept between runs.

mod compare_alternatives;
mod engine_factory;
mod run_sensitivity;
mod simulate_alternatives;

pub use compare_alternatives::{
    CompareAlternativesCommand, CompareAlternativesHandler, ComparisonHeatmaps, ComparisonReport,
};
pub use engine_factory::EngineFactory;
pub use run_sensitivity::{RunSensitivityCommand, RunSensitivityHandler, RunSensitivityResult};
pub use simulate_alternatives::{
    SimulateAlternativesCommand, SimulateAlternativesHandler, SimulateAlternativesResult,
};
