//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Profiles are loaded through ports before any computation starts; the
//! CPU-bound pipeline runs on blocking threads.

pub mod handlers;

pub use handlers::{
    CompareAlternativesCommand, CompareAlternativesHandler, ComparisonHeatmaps, ComparisonReport,
    EngineFactory, RunSensitivityCommand, RunSensitivityHandler, RunSensitivityResult,
    SimulateAlternativesCommand, SimulateAlternativesHandler, SimulateAlternativesResult,
};
