//! Sensitivity Module - One-at-a-time parameter influence.
//!
//! A `BaseState` is never mutated. Each trial applies one
//! `ParameterOverride` to get its own state, runs the full simulation on the
//! baseline's random stream and compares the output metric.

mod analyzer;
mod state;

pub use analyzer::{SensitivityAnalyzer, SensitivityRecord, SensitivityReport, SensitivityTarget};
pub use state::{BaseState, Parameter, ParameterOverride, PerturbationFraction};
