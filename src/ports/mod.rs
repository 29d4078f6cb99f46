//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Input Ports
//!
//! - `ProfileSource` - Per-material impact statistics for one run
//! - `ScenarioSource` - Alternatives, service life and analysis options
//!
//! All I/O happens behind these ports and completes before the simulation
//! pipeline starts.

mod profile_source;
mod scenario_source;
mod source_error;

pub use profile_source::ProfileSource;
pub use scenario_source::{Scenario, ScenarioSource};
pub use source_error::SourceError;
