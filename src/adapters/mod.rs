//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `source` - Profile and scenario sources (in-memory, JSON/YAML files)

pub mod source;

pub use source::{FileProfileSource, FileScenarioSource, InMemoryProfileSource};
