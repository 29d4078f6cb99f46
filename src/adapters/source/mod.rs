//! Source adapters for profiles and scenarios

mod file_format;
mod file_profile_source;
mod file_scenario_source;
mod in_memory_profile_source;

pub use file_format::{read_document, FileFormat};
pub use file_profile_source::FileProfileSource;
pub use file_scenario_source::FileScenarioSource;
pub use in_memory_profile_source::InMemoryProfileSource;
