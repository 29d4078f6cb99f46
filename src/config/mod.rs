//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `LCA_UNCERTAINTY` prefix and nested values use double underscores as separators.
//! Every setting has a default, so an empty environment is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use lca_uncertainty::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Simulating {} draws per alternative", config.simulation.draws);
//! ```

mod comparison;
mod error;
mod logging;
mod profiles;
mod renewal;
mod sensitivity;
mod simulation;

pub use comparison::ComparisonConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use profiles::ProfilesConfig;
pub use renewal::{LifeDrawPolicyKind, RenewalConfig};
pub use sensitivity::SensitivityConfig;
pub use simulation::SimulationConfig;

use serde::Deserialize;

use crate::domain::foundation::DomainError;
use crate::domain::simulation::EngineSettings;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Draw count, seed and sampler guards
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Service-life sampling
    #[serde(default)]
    pub renewal: RenewalConfig,

    /// Missing-profile fallback
    #[serde(default)]
    pub profiles: ProfilesConfig,

    /// Comparison metric tunables
    #[serde(default)]
    pub comparison: ComparisonConfig,

    /// One-at-a-time sensitivity analysis
    #[serde(default)]
    pub sensitivity: SensitivityConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LCA_UNCERTAINTY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LCA_UNCERTAINTY__SIMULATION__DRAWS=5000` -> `simulation.draws = 5000`
    /// - `LCA_UNCERTAINTY__COMPARISON__ROW_ALIGNMENT=strict` -> `comparison.row_alignment = strict`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LCA_UNCERTAINTY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.simulation.validate()?;
        self.renewal.validate()?;
        self.comparison.validate()?;
        self.sensitivity.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Engine settings for one run, including the standard exogenous components
    pub fn engine_settings(&self) -> Result<EngineSettings, DomainError> {
        Ok(EngineSettings {
            sampler: self.simulation.sampler(),
            renewal: self.renewal.model()?,
            ..EngineSettings::standard()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comparison::RowAlignment;
    use crate::domain::profile::FallbackPolicy;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "LCA_UNCERTAINTY__SIMULATION__DRAWS",
        "LCA_UNCERTAINTY__SIMULATION__SEED",
        "LCA_UNCERTAINTY__SIMULATION__PARALLEL",
        "LCA_UNCERTAINTY__PROFILES__FALLBACK_ENABLED",
        "LCA_UNCERTAINTY__COMPARISON__ROW_ALIGNMENT",
        "LCA_UNCERTAINTY__SENSITIVITY__PERTURBATION_FRACTION",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.simulation.draws, 1000);
        assert_eq!(config.simulation.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("LCA_UNCERTAINTY__SIMULATION__DRAWS", "5000");
        env::set_var("LCA_UNCERTAINTY__SIMULATION__SEED", "17");
        env::set_var("LCA_UNCERTAINTY__SIMULATION__PARALLEL", "false");
        env::set_var("LCA_UNCERTAINTY__PROFILES__FALLBACK_ENABLED", "false");
        env::set_var("LCA_UNCERTAINTY__COMPARISON__ROW_ALIGNMENT", "strict");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.simulation.draws, 5000);
        assert_eq!(config.simulation.seed, Some(17));
        assert!(!config.simulation.parallel);
        assert_eq!(config.profiles.fallback_policy(), FallbackPolicy::Disabled);
        assert_eq!(config.comparison.row_alignment, RowAlignment::Strict);
    }

    #[test]
    fn test_validate_rejects_bad_fraction() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("LCA_UNCERTAINTY__SENSITIVITY__PERTURBATION_FRACTION", "2.0");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidPerturbationFraction(2.0))
        );
    }

    #[test]
    fn test_engine_settings_carry_configured_values() {
        let mut config = AppConfig::default();
        config.simulation.sigma_cap = 0.3;

        let settings = config.engine_settings().unwrap();
        assert_eq!(settings.sampler.sigma_cap, 0.3);
        assert_eq!(settings.exogenous.len(), 1);
    }
}
