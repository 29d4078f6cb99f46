//! Simulation configuration

use serde::Deserialize;

use crate::domain::foundation::DomainError;
use crate::domain::simulation::{RunContext, SamplerConfig};

use super::error::ValidationError;

/// Draw count, seeding and numeric guards of the Monte Carlo pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Draws per alternative
    #[serde(default = "default_draws")]
    pub draws: usize,

    /// Fixed seed; a random one is drawn per run when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Upper bound on the lognormal σ
    #[serde(default = "default_sigma_cap")]
    pub sigma_cap: f64,

    /// Draws above this are replaced by `sentinel_value`
    #[serde(default = "default_value_ceiling")]
    pub value_ceiling: f64,

    #[serde(default = "default_sentinel_value")]
    pub sentinel_value: f64,

    /// Run draws and sensitivity trials on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Report per-module subtotals next to the Row Total
    #[serde(default)]
    pub include_modules: bool,
}

impl SimulationConfig {
    /// Sampler guards for the engine
    pub fn sampler(&self) -> SamplerConfig {
        SamplerConfig {
            sigma_cap: self.sigma_cap,
            value_ceiling: self.value_ceiling,
            sentinel_value: self.sentinel_value,
        }
    }

    /// Run context, with optional per-scenario overrides of draws and seed
    pub fn run_context(
        &self,
        draws: Option<usize>,
        seed: Option<u64>,
    ) -> Result<RunContext, DomainError> {
        Ok(RunContext::new(draws.unwrap_or(self.draws), seed.or(self.seed))?
            .with_modules(self.include_modules)
            .with_parallel(self.parallel))
    }

    /// Validate simulation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.draws == 0 {
            return Err(ValidationError::InvalidDrawCount);
        }
        if !(self.sigma_cap > 0.0) || !self.sigma_cap.is_finite() {
            return Err(ValidationError::InvalidSigmaCap(self.sigma_cap));
        }
        if !(self.value_ceiling > 0.0) || !self.value_ceiling.is_finite() {
            return Err(ValidationError::InvalidValueCeiling(self.value_ceiling));
        }
        if !self.sentinel_value.is_finite() || self.sentinel_value < 0.0 {
            return Err(ValidationError::InvalidSentinelValue(self.sentinel_value));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            draws: default_draws(),
            seed: None,
            sigma_cap: default_sigma_cap(),
            value_ceiling: default_value_ceiling(),
            sentinel_value: default_sentinel_value(),
            parallel: default_parallel(),
            include_modules: false,
        }
    }
}

fn default_draws() -> usize {
    1000
}

fn default_sigma_cap() -> f64 {
    0.5
}

fn default_value_ceiling() -> f64 {
    1e6
}

fn default_sentinel_value() -> f64 {
    1000.0
}

fn default_parallel() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_defaults_match_sampler_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.draws, 1000);
        assert_eq!(config.sampler(), SamplerConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_run_context_overrides() {
        let config = SimulationConfig {
            seed: Some(1),
            include_modules: true,
            ..SimulationConfig::default()
        };

        let ctx = config.run_context(Some(10), None).unwrap();
        assert_eq!(ctx.draws, 10);
        assert_eq!(ctx.seed, 1);
        assert!(ctx.include_modules);

        let ctx = config.run_context(None, Some(9)).unwrap();
        assert_eq!(ctx.draws, 1000);
        assert_eq!(ctx.seed, 9);
    }

    #[test]
    fn test_invalid_sigma_cap() {
        let config = SimulationConfig {
            sigma_cap: 0.0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidSigmaCap(0.0)));
    }

    #[test]
    fn test_zero_draws() {
        let config = SimulationConfig {
            draws: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidDrawCount));
    }
}
