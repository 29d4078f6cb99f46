//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("simulation.draws must be positive")]
    InvalidDrawCount,

    #[error("simulation.sigma_cap must be positive and finite, got {0}")]
    InvalidSigmaCap(f64),

    #[error("simulation.value_ceiling must be positive and finite, got {0}")]
    InvalidValueCeiling(f64),

    #[error("simulation.sentinel_value must be finite and non-negative, got {0}")]
    InvalidSentinelValue(f64),

    #[error("renewal.material_life_variation must be finite and non-negative, got {0}")]
    InvalidLifeVariation(f64),

    #[error("renewal.max_resample_attempts must be positive")]
    InvalidResampleAttempts,

    #[error("renewal.clamp_epsilon must be positive and finite, got {0}")]
    InvalidClampEpsilon(f64),

    #[error("comparison.indifference_threshold must be finite and non-negative, got {0}")]
    InvalidIndifferenceThreshold(f64),

    #[error("sensitivity.perturbation_fraction must be in (0, 1], got {0}")]
    InvalidPerturbationFraction(f64),

    #[error("sensitivity.top_n must be positive")]
    InvalidTopN,

    #[error("logging.log_level is not a valid filter directive: {0}")]
    InvalidLogLevel(String),
}
