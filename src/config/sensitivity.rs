//! Sensitivity analysis configuration

use serde::Deserialize;

use crate::domain::sensitivity::PerturbationFraction;

use super::error::ValidationError;

/// One-at-a-time analysis settings
#[derive(Debug, Clone, Deserialize)]
pub struct SensitivityConfig {
    /// Relative change applied to each parameter
    #[serde(default = "default_perturbation_fraction")]
    pub perturbation_fraction: f64,

    /// Records kept in the reported top list
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl SensitivityConfig {
    pub fn fraction(&self) -> Result<PerturbationFraction, ValidationError> {
        PerturbationFraction::new(self.perturbation_fraction)
            .map_err(|_| ValidationError::InvalidPerturbationFraction(self.perturbation_fraction))
    }

    /// Validate sensitivity configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.fraction()?;
        if self.top_n == 0 {
            return Err(ValidationError::InvalidTopN);
        }
        Ok(())
    }
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            perturbation_fraction: default_perturbation_fraction(),
            top_n: default_top_n(),
        }
    }
}

fn default_perturbation_fraction() -> f64 {
    0.1
}

fn default_top_n() -> usize {
    5
}
