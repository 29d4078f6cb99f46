//! Renewal configuration

use serde::Deserialize;

use crate::domain::foundation::DomainError;
use crate::domain::simulation::{LifeDrawPolicy, RenewalModel, ServiceLifeTable};

use super::error::ValidationError;

/// Handling of non-positive service-life draws
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LifeDrawPolicyKind {
    #[default]
    Resample,
    Clamp,
}

/// Service-life sampling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RenewalConfig {
    /// Relative std of material lives around their expected value
    #[serde(default = "default_material_life_variation")]
    pub material_life_variation: f64,

    #[serde(default)]
    pub life_draw_policy: LifeDrawPolicyKind,

    #[serde(default = "default_max_resample_attempts")]
    pub max_resample_attempts: u32,

    #[serde(default = "default_clamp_epsilon")]
    pub clamp_epsilon: f64,
}

impl RenewalConfig {
    /// The configured draw policy
    pub fn policy(&self) -> LifeDrawPolicy {
        match self.life_draw_policy {
            LifeDrawPolicyKind::Resample => LifeDrawPolicy::Resample {
                max_attempts: self.max_resample_attempts,
            },
            LifeDrawPolicyKind::Clamp => LifeDrawPolicy::Clamp {
                epsilon: self.clamp_epsilon,
            },
        }
    }

    /// Renewal model over the default life table
    pub fn model(&self) -> Result<RenewalModel, DomainError> {
        RenewalModel::new(
            ServiceLifeTable::default(),
            self.material_life_variation,
            self.policy(),
        )
    }

    /// Validate renewal configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.material_life_variation.is_finite() || self.material_life_variation < 0.0 {
            return Err(ValidationError::InvalidLifeVariation(
                self.material_life_variation,
            ));
        }
        if self.max_resample_attempts == 0 {
            return Err(ValidationError::InvalidResampleAttempts);
        }
        if !(self.clamp_epsilon > 0.0) || !self.clamp_epsilon.is_finite() {
            return Err(ValidationError::InvalidClampEpsilon(self.clamp_epsilon));
        }
        Ok(())
    }
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            material_life_variation: default_material_life_variation(),
            life_draw_policy: LifeDrawPolicyKind::default(),
            max_resample_attempts: default_max_resample_attempts(),
            clamp_epsilon: default_clamp_epsilon(),
        }
    }
}

fn default_material_life_variation() -> f64 {
    0.05
}

fn default_max_resample_attempts() -> u32 {
    32
}

fn default_clamp_epsilon() -> f64 {
    1e-6
}
