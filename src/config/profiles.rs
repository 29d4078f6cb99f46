//! Profile store configuration

use serde::Deserialize;

use crate::domain::profile::FallbackPolicy;

/// Fallback behaviour for materials missing from the profile table
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilesConfig {
    /// Synthesize missing profiles from class priors
    #[serde(default = "default_fallback_enabled")]
    pub fallback_enabled: bool,

    /// Seed of the deterministic synthesis
    #[serde(default = "default_fallback_seed")]
    pub fallback_seed: u64,
}

impl ProfilesConfig {
    pub fn fallback_policy(&self) -> FallbackPolicy {
        if self.fallback_enabled {
            FallbackPolicy::Synthesize {
                seed: self.fallback_seed,
            }
        } else {
            FallbackPolicy::Disabled
        }
    }
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: default_fallback_enabled(),
            fallback_seed: default_fallback_seed(),
        }
    }
}

fn default_fallback_enabled() -> bool {
    true
}

fn default_fallback_seed() -> u64 {
    42
}
