//! Synthetic fallback profiles for materials missing from the reference tables.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ImpactCategory, MaterialClass, MaterialName};

use super::IntensityStats;

/// What to do when a material or category has no measured statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Missing profiles are an error.
    Disabled,
    /// Missing profiles are synthesized from class priors, deterministically per seed.
    Synthesize { seed: u64 },
}

impl FallbackPolicy {
    /// Returns true if missing profiles are synthesized.
    pub fn is_enabled(&self) -> bool {
        matches!(self, FallbackPolicy::Synthesize { .. })
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::Synthesize { seed: 42 }
    }
}

/// Uniform prior ranges for synthesized (mean, std) pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisPrior {
    pub mean_range: (f64, f64),
    pub std_range: (f64, f64),
}

impl SynthesisPrior {
    /// Prior calibrated for a material class.
    pub fn for_class(class: MaterialClass) -> Self {
        let (mean_range, std_range) = match class {
            MaterialClass::Masonry => ((0.5, 5.0), (0.1, 0.5)),
            MaterialClass::Wood => ((0.2, 3.0), (0.1, 0.4)),
            MaterialClass::Metal => ((3.0, 10.0), (0.3, 0.7)),
            MaterialClass::Insulation => ((0.3, 2.5), (0.1, 0.3)),
            MaterialClass::System => ((5.0, 15.0), (0.5, 1.0)),
            MaterialClass::Glass | MaterialClass::Transport | MaterialClass::Other => {
                ((0.1, 5.0), (0.1, 0.5))
            }
        };
        Self {
            mean_range,
            std_range,
        }
    }
}

/// Mean multiplier that keeps each category's order of magnitude plausible.
pub fn category_scale(category: &ImpactCategory) -> f64 {
    if category.is_climate_change() {
        2.0
    } else if category.is_resource_use() {
        1.5
    } else {
        1.0
    }
}

/// Synthesizes statistics for one (material, category) pair.
///
/// The same seed, material and category always yield the same pair, so a
/// store with a fallback policy stays immutable and its lookups pure.
pub fn synthesize(seed: u64, material: &MaterialName, category: &ImpactCategory) -> IntensityStats {
    let prior = SynthesisPrior::for_class(material.class());
    let mut rng = StdRng::seed_from_u64(seed ^ fingerprint(material.as_str(), category.as_str()));

    let mean = rng.gen_range(prior.mean_range.0..prior.mean_range.1) * category_scale(category);
    let std = rng.gen_range(prior.std_range.0..prior.std_range.1);

    IntensityStats { mean, std }
}

/// FNV-1a over the material and category names.
fn fingerprint(material: &str, category: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    material
        .bytes()
        .chain(std::iter::once(0x1f))
        .chain(category.bytes())
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}
