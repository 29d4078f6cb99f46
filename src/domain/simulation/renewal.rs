//! Renewal Model - How many times each material is replaced over the building life.

use once_cell::sync::Lazy;
use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::foundation::{DomainError, MaterialName};

/// Expected material service lives in years.
const DEFAULT_SERVICE_LIVES: &[(&str, f64)] = &[
    ("External Wood", 50.0),
    ("OSB", 50.0),
    ("Poutrelle", 50.0),
    ("Beam", 50.0),
    ("Parquet", 50.0),
    ("Steel", 50.0),
    ("Glazing", 25.0),
    ("Wool", 50.0),
    ("WaterProofing", 30.0),
    ("Polystyrene", 30.0),
    ("Gypsum", 30.0),
    ("Aluminium", 25.0),
    ("Paint", 15.0),
    ("Mortar", 50.0),
    ("PV Systems", 25.0),
    ("Battery", 10.0),
    ("HVAC", 20.0),
    ("DHW", 10.0),
    ("Cinderblock", 50.0),
    ("Fired Bricks", 50.0),
    ("Earth", 50.0),
    ("Hemp", 50.0),
    ("Concrete", 50.0),
];

static DEFAULT_TABLE: Lazy<ServiceLifeTable> = Lazy::new(|| {
    let lives = DEFAULT_SERVICE_LIVES
        .iter()
        .filter_map(|(name, years)| MaterialName::new(name).ok().map(|m| (m, *years)))
        .collect();
    ServiceLifeTable { lives }
});

/// Building service-life distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceLifeParams {
    pub mean: f64,
    pub std: f64,
}

impl ServiceLifeParams {
    /// Creates validated parameters.
    ///
    /// # Errors
    /// `InvalidParameter` if mean ≤ 0 or std < 0 (or either is not finite).
    pub fn new(mean: f64, std: f64) -> Result<Self, DomainError> {
        let params = Self { mean, std };
        params.validate()?;
        Ok(params)
    }

    /// Checks the parameters after deserialization.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.mean.is_finite() || self.mean <= 0.0 {
            return Err(DomainError::invalid_parameter(
                "service_life.mean",
                format!("Building service life mean must be positive, got {}", self.mean),
            ));
        }
        if !self.std.is_finite() || self.std < 0.0 {
            return Err(DomainError::invalid_parameter(
                "service_life.std",
                format!(
                    "Building service life std must be non-negative, got {}",
                    self.std
                ),
            ));
        }
        Ok(())
    }
}

/// Expected service life per material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceLifeTable {
    lives: BTreeMap<MaterialName, f64>,
}

impl ServiceLifeTable {
    /// An empty table; every material then gets factor 1.
    pub fn empty() -> Self {
        Self {
            lives: BTreeMap::new(),
        }
    }

    /// Sets or overrides one material's expected life.
    ///
    /// # Errors
    /// `InvalidParameter` if `years` is not a positive finite number.
    pub fn with_life(mut self, material: MaterialName, years: f64) -> Result<Self, DomainError> {
        if !years.is_finite() || years <= 0.0 {
            return Err(DomainError::invalid_parameter(
                "material_life",
                format!("Expected life of '{}' must be positive, got {}", material, years),
            )
            .with_detail("material", material.as_str()));
        }
        self.lives.insert(material, years);
        Ok(self)
    }

    /// Expected life of a material, if known.
    pub fn get(&self, material: &MaterialName) -> Option<f64> {
        self.lives.get(material).copied()
    }

    /// Number of materials with a known life.
    pub fn len(&self) -> usize {
        self.lives.len()
    }

    /// Returns true if no material has a known life.
    pub fn is_empty(&self) -> bool {
        self.lives.is_empty()
    }
}

impl Default for ServiceLifeTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

/// What to do with a non-positive service-life draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum LifeDrawPolicy {
    /// Redraw up to `max_attempts` times, then fail.
    Resample { max_attempts: u32 },
    /// Replace the draw with a small positive value.
    Clamp { epsilon: f64 },
}

impl Default for LifeDrawPolicy {
    fn default() -> Self {
        LifeDrawPolicy::Resample { max_attempts: 32 }
    }
}

/// Renewal factors of one draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenewalFactors {
    pub building_life: f64,
    factors: BTreeMap<MaterialName, f64>,
}

impl RenewalFactors {
    /// Factor for a material; 1 when it was not part of the draw.
    pub fn get(&self, material: &MaterialName) -> f64 {
        self.factors.get(material).copied().unwrap_or(1.0)
    }

    /// Iterates over (material, factor).
    pub fn iter(&self) -> impl Iterator<Item = (&MaterialName, f64)> {
        self.factors.iter().map(|(m, f)| (m, *f))
    }
}

/// Draws building and material lives and turns them into renewal factors.
#[derive(Debug, Clone, PartialEq)]
pub struct RenewalModel {
    lives: ServiceLifeTable,
    material_life_variation: f64,
    policy: LifeDrawPolicy,
}

impl Default for RenewalModel {
    fn default() -> Self {
        Self {
            lives: ServiceLifeTable::default(),
            material_life_variation: 0.05,
            policy: LifeDrawPolicy::default(),
        }
    }
}

impl RenewalModel {
    /// Creates a model.
    ///
    /// # Errors
    /// `InvalidParameter` for a negative or non-finite variation, a zero
    /// resample budget, or a non-positive clamp epsilon.
    pub fn new(
        lives: ServiceLifeTable,
        material_life_variation: f64,
        policy: LifeDrawPolicy,
    ) -> Result<Self, DomainError> {
        if !material_life_variation.is_finite() || material_life_variation < 0.0 {
            return Err(DomainError::invalid_parameter(
                "material_life_variation",
                format!(
                    "Material life variation must be non-negative, got {}",
                    material_life_variation
                ),
            ));
        }
        match policy {
            LifeDrawPolicy::Resample { max_attempts: 0 } => {
                return Err(DomainError::invalid_parameter(
                    "max_resample_attempts",
                    "At least one draw attempt is required",
                ));
            }
            LifeDrawPolicy::Clamp { epsilon } if !(epsilon > 0.0) || !epsilon.is_finite() => {
                return Err(DomainError::invalid_parameter(
                    "clamp_epsilon",
                    format!("Clamp epsilon must be positive, got {}", epsilon),
                ));
            }
            _ => {}
        }

        Ok(Self {
            lives,
            material_life_variation,
            policy,
        })
    }

    /// The expected-life table.
    pub fn lives(&self) -> &ServiceLifeTable {
        &self.lives
    }

    /// Same variation and policy over a different life table.
    pub fn with_lives(&self, lives: ServiceLifeTable) -> Self {
        Self {
            lives,
            ..self.clone()
        }
    }

    /// max(1, building_life / material_life).
    pub fn factor(building_life: f64, material_life: f64) -> f64 {
        (building_life / material_life).max(1.0)
    }

    /// Draws one building life and one life per material, returning their factors.
    ///
    /// Materials without an expected life get factor 1.
    pub fn compute<'a, R, I>(
        &self,
        service_life: &ServiceLifeParams,
        materials: I,
        rng: &mut R,
    ) -> Result<RenewalFactors, DomainError>
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = &'a MaterialName>,
    {
        let building_life =
            self.draw_life(service_life.mean, service_life.std, "building_life", rng)?;

        let mut factors = BTreeMap::new();
        for material in materials {
            let factor = match self.lives.get(material) {
                Some(expected) => {
                    let material_life = self.draw_life(
                        expected,
                        expected * self.material_life_variation,
                        material.as_str(),
                        rng,
                    )?;
                    Self::factor(building_life, material_life)
                }
                None => {
                    debug!(material = %material, "No expected service life, renewal factor 1");
                    1.0
                }
            };
            factors.insert(material.clone(), factor);
        }

        Ok(RenewalFactors {
            building_life,
            factors,
        })
    }

    /// Draws one positive life from Normal(mean, std) under the configured policy.
    ///
    /// A zero std returns the mean without consuming randomness.
    pub fn draw_life<R: Rng + ?Sized>(
        &self,
        mean: f64,
        std: f64,
        subject: &str,
        rng: &mut R,
    ) -> Result<f64, DomainError> {
        if !(mean > 0.0) || !mean.is_finite() {
            return Err(DomainError::invalid_parameter(
                subject,
                format!("Service life mean must be positive, got {}", mean),
            ));
        }
        if std <= 0.0 {
            return Ok(mean);
        }

        let normal = Normal::new(mean, std).map_err(|e| {
            DomainError::invalid_parameter(subject, format!("Invalid life distribution: {}", e))
        })?;

        match self.policy {
            LifeDrawPolicy::Resample { max_attempts } => {
                for _ in 0..max_attempts {
                    let draw = normal.sample(rng);
                    if draw > 0.0 && draw.is_finite() {
                        return Ok(draw);
                    }
                }
                Err(DomainError::degenerate(format!(
                    "No positive service life for '{}' after {} draws from Normal({}, {})",
                    subject, max_attempts, mean, std
                ))
                .with_detail("material", subject))
            }
            LifeDrawPolicy::Clamp { epsilon } => {
                let draw = normal.sample(rng);
                if draw > epsilon && draw.is_finite() {
                    Ok(draw)
                } else {
                    debug!(subject, draw, epsilon, "Clamping non-positive service life draw");
                    Ok(epsilon)
                }
            }
        }
    }
}
