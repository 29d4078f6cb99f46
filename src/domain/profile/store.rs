//! Impact Profile Store - Per-material, per-category intensity statistics.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::domain::foundation::{DomainError, ImpactCategory, MaterialName};

use super::fallback::{self, FallbackPolicy};

/// Mean and standard deviation of impact intensity per unit quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityStats {
    pub mean: f64,
    pub std: f64,
}

impl IntensityStats {
    /// Creates a new statistics pair.
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    /// A profile is samplable only when its mean is strictly positive.
    pub fn is_samplable(&self) -> bool {
        self.mean > 0.0
    }
}

/// Where a looked-up profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileOrigin {
    Measured,
    Synthetic,
}

/// Result of a profile lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileLookup {
    pub stats: IntensityStats,
    pub origin: ProfileOrigin,
}

impl ProfileLookup {
    /// Returns true if the statistics were synthesized.
    pub fn is_synthetic(&self) -> bool {
        self.origin == ProfileOrigin::Synthetic
    }
}

/// Raw profile table as handed over by collaborators:
/// material → category → (mean, std).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactProfileTable(pub BTreeMap<MaterialName, BTreeMap<ImpactCategory, IntensityStats>>);

impl ImpactProfileTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one entry, replacing any previous value.
    pub fn insert(&mut self, material: MaterialName, category: ImpactCategory, stats: IntensityStats) {
        self.0.entry(material).or_default().insert(category, stats);
    }

    /// Number of materials in the table.
    pub fn material_count(&self) -> usize {
        self.0.len()
    }

    /// Categories present in the table: EF 3.0 order first, then any others.
    pub fn categories(&self) -> Vec<ImpactCategory> {
        let present: BTreeSet<&ImpactCategory> = self.0.values().flat_map(|c| c.keys()).collect();
        let mut ordered: Vec<ImpactCategory> = ImpactCategory::defaults()
            .iter()
            .filter(|c| present.contains(c))
            .cloned()
            .collect();
        ordered.extend(
            present
                .into_iter()
                .filter(|c| !ImpactCategory::defaults().contains(*c))
                .cloned(),
        );
        ordered
    }
}

/// Measured statistics for one material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialImpactProfile {
    pub material: MaterialName,
    pub intensities: BTreeMap<ImpactCategory, IntensityStats>,
}

/// Immutable lookup of impact statistics, with an optional synthetic fallback.
///
/// One store is built per analysis run and never shared across runs.
#[derive(Debug, Clone)]
pub struct ImpactProfileStore {
    profiles: HashMap<MaterialName, MaterialImpactProfile>,
    categories: Vec<ImpactCategory>,
    fallback: FallbackPolicy,
}

impl ImpactProfileStore {
    /// Creates a builder for constructing a store.
    pub fn builder() -> ImpactProfileStoreBuilder {
        ImpactProfileStoreBuilder::new()
    }

    /// Builds a store from a raw table.
    ///
    /// # Errors
    /// - `InvalidParameter` if any statistic is not finite
    /// - `ValidationFailed` if the category list is empty
    pub fn from_table(
        table: &ImpactProfileTable,
        categories: Vec<ImpactCategory>,
        fallback: FallbackPolicy,
    ) -> Result<Self, DomainError> {
        if categories.is_empty() {
            return Err(DomainError::validation(
                "categories",
                "At least one impact category is required",
            ));
        }

        let mut profiles = HashMap::with_capacity(table.0.len());
        for (material, intensities) in &table.0 {
            for (category, stats) in intensities {
                if !stats.mean.is_finite() || !stats.std.is_finite() {
                    return Err(DomainError::invalid_parameter(
                        "profile",
                        format!(
                            "Non-finite statistics for '{}' in '{}': mean={}, std={}",
                            material, category, stats.mean, stats.std
                        ),
                    )
                    .with_detail("material", material.as_str())
                    .with_detail("category", category.as_str()));
                }
            }
            profiles.insert(
                material.clone(),
                MaterialImpactProfile {
                    material: material.clone(),
                    intensities: intensities.clone(),
                },
            );
        }

        Ok(Self {
            profiles,
            categories,
            fallback,
        })
    }

    /// Looks up statistics for a material in a category.
    ///
    /// # Errors
    /// `ProfileNotFound` when no measured value exists and fallback is disabled.
    pub fn get_profile(
        &self,
        material: &MaterialName,
        category: &ImpactCategory,
    ) -> Result<ProfileLookup, DomainError> {
        if let Some(stats) = self
            .profiles
            .get(material)
            .and_then(|p| p.intensities.get(category))
        {
            return Ok(ProfileLookup {
                stats: *stats,
                origin: ProfileOrigin::Measured,
            });
        }

        match self.fallback {
            FallbackPolicy::Disabled => Err(DomainError::profile_not_found(
                material.as_str(),
                category.as_str(),
            )),
            FallbackPolicy::Synthesize { seed } => {
                debug!(
                    material = %material,
                    category = %category,
                    class = material.class().label(),
                    "Synthesizing fallback impact profile"
                );
                Ok(ProfileLookup {
                    stats: fallback::synthesize(seed, material, category),
                    origin: ProfileOrigin::Synthetic,
                })
            }
        }
    }

    /// Returns the measured profile of a material, if any.
    pub fn measured(&self, material: &MaterialName) -> Option<&MaterialImpactProfile> {
        self.profiles.get(material)
    }

    /// Returns true if the material has at least one measured category.
    pub fn has_material(&self, material: &MaterialName) -> bool {
        self.profiles.contains_key(material)
    }

    /// Ordered impact categories of this store.
    pub fn categories(&self) -> &[ImpactCategory] {
        &self.categories
    }

    /// The configured fallback policy.
    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Number of measured materials.
    pub fn material_count(&self) -> usize {
        self.profiles.len()
    }
}

/// Builder for constructing ImpactProfileStore instances.
#[derive(Debug, Default)]
pub struct ImpactProfileStoreBuilder {
    table: ImpactProfileTable,
    categories: Option<Vec<ImpactCategory>>,
    fallback: Option<FallbackPolicy>,
}

impl ImpactProfileStoreBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the categories; the EF 3.0 list is used when never called.
    pub fn categories(mut self, names: Vec<impl Into<String>>) -> Self {
        self.categories = Some(
            names
                .into_iter()
                .filter_map(|n| ImpactCategory::new(n).ok())
                .collect(),
        );
        self
    }

    /// Adds one measured (mean, std) pair. Blank names are ignored.
    pub fn profile(mut self, material: &str, category: &str, mean: f64, std: f64) -> Self {
        if let (Ok(material), Ok(category)) = (MaterialName::new(material), ImpactCategory::new(category)) {
            self.table.insert(material, category, IntensityStats::new(mean, std));
        }
        self
    }

    /// Sets the fallback policy; synthesis with the default seed when never called.
    pub fn fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = Some(policy);
        self
    }

    /// Builds the store.
    pub fn build(self) -> Result<ImpactProfileStore, DomainError> {
        let categories = self
            .categories
            .unwrap_or_else(|| ImpactCategory::defaults().to_vec());
        ImpactProfileStore::from_table(&self.table, categories, self.fallback.unwrap_or_default())
    }
}
