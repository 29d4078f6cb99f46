//! Scenario Source Port - The alternatives and settings of one analysis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::domain::comparison::RankingBasis;
use crate::domain::foundation::{DomainError, ImpactCategory, MaterialName};
use crate::domain::profile::ImpactProfileTable;
use crate::domain::simulation::{AlternativeSpec, ServiceLifeParams, ServiceLifeTable};

use super::SourceError;

/// One analysis request as handed over by a collaborator.
///
/// Profiles are either embedded or referenced by `profiles_path`; embedded
/// profiles win when both are given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,

    /// Building service life distribution.
    pub service_life: ServiceLifeParams,

    pub alternatives: Vec<AlternativeSpec>,

    #[serde(default)]
    pub profiles: Option<ImpactProfileTable>,

    #[serde(default)]
    pub profiles_path: Option<PathBuf>,

    /// Category order of the results; the categories of the profile table when absent.
    #[serde(default)]
    pub categories: Option<Vec<ImpactCategory>>,

    /// Expected service lives replacing the defaults for this run.
    #[serde(default)]
    pub service_lives: BTreeMap<MaterialName, f64>,

    /// Alternatives to run a sensitivity analysis on.
    #[serde(default)]
    pub sensitivity: Vec<String>,

    #[serde(default)]
    pub ranking_basis: RankingBasis,

    /// Overrides the configured draw count.
    #[serde(default)]
    pub draws: Option<usize>,

    /// Overrides the configured seed.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Scenario {
    /// Checks the structure of the scenario.
    ///
    /// # Errors
    /// `SourceError::Invalid` for no alternatives, duplicate names, an unknown
    /// sensitivity alternative or missing profiles.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.alternatives.is_empty() {
            return Err(SourceError::Invalid(
                "scenario defines no alternatives".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for alternative in &self.alternatives {
            if !seen.insert(alternative.name.as_str()) {
                return Err(SourceError::Invalid(format!(
                    "duplicate alternative '{}'",
                    alternative.name
                )));
            }
        }

        if let Some(unknown) = self.sensitivity.iter().find(|n| !seen.contains(n.as_str())) {
            return Err(SourceError::Invalid(format!(
                "sensitivity requested for unknown alternative '{}'",
                unknown
            )));
        }

        if self.profiles.is_none() && self.profiles_path.is_none() {
            return Err(SourceError::Invalid(
                "scenario needs either 'profiles' or 'profiles_path'".to_string(),
            ));
        }

        if self.draws == Some(0) {
            return Err(SourceError::Invalid("draws must be positive".to_string()));
        }

        Ok(())
    }

    /// Alternative by name.
    pub fn alternative(&self, name: &str) -> Option<&AlternativeSpec> {
        self.alternatives.iter().find(|a| a.name == name)
    }

    /// `base` with this scenario's service-life overrides applied.
    pub fn service_life_table(&self, base: &ServiceLifeTable) -> Result<ServiceLifeTable, DomainError> {
        self.service_lives
            .iter()
            .try_fold(base.clone(), |table, (material, years)| {
                table.with_life(material.clone(), *years)
            })
    }
}

/// Port for loading scenarios.
#[async_trait]
pub trait ScenarioSource: Send + Sync {
    /// Load and validate a scenario.
    ///
    /// # Errors
    /// Returns `SourceError` if the scenario cannot be read, parsed or validated.
    async fn load_scenario(&self) -> Result<Scenario, SourceError>;
}
