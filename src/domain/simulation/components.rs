//! Component catalogs used by the aggregation stages.
//!
//! - `EnergySystemCatalog` - fixed-unit energy systems and their per-unit scaling
//! - `ExogenousComponent` - normally distributed columns without impact profiles
//! - `ModuleCatalog` - named groups of columns summed into module subtotals

use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::collections::BTreeSet;
use tracing::warn;

use crate::domain::foundation::{DomainError, MaterialClass, MaterialName};

// Energy systems

/// One fixed-unit energy system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySystemComponent {
    pub material: MaterialName,
    pub units_per_quantity: f64,
    pub kg_per_unit: f64,
}

impl EnergySystemComponent {
    /// Multiplier applied on top of the renewal-scaled quantity.
    pub fn multiplier(&self) -> f64 {
        self.units_per_quantity * self.kg_per_unit
    }
}

/// Energy systems whose quantity is scaled by unit count and unit mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnergySystemCatalog {
    components: Vec<EnergySystemComponent>,
}

impl EnergySystemCatalog {
    /// Creates a catalog from explicit components.
    ///
    /// # Errors
    /// `InvalidParameter` for negative or non-finite scaling values.
    pub fn new(components: Vec<EnergySystemComponent>) -> Result<Self, DomainError> {
        for c in &components {
            if !c.multiplier().is_finite() || c.units_per_quantity < 0.0 || c.kg_per_unit < 0.0 {
                return Err(DomainError::invalid_parameter(
                    "energy_system",
                    format!("Invalid scaling for energy system '{}'", c.material),
                )
                .with_detail("material", c.material.as_str()));
            }
        }
        Ok(Self { components })
    }

    /// Looks up the component for a material.
    pub fn get(&self, material: &MaterialName) -> Option<&EnergySystemComponent> {
        self.components.iter().find(|c| &c.material == material)
    }

    /// Returns true if the material is an energy system.
    pub fn contains(&self, material: &MaterialName) -> bool {
        self.get(material).is_some()
    }
}

impl Default for EnergySystemCatalog {
    fn default() -> Self {
        let entry = |name: &str, units: f64, kg: f64| {
            MaterialName::new(name).ok().map(|material| EnergySystemComponent {
                material,
                units_per_quantity: units,
                kg_per_unit: kg,
            })
        };
        Self {
            components: [
                entry("PV Systems", 400.0, 1.0),
                entry("Battery", 250.0, 25.0),
                entry("HVAC", 50.0, 1.0),
                entry("DHW", 283.0, 1.0),
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }
}

// Exogenous components

/// A column drawn from Normal(mean, std), independent of the profile store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExogenousComponent {
    pub name: String,
    pub mean: f64,
    pub std: f64,
}

impl ExogenousComponent {
    /// Creates a component, validating its parameters.
    pub fn new(name: impl Into<String>, mean: f64, std: f64) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("exogenous.name", "Name cannot be empty"));
        }
        if !mean.is_finite() || !std.is_finite() || std < 0.0 {
            return Err(DomainError::invalid_parameter(
                "exogenous",
                format!("Invalid distribution for '{}': mean={}, std={}", name, mean, std),
            ));
        }
        Ok(Self { name, mean, std })
    }

    /// Default end-of-life transport leg.
    pub fn defaults() -> Vec<ExogenousComponent> {
        vec![ExogenousComponent {
            name: "Transportation to Landfill".to_string(),
            mean: 30.0,
            std: 4.0,
        }]
    }

    /// Draws `n` non-negative values.
    pub fn draw<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        match Normal::new(self.mean, self.std) {
            Ok(normal) if self.std > 0.0 => (0..n).map(|_| normal.sample(rng).max(0.0)).collect(),
            _ => vec![self.mean.max(0.0); n],
        }
    }
}

// Modules

/// Role a module plays in the Row Total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleRole {
    Envelope,
    DemandSide,
    ProductionPv,
    ProductionPvWithStorage,
    TransportToSite,
    TransportEndOfLife,
}

/// Which production-side module counts for an alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionVariant {
    PvOnly,
    PvWithStorage,
}

impl ProductionVariant {
    /// Storage variant when the alternative has a positive battery quantity.
    pub fn from_battery_quantity(quantity: f64) -> Self {
        if quantity > 0.0 {
            ProductionVariant::PvWithStorage
        } else {
            ProductionVariant::PvOnly
        }
    }
}

/// A named group of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub name: String,
    pub role: ModuleRole,
    #[serde(default)]
    pub members: Vec<MaterialName>,
}

impl ModuleDefinition {
    fn new(name: &str, role: ModuleRole, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            role,
            members: members
                .iter()
                .filter_map(|m| MaterialName::new(m).ok())
                .collect(),
        }
    }

    /// Returns true if this module counts toward the Row Total for the variant.
    pub fn counts_toward_total(&self, variant: ProductionVariant) -> bool {
        match self.role {
            ModuleRole::ProductionPv => variant == ProductionVariant::PvOnly,
            ModuleRole::ProductionPvWithStorage => variant == ProductionVariant::PvWithStorage,
            _ => true,
        }
    }
}

/// Ordered set of module definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleCatalog {
    modules: Vec<ModuleDefinition>,
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self {
            modules: vec![
                ModuleDefinition::new("Module A Envelope", ModuleRole::Envelope, &[]),
                ModuleDefinition::new("Module A Demand Side", ModuleRole::DemandSide, &["HVAC", "DHW"]),
                ModuleDefinition::new(
                    "Module A Production Side PV",
                    ModuleRole::ProductionPv,
                    &["PV Systems"],
                ),
                ModuleDefinition::new(
                    "Module A Production Side PV&Battery",
                    ModuleRole::ProductionPvWithStorage,
                    &["PV Systems", "Battery"],
                ),
                ModuleDefinition::new(
                    "Module A4 Transportation to construction site",
                    ModuleRole::TransportToSite,
                    &["Transport in Morocco", "Transport in France", "Transport Marine"],
                ),
                ModuleDefinition::new(
                    "Module C2 Transportation End Of Life",
                    ModuleRole::TransportEndOfLife,
                    &["Transportation to Landfill"],
                ),
            ],
        }
    }
}

impl ModuleCatalog {
    /// Creates a catalog from explicit definitions.
    pub fn new(modules: Vec<ModuleDefinition>) -> Self {
        Self { modules }
    }

    /// Module definitions in order.
    pub fn modules(&self) -> &[ModuleDefinition] {
        &self.modules
    }

    fn is_listed(&self, column: &str) -> bool {
        self.modules
            .iter()
            .any(|m| m.members.iter().any(|member| member.as_str() == column))
    }

    /// Resolves which present columns feed which module for one alternative.
    ///
    /// Columns not listed in any module join the envelope unless their class is
    /// system or transport; those are left unassigned. Counting modules with no
    /// present column are recorded in `empty_modules`.
    pub fn resolve<S: AsRef<str>>(&self, columns: &[S], variant: ProductionVariant) -> ModulePlan {
        let present: BTreeSet<&str> = columns.iter().map(|c| c.as_ref()).collect();

        let mut unlisted = Vec::new();
        let mut unassigned = Vec::new();
        for column in &present {
            if self.is_listed(column) {
                continue;
            }
            match MaterialClass::classify(column) {
                MaterialClass::System | MaterialClass::Transport => {
                    unassigned.push((*column).to_string());
                }
                _ => unlisted.push((*column).to_string()),
            }
        }

        let mut empty_modules = Vec::new();
        let modules = self
            .modules
            .iter()
            .map(|module| {
                let mut members: Vec<String> = module
                    .members
                    .iter()
                    .filter(|m| present.contains(m.as_str()))
                    .map(|m| m.as_str().to_string())
                    .collect();
                if module.role == ModuleRole::Envelope {
                    members.extend(unlisted.iter().cloned());
                }
                let counts = module.counts_toward_total(variant);
                if members.is_empty() && counts {
                    empty_modules.push(module.name.clone());
                }
                PlannedModule {
                    name: module.name.clone(),
                    members,
                    counts_toward_total: counts,
                }
            })
            .collect();

        ModulePlan {
            modules,
            unassigned,
            empty_modules,
        }
    }
}

/// One module with its resolved columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedModule {
    pub name: String,
    pub members: Vec<String>,
    pub counts_toward_total: bool,
}

/// Column-to-module assignment for one alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct ModulePlan {
    pub modules: Vec<PlannedModule>,
    /// Columns outside every module; they do not reach the Row Total.
    pub unassigned: Vec<String>,
    /// Counting modules without any present column; they contribute zero.
    pub empty_modules: Vec<String>,
}

impl ModulePlan {
    /// Finds a planned module by name.
    pub fn module(&self, name: &str) -> Option<&PlannedModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Whether any column is dropped or any counting module is empty.
    pub fn has_gaps(&self) -> bool {
        !self.unassigned.is_empty() || !self.empty_modules.is_empty()
    }

    /// Warns about dropped columns and empty modules of one alternative.
    ///
    /// Called once per alternative and run, not per simulation.
    pub fn log_gaps(&self, alternative: &str) {
        for column in &self.unassigned {
            warn!(
                alternative,
                column = %column,
                "Column not assigned to any module, excluded from the Row Total"
            );
        }
        for module in &self.empty_modules {
            warn!(
                alternative,
                module = %module,
                "No columns present for module, contributing zero"
            );
        }
    }
}
