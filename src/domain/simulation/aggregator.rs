//! Impact Aggregator - Turns quantities and sampled intensities into Row Totals.
//!
//! One draw runs four ordered stages:
//!
//! 1. Quantity scaling (renewal factors, energy-system unit scaling)
//! 2. Exogenous column injection
//! 3. Per-draw multiplication of per-unit samples by scaled quantities
//! 4. Module aggregation into a Row Total per impact category

use rand::Rng;
use std::collections::BTreeMap;

use crate::domain::foundation::{DomainError, ImpactCategory, MaterialName};
use crate::domain::profile::{ImpactProfileStore, IntensityStats};

use super::components::{EnergySystemCatalog, ExogenousComponent, ModulePlan};
use super::quantities::{ComponentQuantities, ScaledQuantities};
use super::renewal::RenewalFactors;
use super::sampler::{LognormalSampler, SamplingDiagnostics};
use super::table::ImpactTable;

/// Statistics of every material, resolved once per alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfiles {
    categories: Vec<ImpactCategory>,
    materials: Vec<(MaterialName, Vec<IntensityStats>)>,
    synthetic: Vec<MaterialName>,
}

impl ResolvedProfiles {
    /// Materials with at least one synthesized category.
    pub fn synthetic_materials(&self) -> &[MaterialName] {
        &self.synthetic
    }

    /// Categories in row order.
    pub fn categories(&self) -> &[ImpactCategory] {
        &self.categories
    }
}

/// Per-module and Row Total sums of one draw, one value per category.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleTotals {
    pub modules: Vec<(String, Vec<f64>)>,
    pub row_total: Vec<f64>,
}

/// Runs the aggregation stages against borrowed run-scoped collaborators.
#[derive(Debug, Clone, Copy)]
pub struct ImpactAggregator<'a> {
    profiles: &'a ImpactProfileStore,
    sampler: &'a LognormalSampler,
    energy: &'a EnergySystemCatalog,
    exogenous: &'a [ExogenousComponent],
}

impl<'a> ImpactAggregator<'a> {
    pub fn new(
        profiles: &'a ImpactProfileStore,
        sampler: &'a LognormalSampler,
        energy: &'a EnergySystemCatalog,
        exogenous: &'a [ExogenousComponent],
    ) -> Self {
        Self {
            profiles,
            sampler,
            energy,
            exogenous,
        }
    }

    /// Looks up every (material, category) pair.
    ///
    /// # Errors
    /// `ProfileNotFound` when a pair is missing and fallback is disabled.
    pub fn resolve_profiles<'m, I>(&self, materials: I) -> Result<ResolvedProfiles, DomainError>
    where
        I: IntoIterator<Item = &'m MaterialName>,
    {
        let categories = self.profiles.categories().to_vec();
        let mut resolved = Vec::new();
        let mut synthetic = Vec::new();

        for material in materials {
            let mut stats = Vec::with_capacity(categories.len());
            let mut any_synthetic = false;
            for category in &categories {
                let lookup = self.profiles.get_profile(material, category)?;
                any_synthetic |= lookup.is_synthetic();
                stats.push(lookup.stats);
            }
            if any_synthetic {
                synthetic.push(material.clone());
            }
            resolved.push((material.clone(), stats));
        }

        Ok(ResolvedProfiles {
            categories,
            materials: resolved,
            synthetic,
        })
    }

    /// Stage 1: renewal-scaled quantities plus energy-system unit scaling.
    ///
    /// The building total excludes energy-system materials.
    pub fn scale_quantities(
        &self,
        quantities: &ComponentQuantities,
        factors: &RenewalFactors,
    ) -> ScaledQuantities {
        let mut multipliers = BTreeMap::new();
        let mut energy_system_total = 0.0;
        let mut building_component_total = 0.0;

        for (material, quantity) in quantities.iter() {
            let renewed = quantity * factors.get(material);
            match self.energy.get(material) {
                Some(component) => {
                    let scaled = renewed * component.multiplier();
                    energy_system_total += scaled;
                    multipliers.insert(material.as_str().to_string(), scaled);
                }
                None => {
                    building_component_total += renewed;
                    multipliers.insert(material.as_str().to_string(), renewed);
                }
            }
        }

        ScaledQuantities::new(multipliers, energy_system_total, building_component_total)
    }

    /// Draws one per-unit value per (material, category).
    pub fn sample_unit_impacts<R: Rng + ?Sized>(
        &self,
        resolved: &ResolvedProfiles,
        rng: &mut R,
        diagnostics: &mut SamplingDiagnostics,
    ) -> Result<ImpactTable, DomainError> {
        let mut table = ImpactTable::with_categories(&resolved.categories);
        for (material, stats) in &resolved.materials {
            let values = stats
                .iter()
                .map(|s| {
                    let outcome = self.sampler.sample(*s, rng);
                    diagnostics.record(&outcome);
                    outcome.value()
                })
                .collect();
            table.push_numeric(material.as_str(), values)?;
        }
        Ok(table)
    }

    /// Stage 2: adds exogenous columns not already present.
    pub fn inject_exogenous<R: Rng + ?Sized>(
        &self,
        table: &mut ImpactTable,
        rng: &mut R,
    ) -> Result<(), DomainError> {
        for component in self.exogenous {
            if table.contains(&component.name) {
                continue;
            }
            let values = component.draw(table.row_count(), rng);
            table.push_numeric(component.name.clone(), values)?;
        }
        Ok(())
    }

    /// Stage 3: multiplies each numeric column by its scaled quantity.
    pub fn apply_quantities(&self, table: &ImpactTable, scaled: &ScaledQuantities) -> ImpactTable {
        table.scale_numeric(|column| scaled.multiplier(column))
    }

    /// Stage 4: sums columns into modules and counting modules into the Row Total.
    pub fn aggregate_modules(&self, table: &ImpactTable, plan: &ModulePlan) -> ModuleTotals {
        let rows = table.row_count();
        let mut row_total = vec![0.0; rows];
        let mut modules = Vec::with_capacity(plan.modules.len());

        for module in &plan.modules {
            let sums = table
                .sum_columns(&module.members)
                .unwrap_or_else(|| vec![0.0; rows]);
            if module.counts_toward_total {
                for (total, value) in row_total.iter_mut().zip(&sums) {
                    *total += value;
                }
            }
            modules.push((module.name.clone(), sums));
        }

        ModuleTotals { modules, row_total }
    }

    /// Column names that will exist after stage 2 for these materials.
    pub fn column_names<'m, I>(&self, materials: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'m MaterialName>,
    {
        let mut names: Vec<String> = materials.into_iter().map(|m| m.as_str().to_string()).collect();
        for component in self.exogenous {
            if !names.contains(&component.name) {
                names.push(component.name.clone());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::profile::FallbackPolicy;
    use crate::domain::simulation::components::{ModuleCatalog, ProductionVariant};
    use crate::domain::simulation::renewal::{LifeDrawPolicy, RenewalModel, ServiceLifeParams, ServiceLifeTable};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn material(name: &str) -> MaterialName {
        MaterialName::new(name).unwrap()
    }

    fn store() -> ImpactProfileStore {
        ImpactProfileStore::builder()
            .categories(vec!["Climate change", "Water use"])
            .profile("Hemp", "Climate change", 5.0, 0.0)
            .profile("Hemp", "Water use", 1.0, 0.0)
            .profile("HVAC", "Climate change", 2.0, 0.0)
            .profile("HVAC", "Water use", 0.0, 0.0)
            .fallback(FallbackPolicy::Disabled)
            .build()
            .unwrap()
    }

    fn unit_factors(quantities: &ComponentQuantities) -> RenewalFactors {
        let model = RenewalModel::new(ServiceLifeTable::empty(), 0.0, LifeDrawPolicy::default()).unwrap();
        model
            .compute(
                &ServiceLifeParams::new(50.0, 0.0).unwrap(),
                quantities.materials(),
                &mut StdRng::seed_from_u64(0),
            )
            .unwrap()
    }

    // Stage 1 Tests

    #[test]
    fn energy_systems_are_scaled_and_kept_out_of_building_total() {
        let store = store();
        let sampler = LognormalSampler::default();
        let energy = EnergySystemCatalog::default();
        let aggregator = ImpactAggregator::new(&store, &sampler, &energy, &[]);

        let quantities = ComponentQuantities::from_pairs(&[("Hemp", 10.0), ("HVAC", 2.0)]).unwrap();
        let scaled = aggregator.scale_quantities(&quantities, &unit_factors(&quantities));

        assert_eq!(scaled.multiplier("Hemp"), 10.0);
        assert_eq!(scaled.multiplier("HVAC"), 100.0);
        assert_eq!(scaled.energy_system_total, 100.0);
        assert_eq!(scaled.building_component_total, 10.0);
    }

    // Stage 2 Tests

    #[test]
    fn exogenous_column_is_not_injected_over_profiled_column() {
        let store = store();
        let sampler = LognormalSampler::default();
        let energy = EnergySystemCatalog::default();
        let exogenous = vec![
            ExogenousComponent::new("Hemp", 999.0, 0.0).unwrap(),
            ExogenousComponent::new("Transportation to Landfill", 30.0, 0.0).unwrap(),
        ];
        let aggregator = ImpactAggregator::new(&store, &sampler, &energy, &exogenous);
        let resolved = aggregator.resolve_profiles([&material("Hemp")]).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let mut diagnostics = SamplingDiagnostics::default();
        let mut table = aggregator
            .sample_unit_impacts(&resolved, &mut rng, &mut diagnostics)
            .unwrap();
        aggregator.inject_exogenous(&mut table, &mut rng).unwrap();

        assert_eq!(table.numeric("Hemp"), Some(&[5.0, 1.0][..]));
        assert_eq!(table.numeric("Transportation to Landfill"), Some(&[30.0, 30.0][..]));
        assert_eq!(diagnostics.point_mass, 2);
    }

    // Stage 3 and 4 Tests

    #[test]
    fn single_material_row_total_is_quantity_times_impact() {
        let store = store();
        let sampler = LognormalSampler::default();
        let energy = EnergySystemCatalog::default();
        let aggregator = ImpactAggregator::new(&store, &sampler, &energy, &[]);

        let quantities = ComponentQuantities::from_pairs(&[("Hemp", 10.0)]).unwrap();
        let resolved = aggregator.resolve_profiles(quantities.materials()).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let table = aggregator
            .sample_unit_impacts(&resolved, &mut rng, &mut SamplingDiagnostics::default())
            .unwrap();
        let scaled = aggregator.scale_quantities(&quantities, &unit_factors(&quantities));
        let weighted = aggregator.apply_quantities(&table, &scaled);

        let columns = aggregator.column_names(quantities.materials());
        let plan = ModuleCatalog::default().resolve(&columns, ProductionVariant::PvOnly);
        let totals = aggregator.aggregate_modules(&weighted, &plan);

        assert_eq!(totals.row_total, vec![50.0, 10.0]);
        let envelope = totals
            .modules
            .iter()
            .find(|(name, _)| name == "Module A Envelope")
            .unwrap();
        assert_eq!(envelope.1, vec![50.0, 10.0]);
    }

    #[test]
    fn absent_modules_contribute_zero() {
        let store = store();
        let sampler = LognormalSampler::default();
        let energy = EnergySystemCatalog::default();
        let aggregator = ImpactAggregator::new(&store, &sampler, &energy, &[]);

        let table = ImpactTable::with_categories(store.categories());
        let plan = ModuleCatalog::default().resolve::<&str>(&[], ProductionVariant::PvOnly);
        let totals = aggregator.aggregate_modules(&table, &plan);

        assert_eq!(totals.row_total, vec![0.0, 0.0]);
        assert!(totals.modules.iter().all(|(_, v)| v == &vec![0.0, 0.0]));
    }

    // Profile Resolution Tests

    #[test]
    fn missing_profile_without_fallback_fails() {
        let store = store();
        let sampler = LognormalSampler::default();
        let energy = EnergySystemCatalog::default();
        let aggregator = ImpactAggregator::new(&store, &sampler, &energy, &[]);

        let err = aggregator.resolve_profiles([&material("Steel")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProfileNotFound);
    }

    #[test]
    fn synthetic_materials_are_listed() {
        let store = ImpactProfileStore::builder()
            .categories(vec!["Climate change"])
            .profile("Hemp", "Climate change", 1.0, 0.1)
            .fallback(FallbackPolicy::Synthesize { seed: 5 })
            .build()
            .unwrap();
        let sampler = LognormalSampler::default();
        let energy = EnergySystemCatalog::default();
        let aggregator = ImpactAggregator::new(&store, &sampler, &energy, &[]);

        let resolved = aggregator
            .resolve_profiles([&material("Hemp"), &material("Steel")])
            .unwrap();
        assert_eq!(resolved.synthetic_materials(), &[material("Steel")]);
    }
}
