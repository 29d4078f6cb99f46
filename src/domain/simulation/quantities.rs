//! Component quantities and their renewal/energy-scaled forms.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{DomainError, MaterialName, ValidationError};

/// Physical quantity per material for one alternative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentQuantities(BTreeMap<MaterialName, f64>);

impl ComponentQuantities {
    /// Creates validated quantities.
    ///
    /// # Errors
    /// `InvalidParameter` if any quantity is negative or not finite.
    pub fn new(quantities: BTreeMap<MaterialName, f64>) -> Result<Self, DomainError> {
        let quantities = Self(quantities);
        quantities.validate()?;
        Ok(quantities)
    }

    /// Builds quantities from (name, value) pairs. Aliases merge by summing.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[(S, f64)]) -> Result<Self, DomainError> {
        let mut map = BTreeMap::new();
        for (name, value) in pairs {
            let material = MaterialName::new(name)?;
            *map.entry(material).or_insert(0.0) += *value;
        }
        Self::new(map)
    }

    /// Checks every quantity is finite and non-negative.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (material, quantity) in &self.0 {
            if !quantity.is_finite() || *quantity < 0.0 {
                let field = format!("quantity.{}", material);
                let reason = ValidationError::negative(field.as_str(), *quantity).to_string();
                return Err(DomainError::invalid_parameter(field, reason)
                    .with_detail("material", material.as_str()));
            }
        }
        Ok(())
    }

    /// Quantity of a material; 0 when absent.
    pub fn get(&self, material: &MaterialName) -> f64 {
        self.0.get(material).copied().unwrap_or(0.0)
    }

    /// Materials in canonical order.
    pub fn materials(&self) -> impl Iterator<Item = &MaterialName> {
        self.0.keys()
    }

    /// Iterates over (material, quantity).
    pub fn iter(&self) -> impl Iterator<Item = (&MaterialName, f64)> {
        self.0.iter().map(|(m, q)| (m, *q))
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no materials.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy with one quantity replaced.
    pub fn with_quantity(&self, material: &MaterialName, quantity: f64) -> Self {
        let mut map = self.0.clone();
        map.insert(material.clone(), quantity);
        Self(map)
    }
}

/// Per-column multipliers of one draw, with the two quantity totals.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledQuantities {
    multipliers: BTreeMap<String, f64>,
    pub energy_system_total: f64,
    pub building_component_total: f64,
}

impl ScaledQuantities {
    pub(crate) fn new(
        multipliers: BTreeMap<String, f64>,
        energy_system_total: f64,
        building_component_total: f64,
    ) -> Self {
        Self {
            multipliers,
            energy_system_total,
            building_component_total,
        }
    }

    /// Multiplier for a column; 1 for columns without one.
    pub fn multiplier(&self, column: &str) -> f64 {
        self.multipliers.get(column).copied().unwrap_or(1.0)
    }
}

/// Mean quantity figures over all draws of an alternative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityBreakdown {
    pub energy_system_total: f64,
    pub building_component_total: f64,
    pub renewal_factors: BTreeMap<MaterialName, f64>,
}

/// Running sums used to build a [`QuantityBreakdown`].
#[derive(Debug, Clone, Default)]
pub(crate) struct BreakdownAccumulator {
    draws: usize,
    energy_system_total: f64,
    building_component_total: f64,
    renewal_factors: BTreeMap<MaterialName, f64>,
}

impl BreakdownAccumulator {
    pub(crate) fn add<'a, I>(&mut self, scaled: &ScaledQuantities, factors: I)
    where
        I: IntoIterator<Item = (&'a MaterialName, f64)>,
    {
        self.draws += 1;
        self.energy_system_total += scaled.energy_system_total;
        self.building_component_total += scaled.building_component_total;
        for (material, factor) in factors {
            *self.renewal_factors.entry(material.clone()).or_insert(0.0) += factor;
        }
    }

    pub(crate) fn finish(self) -> QuantityBreakdown {
        if self.draws == 0 {
            return QuantityBreakdown::default();
        }
        let n = self.draws as f64;
        QuantityBreakdown {
            energy_system_total: self.energy_system_total / n,
            building_component_total: self.building_component_total / n,
            renewal_factors: self
                .renewal_factors
                .into_iter()
                .map(|(m, sum)| (m, sum / n))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn negative_quantity_is_rejected_with_material() {
        let err = ComponentQuantities::from_pairs(&[("Hemp", -1.0)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
        assert_eq!(err.detail("material"), Some("Hemp"));
        assert_eq!(err.detail("parameter"), Some("quantity.Hemp"));
    }

    #[test]
    fn non_finite_quantity_is_an_invalid_parameter() {
        let err = ComponentQuantities::from_pairs(&[("Concrete", f64::NAN)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
        assert_eq!(err.detail("material"), Some("Concrete"));
    }

    #[test]
    fn aliases_merge() {
        let q = ComponentQuantities::from_pairs(&[("XPS", 1.0), ("Polystyrene", 2.0)]).unwrap();
        assert_eq!(q.len(), 1);
        assert_eq!(q.get(&MaterialName::new("Polystyrene").unwrap()), 3.0);
    }

    #[test]
    fn with_quantity_leaves_source_unchanged() {
        let hemp = MaterialName::new("Hemp").unwrap();
        let q = ComponentQuantities::from_pairs(&[("Hemp", 1.0)]).unwrap();
        let changed = q.with_quantity(&hemp, 5.0);
        assert_eq!(q.get(&hemp), 1.0);
        assert_eq!(changed.get(&hemp), 5.0);
    }

    #[test]
    fn missing_multiplier_defaults_to_one() {
        let scaled = ScaledQuantities::new(BTreeMap::new(), 0.0, 0.0);
        assert_eq!(scaled.multiplier("Transportation to Landfill"), 1.0);
    }

    #[test]
    fn breakdown_averages_over_draws() {
        let hemp = MaterialName::new("Hemp").unwrap();
        let mut acc = BreakdownAccumulator::default();
        acc.add(&ScaledQuantities::new(BTreeMap::new(), 10.0, 2.0), [(&hemp, 1.0)]);
        acc.add(&ScaledQuantities::new(BTreeMap::new(), 20.0, 4.0), [(&hemp, 3.0)]);

        let breakdown = acc.finish();
        assert_eq!(breakdown.energy_system_total, 15.0);
        assert_eq!(breakdown.building_component_total, 3.0);
        assert_eq!(breakdown.renewal_factors[&hemp], 2.0);
    }
}
