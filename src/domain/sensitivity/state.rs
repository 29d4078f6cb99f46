//! Immutable base state and pure parameter overrides.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{DomainError, MaterialName, ValidationError};
use crate::domain::simulation::{AlternativeSpec, ServiceLifeParams};

/// Relative perturbation applied to one parameter, in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PerturbationFraction(f64);

impl PerturbationFraction {
    /// Ten percent.
    pub const TEN_PERCENT: Self = Self(0.1);

    /// Creates a fraction, rejecting values outside (0, 1].
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(ValidationError::out_of_range(
                "perturbation_fraction",
                0.0,
                1.0,
                value,
            ));
        }
        Ok(Self(value))
    }

    /// Returns the fraction.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the fraction as a percentage.
    pub fn as_percent(&self) -> f64 {
        self.0 * 100.0
    }
}

impl Default for PerturbationFraction {
    fn default() -> Self {
        Self::TEN_PERCENT
    }
}

impl TryFrom<f64> for PerturbationFraction {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PerturbationFraction> for f64 {
    fn from(fraction: PerturbationFraction) -> Self {
        fraction.0
    }
}

impl fmt::Display for PerturbationFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

/// A tunable input of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "material", rename_all = "snake_case")]
pub enum Parameter {
    Quantity(MaterialName),
    ServiceLifeMean,
    ServiceLifeStd,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Quantity(material) => write!(f, "{}", material),
            Parameter::ServiceLifeMean => write!(f, "Service life mean"),
            Parameter::ServiceLifeStd => write!(f, "Service life std"),
        }
    }
}

/// A replacement value for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterOverride {
    pub parameter: Parameter,
    pub value: f64,
}

/// Inputs of one alternative's pipeline run.
///
/// Never mutated: overrides produce a new state, so trials cannot alias the
/// baseline or each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseState {
    alternative: AlternativeSpec,
    service_life: ServiceLifeParams,
}

impl BaseState {
    /// Creates a validated state.
    pub fn new(alternative: AlternativeSpec, service_life: ServiceLifeParams) -> Result<Self, DomainError> {
        alternative.validate()?;
        service_life.validate()?;
        Ok(Self {
            alternative,
            service_life,
        })
    }

    pub fn alternative(&self) -> &AlternativeSpec {
        &self.alternative
    }

    pub fn service_life(&self) -> &ServiceLifeParams {
        &self.service_life
    }

    /// Every material quantity, then service-life mean and std.
    pub fn parameters(&self) -> Vec<Parameter> {
        self.alternative
            .quantities
            .materials()
            .cloned()
            .map(Parameter::Quantity)
            .chain([Parameter::ServiceLifeMean, Parameter::ServiceLifeStd])
            .collect()
    }

    /// Current value of a parameter.
    pub fn value_of(&self, parameter: &Parameter) -> Option<f64> {
        match parameter {
            Parameter::Quantity(material) => self
                .alternative
                .quantities
                .materials()
                .any(|m| m == material)
                .then(|| self.alternative.quantities.get(material)),
            Parameter::ServiceLifeMean => Some(self.service_life.mean),
            Parameter::ServiceLifeStd => Some(self.service_life.std),
        }
    }

    /// Override that scales a parameter by (1 + fraction).
    pub fn perturbation(
        &self,
        parameter: &Parameter,
        fraction: PerturbationFraction,
    ) -> Result<ParameterOverride, DomainError> {
        let value = self.value_of(parameter).ok_or_else(|| unknown(parameter))?;
        Ok(ParameterOverride {
            parameter: parameter.clone(),
            value: value * (1.0 + fraction.value()),
        })
    }

    /// Returns a new state with one parameter replaced.
    ///
    /// # Errors
    /// `InvalidParameter` for a material not in the alternative, a negative
    /// quantity or an invalid service life.
    pub fn apply(&self, change: &ParameterOverride) -> Result<BaseState, DomainError> {
        match &change.parameter {
            Parameter::Quantity(material) => {
                if self.value_of(&change.parameter).is_none() {
                    return Err(unknown(&change.parameter));
                }
                let quantities = self.alternative.quantities.with_quantity(material, change.value);
                quantities.validate()?;
                Ok(BaseState {
                    alternative: AlternativeSpec {
                        name: self.alternative.name.clone(),
                        quantities,
                    },
                    service_life: self.service_life,
                })
            }
            Parameter::ServiceLifeMean => Ok(BaseState {
                alternative: self.alternative.clone(),
                service_life: ServiceLifeParams::new(change.value, self.service_life.std)?,
            }),
            Parameter::ServiceLifeStd => Ok(BaseState {
                alternative: self.alternative.clone(),
                service_life: ServiceLifeParams::new(self.service_life.mean, change.value)?,
            }),
        }
    }
}

fn unknown(parameter: &Parameter) -> DomainError {
    DomainError::invalid_parameter(
        "parameter",
        format!("'{}' is not a parameter of this state", parameter),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::simulation::ComponentQuantities;

    fn state() -> BaseState {
        BaseState::new(
            AlternativeSpec::new(
                "House",
                ComponentQuantities::from_pairs(&[("Hemp", 10.0), ("Concrete", 4.0)]).unwrap(),
            )
            .unwrap(),
            ServiceLifeParams::new(50.0, 5.0).unwrap(),
        )
        .unwrap()
    }

    fn hemp() -> Parameter {
        Parameter::Quantity(MaterialName::new("Hemp").unwrap())
    }

    #[test]
    fn fraction_bounds() {
        assert!(PerturbationFraction::new(0.0).is_err());
        assert!(PerturbationFraction::new(1.5).is_err());
        assert!(PerturbationFraction::new(f64::NAN).is_err());
        assert_eq!(PerturbationFraction::new(1.0).unwrap().value(), 1.0);
        assert_eq!(PerturbationFraction::default().as_percent(), 10.0);
    }

    #[test]
    fn fraction_deserialization_validates() {
        assert!(serde_json::from_str::<PerturbationFraction>("0.2").is_ok());
        assert!(serde_json::from_str::<PerturbationFraction>("2.0").is_err());
    }

    #[test]
    fn parameters_cover_quantities_and_service_life() {
        let names: Vec<String> = state().parameters().iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["Concrete", "Hemp", "Service life mean", "Service life std"]);
    }

    #[test]
    fn apply_returns_new_state_and_leaves_base_untouched() {
        let base = state();
        let snapshot = base.clone();
        let change = base.perturbation(&hemp(), PerturbationFraction::default()).unwrap();

        let trial = base.apply(&change).unwrap();

        assert_eq!(base, snapshot);
        assert!((trial.value_of(&hemp()).unwrap() - 11.0).abs() < 1e-12);
        assert_eq!(trial.value_of(&Parameter::ServiceLifeMean), Some(50.0));
    }

    #[test]
    fn service_life_overrides_are_validated() {
        let base = state();
        let bad = ParameterOverride {
            parameter: Parameter::ServiceLifeMean,
            value: -1.0,
        };
        assert!(base.apply(&bad).is_err());

        let std = base
            .apply(&ParameterOverride {
                parameter: Parameter::ServiceLifeStd,
                value: 6.0,
            })
            .unwrap();
        assert_eq!(std.service_life().std, 6.0);
    }

    #[test]
    fn unknown_material_is_rejected() {
        let change = ParameterOverride {
            parameter: Parameter::Quantity(MaterialName::new("Steel").unwrap()),
            value: 1.0,
        };
        assert!(state().apply(&change).is_err());
    }

    #[test]
    fn negative_quantity_override_is_an_invalid_parameter() {
        let change = ParameterOverride {
            parameter: hemp(),
            value: -3.0,
        };
        let err = state().apply(&change).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
        assert_eq!(err.detail("material"), Some("Hemp"));
    }
}
