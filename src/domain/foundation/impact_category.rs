//! Impact category value object and the EF 3.0 category list.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// The 27 Environmental Footprint 3.0 midpoint categories, in report order.
pub const EF_IMPACT_CATEGORIES: &[&str] = &[
    "Acidification",
    "Climate change",
    "Climate change - Biogenic",
    "Climate change - Fossil",
    "Climate change - Land use and LU change",
    "Ecotoxicity, freshwater - inorganics",
    "Ecotoxicity, freshwater - organics - p.1",
    "Ecotoxicity, freshwater - organics - p.2",
    "Ecotoxicity, freshwater - part 1",
    "Ecotoxicity, freshwater - part 2",
    "Eutrophication, freshwater",
    "Eutrophication, marine",
    "Eutrophication, terrestrial",
    "Human toxicity, cancer",
    "Human toxicity, cancer - inorganics",
    "Human toxicity, cancer - organics",
    "Human toxicity, non-cancer",
    "Human toxicity, non-cancer - inorganics",
    "Human toxicity, non-cancer - organics",
    "Ionising radiation",
    "Land use",
    "Ozone depletion",
    "Particulate matter",
    "Photochemical ozone formation",
    "Resource use, fossils",
    "Resource use, minerals and metals",
    "Water use",
];

static DEFAULT_CATEGORIES: Lazy<Vec<ImpactCategory>> = Lazy::new(|| {
    EF_IMPACT_CATEGORIES
        .iter()
        .map(|name| ImpactCategory(name.to_string()))
        .collect()
});

/// A named environmental effect axis (e.g. "Climate change").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactCategory(String);

impl ImpactCategory {
    /// Creates a category, rejecting blank names.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("impact_category"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The default EF 3.0 category list.
    pub fn defaults() -> &'static [ImpactCategory] {
        &DEFAULT_CATEGORIES
    }

    /// Returns the category name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the climate change family of categories.
    pub fn is_climate_change(&self) -> bool {
        self.0.starts_with("Climate change")
    }

    /// True for the resource use family of categories.
    pub fn is_resource_use(&self) -> bool {
        self.0.starts_with("Resource use")
    }
}

impl fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ImpactCategory {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
