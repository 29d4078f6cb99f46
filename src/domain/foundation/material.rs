//! Material names and coarse material classes.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::ValidationError;

/// Alternative spellings found in reference tables, mapped to the canonical name.
const MATERIAL_ALIASES: &[(&str, &str)] = &[
    ("ExternalWood", "External Wood"),
    ("External Wood OSB", "External Wood"),
    ("BeamWood", "Beam"),
    ("Firedbrick", "Fired Bricks"),
    ("FriedBricks", "Fired Bricks"),
    ("Glass wool", "Wool"),
    ("Glass", "Glazing"),
    ("Earthen", "Earth"),
    ("XPS", "Polystyrene"),
    ("Aluminum", "Aluminium"),
    ("CinderBlock", "Cinderblock"),
    ("Cinder blocks", "Cinderblock"),
    ("Transportation In moroco", "Transport in Morocco"),
    ("Transportation in Morocco", "Transport in Morocco"),
    ("Transportation in France", "Transport in France"),
    ("Transportation marine", "Transport Marine"),
];

/// Canonical material name.
///
/// Construction goes through alias resolution so "XPS" and "Polystyrene"
/// address the same profile, service life and module membership.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MaterialName(String);

impl MaterialName {
    /// Creates a canonical material name, rejecting blank input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("material"));
        }
        let canonical = MATERIAL_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
            .map(|(_, canonical)| *canonical)
            .unwrap_or(trimmed);
        Ok(Self(canonical.to_string()))
    }

    /// Returns the canonical name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Coarse class inferred from the name.
    pub fn class(&self) -> MaterialClass {
        MaterialClass::classify(&self.0)
    }
}

impl<'de> Deserialize<'de> for MaterialName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        MaterialName::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for MaterialName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MaterialName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Coarse material bucket used to pick synthesis priors and module membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialClass {
    Wood,
    Masonry,
    Metal,
    Insulation,
    Glass,
    System,
    Transport,
    Other,
}

impl MaterialClass {
    /// Classifies a material by case-insensitive name patterns.
    ///
    /// Patterns are checked in a fixed order; the first bucket with a match wins.
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        let has = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));

        if has(&["transport"]) {
            MaterialClass::Transport
        } else if has(&["wood", "beam", "osb", "plywood", "lath", "parquet", "poutrelle"]) {
            MaterialClass::Wood
        } else if has(&["concrete", "brick", "block", "cinder", "earth", "mortar"]) {
            MaterialClass::Masonry
        } else if has(&["steel", "metal", "aluminum", "aluminium"]) {
            MaterialClass::Metal
        } else if has(&["insulation", "wool", "xps", "polystyrene", "hemp"]) {
            MaterialClass::Insulation
        } else if has(&["pv", "hvac", "dhw", "battery", "system"]) {
            MaterialClass::System
        } else if has(&["glass", "glazing"]) {
            MaterialClass::Glass
        } else {
            MaterialClass::Other
        }
    }

    /// Returns the display label for this class.
    pub fn label(&self) -> &'static str {
        match self {
            MaterialClass::Wood => "wood",
            MaterialClass::Masonry => "masonry",
            MaterialClass::Metal => "metal",
            MaterialClass::Insulation => "insulation",
            MaterialClass::Glass => "glass",
            MaterialClass::System => "system",
            MaterialClass::Transport => "transport",
            MaterialClass::Other => "other",
        }
    }
}
