//! Comparison configuration

use serde::Deserialize;

use crate::domain::comparison::{ComparisonSettings, RowAlignment};

use super::error::ValidationError;

/// Comparison metric tunables
#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonConfig {
    /// Indifference threshold λ of the Heijungs metric
    #[serde(default = "default_indifference_threshold")]
    pub indifference_threshold: f64,

    /// `truncate` or `strict`
    #[serde(default)]
    pub row_alignment: RowAlignment,
}

impl ComparisonConfig {
    pub fn settings(&self) -> ComparisonSettings {
        ComparisonSettings {
            indifference_threshold: self.indifference_threshold,
            row_alignment: self.row_alignment,
        }
    }

    /// Validate comparison configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.indifference_threshold.is_finite() || self.indifference_threshold < 0.0 {
            return Err(ValidationError::InvalidIndifferenceThreshold(
                self.indifference_threshold,
            ));
        }
        Ok(())
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            indifference_threshold: default_indifference_threshold(),
            row_alignment: RowAlignment::default(),
        }
    }
}

fn default_indifference_threshold() -> f64 {
    0.05
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_defaults() {
        assert_eq!(ComparisonConfig::default().settings(), ComparisonSettings::default());
    }

    #[test]
    fn test_strict_alignment() {
        let config: ComparisonConfig = serde_json::from_str(r#"{ "row_alignment": "strict" }"#).unwrap();
        assert_eq!(config.settings().row_alignment, RowAlignment::Strict);
    }

    #[test]
    fn test_negative_threshold_is_invalid() {
        let config = ComparisonConfig {
            indifference_threshold: -1.0,
            ..ComparisonConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
