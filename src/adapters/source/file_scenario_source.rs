//! File-based Scenario Source Adapter
//!
//! Reads a scenario document from JSON or YAML. A relative `profiles_path`
//! is resolved against the scenario file's directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::ports::{Scenario, ScenarioSource, SourceError};

use super::file_format::read_document;

/// Scenario stored on disk
#[derive(Debug, Clone)]
pub struct FileScenarioSource {
    path: PathBuf,
}

impl FileScenarioSource {
    /// Create a source reading `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            return relative.to_path_buf();
        }
        self.path
            .parent()
            .map(|dir| dir.join(relative))
            .unwrap_or_else(|| relative.to_path_buf())
    }
}

#[async_trait]
impl ScenarioSource for FileScenarioSource {
    async fn load_scenario(&self) -> Result<Scenario, SourceError> {
        let mut scenario: Scenario = read_document(&self.path).await?;
        scenario.profiles_path = scenario.profiles_path.as_deref().map(|p| self.resolve(p));
        scenario.validate()?;

        debug!(
            path = %self.path.display(),
            alternatives = scenario.alternatives.len(),
            embedded_profiles = scenario.profiles.is_some(),
            "Loaded scenario"
        );
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCENARIO_YAML: &str = "\
service_life:
  mean: 50.0
  std: 5.0
alternatives:
  - name: Hemp house
    quantities:
      Hemp: 10.0
profiles_path: profiles.json
sensitivity:
  - Hemp house
";

    #[tokio::test]
    async fn relative_profiles_path_is_resolved_against_scenario_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scenario.yaml");
        tokio::fs::write(&path, SCENARIO_YAML).await.unwrap();

        let scenario = FileScenarioSource::new(&path).load_scenario().await.unwrap();

        assert_eq!(
            scenario.profiles_path,
            Some(temp_dir.path().join("profiles.json"))
        );
        assert_eq!(scenario.sensitivity, vec!["Hemp house"]);
    }

    #[tokio::test]
    async fn embedded_profiles_from_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scenario.json");
        let body = serde_json::json!({
            "service_life": { "mean": 50.0, "std": 0.0 },
            "alternatives": [{ "name": "A", "quantities": { "Concrete": 2.0 } }],
            "profiles": { "Concrete": { "Climate change": { "mean": 3.0, "std": 0.3 } } },
            "seed": 7
        });
        tokio::fs::write(&path, body.to_string()).await.unwrap();

        let scenario = FileScenarioSource::new(&path).load_scenario().await.unwrap();
        assert_eq!(scenario.seed, Some(7));
        assert_eq!(scenario.profiles.map(|p| p.material_count()), Some(1));
    }

    #[tokio::test]
    async fn invalid_scenario_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scenario.json");
        let body = serde_json::json!({
            "service_life": { "mean": 50.0, "std": 0.0 },
            "alternatives": [],
            "profiles_path": "p.json"
        });
        tokio::fs::write(&path, body.to_string()).await.unwrap();

        assert!(matches!(
            FileScenarioSource::new(&path).load_scenario().await,
            Err(SourceError::Invalid(_))
        ));
    }
}
